// Diagnostic for clock recognition on a single image or video frame

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clocksync::{
    config::Config,
    recognition::{find_clock, ClockExtractor, TesseractRecognizer, TextRecognizer},
    sync::TimeRangeResolver,
    video::{FfmpegSource, Frame, VideoClockReader, VideoSource},
};

#[derive(Parser)]
#[command(name = "probe_clock", version, about = "Show what the recognizer reads on a frame")]
struct Cli {
    /// Image or video file
    input: PathBuf,

    /// Frame index to read when the input is a video (default: first and last usable)
    #[arg(short, long)]
    frame: Option<u64>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the decoded frame as PNG
    #[arg(short, long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;

    let recognizer = Arc::new(TesseractRecognizer::new(&config.recognition));
    if !recognizer.check_available() {
        anyhow::bail!("tesseract not found at '{}'", config.recognition.tesseract_path);
    }

    // Still images go straight to the recognizer
    if let Ok(frame) = Frame::open(&cli.input) {
        println!("Image {}x{}", frame.width(), frame.height());
        report(recognizer.as_ref(), &frame)?;
        return Ok(());
    }

    let source = Arc::new(FfmpegSource::new(&config.video));
    let extractor = ClockExtractor::new(recognizer.clone());

    match cli.frame {
        Some(index) => {
            let mut handle = source.open(&cli.input)?;
            let metadata = handle.metadata().clone();
            println!(
                "Video {:.2}s, {} frames at {:.2} fps",
                metadata.duration, metadata.frame_count, metadata.fps
            );
            match handle.decode_frame(index)? {
                Some(frame) => {
                    if let Some(path) = &cli.save {
                        frame.save_png(path)?;
                        println!("Saved frame {} to {}", index, path.display());
                    }
                    report(recognizer.as_ref(), &frame)?;
                }
                None => println!("Frame {} is past the end of the video", index),
            }
        }
        None => {
            let reader = VideoClockReader::new(source, extractor, config.video.end_frame_backoff);
            let range = TimeRangeResolver::new(reader).resolve_range(&cli.input)?;
            match (range.start, range.end) {
                (Some(start), Some(end)) => {
                    println!("Clock range: {} to {} ({}s)", start, end, end.seconds_since(start));
                }
                _ => println!("Clock range incomplete: {:?}", range),
            }
        }
    }

    Ok(())
}

fn report(recognizer: &dyn TextRecognizer, frame: &Frame) -> Result<()> {
    let fragments = recognizer.recognize(frame)?;
    println!("Recognized {} fragment(s) with {}:", fragments.len(), recognizer.name());
    for fragment in &fragments {
        println!("  {:?}", fragment);
    }
    match find_clock(&fragments.join(" ")) {
        Some(clock) => println!("Clock: {}", clock),
        None => println!("Clock: none"),
    }
    Ok(())
}
