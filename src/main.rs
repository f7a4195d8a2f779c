use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use clocksync::{
    config::Config,
    events::EventLog,
    playback::player_from_config,
    recognition::TesseractRecognizer,
    sync::{SeekCoordinator, SeekEvent, SeekOutcome, SyncEngine, VideoTimeRange},
    video::FfmpegSource,
};

#[derive(Parser)]
#[command(
    name = "clocksync",
    version,
    about = "Seek a video to the moment an event log entry happened",
    long_about = "Clocksync reads the clock burned into a video's frames, maps the time of a selected event log row to a playback position and hands it to a player. A jump time pushes the position forward."
)]
struct Cli {
    /// Video file to synchronize
    #[arg(long)]
    video: PathBuf,

    /// Event log (CSV with a header row)
    #[arg(short, long)]
    events: PathBuf,

    /// Column used to pick events (defaults to the first column)
    #[arg(short = 'k', long)]
    column: Option<String>,

    /// Column holding the event time of day
    #[arg(short, long)]
    time_column: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the video as-is instead of re-encoding it first
    #[arg(long)]
    no_transcode: bool,

    /// Compute seek positions without starting a player
    #[arg(long)]
    no_playback: bool,

    /// Select this value and exit instead of starting the console
    #[arg(short, long)]
    select: Option<String>,

    /// Jump time (HH:MM:SS) applied after --select
    #[arg(short, long, requires = "select")]
    jump: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("Starting clocksync v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    if let Some(time_column) = &cli.time_column {
        config.events.time_column = time_column.clone();
    }
    if cli.no_transcode {
        config.video.transcode = false;
    }
    if cli.no_playback {
        config.playback.enabled = false;
    }
    config.validate()?;

    let log = EventLog::from_path(&cli.events, &config.events)?;
    if log.is_empty() {
        println!("The event log is empty. There is nothing to select.");
        return Ok(());
    }
    let column = match &cli.column {
        Some(column) => column.clone(),
        None => log
            .columns()
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("The event log has no header row"))?,
    };
    if !log.has_column(&column) {
        anyhow::bail!("The event log has no column named '{}'", column);
    }

    let source = Arc::new(FfmpegSource::new(&config.video));
    if !source.check_available() {
        warn!("ffmpeg not found at '{}'", config.video.ffmpeg_path);
    }
    let recognizer = Arc::new(TesseractRecognizer::new(&config.recognition));
    if !recognizer.check_available() {
        warn!("tesseract not found at '{}'; clocks will not be read", config.recognition.tesseract_path);
    }

    let engine = SyncEngine::new(config.clone(), source, recognizer);
    let video = match engine.load_video(&cli.video) {
        Ok(video) => video,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    let player = player_from_config(&config.playback);
    let mut console = Console {
        coordinator: engine.coordinator(video, player),
        log,
        column,
    };
    console.show_video();

    match &cli.select {
        Some(value) => {
            console.select(value)?;
            if let Some(jump) = &cli.jump {
                console.jump(jump);
            }
            if config.playback.enabled {
                println!("Press Enter to stop playback.");
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line)?;
            }
        }
        None => console.run()?,
    }

    Ok(())
}

/// Line-based operator console over one video and one event log
struct Console {
    coordinator: SeekCoordinator,
    log: EventLog,
    column: String,
}

impl Console {
    fn run(&mut self) -> Result<()> {
        print_help();
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let (command, argument) = match line.trim().split_once(char::is_whitespace) {
                Some((command, argument)) => (command, argument.trim()),
                None => (line.trim(), ""),
            };

            match command {
                "" => {}
                "columns" => println!("{}", self.log.columns().join(", ")),
                "column" => self.set_column(argument),
                "values" => self.list_values()?,
                "select" => {
                    if let Err(e) = self.select(argument) {
                        println!("{}", e);
                    }
                }
                "clear" => {
                    let label = self.coordinator.unselected_label().to_string();
                    self.select(&label)?;
                }
                "jump" => self.jump(argument),
                "status" => self.show_status(),
                "help" => print_help(),
                "quit" | "exit" => break,
                other => println!("Unknown command '{}'. Type 'help' for a list.", other),
            }
        }

        Ok(())
    }

    fn set_column(&mut self, column: &str) {
        if self.log.has_column(column) {
            self.column = column.to_string();
            println!("Selecting by '{}'", self.column);
        } else {
            println!("The event log has no column named '{}'.", column);
        }
    }

    fn list_values(&self) -> Result<()> {
        println!("  {}", self.coordinator.unselected_label());
        for value in self.log.values(&self.column)? {
            println!("  {}", value);
        }
        Ok(())
    }

    fn select(&mut self, value: &str) -> Result<()> {
        let events = self
            .coordinator
            .select(&self.log, &self.column, value)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        self.render(&events);
        Ok(())
    }

    fn jump(&mut self, text: &str) {
        let events = self.coordinator.edit_jump(text);
        if events.is_empty() {
            println!("Jump set to '{}'.", self.coordinator.session().jump());
        }
        self.render(&events);
    }

    fn render(&self, events: &[SeekEvent]) {
        for event in events {
            match event {
                SeekEvent::Unselected => println!("No event selected."),
                SeekEvent::JumpReset(jump) => println!("Jump reset to '{}'.", jump),
                SeekEvent::Degraded(degradation) => println!("! {}", degradation),
                SeekEvent::Seek(outcome) => self.show_seek(outcome),
            }
        }
    }

    fn show_seek(&self, outcome: &SeekOutcome) {
        for line in seek_summary(&self.coordinator.video().range, outcome) {
            println!("{}", line);
        }
    }

    fn show_video(&self) {
        let video = self.coordinator.video();
        println!("Video: {}", video.source.display());
        if video.media != video.source {
            println!("Playing: {}", video.media.display());
        }
        println!(
            "Clock: {} to {} ({:.0}s, {} frames)",
            clock_text(video.range.start),
            clock_text(video.range.end),
            video.metadata.duration,
            video.metadata.frame_count
        );
        for degradation in &video.degradations {
            println!("! {}", degradation);
        }
        println!("Events: {} rows, selecting by '{}'", self.log.len(), self.column);
    }

    fn show_status(&self) {
        let session = self.coordinator.session();
        println!("State: {:?}", session.state());
        println!("Selected: {}", session.selected().unwrap_or("-"));
        println!("Jump: {}", session.jump());
        println!("Column: {} (time in '{}')", self.column, self.coordinator.time_column());
    }
}

/// Lines shown for a computed seek; "Start time" is the video's first clock
fn seek_summary(range: &VideoTimeRange, outcome: &SeekOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "Video clock: {} to {}",
        clock_text(range.start),
        clock_text(range.end)
    )];
    if let Some(record) = &outcome.record {
        lines.push(format!("Row {}:", record.row() + 1));
        for (column, value) in record.fields() {
            lines.push(format!("  {}: {}", column, value));
        }
    }
    lines.push(format!("Start time: {}", clock_text(range.start)));
    lines.push(format!("Event time: {}", clock_text(outcome.event_time)));
    lines.push(format!("Jump: {}", outcome.jump));
    lines.push(format!(
        "Playing from {} ({} + {}s jump)",
        outcome.offset, outcome.base, outcome.adjustment
    ));
    lines
}

fn clock_text<T: ToString>(clock: Option<T>) -> String {
    clock.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string())
}

fn print_help() {
    println!("Commands:");
    println!("  columns          list event log columns");
    println!("  column <name>    select events by another column");
    println!("  values           list values of the current column");
    println!("  select <value>   seek to the first row with this value");
    println!("  clear            clear the selection");
    println!("  jump <HH:MM:SS>  move forward to a later time of day");
    println!("  status           show the current selection");
    println!("  quit             exit");
}
