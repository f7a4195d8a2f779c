//! # Event Log
//!
//! Loads the external timestamped log (CSV with a header row) and lets the
//! operator pick one record by a column value. All cells are kept as text;
//! only the time column is ever interpreted.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::clock::ClockReading;
use crate::config::EventsConfig;
use crate::error::{EventLogError, Result, TimestampError};

/// One row of the event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    row: usize,
    fields: Vec<(String, String)>,
}

impl EventRecord {
    /// Zero-based row number in the log (header excluded)
    pub fn row(&self) -> usize {
        self.row
    }

    /// Value of `column`, if the row has it
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// All `(column, value)` pairs in header order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Time of day of this event
    ///
    /// The time column may hold a full date-time such as `2024-01-05 09:03:30`;
    /// its last whitespace-delimited token is parsed as `HH:MM:SS`.
    pub fn clock(&self, time_column: &str) -> std::result::Result<ClockReading, TimestampError> {
        let value = self.get(time_column).ok_or_else(|| TimestampError::MissingColumn {
            column: time_column.to_string(),
        })?;

        let token = value
            .split_whitespace()
            .last()
            .ok_or_else(|| TimestampError::Empty {
                column: time_column.to_string(),
            })?;

        Ok(ClockReading::parse(token)?)
    }
}

/// The loaded event log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    headers: Vec<String>,
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Load a CSV event log from disk
    pub fn from_path<P: AsRef<Path>>(path: P, config: &EventsConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| EventLogError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let log = Self::from_reader(file, config).map_err(|e| match e {
            crate::error::SyncError::EventLog(EventLogError::ReadFailed { reason, .. }) => {
                EventLogError::ReadFailed {
                    path: path.display().to_string(),
                    reason,
                }
                .into()
            }
            other => other,
        })?;

        info!("Loaded {} events with {} columns from {:?}", log.len(), log.headers.len(), path);
        Ok(log)
    }

    /// Parse a CSV event log from any reader
    pub fn from_reader<R: Read>(reader: R, config: &EventsConfig) -> Result<Self> {
        let read_failed = |reason: String| EventLogError::ReadFailed {
            path: "<input>".to_string(),
            reason,
        };

        let delimiter = config
            .delimiter_byte()
            .ok_or_else(|| read_failed(format!("unsupported delimiter {:?}", config.delimiter)))?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| read_failed(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for (row, result) in csv_reader.records().enumerate() {
            let record = result.map_err(|e| read_failed(e.to_string()))?;
            let fields = headers
                .iter()
                .zip(record.iter())
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect();
            records.push(EventRecord { row, fields });
        }

        debug!("Parsed {} event rows", records.len());
        Ok(Self { headers, records })
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of `column` in row order, duplicates included
    pub fn values(&self, column: &str) -> Result<Vec<&str>> {
        self.require_column(column)?;
        Ok(self
            .records
            .iter()
            .map(|record| record.get(column).unwrap_or(""))
            .collect())
    }

    /// First record whose `column` equals `value`
    ///
    /// When several rows share the value, the earliest row wins.
    pub fn find_first(&self, column: &str, value: &str) -> Result<Option<&EventRecord>> {
        self.require_column(column)?;
        Ok(self
            .records
            .iter()
            .find(|record| record.get(column).unwrap_or("") == value))
    }

    fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(EventLogError::UnknownColumn {
                column: column.to_string(),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LOG: &str = "\
ID,DATE AND TIME,MESSAGE
A1,2024-01-05 09:03:30,door opened
A2,2024-01-05 09:04:10,door closed
A1,2024-01-05 09:07:00,door opened again
A3,,no time
A4,yesterday noonish,bad time
";

    fn log() -> EventLog {
        EventLog::from_reader(LOG.as_bytes(), &EventsConfig::default()).unwrap()
    }

    #[test]
    fn test_columns_and_values() {
        let log = log();
        assert_eq!(log.columns(), ["ID", "DATE AND TIME", "MESSAGE"]);
        assert_eq!(log.len(), 5);
        assert_eq!(log.values("ID").unwrap(), vec!["A1", "A2", "A1", "A3", "A4"]);
        assert!(log.values("NOPE").is_err());
    }

    #[test]
    fn test_first_match_wins_for_duplicates() {
        let log = log();
        let record = log.find_first("ID", "A1").unwrap().unwrap();
        assert_eq!(record.row(), 0);
        assert_eq!(record.get("MESSAGE"), Some("door opened"));
        assert!(log.find_first("ID", "Z9").unwrap().is_none());
    }

    #[test]
    fn test_clock_takes_last_token() {
        let log = log();
        let record = log.find_first("ID", "A2").unwrap().unwrap();
        assert_eq!(record.clock("DATE AND TIME").unwrap().to_string(), "09:04:10");

        let bare = EventLog::from_reader("T\n09:00:01\n".as_bytes(), &EventsConfig::default()).unwrap();
        assert_eq!(bare.records()[0].clock("T").unwrap().to_string(), "09:00:01");
    }

    #[test]
    fn test_clock_failures() {
        let log = log();
        let empty = log.find_first("ID", "A3").unwrap().unwrap();
        assert!(matches!(empty.clock("DATE AND TIME"), Err(TimestampError::Empty { .. })));

        let bad = log.find_first("ID", "A4").unwrap().unwrap();
        assert!(matches!(bad.clock("DATE AND TIME"), Err(TimestampError::Unparseable(_))));

        assert!(matches!(bad.clock("WHEN"), Err(TimestampError::MissingColumn { .. })));
    }

    #[test]
    fn test_from_path_with_custom_delimiter() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ID;DATE AND TIME\nB1;05/01/2024 10:00:00\n").unwrap();

        let config = EventsConfig {
            delimiter: ';',
            ..EventsConfig::default()
        };
        let log = EventLog::from_path(file.path(), &config).unwrap();
        let record = log.find_first("ID", "B1").unwrap().unwrap();
        assert_eq!(record.clock("DATE AND TIME").unwrap().to_string(), "10:00:00");
    }

    #[test]
    fn test_empty_log() {
        let log = EventLog::from_reader("ID,DATE AND TIME\n".as_bytes(), &EventsConfig::default()).unwrap();
        assert!(log.is_empty());
        assert_eq!(log.columns().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = EventLog::from_path("/no/such/events.csv", &EventsConfig::default()).unwrap_err();
        assert!(err.user_message().contains("/no/such/events.csv"));
    }
}
