use crate::error::{DataLoadError, Result};
use crate::models::{EnergyColumn, Reading, Readings};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const TIMESTAMP_COLUMN: &str = "Date_and_time";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const WH_PER_KWH: f64 = 1000.0;

/// Column positions resolved from the normalized header row.
struct ColumnIndex {
    timestamp: usize,
    energy: [usize; 5],
}

pub struct DataLoader {
    delimiter: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load PV readings from a CSV file on disk
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Readings> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DataLoadError::FileNotFound(path.to_path_buf()),
            _ => DataLoadError::Io(e),
        })?;

        let readings = self.load_from_reader(file)?;
        log::info!("Loaded {} readings from {}", readings.len(), path.display());
        Ok(readings)
    }

    /// Load PV readings from any CSV source with a header row
    pub fn load_from_reader<R: Read>(&self, source: R) -> Result<Readings> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(source);

        let headers = normalize_headers(reader.headers()?);
        let index = resolve_columns(&headers)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(parse_record(&record, &index)?);
        }

        Ok(Readings::new(rows))
    }
}

/// Replace spaces in header names with underscores ("Date and time" -> "Date_and_time").
pub fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    headers.iter().map(|h| h.replace(' ', "_")).collect()
}

fn resolve_columns(headers: &[String]) -> Result<ColumnIndex> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataLoadError::MissingColumn(name.to_string()))
    };

    let timestamp = find(TIMESTAMP_COLUMN)?;
    let mut energy = [0usize; 5];
    for (slot, column) in energy.iter_mut().zip(EnergyColumn::ALL) {
        *slot = find(column.header())?;
    }

    Ok(ColumnIndex { timestamp, energy })
}

fn parse_record(record: &StringRecord, index: &ColumnIndex) -> Result<Reading> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let field = |idx: usize| record.get(idx).unwrap_or("");

    let raw_timestamp = field(index.timestamp);
    let timestamp = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT).map_err(|e| {
        DataLoadError::Parse {
            line,
            column: TIMESTAMP_COLUMN.to_string(),
            value: raw_timestamp.to_string(),
            reason: e.to_string(),
        }
    })?;

    let mut kwh = [0.0f64; 5];
    for ((value, &idx), column) in kwh.iter_mut().zip(&index.energy).zip(EnergyColumn::ALL) {
        let raw = field(idx);
        let wh: f64 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| {
            DataLoadError::Parse {
                line,
                column: column.header().to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            }
        })?;
        if !wh.is_finite() {
            return Err(DataLoadError::Parse {
                line,
                column: column.header().to_string(),
                value: raw.to_string(),
                reason: "non-finite value".to_string(),
            });
        }
        *value = wh / WH_PER_KWH;
    }

    Ok(Reading::new(timestamp, kwh))
}
