//! CSV row source
//!
//! Reads `machine_id,timestamp,cpu_util,mem_util` telemetry. A header line
//! is optional: when present, columns are matched by name (`entity_id` is
//! accepted for the id column) and may come in any order; otherwise the
//! four columns are taken positionally. Empty cells become missing values.
//! Timestamps are whole seconds; fractional values are rounded with a warning.

use blackice_core::{EntityId, Metric, Row, Timestamp};
use blackice_ports::{RowSource, SourceError, SourceResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Column positions within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    entity: usize,
    timestamp: usize,
    cpu: Option<usize>,
    memory: Option<usize>,
}

impl Columns {
    const POSITIONAL: Columns = Columns {
        entity: 0,
        timestamp: 1,
        cpu: Some(2),
        memory: Some(3),
    };

    fn from_header(fields: &[&str]) -> SourceResult<Self> {
        let find = |names: &[&str]| fields.iter().position(|f| names.contains(f));

        let entity = find(&["machine_id", "entity_id"])
            .ok_or_else(|| SourceError::MissingColumn("machine_id".to_string()))?;
        let timestamp = find(&["timestamp"])
            .ok_or_else(|| SourceError::MissingColumn("timestamp".to_string()))?;

        Ok(Self {
            entity,
            timestamp,
            cpu: find(&[Metric::Cpu.column()]),
            memory: find(&[Metric::Memory.column()]),
        })
    }
}

pub struct CsvRowSource<R> {
    reader: R,
    chunk_size: usize,
    entity_filter: Option<EntityId>,
    columns: Option<Columns>,
    line_number: usize,
    buffer: String,
    exhausted: bool,
}

impl CsvRowSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> CsvRowSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            chunk_size: DEFAULT_CHUNK_SIZE,
            entity_filter: None,
            columns: None,
            line_number: 0,
            buffer: String::new(),
            exhausted: false,
        }
    }

    /// Rows per chunk; clamped to at least 1
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Only yield rows for this entity
    pub fn with_entity(mut self, entity_id: impl Into<EntityId>) -> Self {
        self.entity_filter = Some(entity_id.into());
        self
    }

    /// Read the next non-blank line into the buffer
    fn read_line(&mut self) -> SourceResult<bool> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(false);
            }
            self.line_number += 1;
            if !self.buffer.trim().is_empty() {
                return Ok(true);
            }
        }
    }

    fn parse_line(&self, columns: Columns) -> SourceResult<Row> {
        let fields: Vec<&str> = self.buffer.trim_end_matches(['\r', '\n']).split(',').collect();
        let line = self.line_number;

        let field = |index: usize| fields.get(index).map(|f| f.trim()).unwrap_or("");

        let entity_id = field(columns.entity);
        if entity_id.is_empty() {
            return Err(malformed(line, "empty entity id"));
        }
        let timestamp = parse_timestamp(field(columns.timestamp), line)
            .ok_or_else(|| malformed(line, format!("bad timestamp '{}'", field(columns.timestamp))))?;

        let mut row = Row::new(entity_id, timestamp);
        row.cpu_util = parse_value(columns.cpu.map(field), line, Metric::Cpu)?;
        row.mem_util = parse_value(columns.memory.map(field), line, Metric::Memory)?;
        Ok(row)
    }
}

impl<R: BufRead> RowSource for CsvRowSource<R> {
    fn next_chunk(&mut self) -> SourceResult<Option<Vec<Row>>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(self.chunk_size);
        while rows.len() < self.chunk_size {
            if !self.read_line()? {
                self.exhausted = true;
                break;
            }

            let columns = match self.columns {
                Some(columns) => columns,
                None => {
                    let header = self.is_header();
                    let columns = self.detect_columns()?;
                    self.columns = Some(columns);
                    if header {
                        continue;
                    }
                    columns
                }
            };

            let row = self.parse_line(columns)?;
            match &self.entity_filter {
                Some(filter) if &row.entity_id != filter => continue,
                _ => rows.push(row),
            }
        }

        if rows.is_empty() {
            return Ok(None);
        }
        log::debug!("Read chunk of {} rows (line {})", rows.len(), self.line_number);
        Ok(Some(rows))
    }
}

impl<R: BufRead> CsvRowSource<R> {
    /// A first line whose timestamp column is not numeric is a header
    fn is_header(&self) -> bool {
        let mut fields = self.buffer.trim_end_matches(['\r', '\n']).split(',');
        match fields.nth(1) {
            Some(second) => second.trim().parse::<f64>().is_err(),
            None => true,
        }
    }

    fn detect_columns(&self) -> SourceResult<Columns> {
        if !self.is_header() {
            return Ok(Columns::POSITIONAL);
        }
        let fields: Vec<&str> = self
            .buffer
            .trim_end_matches(['\r', '\n'])
            .split(',')
            .map(str::trim)
            .collect();
        Columns::from_header(&fields)
    }
}

fn malformed(line: usize, message: impl Into<String>) -> SourceError {
    SourceError::Malformed {
        line,
        message: message.into(),
    }
}

/// Integer seconds; fractional seconds are rounded to the nearest second
fn parse_timestamp(raw: &str, line: usize) -> Option<Timestamp> {
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Some(ts);
    }
    let value = raw.parse::<f64>().ok()?;
    if !value.is_finite() || value.abs() >= Timestamp::MAX as f64 {
        return None;
    }
    let rounded = value.round();
    if rounded != value {
        log::warn!("Line {}: timestamp {} rounded to {}", line, raw, rounded);
    }
    Some(rounded as Timestamp)
}

fn parse_value(raw: Option<&str>, line: usize, metric: Metric) -> SourceResult<Option<f64>> {
    match raw {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .map_err(|_| malformed(line, format!("bad {} value '{}'", metric, text))),
    }
}
