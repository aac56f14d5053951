use crate::error::{ProcessingError, Result};
use crate::models::ObservationRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Downstream receiver of timestamped observations. A failing `put` aborts
/// the import that issued it.
pub trait ObservationSink {
    fn put(&mut self, timestamp: NaiveDateTime, record: &ObservationRecord) -> Result<()>;
}

#[derive(Serialize)]
struct Line<'a> {
    time: String,
    value: &'a ObservationRecord,
}

/// Writes one JSON object per observation
pub struct JsonLinesWriter<W: Write> {
    writer: W,
    written: usize,
}

impl JsonLinesWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ObservationSink for JsonLinesWriter<W> {
    fn put(&mut self, timestamp: NaiveDateTime, record: &ObservationRecord) -> Result<()> {
        let line = Line {
            time: timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            value: record,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

/// Keeps every observation in memory, optionally refusing after a limit
#[derive(Debug, Default)]
pub struct MemorySink {
    points: Vec<(NaiveDateTime, ObservationRecord)>,
    capacity: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            points: Vec::new(),
            capacity: Some(capacity),
        }
    }

    pub fn points(&self) -> &[(NaiveDateTime, ObservationRecord)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(NaiveDateTime, ObservationRecord)> {
        self.points
    }
}

impl ObservationSink for MemorySink {
    fn put(&mut self, timestamp: NaiveDateTime, record: &ObservationRecord) -> Result<()> {
        if self.capacity.is_some_and(|limit| self.points.len() >= limit) {
            return Err(ProcessingError::Sink(format!(
                "memory sink full after {} points",
                self.points.len()
            )));
        }
        self.points.push((timestamp, record.clone()));
        Ok(())
    }
}

impl<S: ObservationSink + ?Sized> ObservationSink for &mut S {
    fn put(&mut self, timestamp: NaiveDateTime, record: &ObservationRecord) -> Result<()> {
        (**self).put(timestamp, record)
    }
}
