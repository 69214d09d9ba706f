//! CSV export of scraped messages

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

/// Column names, in output order.
pub const CSV_HEADER: [&str; 6] = [
    "Channel Title",
    "Channel Username",
    "ID",
    "Message",
    "Date",
    "Media Path",
];

/// Date layout of the `Date` column, e.g. `2024-01-05 09:30:00+00:00`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    #[serde(rename = "Channel Title")]
    pub channel_title: String,
    #[serde(rename = "Channel Username")]
    pub channel_username: String,
    #[serde(rename = "ID")]
    pub id: i32,
    #[serde(rename = "Message")]
    pub message: Option<String>,
    #[serde(rename = "Date", serialize_with = "serialize_date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "Media Path")]
    pub media_path: Option<String>,
}

fn serialize_date<S>(date: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
}

/// Row writer shared by every channel in a run.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (or truncate) the CSV file and write the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wrap any writer and write the header row.
    pub fn new(inner: W) -> Result<Self> {
        // Header is written explicitly so an empty run still has it.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(CSV_HEADER)?;
        Ok(Self { writer, rows: 0 })
    }

    /// Append one message row.
    pub fn write(&mut self, record: &MessageRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush buffered rows.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::Error::CsvError(e.error().to_string()))
    }
}
