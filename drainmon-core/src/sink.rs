//! CSV output sink
//!
//! One sink exclusively owns the output file for the lifetime of a
//! monitoring run. Rows are flushed as they are written so the file stays
//! readable after an abrupt termination.

use crate::error::SinkError;
use crate::sample::Sample;
use chrono::SecondsFormat;
use std::fs::File;
use std::path::Path;

/// Column order of the output file
pub const CSV_HEADER: [&str; 12] = [
    "timestamp",
    "cpu_percent",
    "memory_rss_mb",
    "memory_vms_mb",
    "process_threads",
    "thread_pool_total",
    "thread_pool_borrowed",
    "thread_pool_available",
    "thread_pool_waiting",
    "pending_bg_tasks",
    "active_threads",
    "phase",
];

/// Destination for sample rows
pub trait SampleSink {
    /// Append one sample and make it durable
    fn write_sample(&mut self, sample: &Sample) -> Result<(), SinkError>;
}

/// File-backed CSV sink
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Create the output file and write the header row
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl SampleSink for CsvSink {
    fn write_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
        self.writer.write_record(to_record(sample))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Render a sample as CSV cells; the absent runtime group serializes as
/// empty strings so the schema stays fixed-width.
fn to_record(sample: &Sample) -> Vec<String> {
    let mut record = vec![
        sample
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        format!("{:.2}", sample.cpu_percent),
        format!("{:.2}", to_mb(sample.memory_rss_bytes)),
        format!("{:.2}", to_mb(sample.memory_vms_bytes)),
        sample.process_threads.to_string(),
    ];

    match &sample.runtime {
        Some(runtime) => {
            record.push(runtime.thread_pool_total.to_string());
            record.push(runtime.thread_pool_borrowed.to_string());
            record.push(runtime.thread_pool_available.to_string());
            record.push(runtime.thread_pool_waiting.to_string());
            record.push(runtime.pending_bg_tasks.to_string());
            record.push(runtime.active_threads.to_string());
        }
        None => {
            record.extend(std::iter::repeat_n(String::new(), 6));
        }
    }

    record.push(sample.phase.as_str().to_string());
    record
}

fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
