//! CSV serialization and the single-owner output sink
//!
//! Serialization contract: textual fields are wrapped in double quotes with
//! interior quotes doubled; raw fields (numeric scores, the
//! unknown-platform sentinel) are emitted verbatim.
//!
//! Concurrent writers never interleave partial lines because no writer
//! touches the file directly: [`CsvSink`] spawns one owner task holding the
//! buffered file handle, and every producer sends fully formatted lines to
//! it over a channel. The header goes out before the channel opens, so it
//! appears exactly once and always first.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::types::{CsvField, CsvRecord};

/// Channel capacity between producers and the writer task. Writers briefly
/// suspend when the file falls behind, which keeps memory bounded.
const SINK_QUEUE_DEPTH: usize = 64;

/// Quote a textual field: wrap in double quotes, doubling interior quotes.
pub fn quote(field: &str) -> String {
    let mut quoted = String::with_capacity(field.len() + 2);
    quoted.push('"');
    for ch in field.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Render one record into a CSV line (no trailing newline).
pub fn format_line<R: CsvRecord>(record: &R) -> String {
    let fields: Vec<String> = record
        .fields()
        .into_iter()
        .map(|field| match field {
            CsvField::Text(value) => quote(&value),
            CsvField::Raw(value) => value,
        })
        .collect();
    fields.join(",")
}

/// Single-owner CSV writer
///
/// Opening the destination is fatal on failure and happens before any page
/// work. Cloneable [`SinkHandle`]s feed the owner task; [`CsvSink::close`]
/// drains outstanding writes, flushes, and surfaces any I/O error.
#[derive(Debug)]
pub struct CsvSink {
    tx: mpsc::Sender<String>,
    writer: JoinHandle<std::io::Result<()>>,
}

/// Cloneable producer handle for a [`CsvSink`]
#[derive(Clone, Debug)]
pub struct SinkHandle {
    tx: mpsc::Sender<String>,
}

impl CsvSink {
    /// Create the output file, write `header`, and spawn the owner task.
    pub async fn create(path: &Path, header: &str) -> Result<Self> {
        let file = File::create(path).await?;
        let mut out = BufWriter::new(file);
        out.write_all(header.as_bytes()).await?;
        out.write_all(b"\n").await?;

        let (tx, mut rx) = mpsc::channel::<String>(SINK_QUEUE_DEPTH);
        let writer = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                out.write_all(line.as_bytes()).await?;
                out.write_all(b"\n").await?;
            }
            out.flush().await
        });

        Ok(Self { tx, writer })
    }

    /// Get a producer handle for this sink.
    pub fn handle(&self) -> SinkHandle {
        SinkHandle {
            tx: self.tx.clone(),
        }
    }

    /// Close the sink: drain pending writes, flush, report I/O errors.
    ///
    /// Every cloned handle must be dropped before this resolves; drivers
    /// call it only after joining their workers.
    pub async fn close(self) -> Result<()> {
        drop(self.tx);
        match self.writer.await {
            Ok(io_result) => io_result.map_err(Error::Io),
            Err(_) => Err(Error::SinkClosed),
        }
    }
}

impl SinkHandle {
    /// Serialize `record` and enqueue it for the owner task.
    pub async fn write<R: CsvRecord>(&self, record: &R) -> Result<()> {
        self.tx
            .send(format_line(record))
            .await
            .map_err(|_| Error::SinkClosed)
    }
}
