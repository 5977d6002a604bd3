//! Reads complete records appended to the event source since a byte cursor.
//! A trailing line without its newline is still being written and is left
//! for the next read.

use super::{parse, InferenceEvent, RawRecord};
use crate::error::MonitorError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Present,
    /// Nothing has been served yet. Not an error.
    Absent,
}

/// Counters for one pass over the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub status: SourceStatus,
    pub accepted: u64,
    /// Malformed records skipped
    pub dropped: u64,
    /// Offset just past the last complete record consumed
    pub next_cursor: u64,
    /// An unterminated trailing record was left unread
    pub partial_tail: bool,
    /// The source was shorter than the cursor and was re-read from the start
    pub rewound: bool,
}

impl IngestSummary {
    fn absent(cursor: u64) -> Self {
        Self {
            status: SourceStatus::Absent,
            accepted: 0,
            dropped: 0,
            next_cursor: cursor,
            partial_tail: false,
            rewound: false,
        }
    }
}

/// Collected events plus their pass summary.
#[derive(Debug, Clone)]
pub struct IngestBatch {
    pub events: Vec<InferenceEvent>,
    pub summary: IngestSummary,
}

/// Lazy sequence of newline-terminated records starting at a byte offset.
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
    partial: bool,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R, start: u64) -> Self {
        Self {
            inner,
            offset: start,
            partial: false,
            done: false,
        }
    }

    /// Offset just past the last complete record yielded.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn saw_partial(&self) -> bool {
        self.partial
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = Vec::new();
        match self.inner.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                if buf.last() != Some(&b'\n') {
                    self.partial = true;
                    self.done = true;
                    return None;
                }
                let start = self.offset;
                self.offset += n as u64;
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
                Some(Ok(RawRecord { offset: start, bytes: buf }))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

pub struct EventIngester {
    features: Vec<String>,
}

impl EventIngester {
    pub fn new(features: Vec<String>) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Stream accepted events from `cursor` onward into `on_event`.
    pub fn ingest(
        &self,
        path: &Path,
        cursor: u64,
        on_event: impl FnMut(InferenceEvent),
    ) -> Result<IngestSummary, MonitorError> {
        self.ingest_cancellable(path, cursor, &AtomicBool::new(false), on_event)
    }

    /// Like [`ingest`](Self::ingest), but checks `cancel` before every record
    /// and stops with `MonitorError::Cancelled` once it is set. Events already
    /// handed to `on_event` are the caller's to discard.
    pub fn ingest_cancellable(
        &self,
        path: &Path,
        cursor: u64,
        cancel: &AtomicBool,
        mut on_event: impl FnMut(InferenceEvent),
    ) -> Result<IngestSummary, MonitorError> {
        if cancel.load(Ordering::Relaxed) {
            return Err(MonitorError::Cancelled);
        }
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "event source absent; no production traffic yet");
                return Ok(IngestSummary::absent(cursor));
            }
            Err(e) => return Err(e.into()),
        };

        let len = file.metadata()?.len();
        let (start, rewound) = if len < cursor {
            warn!(
                path = %path.display(),
                cursor,
                len,
                "event source shorter than cursor; re-reading from start"
            );
            (0, true)
        } else {
            (cursor, false)
        };
        file.seek(SeekFrom::Start(start))?;

        let mut reader = RecordReader::new(BufReader::new(file), start);
        let mut accepted = 0;
        let mut dropped = 0;
        for record in reader.by_ref() {
            if cancel.load(Ordering::Relaxed) {
                debug!(accepted, dropped, "ingest cancelled");
                return Err(MonitorError::Cancelled);
            }
            let record = record?;
            if record.is_blank() {
                continue;
            }
            match parse(&record, &self.features) {
                Ok(ev) => {
                    accepted += 1;
                    on_event(ev);
                }
                Err(e) => {
                    dropped += 1;
                    debug!(offset = record.offset, error = %e, "dropping malformed record");
                }
            }
        }

        Ok(IngestSummary {
            status: SourceStatus::Present,
            accepted,
            dropped,
            next_cursor: reader.offset(),
            partial_tail: reader.saw_partial(),
            rewound,
        })
    }

    /// Collect every event appended after `cursor`.
    pub fn read_from(&self, path: &Path, cursor: u64) -> Result<IngestBatch, MonitorError> {
        let mut events = Vec::new();
        let summary = self.ingest(path, cursor, |ev| events.push(ev))?;
        Ok(IngestBatch { events, summary })
    }

    /// Re-read the whole source.
    pub fn read_all(&self, path: &Path) -> Result<IngestBatch, MonitorError> {
        self.read_from(path, 0)
    }
}
