//! Inference events written by the serving component, one JSON object per line.
//! Parsing is strict on tracked features and lenient on everything else.

mod ingester;
mod log;

pub use ingester::{EventIngester, IngestBatch, IngestSummary, RecordReader, SourceStatus};
pub use log::EventLog;

use crate::error::ParseError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One complete, newline-terminated line from the event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Byte offset of the first byte of the line
    pub offset: u64,
    /// Line content without the trailing newline
    pub bytes: Vec<u8>,
}

impl RawRecord {
    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(u8::is_ascii_whitespace)
    }
}

/// One served prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceEvent {
    #[serde(flatten)]
    pub features: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl InferenceEvent {
    pub fn new(features: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            features: features.into_iter().collect(),
            prediction: None,
            probability: None,
            timestamp: None,
        }
    }

    pub fn with_prediction(mut self, prediction: u8, probability: f64) -> Self {
        self.prediction = Some(prediction);
        self.probability = Some(probability);
        self.timestamp = Some(Utc::now());
        self
    }

    pub fn value(&self, feature: &str) -> Option<f64> {
        self.features.get(feature).copied()
    }
}

/// Parse one record, keeping only the tracked features.
pub fn parse(record: &RawRecord, features: &[String]) -> Result<InferenceEvent, ParseError> {
    let value: Value =
        serde_json::from_slice(&record.bytes).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let obj = value.as_object().ok_or(ParseError::NotAnObject)?;

    let mut values = BTreeMap::new();
    for name in features {
        let v = match obj.get(name) {
            None | Some(Value::Null) => return Err(ParseError::MissingFeature(name.clone())),
            Some(v) => v,
        };
        let x = v
            .as_f64()
            .filter(|x| x.is_finite())
            .ok_or_else(|| ParseError::NonNumeric(name.clone()))?;
        values.insert(name.clone(), x);
    }

    Ok(InferenceEvent {
        features: values,
        prediction: parse_prediction(obj)?,
        probability: parse_probability(obj)?,
        timestamp: parse_timestamp(obj)?,
    })
}

fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn parse_prediction(obj: &Map<String, Value>) -> Result<Option<u8>, ParseError> {
    let Some(v) = present(obj, "prediction") else {
        return Ok(None);
    };
    match v.as_u64() {
        Some(p @ (0 | 1)) => Ok(Some(p as u8)),
        _ => Err(ParseError::InvalidMetadata {
            field: "prediction",
            reason: format!("expected 0 or 1, got {}", v),
        }),
    }
}

fn parse_probability(obj: &Map<String, Value>) -> Result<Option<f64>, ParseError> {
    let Some(v) = present(obj, "probability") else {
        return Ok(None);
    };
    match v.as_f64() {
        Some(p) if (0.0..=1.0).contains(&p) => Ok(Some(p)),
        _ => Err(ParseError::InvalidMetadata {
            field: "probability",
            reason: format!("expected a number in [0, 1], got {}", v),
        }),
    }
}

fn parse_timestamp(obj: &Map<String, Value>) -> Result<Option<DateTime<Utc>>, ParseError> {
    let Some(v) = present(obj, "timestamp") else {
        return Ok(None);
    };
    let invalid = || ParseError::InvalidMetadata {
        field: "timestamp",
        reason: format!("expected ISO-8601, got {}", v),
    };
    let s = v.as_str().ok_or_else(invalid)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    // Offset-less timestamps are taken as UTC.
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| invalid())
}
