//! JSON boundary between the pipeline and the evaluator.

use std::io::{Read, Write};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::triage::IncidentRecord;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read incident input")]
    Read(#[from] std::io::Error),
    #[error("incident input is not valid JSON")]
    Parse(#[source] serde_json::Error),
    #[error("incident input must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("batch input must be a JSON array, got {0}")]
    NotABatch(&'static str),
}

/// Read one JSON document from `reader`.
pub fn read_document<R: Read>(mut reader: R) -> Result<Value, InputError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    serde_json::from_str(&buf).map_err(InputError::Parse)
}

pub fn parse_record(document: Value) -> Result<IncidentRecord, InputError> {
    if !document.is_object() {
        return Err(InputError::NotAnObject(json_kind(&document)));
    }
    serde_json::from_value(document).map_err(InputError::Parse)
}

/// Parse an array of incident objects, keeping their order.
pub fn parse_batch(document: Value) -> Result<Vec<IncidentRecord>, InputError> {
    match document {
        Value::Array(items) => items.into_iter().map(parse_record).collect(),
        other => Err(InputError::NotABatch(json_kind(&other))),
    }
}

/// Pretty-print `value` (two-space indent) followed by a newline.
pub fn write_pretty<W: Write, T: Serialize + ?Sized>(
    mut writer: W,
    value: &T,
) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
