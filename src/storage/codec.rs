use serde_json::Value;

use crate::CodecError;
use crate::Record;
use crate::Result;
use crate::SavedBlob;

/// Turn the persisted subset into what the backend stores.
pub(crate) fn encode_record(
    record: Record,
    stringify: bool,
) -> Result<SavedBlob> {
    if stringify {
        Ok(SavedBlob::Text(serde_json::to_string(&record)?))
    } else {
        Ok(SavedBlob::Raw(record))
    }
}

/// Decode whatever the backend returned into a flat record.
///
/// Text is always parsed as JSON, structured blobs are taken as-is, so a
/// backend may hand back either form regardless of the encoding mode.
pub(crate) fn decode_blob(blob: SavedBlob) -> Result<Record> {
    match blob {
        SavedBlob::Raw(record) => Ok(record),
        SavedBlob::Text(text) => match serde_json::from_str::<Value>(&text)? {
            Value::Object(record) => Ok(record),
            other => Err(CodecError::NotAnObject {
                found: json_kind(&other),
            }
            .into()),
        },
    }
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
