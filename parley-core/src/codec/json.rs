//! JSON codec

use crate::error::{Error, Result};
use crate::session::store::Message;
use serde_json::Value;

/// Serialize a message sequence as a JSON array
///
/// Field presence is preserved: a message without a timestamp omits the
/// key rather than emitting null, and any extra fields that arrived via
/// import are re-emitted.
pub fn to_json(messages: &[Message]) -> Result<String> {
    Ok(serde_json::to_string_pretty(messages)?)
}

/// Parse a JSON array of message objects
///
/// Fails closed: the top level must be an array, and every element must
/// be an object carrying at least `role` and `content`. Unknown fields
/// are preserved on the resulting messages.
pub fn from_json(input: &str) -> Result<Vec<Message>> {
    let value: Value = serde_json::from_str(input)
        .map_err(|e| Error::Validation(format!("invalid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Error::Validation(format!(
                "expected a JSON array of messages, got {}",
                json_type_name(&other)
            )))
        }
    };

    let mut messages = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(Error::Validation(format!(
                "message at index {} is not an object",
                index
            )));
        }
        for field in ["role", "content"] {
            if item.get(field).is_none() {
                return Err(Error::Validation(format!(
                    "message at index {} is missing required field '{}'",
                    index, field
                )));
            }
        }
        let message: Message = serde_json::from_value(item)
            .map_err(|e| Error::Validation(format!("message at index {}: {}", index, e)))?;
        messages.push(message);
    }

    Ok(messages)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
