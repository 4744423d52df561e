//! CSV codec
//!
//! Three fixed columns with standard RFC 4180 quoting: fields containing
//! a comma, quote or line break are wrapped in quotes, inner quotes
//! doubled.

use crate::error::{Error, Result};
use crate::session::store::Message;

/// The header row emitted (and expected) by this codec
pub const CSV_HEADER: &str = "role,content,timestamp";

/// Serialize a message sequence as CSV
///
/// The header row is always exactly `role,content,timestamp`; a missing
/// timestamp yields an empty field, not an omitted column. An empty
/// sequence produces the header row alone.
pub fn to_csv(messages: &[Message]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for message in messages {
        out.push_str(&escape_field(&message.role));
        out.push(',');
        out.push_str(&escape_field(&message.content));
        out.push(',');
        out.push_str(&escape_field(message.timestamp.as_deref().unwrap_or("")));
        out.push('\n');
    }

    out
}

/// Parse CSV text into a message sequence
///
/// Fails closed: the header row must contain `role` and `content`
/// columns. A `timestamp` column is optional per-row; an empty cell
/// leaves the message unstamped. Structural malformation (unterminated
/// quotes, rows missing a required cell) is a validation error.
pub fn from_csv(input: &str) -> Result<Vec<Message>> {
    let mut records = parse_records(input)?.into_iter();

    let header = records
        .next()
        .ok_or_else(|| Error::Validation("CSV input is empty, missing header row".to_string()))?;

    let role_idx = find_column(&header, "role")?;
    let content_idx = find_column(&header, "content")?;
    let timestamp_idx = header.iter().position(|column| column == "timestamp");

    let mut messages = Vec::new();
    for (row_number, record) in records.enumerate() {
        let role = required_cell(&record, role_idx, "role", row_number)?;
        let content = required_cell(&record, content_idx, "content", row_number)?;

        let mut message = Message::new(role, content);
        if let Some(idx) = timestamp_idx {
            if let Some(cell) = record.get(idx) {
                if !cell.is_empty() {
                    message = message.with_timestamp(cell.clone());
                }
            }
        }
        messages.push(message);
    }

    Ok(messages)
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn find_column(header: &[String], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| Error::Validation(format!("CSV header is missing required column '{}'", name)))
}

fn required_cell(record: &[String], idx: usize, name: &str, row_number: usize) -> Result<String> {
    record.get(idx).cloned().ok_or_else(|| {
        Error::Validation(format!(
            "CSV data row {} has no value for required column '{}'",
            row_number + 1,
            name
        ))
    })
}

/// Split CSV text into records of fields, honoring quoted fields with
/// embedded commas, quotes and line breaks. Blank lines are skipped.
fn parse_records(input: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if !record.is_empty() || !field.is_empty() || quoted {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(Error::Validation(
            "malformed CSV: unterminated quoted field".to_string(),
        ));
    }

    // Final record when the input has no trailing newline
    if !record.is_empty() || !field.is_empty() || quoted {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}
