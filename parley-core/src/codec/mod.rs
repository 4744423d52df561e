//! Import/export codecs for conversation history
//!
//! Codecs are pure transformations between a message slice and a
//! serialized string. They have no dependency on the session manager
//! and are testable in isolation.

pub mod csv;
pub mod json;
pub mod markdown;

pub use csv::{from_csv, to_csv};
pub use json::{from_json, to_json};
pub use markdown::to_markdown;

use crate::error::{Error, Result};

/// Formats a session can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "markdown" => Ok(Self::Markdown),
            other => Err(Error::Validation(format!(
                "unknown export format '{}' (expected json, csv or markdown)",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "markdown",
        }
    }
}

/// Formats a session can be imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(Error::Validation(format!(
                "unknown import format '{}' (expected json or csv)",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}
