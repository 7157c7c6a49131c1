// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Failure talking to the upstream registry.
#[derive(Debug)]
pub enum RegistryError {
    /// Connection, TLS, or timeout failure before a response arrived.
    Transport(reqwest::Error),
    /// The registry answered with a status the caller does not accept.
    Status(reqwest::StatusCode),
    /// The body was not the JSON shape expected.
    Decode(String),
}

impl RegistryError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT",
            Self::Status(_) => "STATUS",
            Self::Decode(_) => "DECODE",
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "request failed: {e}"),
            Self::Status(code) => write!(f, "unexpected status {code}"),
            Self::Decode(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure processing a single agency inside an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Titles document was not a JSON object.
    UnexpectedTitlesShape { slug: String, found: &'static str },
    /// Agency list entry was not a JSON object.
    MalformedAgency { found: &'static str },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedTitlesShape { slug, found } => {
                write!(f, "titles for {slug:?} is a JSON {found}, expected an object")
            }
            Self::MalformedAgency { found } => {
                write!(f, "agency entry is a JSON {found}, expected an object")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Name of a JSON value's type, for error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
