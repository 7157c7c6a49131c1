// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the eCFR registry API.

use std::sync::Once;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};

use crate::config::AnalyzerConfig;
use crate::error::{json_type_name, AnalysisError, RegistryError};

/// An agency entry from `admin/v1/agencies.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agency {
    pub name: String,
    pub slug: String,
}

impl Agency {
    /// Read one raw list entry.
    ///
    /// Missing or null `name` becomes `"Unknown"`, missing or null `slug`
    /// becomes `""`; other non-string values are kept in their JSON text form.
    /// Entries that are not objects are rejected.
    pub fn from_entry(entry: &Value) -> Result<Self, AnalysisError> {
        let Some(obj) = entry.as_object() else {
            return Err(AnalysisError::MalformedAgency { found: json_type_name(entry) });
        };
        Ok(Self {
            name: text_field(obj.get("name")).unwrap_or_else(|| "Unknown".to_owned()),
            slug: text_field(obj.get("slug")).unwrap_or_default(),
        })
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// HTTP client wrapper for the registry.
///
/// The plain methods never fail: errors are logged and mapped to an empty
/// value. The `try_` variants expose the structured error instead.
#[derive(Clone)]
pub struct RegistryClient {
    base_url: String,
    client: Client,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        ensure_crypto_provider();
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, client }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.base_url.trim(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the raw agency entries. Any non-2xx status is an error.
    ///
    /// Entries are returned undecoded so a malformed one only affects itself.
    pub async fn try_list_agencies(&self) -> Result<Vec<Value>, RegistryError> {
        let resp = self
            .client
            .get(self.url("/admin/v1/agencies.json"))
            .send()
            .await
            .map_err(RegistryError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status));
        }
        let bytes = resp.bytes().await.map_err(RegistryError::Transport)?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| RegistryError::Decode(e.to_string()))?;
        let mut body = match body {
            Value::Object(obj) => obj,
            other => {
                return Err(RegistryError::Decode(format!(
                    "expected an object, got a JSON {}",
                    json_type_name(&other)
                )))
            }
        };
        match body.remove("agencies") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(entries)) => Ok(entries),
            Some(other) => Err(RegistryError::Decode(format!(
                "`agencies` is a JSON {}, expected an array",
                json_type_name(&other)
            ))),
        }
    }

    /// Fetch titles metadata for one agency. Only `200 OK` is accepted.
    pub async fn try_titles_for_agency(&self, slug: &str) -> Result<Value, RegistryError> {
        let resp = self
            .client
            .get(self.url("/versioner/v1/titles.json"))
            .query(&[("agency", slug)])
            .send()
            .await
            .map_err(RegistryError::Transport)?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(RegistryError::Status(status));
        }
        let bytes = resp.bytes().await.map_err(RegistryError::Transport)?;
        serde_json::from_slice(&bytes).map_err(|e| RegistryError::Decode(e.to_string()))
    }

    /// Raw agency entries, or empty on any failure.
    pub async fn list_agencies(&self) -> Vec<Value> {
        match self.try_list_agencies().await {
            Ok(agencies) => agencies,
            Err(e) => {
                tracing::error!(kind = e.kind(), err = %e, "error fetching agencies");
                Vec::new()
            }
        }
    }

    /// Titles metadata for `slug`, or an empty object on any failure.
    pub async fn titles_for_agency(&self, slug: &str) -> Value {
        match self.try_titles_for_agency(slug).await {
            Ok(value) => value,
            Err(RegistryError::Status(status)) => {
                tracing::warn!(slug, %status, "titles request returned non-200 status");
                Value::Object(Map::new())
            }
            Err(e) => {
                tracing::error!(slug, kind = e.kind(), err = %e, "error fetching titles");
                Value::Object(Map::new())
            }
        }
    }
}

/// reqwest is built without a TLS provider; install ring once per process.
fn ensure_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        // Err means another provider is already installed, which is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
