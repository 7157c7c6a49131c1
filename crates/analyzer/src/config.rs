// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Public eCFR API root.
pub const DEFAULT_BASE_URL: &str = "https://www.ecfr.gov/api";

/// Number of agencies analyzed per pipeline run, taken from the head of the list.
pub const DEFAULT_AGENCY_LIMIT: usize = 10;

/// Pause between consecutive agencies, in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 200;

/// Per-request timeout for registry calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for the analyzer service.
#[derive(Debug, Clone, clap::Args)]
pub struct AnalyzerConfig {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "ECFR_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000, env = "ECFR_PORT")]
    pub port: u16,

    /// Registry API base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "ECFR_BASE_URL")]
    pub base_url: String,

    /// Timeout for each registry request in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, env = "ECFR_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Maximum number of agencies analyzed per run.
    #[arg(long, default_value_t = DEFAULT_AGENCY_LIMIT, env = "ECFR_AGENCY_LIMIT")]
    pub agency_limit: usize,

    /// Delay between consecutive agencies in milliseconds.
    #[arg(long, default_value_t = DEFAULT_THROTTLE_MS, env = "ECFR_THROTTLE_MS")]
    pub throttle_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8000,
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            agency_limit: DEFAULT_AGENCY_LIMIT,
            throttle_ms: DEFAULT_THROTTLE_MS,
        }
    }
}

impl AnalyzerConfig {
    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            anyhow::bail!("--base-url must not be empty");
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            anyhow::bail!("--base-url must start with http:// or https:// (got {base})");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("--request-timeout-secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Command-line entry point: service config plus logging options.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "ecfr-analyzer", version, about = "eCFR regulation size analyzer API")]
pub struct Cli {
    #[command(flatten)]
    pub analyzer: AnalyzerConfig,

    /// Log format (json or text).
    #[arg(long, env = "ECFR_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[arg(long, env = "ECFR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
