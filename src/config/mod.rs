// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 35043;
const DEFAULT_DISPATCH_QUEUE: usize = 64;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── AgentConfig ──────────────────────────────────────────────────────────────

/// Client agent tunables (`[agent]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Capacity of the channel handing submitted bundles to the
    /// forwarding core. Submissions block once the core falls this far
    /// behind.
    pub dispatch_queue: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            dispatch_queue: DEFAULT_DISPATCH_QUEUE,
        }
    }
}

// ─── DaemonConfig ─────────────────────────────────────────────────────────────

/// Daemon configuration, loaded from an optional TOML file with CLI and
/// environment overrides applied on top.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Client agent API port.
    pub port: u16,
    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access).
    pub bind_address: String,
    /// Log level or full EnvFilter directive (trace, debug, info, ...).
    pub log_level: String,
    /// Log output format: "compact" or "json".
    pub log_format: String,
    /// Write logs to this file path (rotated daily) in addition to stdout.
    pub log_file: Option<PathBuf>,
    pub agent: AgentConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: default_bind_address(),
            log_level: "info".to_string(),
            log_format: "compact".to_string(),
            log_file: None,
            agent: AgentConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from `path`, or defaults when no file is given.
    /// An explicitly named file that cannot be read or parsed is an error,
    /// not a silent fallback.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))
            }
        }
    }

    /// Apply CLI/env overrides. CLI wins over file values.
    pub fn apply_overrides(
        &mut self,
        port: Option<u16>,
        bind_address: Option<String>,
        log_level: Option<String>,
    ) {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_bind_locally() {
        let config = DaemonConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.log_format, "compact");
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "port = 4040\nlog_level = \"debug\"\n\n[agent]\ndispatch_queue = 8\n"
        )
        .unwrap();

        let config = DaemonConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 4040);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.agent.dispatch_queue, 8);
        // Unspecified values keep their defaults.
        assert_eq!(config.bind_address, "127.0.0.1");
    }

    #[test]
    fn missing_named_file_is_an_error() {
        assert!(DaemonConfig::load(Some(Path::new("/nonexistent/dtnd.toml"))).is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = DaemonConfig::default();
        config.apply_overrides(Some(8080), None, Some("trace".to_string()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.log_level, "trace");
    }
}
