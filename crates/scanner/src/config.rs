use crate::views::portfolio::PortfolioSort;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    pub connection: ConnectionConfig,
    pub display: DisplayConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub url: String,
    /// Fixed delay between reconnect attempts. No backoff, no retry cap.
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    pub default_sort: PortfolioSort,
    pub sol_usd_fallback: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub default_level: String,
}

impl ScannerConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self> {
        let config: ScannerConfig =
            toml::from_str(content).context("failed to parse scanner config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.connection.url.starts_with("ws://") || self.connection.url.starts_with("wss://"),
            "connection.url must be a ws:// or wss:// endpoint"
        );
        anyhow::ensure!(
            self.connection.reconnect_delay_ms > 0,
            "connection.reconnect_delay_ms must be > 0"
        );
        anyhow::ensure!(
            self.display.sol_usd_fallback > 0.0,
            "display.sol_usd_fallback must be > 0"
        );
        Ok(())
    }

    pub fn default_config_path() -> String {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(std::path::Path::to_path_buf));

        // Check next to the binary first
        if let Some(dir) = &exe_dir {
            let candidate = dir.join("scanner.toml");
            if candidate.exists() {
                return candidate.to_string_lossy().to_string();
            }
        }

        // Check config/ directory relative to cwd
        let candidate = Path::new("config/scanner.toml");
        if candidate.exists() {
            return candidate.to_string_lossy().to_string();
        }

        // Check crates/scanner/config/ (development)
        let candidate = Path::new("crates/scanner/config/scanner.toml");
        if candidate.exists() {
            return candidate.to_string_lossy().to_string();
        }

        // Fallback
        "config/scanner.toml".to_string()
    }
}
