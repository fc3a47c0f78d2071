use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::keywords;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub lookups: LookupConfig,
    pub report: ReportConfig,
    pub history: HistoryConfig,
    /// Threat-keyword vocabulary; defaults to the built-in list when absent.
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LookupConfig {
    pub whois_timeout_seconds: u64,
    pub rdap_timeout_seconds: u64,
    pub rdap_base_url: String,
    /// Offline mode: fixture WHOIS/RDAP data instead of network lookups.
    pub use_mock: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportConfig {
    pub page_width: usize,
    pub page_lines: usize,
    pub max_body_lines: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HistoryConfig {
    /// How many recent scan summaries the display shows. Retention is a
    /// display concern; the history itself is append-only.
    pub display_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookups: LookupConfig {
                whois_timeout_seconds: 10,
                rdap_timeout_seconds: 10,
                rdap_base_url: "https://rdap.org".to_string(),
                use_mock: false,
            },
            report: ReportConfig {
                page_width: 100,
                page_lines: 56,
                max_body_lines: 60,
            },
            history: HistoryConfig { display_limit: 8 },
            keywords: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading config file {}", path.as_ref().display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.as_ref().display()))?;
        Ok(config)
    }

    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(&Config::default())?;
        std::fs::write(path.as_ref(), yaml)
            .with_context(|| format!("writing config file {}", path.as_ref().display()))?;
        Ok(())
    }

    /// The effective vocabulary: configured override or the built-in list.
    pub fn vocabulary(&self) -> Vec<String> {
        self.keywords
            .clone()
            .unwrap_or_else(keywords::default_vocabulary)
    }
}
