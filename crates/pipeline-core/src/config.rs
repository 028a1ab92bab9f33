//! Pipeline configuration
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) yields a working local setup. Environment variables are
//! applied last and win over the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use intake_core::ScanPolicy;
use serde::{Deserialize, Serialize};
use service_probe::RetryPolicy;
use summarizer_core::SummarizerConfig;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_SCAN_POLICY: &str = "DISCLOSURE_SCAN_POLICY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Debug-level logging
    pub debug: bool,
    pub scan_policy: ScanPolicy,
    pub paths: PathsConfig,
    pub scanner: ScannerConfig,
    pub probe: ProbeConfig,
    pub extraction: ExtractionConfig,
    pub summarization: SummarizerConfig,
    pub standards: StandardsConfig,
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pipeline_core::PipelineConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = PipelineConfig::from_file("disclosure.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// ```
    /// use pipeline_core::PipelineConfig;
    ///
    /// let config = PipelineConfig::from_str(r#"
    ///     scan_policy = "fail-open"
    ///
    ///     [scanner]
    ///     host = "localhost"
    /// "#).unwrap();
    /// assert_eq!(config.scanner.port, 3310);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// File if given, defaults otherwise, then environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (the process environment in production)
    pub fn apply_env_with<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.summarization.api_key = Some(key);
        }
        if let Some(policy) = lookup(ENV_SCAN_POLICY) {
            self.scan_policy = policy
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {}", ENV_SCAN_POLICY))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Private per-request staging area, never read by extraction
    pub staging_dir: PathBuf,
    pub intake_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("data/staging"),
            intake_dir: PathBuf::from("data/intake"),
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "clamav-container".to_string(),
            port: 3310,
            timeout_ms: 10_000,
        }
    }
}

impl ScannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub reprobe_on_call: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_attempts: RetryPolicy::DEFAULT_ATTEMPTS,
            backoff_ms: RetryPolicy::DEFAULT_BACKOFF.as_millis() as u64,
            reprobe_on_call: false,
        }
    }
}

impl ProbeConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_ms))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorBackend {
    #[default]
    Lopdf,
    PdfExtract,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub backend: ExtractorBackend,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardsConfig {
    /// TOML rule file merged over the built-in standards
    pub extra_rules: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also append log lines to this file
    pub file: Option<PathBuf>,
}
