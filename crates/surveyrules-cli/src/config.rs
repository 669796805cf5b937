//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Output format for `expand` and `evaluate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Top-level surveyrules configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyrulesConfig {
    /// Output format when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Decimal places for computed values in text output.
    #[serde(default = "default_precision")]
    pub precision: usize,
    /// Make `validate` fail when warnings are found.
    #[serde(default)]
    pub fail_on_warnings: bool,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_precision() -> usize {
    2
}

impl Default for SurveyrulesConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            precision: default_precision(),
            fail_on_warnings: false,
        }
    }
}

impl SurveyrulesConfig {
    /// Resolve the output format, preferring an explicit flag.
    pub fn output_format(&self, flag: Option<&str>) -> Result<OutputFormat> {
        flag.unwrap_or(self.default_format.as_str())
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{}", e))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `surveyrules.toml` in the current directory
/// 2. `~/.config/surveyrules/config.toml`
///
/// Environment variable overrides: `SURVEYRULES_FORMAT`, `SURVEYRULES_PRECISION`.
pub fn load_config_from(path: Option<&Path>) -> Result<SurveyrulesConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("surveyrules.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SurveyrulesConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SurveyrulesConfig::default(),
    };

    if let Ok(format) = std::env::var("SURVEYRULES_FORMAT") {
        config.default_format = format;
    }
    if let Ok(precision) = std::env::var("SURVEYRULES_PRECISION") {
        config.precision = precision
            .trim()
            .parse()
            .with_context(|| format!("invalid SURVEYRULES_PRECISION: '{precision}'"))?;
    }

    config.default_format = resolve_env_vars(&config.default_format);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("surveyrules"))
}
