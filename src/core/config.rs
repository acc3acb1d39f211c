use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Bucket used by the dashboard when neither `S3_BUCKET` nor the config file
/// names one.
pub const FALLBACK_DASHBOARD_BUCKET: &str = "aws-billing-dashboard-4frfdktl";

pub const BUCKET_ENV_VAR: &str = "S3_BUCKET";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
        }
    }
}

/// Report pipeline configuration. The bucket can also come from the
/// `S3_BUCKET` environment variable, which always wins over the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Object-storage bucket holding the dashboard template and snapshots.
    pub bucket: Option<String>,
    /// AWS region override; the ambient chain decides when unset.
    pub region: Option<String>,
    #[serde(default = "default_template_key")]
    pub template_key: String,
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
    /// USD→INR conversion rate applied to every record.
    #[serde(default = "default_usd_to_inr")]
    pub usd_to_inr: f64,
}

fn default_template_key() -> String {
    "index.html".to_string()
}
fn default_snapshot_key() -> String {
    "billing-data.json".to_string()
}
fn default_usd_to_inr() -> f64 {
    83.0
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            region: None,
            template_key: default_template_key(),
            snapshot_key: default_snapshot_key(),
            usd_to_inr: default_usd_to_inr(),
        }
    }
}

impl ReportConfig {
    /// Bucket for the dashboard pipeline; falls back to the well-known
    /// dashboard bucket when nothing is configured.
    pub fn dashboard_bucket(&self) -> String {
        resolve_bucket(std::env::var(BUCKET_ENV_VAR).ok(), self.bucket.as_deref())
            .unwrap_or_else(|| FALLBACK_DASHBOARD_BUCKET.to_string())
    }

    /// Bucket for the snapshot pipeline; there is no sensible fallback, so
    /// absence is an error.
    pub fn snapshot_bucket(&self) -> Result<String, String> {
        resolve_bucket(std::env::var(BUCKET_ENV_VAR).ok(), self.bucket.as_deref()).ok_or_else(
            || format!("{BUCKET_ENV_VAR} is not set and no bucket is configured"),
        )
    }
}

fn resolve_bucket(env_bucket: Option<String>, config_bucket: Option<&str>) -> Option<String> {
    env_bucket
        .filter(|b| !b.is_empty())
        .or_else(|| config_bucket.map(str::to_string))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub report: ReportConfig,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("costlens").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if self.report.template_key.is_empty() {
            issues.push("template_key must not be empty".to_string());
        }
        if self.report.snapshot_key.is_empty() {
            issues.push("snapshot_key must not be empty".to_string());
        }
        if !self.report.usd_to_inr.is_finite() || self.report.usd_to_inr <= 0.0 {
            issues.push(format!(
                "Invalid usd_to_inr: {} (must be a positive number)",
                self.report.usd_to_inr
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_keys_and_rate() {
        let report = ReportConfig::default();
        assert_eq!(report.template_key, "index.html");
        assert_eq!(report.snapshot_key, "billing-data.json");
        assert_eq!(report.usd_to_inr, 83.0);
        assert!(report.bucket.is_none());
    }

    #[test]
    fn validate_catches_invalid_format() {
        let mut config = AppConfig::default();
        config.settings.default_format = "xml".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("default_format")));
    }

    #[test]
    fn validate_catches_invalid_color() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("color")));
    }

    #[test]
    fn validate_catches_nonpositive_rate() {
        let mut config = AppConfig::default();
        config.report.usd_to_inr = 0.0;
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("usd_to_inr")));
    }

    #[test]
    fn validate_catches_empty_keys() {
        let mut config = AppConfig::default();
        config.report.template_key = String::new();
        config.report.snapshot_key = String::new();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("template_key")));
        assert!(issues.iter().any(|i| i.contains("snapshot_key")));
    }

    #[test]
    fn env_bucket_wins_over_config_bucket() {
        let resolved = resolve_bucket(Some("env-bucket".into()), Some("file-bucket"));
        assert_eq!(resolved.as_deref(), Some("env-bucket"));
    }

    #[test]
    fn empty_env_bucket_is_ignored() {
        let resolved = resolve_bucket(Some(String::new()), Some("file-bucket"));
        assert_eq!(resolved.as_deref(), Some("file-bucket"));
    }

    #[test]
    fn no_bucket_resolves_to_none() {
        assert!(resolve_bucket(None, None).is_none());
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[settings]
default_format = "json"
color = "always"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.default_format, "json");
        assert_eq!(config.settings.color, "always");
        assert_eq!(config.report.usd_to_inr, 83.0);
    }

    #[test]
    fn parse_report_toml() {
        let toml = r#"
[report]
bucket = "my-billing-bucket"
region = "ap-south-1"
usd_to_inr = 85.5
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.report.bucket.as_deref(), Some("my-billing-bucket"));
        assert_eq!(config.report.region.as_deref(), Some("ap-south-1"));
        assert_eq!(config.report.usd_to_inr, 85.5);
        assert_eq!(config.report.template_key, "index.html");
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.default_format, "text");
        assert_eq!(config.settings.color, "auto");
        assert_eq!(config.report.snapshot_key, "billing-data.json");
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(path, PathBuf::from("/tmp/test_xdg_config/costlens/config.toml"));
    }
}
