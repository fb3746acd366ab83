use anyhow::{Context, Result};
use chrono::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ReportError;
use crate::jira::config::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use crate::jira::JiraConfig;
use crate::models::{OutputFormat, ReportMode};

const APP_DIR: &str = "jira-worklog-report";
const REDACTED: &str = "********";

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub jira: JiraSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSettings {
    pub host: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for JiraSettings {
    fn default() -> Self {
        Self {
            host: None,
            email: None,
            api_token: None,
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_mode")]
    pub mode: ReportMode,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    pub title: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Where document reports are written; derived from the backend if unset
    pub output_file: Option<String>,
    /// Converter turning HTML on stdin into a printable document on stdout
    pub converter: Option<Vec<String>>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            format: default_format(),
            delimiter: default_delimiter(),
            title: None,
            locale: default_locale(),
            output_file: None,
            converter: None,
        }
    }
}

fn default_mode() -> ReportMode {
    ReportMode::Detailed
}

fn default_format() -> OutputFormat {
    OutputFormat::Csv
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_locale() -> String {
    "de_DE".to_string()
}

impl GlobalConfig {
    /// Copy safe to print: the API token is masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.jira.api_token.is_some() {
            config.jira.api_token = Some(REDACTED.to_string());
        }
        config
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub mode: Option<ReportMode>,
    pub format: Option<OutputFormat>,
    pub delimiter: Option<String>,
    pub title: Option<String>,
    pub output: Option<String>,
}

/// Configuration after merging overrides, the config file and defaults
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub jira: JiraConfig,
    pub mode: ReportMode,
    pub format: OutputFormat,
    pub delimiter: u8,
    pub title: Option<String>,
    pub locale: Locale,
    pub output_file: PathBuf,
    pub converter: Option<Vec<String>>,
}

impl EffectiveConfig {
    /// Load the global config file and apply `overrides` on top
    pub fn load(overrides: Overrides) -> Result<Self> {
        let global = load_global_config()?;
        Ok(Self::resolve(global, overrides)?)
    }

    /// Merge and validate. Fails with a configuration error naming every
    /// missing connection setting before anything touches the network.
    pub fn resolve(global: GlobalConfig, overrides: Overrides) -> Result<Self, ReportError> {
        let host = non_empty(overrides.host.or(global.jira.host));
        let email = non_empty(overrides.email.or(global.jira.email));
        let api_token = non_empty(overrides.api_token.or(global.jira.api_token));

        let (host, email, api_token) = match (host, email, api_token) {
            (Some(host), Some(email), Some(token)) => (host, email, token),
            (host, email, token) => {
                let missing: Vec<&str> = [
                    (host.is_none(), "host (JIRA_HOST)"),
                    (email.is_none(), "email (JIRA_EMAIL)"),
                    (token.is_none(), "API token (JIRA_API_TOKEN)"),
                ]
                .iter()
                .filter(|(absent, _)| *absent)
                .map(|(_, name)| *name)
                .collect();
                return Err(ReportError::Configuration(format!(
                    "missing Jira {}",
                    missing.join(", ")
                )));
            }
        };

        let jira = JiraConfig::new(host, email, api_token)
            .with_page_size(global.jira.page_size)
            .with_timeout(Duration::from_secs(global.jira.timeout_secs))
            .with_connect_timeout(Duration::from_secs(global.jira.connect_timeout_secs));

        let delimiter = parse_delimiter(&overrides.delimiter.unwrap_or(global.report.delimiter))?;
        let locale = Locale::try_from(global.report.locale.as_str()).map_err(|_| {
            ReportError::Configuration(format!("unknown locale: {}", global.report.locale))
        })?;

        let converter = global.report.converter.filter(|c| !c.is_empty());
        let output_file = match overrides.output.or(global.report.output_file) {
            Some(path) => expand_path(&path)?,
            None if converter.is_some() => PathBuf::from("worklog-report.pdf"),
            None => PathBuf::from("worklog-report.html"),
        };

        Ok(Self {
            jira,
            mode: overrides.mode.unwrap_or(global.report.mode),
            format: overrides.format.unwrap_or(global.report.format),
            delimiter,
            title: non_empty(overrides.title.or(global.report.title)),
            locale,
            output_file,
            converter,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts a single ASCII character, or `tab` / `\t`
fn parse_delimiter(value: &str) -> Result<u8, ReportError> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        v => Err(ReportError::Configuration(format!(
            "delimiter must be a single ASCII character, got {:?}",
            v
        ))),
    }
}

/// Get the global config directory path
pub fn global_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join(APP_DIR);
    Ok(config_dir)
}

/// Get the global config file path
pub fn global_config_path() -> Result<PathBuf> {
    Ok(global_config_dir()?.join("config.toml"))
}

/// Load global configuration from ~/.config/jira-worklog-report/config.toml
pub fn load_global_config() -> Result<GlobalConfig> {
    load_config_file(&global_config_path()?)
}

pub fn load_config_file(config_path: &Path) -> Result<GlobalConfig> {
    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config: GlobalConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    Ok(config)
}

/// Initialize global config directory and create default config if not exists
pub fn init_global_config() -> Result<PathBuf> {
    let config_dir = global_config_dir()?;
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");

    if !config_path.exists() {
        let default_config = GlobalConfig::default();
        let content = toml::to_string_pretty(&default_config)
            .context("Failed to serialize default config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
    }

    Ok(config_path)
}

/// Expand ~ and environment variables in path
pub fn expand_path(path: &str) -> Result<PathBuf, ReportError> {
    let expanded = shellexpand::full(path)
        .map_err(|err| ReportError::Configuration(format!("Failed to expand path {}: {}", path, err)))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Overrides {
        Overrides {
            host: Some("acme.atlassian.net".to_string()),
            email: Some("me@acme.test".to_string()),
            api_token: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.report.mode, ReportMode::Detailed);
        assert_eq!(config.report.format, OutputFormat::Csv);
        assert_eq!(config.report.locale, "de_DE");
        assert_eq!(config.jira.page_size, 100);
    }

    #[test]
    fn test_missing_credentials_are_all_named() {
        let err = EffectiveConfig::resolve(GlobalConfig::default(), Overrides::default()).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ReportError::Configuration(_)));
        assert!(message.contains("JIRA_HOST"));
        assert!(message.contains("JIRA_EMAIL"));
        assert!(message.contains("JIRA_API_TOKEN"));
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let overrides = Overrides {
            api_token: Some("  ".to_string()),
            ..credentials()
        };
        let err = EffectiveConfig::resolve(GlobalConfig::default(), overrides).unwrap_err();
        assert!(err.to_string().contains("JIRA_API_TOKEN"));
        assert!(!err.to_string().contains("JIRA_HOST"));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let global: GlobalConfig = toml::from_str(
            r#"
            [jira]
            host = "file.atlassian.net"
            email = "file@acme.test"
            api_token = "file-token"
            page_size = 50

            [report]
            mode = "daily"
            format = "document"
            delimiter = ";"
            title = "Acme"
            converter = ["wkhtmltopdf", "-", "-"]
            "#,
        )
        .unwrap();

        let config = EffectiveConfig::resolve(global.clone(), Overrides::default()).unwrap();
        assert_eq!(config.jira.host, "file.atlassian.net");
        assert_eq!(config.jira.page_size, 50);
        assert_eq!(config.mode, ReportMode::Daily);
        assert_eq!(config.format, OutputFormat::Document);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.title.as_deref(), Some("Acme"));
        assert_eq!(config.output_file, PathBuf::from("worklog-report.pdf"));

        let overrides = Overrides {
            mode: Some(ReportMode::Detailed),
            delimiter: Some("tab".to_string()),
            output: Some("/tmp/out.pdf".to_string()),
            ..credentials()
        };
        let config = EffectiveConfig::resolve(global, overrides).unwrap();
        assert_eq!(config.jira.host, "acme.atlassian.net");
        assert_eq!(config.mode, ReportMode::Detailed);
        assert_eq!(config.delimiter, b'\t');
        assert_eq!(config.output_file, PathBuf::from("/tmp/out.pdf"));
    }

    #[test]
    fn test_html_output_without_converter() {
        let config = EffectiveConfig::resolve(GlobalConfig::default(), credentials()).unwrap();
        assert_eq!(config.output_file, PathBuf::from("worklog-report.html"));
        assert!(config.converter.is_none());
        assert_eq!(config.locale, Locale::de_DE);
    }

    #[test]
    fn test_invalid_delimiter_and_locale() {
        let overrides = Overrides {
            delimiter: Some("::".to_string()),
            ..credentials()
        };
        assert!(EffectiveConfig::resolve(GlobalConfig::default(), overrides).is_err());

        let mut global = GlobalConfig::default();
        global.report.locale = "xx_YY".to_string();
        assert!(EffectiveConfig::resolve(global, credentials()).is_err());
    }

    #[test]
    fn test_redacted_masks_token() {
        let mut config = GlobalConfig::default();
        config.jira.api_token = Some("secret".to_string());
        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains(REDACTED));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(load_config_file(&path).unwrap().jira.page_size, 100);

        std::fs::write(&path, "[jira]\nemail = \"me@acme.test\"\n").unwrap();
        let config = load_config_file(&path).unwrap();
        assert_eq!(config.jira.email.as_deref(), Some("me@acme.test"));
        assert_eq!(config.report.delimiter, ",");

        std::fs::write(&path, "[jira\n").unwrap();
        assert!(load_config_file(&path).is_err());
    }

    #[test]
    fn test_expand_path() {
        let expanded = expand_path("~/.config/test").unwrap();
        assert!(expanded.to_string_lossy().contains("/.config/test"));
        assert!(!expanded.to_string_lossy().starts_with("~"));
    }
}
