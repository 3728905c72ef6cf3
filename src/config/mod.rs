use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{FingyError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Browser launch / connection settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Probe page settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Terminal output settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Browser executable path (overrides auto-discovery)
    pub executable: Option<String>,

    /// Host of the CDP HTTP endpoint
    #[serde(default = "default_cdp_host")]
    pub cdp_host: String,

    /// CDP port to connect to, or to launch the browser on
    #[serde(default = "default_cdp_port")]
    pub cdp_port: u16,

    /// Launch the browser headless
    #[serde(default)]
    pub headless: bool,

    /// Profile directory for a launched browser
    pub user_data_dir: Option<String>,

    /// Leave a launched browser running after collection
    #[serde(default)]
    pub keep_open: bool,

    /// Extra browser arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            cdp_host: default_cdp_host(),
            cdp_port: default_cdp_port(),
            headless: false,
            user_data_dir: None,
            keep_open: false,
            extra_args: Vec::new(),
        }
    }
}

fn default_cdp_host() -> String {
    "127.0.0.1".to_string()
}

fn default_cdp_port() -> u16 {
    9222
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Page the probes run in
    #[serde(default = "default_page_url")]
    pub page_url: String,

    /// Font names appended to the built-in candidate list
    #[serde(default)]
    pub extra_fonts: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            page_url: default_page_url(),
            extra_fonts: Vec::new(),
        }
    }
}

fn default_page_url() -> String {
    "about:blank".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Truncate raw values wider than this in terminal output (0 = never)
    #[serde(default = "default_max_width")]
    pub max_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
        }
    }
}

fn default_max_width() -> usize {
    96
}

impl Config {
    /// Load configuration from all sources (file, env, defaults)
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration using `path` as the config file
    pub fn load_from(path: &Path) -> Result<Self> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            // FINGY_BROWSER__CDP_PORT=9333 -> browser.cdp_port
            .merge(Env::prefixed("FINGY_").split("__"))
            .extract()
            .map_err(|e| FingyError::ConfigError(e.to_string()))
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fingy")
            .join("config.toml")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| FingyError::ConfigError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read a value by dotted key
    pub fn get_key(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "browser.executable" => self.browser.executable.clone(),
            "browser.cdp_host" => Some(self.browser.cdp_host.clone()),
            "browser.cdp_port" => Some(self.browser.cdp_port.to_string()),
            "browser.headless" => Some(self.browser.headless.to_string()),
            "browser.user_data_dir" => self.browser.user_data_dir.clone(),
            "browser.keep_open" => Some(self.browser.keep_open.to_string()),
            "probe.page_url" => Some(self.probe.page_url.clone()),
            "probe.extra_fonts" => Some(self.probe.extra_fonts.join(",")),
            "output.max_width" => Some(self.output.max_width.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "browser.executable" => self.browser.executable = Some(value.to_string()),
            "browser.cdp_host" => self.browser.cdp_host = value.to_string(),
            "browser.cdp_port" => self.browser.cdp_port = parse_value(key, value)?,
            "browser.headless" => self.browser.headless = parse_value(key, value)?,
            "browser.user_data_dir" => self.browser.user_data_dir = Some(value.to_string()),
            "browser.keep_open" => self.browser.keep_open = parse_value(key, value)?,
            "probe.page_url" => self.probe.page_url = value.to_string(),
            "probe.extra_fonts" => {
                self.probe.extra_fonts = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            "output.max_width" => self.output.max_width = parse_value(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> FingyError {
    FingyError::ConfigError(format!("Unknown config key: {}", key))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| FingyError::ConfigError(format!("Invalid value for {}: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.browser.cdp_host, "127.0.0.1");
        assert_eq!(config.browser.cdp_port, 9222);
        assert!(!config.browser.headless);
        assert_eq!(config.probe.page_url, "about:blank");
        assert!(config.probe.extra_fonts.is_empty());
        assert_eq!(config.output.max_width, 96);
    }

    #[test]
    #[serial]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[browser]
cdp_port = 9333
headless = true

[probe]
extra_fonts = ["Fira Code", "JetBrains Mono"]
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.browser.cdp_port, 9333);
        assert!(config.browser.headless);
        assert_eq!(config.browser.cdp_host, "127.0.0.1");
        assert_eq!(config.probe.extra_fonts, vec!["Fira Code", "JetBrains Mono"]);
        assert_eq!(config.probe.page_url, "about:blank");
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[browser]\ncdp_port = 9333\n").unwrap();

        std::env::set_var("FINGY_BROWSER__CDP_PORT", "9444");
        let config = Config::load_from(&path);
        std::env::remove_var("FINGY_BROWSER__CDP_PORT");

        assert_eq!(config.unwrap().browser.cdp_port, 9444);
    }

    #[test]
    #[serial]
    fn invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[browser]\ncdp_port = \"not a port\"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(FingyError::ConfigError(_))
        ));
    }

    #[test]
    #[serial]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set_key("browser.keep_open", "true").unwrap();
        config.set_key("probe.page_url", "https://example.com").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.browser.keep_open);
        assert_eq!(loaded.probe.page_url, "https://example.com");
    }

    #[test]
    fn set_key_parses_typed_values() {
        let mut config = Config::default();

        config.set_key("browser.cdp_port", "9555").unwrap();
        config.set_key("probe.extra_fonts", "Fira Code, ,Inter").unwrap();

        assert_eq!(config.browser.cdp_port, 9555);
        assert_eq!(config.probe.extra_fonts, vec!["Fira Code", "Inter"]);
        assert_eq!(
            config.get_key("probe.extra_fonts").unwrap().as_deref(),
            Some("Fira Code,Inter")
        );
    }

    #[test]
    fn set_key_rejects_bad_values_and_keys() {
        let mut config = Config::default();

        assert!(matches!(
            config.set_key("browser.headless", "sometimes"),
            Err(FingyError::ConfigError(_))
        ));
        assert!(matches!(
            config.set_key("api.base_url", "x"),
            Err(FingyError::ConfigError(_))
        ));
        assert!(config.get_key("nope").is_err());
    }

    #[test]
    fn unset_executable_reads_as_none() {
        let config = Config::default();
        assert_eq!(config.get_key("browser.executable").unwrap(), None);
    }
}
