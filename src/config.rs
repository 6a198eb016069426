use crate::capture::engine::{self, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

fn empty_path_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<PathBuf>::deserialize(deserializer)?;
    Ok(opt.and_then(|path| {
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }))
}

fn empty_string_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config io error: {}", err),
            ConfigError::Parse(err) => write!(f, "config parse error: {}", err),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub run: RunConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// A read timeout of 0 means "block forever" on some platforms, which
    /// would keep the loop from ever seeing the running flag.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture.timeout_ms <= 0 {
            return Err(ConfigError::Invalid(format!(
                "capture.timeout_ms must be at least 1, got {}",
                self.capture.timeout_ms
            )));
        }
        if self.capture.snaplen <= 0 {
            return Err(ConfigError::Invalid(format!(
                "capture.snaplen must be at least 1, got {}",
                self.capture.snaplen
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    #[serde(deserialize_with = "empty_string_none")]
    pub interface: Option<String>,
    /// Replay a pcap savefile instead of opening an interface.
    #[serde(deserialize_with = "empty_path_none")]
    pub read_file: Option<PathBuf>,
    pub promiscuous: bool,
    pub snaplen: i32,
    pub timeout_ms: i32,
    #[serde(deserialize_with = "empty_string_none")]
    pub filter: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            interface: None,
            read_file: None,
            promiscuous: true,
            snaplen: 65535,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            filter: None,
        }
    }
}

impl CaptureConfig {
    /// Settings for opening a live handle.
    pub fn live(&self) -> engine::CaptureConfig {
        engine::CaptureConfig {
            interface: self.interface.clone(),
            promiscuous: self.promiscuous,
            snaplen: self.snaplen,
            timeout_ms: self.timeout_ms,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Stop after this many frames (0 = unlimited).
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub hex_dump: bool,
    /// One JSON object per frame instead of text.
    pub json: bool,
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.capture.timeout_ms, 2000);
        assert!(config.capture.promiscuous);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = Config::from_toml(
            r#"
            [capture]
            interface = "eth0"
            filter = "tcp port 443"

            [run]
            count = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.capture.interface.as_deref(), Some("eth0"));
        assert_eq!(config.capture.filter.as_deref(), Some("tcp port 443"));
        assert_eq!(config.capture.snaplen, 65535);
        assert_eq!(config.run.count, 25);
        assert!(!config.output.json);
    }

    #[test]
    fn empty_strings_mean_unset() {
        let config = Config::from_toml(
            r#"
            [capture]
            interface = ""
            read_file = ""
            filter = "  "
            "#,
        )
        .unwrap();
        assert_eq!(config.capture.interface, None);
        assert_eq!(config.capture.read_file, None);
        assert_eq!(config.capture.filter, None);
    }

    #[test]
    fn live_settings_carry_over() {
        let config = Config::from_toml(
            r#"
            [capture]
            interface = "en0"
            promiscuous = false
            timeout_ms = 500
            "#,
        )
        .unwrap();
        let live = config.capture.live();
        assert_eq!(live.interface.as_deref(), Some("en0"));
        assert!(!live.promiscuous);
        assert_eq!(live.timeout_ms, 500);
    }

    #[test]
    fn example_file_matches_defaults() {
        let config = Config::from_toml(include_str!("../framescope.example.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = Config::from_toml("[run]\ncount = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn non_positive_timeout_is_rejected() {
        for raw in ["[capture]\ntimeout_ms = 0", "[capture]\ntimeout_ms = -1"] {
            let err = Config::from_toml(raw).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{}", raw);
        }
        let config = Config::from_toml("[capture]\ntimeout_ms = 1").unwrap();
        assert_eq!(config.capture.live().timeout_ms, 1);
    }

    #[test]
    fn non_positive_snaplen_is_rejected() {
        let err = Config::from_toml("[capture]\nsnaplen = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: capture.snaplen must be at least 1, got 0"
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load(Path::new("/nonexistent/framescope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
