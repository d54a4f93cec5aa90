//! Driver configuration
//!
//! The only tunable is the poll loop timeout. With the `std` feature the
//! configuration can also be loaded from a TOML file:
//!
//! ```toml
//! [driver]
//! timeout = "250 ms"
//! ```
//!
//! `timeout` takes either an integer number of milliseconds or a string with
//! a `ns`, `us`, `ms` or `s` suffix.

use core::time::Duration;

/// Default poll loop timeout, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 100_000_000;

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// How long the poll loop may run before the write fails with
    /// [`Error::Timeout`](crate::error::Error::Timeout)
    pub timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl DriverConfig {
    /// Replace the poll loop timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(feature = "std")]
pub use self::toml_file::ConfigError;

#[cfg(feature = "std")]
mod toml_file {
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    use super::DriverConfig;

    /// Errors while loading a [`DriverConfig`]
    #[derive(Debug, thiserror::Error)]
    pub enum ConfigError {
        /// Config file could not be read
        #[error("failed to read config file: {0}")]
        Io(#[from] std::io::Error),

        /// Config file is not valid
        #[error("invalid config: {0}")]
        Parse(String),
    }

    /// TOML config file structure
    #[derive(Debug, Default, serde::Deserialize)]
    struct TomlConfigFile {
        driver: Option<TomlDriver>,
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct TomlDriver {
        #[serde(default, deserialize_with = "deserialize_duration")]
        timeout: Option<Duration>,
    }

    /// Deserialize a duration that can be plain milliseconds or a string with a unit
    fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::Deserialize;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum MillisOrStr {
            Millis(u64),
            Str(String),
        }

        match MillisOrStr::deserialize(deserializer)? {
            MillisOrStr::Millis(ms) => Ok(Some(Duration::from_millis(ms))),
            MillisOrStr::Str(s) => parse_duration(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }

    const NANOS_PER_SEC: u128 = 1_000_000_000;

    /// Parse a duration string like "250 ms", "5s", "100 us" or "1500 ns"
    pub(super) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();

        // Plain numbers are milliseconds
        if let Ok(ms) = s.parse::<u64>() {
            return Ok(Duration::from_millis(ms));
        }

        let lower = s.to_lowercase();
        let (num_str, nanos_per_unit): (&str, u128) =
            if let Some(n) = lower.strip_suffix("ns") {
                (n.trim(), 1)
            } else if let Some(n) = lower.strip_suffix("us") {
                (n.trim(), 1_000)
            } else if let Some(n) = lower.strip_suffix("ms") {
                (n.trim(), 1_000_000)
            } else if let Some(n) = lower.strip_suffix('s') {
                (n.trim(), NANOS_PER_SEC)
            } else {
                return Err(format!("invalid duration: {}", s));
            };

        let num: u128 = num_str
            .parse()
            .map_err(|_| format!("invalid duration: {}", s))?;
        let nanos = num
            .checked_mul(nanos_per_unit)
            .ok_or_else(|| format!("duration out of range: {}", s))?;
        let secs = u64::try_from(nanos / NANOS_PER_SEC)
            .map_err(|_| format!("duration out of range: {}", s))?;
        Ok(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
    }

    /// Format a duration using the coarsest unit that represents it exactly
    pub(super) fn format_duration(d: Duration) -> String {
        let nanos = d.as_nanos();
        if d.subsec_nanos() == 0 {
            format!("{} s", d.as_secs())
        } else if nanos % 1_000_000 == 0 {
            format!("{} ms", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{} us", nanos / 1_000)
        } else {
            format!("{} ns", nanos)
        }
    }

    impl DriverConfig {
        /// Load a configuration from a TOML file
        pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        }

        /// Parse a configuration from a TOML string
        ///
        /// Missing tables and keys keep their default values.
        pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
            let file: TomlConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let mut config = DriverConfig::default();
            if let Some(timeout) = file.driver.and_then(|d| d.timeout) {
                config.timeout = timeout;
            }

            log::debug!("Loaded driver config: timeout {:?}", config.timeout);
            Ok(config)
        }

        /// Convert the configuration to a TOML string
        pub fn to_toml_string(&self) -> String {
            format!(
                "[driver]\ntimeout = \"{}\"\n",
                format_duration(self.timeout)
            )
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::toml_file::{format_duration, parse_duration};
    use super::*;

    #[test]
    fn test_default_timeout() {
        let config = DriverConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(100_000_000));
        let config = config.with_timeout(Duration::from_millis(5));
        assert_eq!(config.timeout, Duration::from_millis(5));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("250").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("250 ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("5 s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("100 us").unwrap(), Duration::from_micros(100));
        assert_eq!(parse_duration("1500 ns").unwrap(), Duration::from_nanos(1500));
        assert_eq!(
            parse_duration("18446744073709551615999999999 ns").unwrap(),
            Duration::MAX
        );
        assert!(parse_duration("18446744073709551616 s").is_err());
        assert_eq!(parse_duration(" 2 MS ").unwrap(), Duration::from_millis(2));
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("5 min").is_err());
        assert!(parse_duration("-1 ms").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5 s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250 ms");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1500 us");
        assert_eq!(format_duration(Duration::from_nanos(1500)), "1500 ns");
        assert_eq!(format_duration(Duration::from_millis(100_000_000)), "100000 s");
        assert_eq!(format_duration(Duration::ZERO), "0 s");
    }

    #[test]
    fn test_parse_toml() {
        let config = DriverConfig::from_toml_str("[driver]\ntimeout = \"250 ms\"\n").unwrap();
        assert_eq!(config.timeout, Duration::from_millis(250));

        let config = DriverConfig::from_toml_str("[driver]\ntimeout = 40\n").unwrap();
        assert_eq!(config.timeout, Duration::from_millis(40));
    }

    #[test]
    fn test_parse_toml_defaults() {
        assert_eq!(DriverConfig::from_toml_str("").unwrap(), DriverConfig::default());
        assert_eq!(
            DriverConfig::from_toml_str("[driver]\n").unwrap(),
            DriverConfig::default()
        );
    }

    #[test]
    fn test_parse_toml_errors() {
        assert!(matches!(
            DriverConfig::from_toml_str("[driver]\ntimeout = \"soon\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DriverConfig::from_toml_str("[driver]\ntimout = 5\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DriverConfig::from_toml_file("/nonexistent/pflash.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_toml_string_reparses() {
        let config = DriverConfig::default().with_timeout(Duration::from_micros(750));
        let text = config.to_toml_string();
        assert_eq!(text, "[driver]\ntimeout = \"750 us\"\n");
        assert_eq!(DriverConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_toml_string_keeps_precision() {
        for timeout in [
            Duration::from_nanos(1500),
            Duration::from_nanos(1),
            Duration::from_secs(3),
            Duration::from_millis(100_000_000),
            Duration::MAX,
        ] {
            let config = DriverConfig::default().with_timeout(timeout);
            let reloaded = DriverConfig::from_toml_str(&config.to_toml_string()).unwrap();
            assert_eq!(reloaded, config, "timeout {:?}", timeout);
        }
    }

    #[test]
    fn test_load_toml_file() {
        let path = std::env::temp_dir().join(format!("pflash-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[driver]\ntimeout = \"75 ms\"\n").unwrap();
        let loaded = DriverConfig::from_toml_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap().timeout, Duration::from_millis(75));
    }
}
