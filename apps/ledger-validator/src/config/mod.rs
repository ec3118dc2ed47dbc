//! Configuration loading for the ledger validator.
//!
//! YAML with `${VAR}` / `${VAR:-default}` environment interpolation. Every
//! section is optional and falls back to its defaults, so an empty document
//! is a valid configuration.
//!
//! ```rust,ignore
//! use ledger_validator::config::load_config;
//!
//! let config = load_config(Some("config.yaml"))?;
//! println!("price band: {}", config.tolerances.price_band);
//! ```

mod audit;
mod market_data;
mod observability;
mod tolerances;

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use audit::AuditConfig;
pub use market_data::MarketDataConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use tolerances::ToleranceConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Check tolerances.
    #[serde(default)]
    pub tolerances: ToleranceConfig,
    /// Audit trail location.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Range lookup bounds.
    #[serde(default)]
    pub market_data: MarketDataConfig,
    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Load configuration from a YAML file.
///
/// `path` defaults to [`DEFAULT_CONFIG_PATH`].
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a file, or use defaults when the file does not exist.
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_config_or_default(path: &str) -> Result<Config, ConfigError> {
    if Path::new(path).exists() {
        load_config(Some(path))
    } else {
        tracing::debug!(path, "Config file not found, using defaults");
        Ok(Config::default())
    }
}

/// Load configuration from a YAML string.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

static ENV_VAR_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").ok());

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
///
/// An unset or empty variable takes the default, or the empty string when no
/// default is given.
fn interpolate_env_vars(input: &str) -> String {
    let Some(re) = ENV_VAR_REGEX.as_ref() else {
        return input.to_string();
    };

    re.replace_all(input, |caps: &Captures<'_>| {
        let default = caps.get(2).map_or("", |m| m.as_str());
        match caps.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(value)) if !value.is_empty() => value,
            _ => default.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let t = &config.tolerances;
    let one = Decimal::ONE;

    if t.absolute < Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "tolerances.absolute must be non-negative".to_string(),
        ));
    }

    for (name, value) in [
        ("price_band", t.price_band),
        ("equity_drift", t.equity_drift),
        ("continuity_warning", t.continuity_warning),
    ] {
        if value < Decimal::ZERO || value >= one {
            return Err(ConfigError::ValidationError(format!(
                "tolerances.{name} must be in [0, 1), got {value}"
            )));
        }
    }

    if t.max_position_pct <= Decimal::ZERO || t.max_position_pct > one {
        return Err(ConfigError::ValidationError(format!(
            "tolerances.max_position_pct must be in (0, 1], got {}",
            t.max_position_pct
        )));
    }

    if config.market_data.range_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "market_data.range_timeout_ms must be positive".to_string(),
        ));
    }

    if config.audit.path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "audit.path must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.tolerances.absolute, dec!(0.01));
        assert_eq!(config.audit.path, "validation_audit.jsonl");
        assert_eq!(config.market_data.range_timeout_ms, 5000);
        assert_eq!(config.observability.logging.level, "info");
        assert_eq!(config.observability.logging.format, "json");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_empty_config() {
        let config = match load_config_from_string("") {
            Ok(c) => c,
            Err(e) => panic!("should load empty config: {e}"),
        };
        assert_eq!(config.tolerances.price_band, dec!(0.20));
    }

    #[test]
    fn test_load_partial_config() {
        let yaml = r"
tolerances:
  price_band: 0.25
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load partial config: {e}"),
        };
        assert_eq!(config.tolerances.price_band, dec!(0.25));
        assert_eq!(config.tolerances.equity_drift, dec!(0.05)); // Default value
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
tolerances:
  absolute: "0.005"
  price_band: 0.30
  equity_drift: 0.10
  continuity_warning: 0.40
  max_position_pct: 0.25

audit:
  path: "/var/log/ledger/audit.jsonl"

market_data:
  range_timeout_ms: 1500

observability:
  logging:
    level: "debug"
    format: "pretty"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert_eq!(config.tolerances.absolute, dec!(0.005));
        assert_eq!(config.tolerances.price_band, dec!(0.30));
        assert_eq!(config.tolerances.max_position_pct, dec!(0.25));
        assert_eq!(config.audit.path, "/var/log/ledger/audit.jsonl");
        assert_eq!(config.market_data.range_timeout_ms, 1500);
        assert_eq!(config.observability.logging.format, "pretty");
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "path: ${LEDGER_VALIDATOR_TEST_NONEXISTENT_VAR:-audit.jsonl}";
        assert_eq!(interpolate_env_vars(input), "path: audit.jsonl");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "level: ${LEDGER_VALIDATOR_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "level: ");
    }

    #[test]
    fn test_validation_band_out_of_range() {
        let yaml = r"
tolerances:
  price_band: 1.5
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for price_band");
        };
        assert!(err.to_string().contains("price_band"));
    }

    #[test]
    fn test_validation_negative_absolute() {
        let yaml = r"
tolerances:
  absolute: -0.01
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for negative absolute tolerance");
        };
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_validation_zero_concentration() {
        let yaml = r"
tolerances:
  max_position_pct: 0
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for max_position_pct");
        };
        assert!(err.to_string().contains("max_position_pct"));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let yaml = r"
market_data:
  range_timeout_ms: 0
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero timeout");
        };
        assert!(err.to_string().contains("range_timeout_ms"));
    }

    #[test]
    fn test_validation_empty_audit_path() {
        let yaml = r#"
audit:
  path: ""
"#;

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for empty audit path");
        };
        assert!(err.to_string().contains("audit.path"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let config = load_config_or_default(path.to_str().unwrap()).unwrap();

        assert_eq!(config.tolerances.absolute, dec!(0.01));
    }

    #[test]
    fn test_load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "audit:\n  path: runs.jsonl\n").unwrap();

        let config = load_config(path.to_str()).unwrap();

        assert_eq!(config.audit.path, "runs.jsonl");
    }
}
