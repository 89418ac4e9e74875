//! Engine configuration
//!
//! Loaded from TOML; every section and field is optional:
//!
//! ```toml
//! [resolver]
//! edge_epsilon = 2.0
//!
//! [settle]
//! quiet_period_ms = 100
//!
//! [features]
//! scroll_end = false
//! scroll_snap_change = false
//! scroll_snap_changing = false
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::events::SnapEventKind;

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub settle: SettleConfig,
    #[serde(default)]
    pub features: HostFeatures,
}

/// Snap target resolution settings
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Tolerance for "at offset 0" / "at max offset" checks, in layout units
    #[serde(default = "default_edge_epsilon")]
    pub edge_epsilon: f32,
}

fn default_edge_epsilon() -> f32 {
    2.0
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            edge_epsilon: default_edge_epsilon(),
        }
    }
}

/// Settle heuristic settings
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SettleConfig {
    /// Quiet time after the last movement before scrolling counts as settled
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
}

fn default_quiet_period_ms() -> u64 {
    100
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period_ms(),
        }
    }
}

impl SettleConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

/// What the host already provides natively
///
/// Read once when the runtime is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostFeatures {
    /// Host fires its own `scrollend`
    #[serde(default)]
    pub scroll_end: bool,
    /// Host fires its own `scrollsnapchange`
    #[serde(default)]
    pub scroll_snap_change: bool,
    /// Host fires its own `scrollsnapchanging`
    #[serde(default)]
    pub scroll_snap_changing: bool,
}

impl HostFeatures {
    pub fn supports_natively(&self, kind: SnapEventKind) -> bool {
        match kind {
            SnapEventKind::Change => self.scroll_snap_change,
            SnapEventKind::Changing => self.scroll_snap_changing,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.resolver.edge_epsilon.is_finite() || self.resolver.edge_epsilon < 0.0 {
            return Err(ConfigError::Invalid {
                field: "resolver.edge_epsilon",
                reason: format!("must be a non-negative number, got {}", self.resolver.edge_epsilon),
            });
        }
        if self.settle.quiet_period_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "settle.quiet_period_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.resolver.edge_epsilon, 2.0);
        assert_eq!(config.settle.quiet_period(), Duration::from_millis(100));
        assert!(!config.features.scroll_end);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [settle]
            quiet_period_ms = 250

            [features]
            scroll_end = true
            "#,
        )
        .unwrap();
        assert_eq!(config.settle.quiet_period_ms, 250);
        assert!(config.features.scroll_end);
        assert!(!config.features.supports_natively(SnapEventKind::Change));
        assert_eq!(config.resolver.edge_epsilon, 2.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_toml_str("[settle]\nquiet_period_ms = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "settle.quiet_period_ms",
                ..
            }
        ));

        let err = EngineConfig::from_toml_str("[resolver]\nedge_epsilon = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = EngineConfig::from_toml_str("[settle\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EngineConfig::default();
        config.features.scroll_snap_changing = true;
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
