//! Simulator configuration file.

use crate::hal::SimHalConfig;
use robot_common::config::{ConfigError, RuntimeConfig, SharedConfig};
use robot_common::consts::RUNTIME_SERVICE_NAME;
use serde::{Deserialize, Serialize};

/// Full simulator configuration.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "info"
/// service_name = "robot-sim"
///
/// [runtime]
/// join_timeout_ms = 1000
///
/// [hal]
/// has_main = true
/// ds_period_ms = 20
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Logging and instance name.
    pub shared: SharedConfig,
    /// Lifecycle settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Simulated HAL settings.
    #[serde(default)]
    pub hal: SimHalConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig {
                log_level: Default::default(),
                service_name: RUNTIME_SERVICE_NAME.to_string(),
            },
            runtime: RuntimeConfig::default(),
            hal: SimHalConfig::default(),
        }
    }
}

impl SimConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` for an empty service name, an
    /// invalid runtime section, or a zero driver-station period.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.runtime.validate()?;
        if self.hal.ds_period_ms == 0 {
            return Err(ConfigError::ValidationError(
                "hal.ds_period_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_common::config::{ConfigLoader, LogLevel, PanicPolicy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.hal.has_main);
        assert_eq!(config.hal.ds_period_ms, 20);
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[shared]
log_level = "debug"
service_name = "practice-field"

[runtime]
join_timeout_ms = 500
panic_policy = "propagate"

[hal]
has_main = false
ds_period_ms = 10
run_for_ms = 3000
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = SimConfig::load(file.path()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.shared.log_level, LogLevel::Debug);
        assert_eq!(config.runtime.join_timeout_ms, 500);
        assert_eq!(config.runtime.panic_policy, PanicPolicy::Propagate);
        assert!(!config.hal.has_main);
        assert_eq!(config.hal.run_for_ms, Some(3000));
        assert!(config.hal.enabled);
        assert_eq!(config.hal.init_error_code, None);
    }

    #[test]
    fn test_zero_ds_period_rejected() {
        let mut config = SimConfig::default();
        config.hal.ds_period_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ds_period_ms"));
    }
}
