use std::time::Duration;

/// Predefined configuration presets for common use cases.
///
/// These presets provide sensible defaults for different deployment
/// scenarios, balancing security against the realities of email delivery
/// latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Production-ready configuration.
    ///
    /// - TTL: 5 minutes (covers typical email round-trip time without
    ///   leaving codes valid for long)
    Production,

    /// Development-friendly configuration.
    ///
    /// - TTL: 10 minutes (longer window for manual testing and debugging)
    Development,

    /// High-security configuration.
    ///
    /// - TTL: 2 minutes (short exposure window; requires fast delivery)
    HighSecurity,

    /// Load configuration from environment variables.
    ///
    /// Reads configuration from:
    /// - `OTP_AUTH_TTL`: code validity in seconds (default: 300)
    FromEnv,
}

/// Configuration for the OTP login flow.
///
/// # Environment Variables
///
/// Configuration options can be set via environment variables:
/// - `OTP_AUTH_TTL`: code validity in seconds (default: 300)
///
/// # Example
///
/// ```rust
/// use otp_auth::{ConfigPreset, OtpConfig};
/// use std::time::Duration;
///
/// // Use a preset
/// let config = OtpConfig::from(ConfigPreset::Production);
///
/// // Create custom configuration
/// let config = OtpConfig {
///     ttl: Duration::from_secs(600), // 10 minutes
/// };
/// ```
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Validity window for issued login codes.
    pub ttl: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(
                std::env::var("OTP_AUTH_TTL")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
        }
    }
}

impl OtpConfig {
    /// Validates the configuration and returns any warnings.
    ///
    /// # Returns
    ///
    /// A vector of warning messages for potentially problematic settings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.ttl.as_secs() < 60 {
            warnings.push(
                "Very short TTL (< 1 minute) may expire codes before the email arrives"
                    .to_string(),
            );
        }
        if self.ttl.as_secs() > 3600 {
            warnings.push(
                "Long TTL (> 1 hour) widens the window for leaked or guessed codes".to_string(),
            );
        }

        warnings
    }

    /// Returns a summary of the current configuration.
    pub fn summary(&self) -> String {
        format!("OtpConfig {{ TTL: {}s }}", self.ttl.as_secs())
    }
}

impl From<ConfigPreset> for OtpConfig {
    fn from(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Production => Self {
                ttl: Duration::from_secs(300),
            },
            ConfigPreset::Development => Self {
                ttl: Duration::from_secs(600),
            },
            ConfigPreset::HighSecurity => Self {
                ttl: Duration::from_secs(120),
            },
            ConfigPreset::FromEnv => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env_vars() {
        unsafe {
            std::env::remove_var("OTP_AUTH_TTL");
        }
    }

    #[test]
    fn test_production_preset() {
        let config = OtpConfig::from(ConfigPreset::Production);
        assert_eq!(config.ttl.as_secs(), 300);
    }

    #[test]
    fn test_development_preset() {
        let config = OtpConfig::from(ConfigPreset::Development);
        assert_eq!(config.ttl.as_secs(), 600);
    }

    #[test]
    fn test_high_security_preset() {
        let config = OtpConfig::from(ConfigPreset::HighSecurity);
        assert_eq!(config.ttl.as_secs(), 120);
    }

    #[test]
    fn test_custom_configuration() {
        let config = OtpConfig {
            ttl: Duration::from_secs(600),
        };
        assert_eq!(config.ttl.as_secs(), 600);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env_vars();

        unsafe {
            std::env::set_var("OTP_AUTH_TTL", "900");
        }

        let config = OtpConfig::from(ConfigPreset::FromEnv);
        assert_eq!(config.ttl.as_secs(), 900);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env_vars();

        let config = OtpConfig::from(ConfigPreset::FromEnv);
        assert_eq!(config.ttl.as_secs(), 300);
    }

    #[test]
    fn test_validation_valid_config() {
        let config = OtpConfig::from(ConfigPreset::Production);
        let warnings = config.validate();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_validation_ttl_warnings() {
        // Test very short TTL
        let config = OtpConfig {
            ttl: Duration::from_secs(30),
        };
        let warnings = config.validate();
        assert!(!warnings.is_empty());
        assert!(warnings.iter().any(|w| w.contains("Very short TTL")));

        // Test very long TTL
        let config = OtpConfig {
            ttl: Duration::from_secs(7200),
        };
        let warnings = config.validate();
        assert!(!warnings.is_empty());
        assert!(warnings.iter().any(|w| w.contains("Long TTL")));
    }

    #[test]
    fn test_summary() {
        let config = OtpConfig::from(ConfigPreset::Production);
        assert_eq!(config.summary(), "OtpConfig { TTL: 300s }");
    }
}
