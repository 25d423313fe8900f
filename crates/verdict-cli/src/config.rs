//! CLI configuration via environment variables
//!
//! Verdict uses environment variables for optional configuration so CI
//! setups can fix a default without wrapping the invocation.

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Default to JSON report output (VERDICT_JSON=1)
    pub default_json: bool,
    /// Disable colored output (VERDICT_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            default_json: env::var("VERDICT_JSON")
                .map(|v| {
                    let lower = v.to_lowercase();
                    !(lower.is_empty() || lower == "0" || lower == "false" || lower == "off")
                })
                .unwrap_or(false),
            no_color: env::var("VERDICT_NO_COLOR").is_ok() || env::var("NO_COLOR").is_ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_defaults() {
        // Clear environment variables for this test
        env::remove_var("VERDICT_JSON");
        env::remove_var("VERDICT_NO_COLOR");
        env::remove_var("NO_COLOR");

        let config = Config::from_env();
        assert!(!config.default_json);
        assert!(!config.no_color);
    }

    #[test]
    fn test_config_json_default() {
        env::set_var("VERDICT_JSON", "1");
        let config = Config::from_env();
        assert!(config.default_json);
        env::remove_var("VERDICT_JSON");
    }

    #[test]
    fn test_config_json_disabled_values() {
        env::set_var("VERDICT_JSON", "0");
        assert!(!Config::from_env().default_json);

        env::set_var("VERDICT_JSON", "false");
        assert!(!Config::from_env().default_json);
        env::remove_var("VERDICT_JSON");
    }

    #[test]
    fn test_config_no_color() {
        env::set_var("VERDICT_NO_COLOR", "1");
        let config = Config::from_env();
        assert!(config.no_color);
        env::remove_var("VERDICT_NO_COLOR");

        // Also test NO_COLOR (standard)
        env::set_var("NO_COLOR", "1");
        let config = Config::from_env();
        assert!(config.no_color);
        env::remove_var("NO_COLOR");
    }
}
