use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;
use twentyq_core::llm_client::InferenceSettings;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Checked per request rather than at startup; a missing key is a 500 on `/api/step`.
    pub inference_api_key: Option<String>,
    pub inference_api_base: String,
    pub chat_model: String,
    pub repair_model: String,
    pub static_dir: PathBuf,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address = match std::env::var("BIND_ADDRESS") {
            Ok(addr) => addr
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?,
            Err(_) => {
                let port = match std::env::var("PORT") {
                    Ok(port) => port.parse::<u16>().map_err(|e| {
                        ConfigError::InvalidValue("PORT".to_string(), e.to_string())
                    })?,
                    Err(_) => 3000,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let inference_api_key = std::env::var("INFERENCE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let inference_api_base = std::env::var("INFERENCE_API_BASE")
            .unwrap_or_else(|_| "https://api.together.xyz/v1".to_string());

        let chat_model = std::env::var("CHAT_MODEL")
            .unwrap_or_else(|_| "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string());

        let repair_model = std::env::var("REPAIR_MODEL")
            .unwrap_or_else(|_| "meta-llama/Llama-3.2-3B-Instruct-Turbo".to_string());

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./public"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            inference_api_key,
            inference_api_base,
            chat_model,
            repair_model,
            static_dir,
            log_level,
        })
    }

    /// The subset of configuration the inference client needs.
    pub fn inference_settings(&self) -> InferenceSettings {
        InferenceSettings {
            api_key: self.inference_api_key.clone(),
            api_base: self.inference_api_base.clone(),
            chat_model: self.chat_model.clone(),
            repair_model: self.repair_model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tracing::Level;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("BIND_ADDRESS");
            env::remove_var("PORT");
            env::remove_var("INFERENCE_API_KEY");
            env::remove_var("INFERENCE_API_BASE");
            env::remove_var("CHAT_MODEL");
            env::remove_var("REPAIR_MODEL");
            env::remove_var("STATIC_DIR");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    fn test_config_error_display() {
        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env_vars();

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.inference_api_key, None);
        assert_eq!(config.inference_api_base, "https://api.together.xyz/v1");
        assert_eq!(config.chat_model, "meta-llama/Llama-3.3-70B-Instruct-Turbo");
        assert_eq!(config.repair_model, "meta-llama/Llama-3.2-3B-Instruct-Turbo");
        assert_eq!(config.static_dir, PathBuf::from("./public"));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("INFERENCE_API_KEY", "test-key");
            env::set_var("INFERENCE_API_BASE", "http://localhost:9000/v1");
            env::set_var("CHAT_MODEL", "big");
            env::set_var("REPAIR_MODEL", "small");
            env::set_var("STATIC_DIR", "/srv/www");
            env::set_var("RUST_LOG", "debug");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.inference_api_key, Some("test-key".to_string()));
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.log_level, Level::DEBUG);

        let settings = config.inference_settings();
        assert_eq!(settings.api_key.as_deref(), Some("test-key"));
        assert_eq!(settings.api_base, "http://localhost:9000/v1");
        assert_eq!(settings.chat_model, "big");
        assert_eq!(settings.repair_model, "small");
    }

    #[test]
    #[serial]
    fn test_config_port_only() {
        clear_env_vars();
        unsafe {
            env::set_var("PORT", "8787");
        }

        let config = Config::from_env().expect("Config should load successfully");
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:8787");
    }

    #[test]
    #[serial]
    fn test_config_blank_key_is_absent() {
        clear_env_vars();
        unsafe {
            env::set_var("INFERENCE_API_KEY", "   ");
        }

        let config = Config::from_env().expect("Config should load successfully");
        assert_eq!(config.inference_api_key, None);
    }

    #[test]
    #[serial]
    fn test_config_invalid_bind_address() {
        clear_env_vars();
        unsafe {
            env::set_var("BIND_ADDRESS", "not-a-valid-address");
        }

        let err = Config::from_env().unwrap_err();
        let ConfigError::InvalidValue(var, _) = err;
        assert_eq!(var, "BIND_ADDRESS");
    }

    #[test]
    #[serial]
    fn test_config_invalid_port() {
        clear_env_vars();
        unsafe {
            env::set_var("PORT", "99999");
        }

        let err = Config::from_env().unwrap_err();
        let ConfigError::InvalidValue(var, _) = err;
        assert_eq!(var, "PORT");
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = Config::from_env().unwrap_err();
        let ConfigError::InvalidValue(var, _) = err;
        assert_eq!(var, "RUST_LOG");
    }
}
