use crate::{
    AuthConfig, CONFIG_DIR_ENV, CacheConfig, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIR,
    LEGACY_ROLE_ARN_ENV, LoggingConfig, ServerConfig, VendingConfig, VerificationMode,
};

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub vending: VendingConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. TVM_CONFIG_DIR env var, else ./.tvm/
    /// 2. Auto-create the config directory if missing
    /// 3. config.toml if present, else defaults
    /// 4. TVM_* environment overrides (plus legacy IAM_ROLE_ARN)
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join("config.toml");

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Config directory: TVM_CONFIG_DIR > ./.tvm/
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all sections. Call after load() so bad config fails at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let config_dir = Self::config_dir()?;

        self.server.validate()?;
        self.auth.validate(&config_dir)?;
        self.vending.validate()?;
        if self.cache.enabled {
            self.cache.validate(self.vending.default_duration_secs)?;
        }

        Ok(())
    }

    /// Bind address as host:port
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary (NEVER logs secrets)
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} (timeout {}s, max {} in flight)",
            self.server.host,
            self.server.port,
            self.server.request_timeout_secs,
            self.server.max_in_flight_requests
        );

        let verification = match self.auth.verification {
            VerificationMode::Jwks => "jwks",
            VerificationMode::Hs256 => "hs256",
            VerificationMode::Rs256 => "rs256",
            VerificationMode::Disabled => "DISABLED",
        };
        info!(
            "  auth: verification={} issuer={} audience={}",
            verification,
            self.auth.issuer.as_deref().unwrap_or("-"),
            self.auth.audience.as_deref().unwrap_or("-")
        );

        info!(
            "  vending: {} role={} duration={}s timeout={}s concurrency={} rate={}/s",
            if self.vending.enabled {
                "enabled"
            } else {
                "DISABLED"
            },
            if self.vending.role_arn().is_some() {
                "configured"
            } else {
                "absent"
            },
            self.vending.default_duration_secs,
            self.vending.exchange_timeout_secs,
            self.vending.max_concurrent_exchanges,
            self.vending.exchanges_per_second
        );

        info!(
            "  cache: {} (refresh {}s before expiry)",
            if self.cache.enabled {
                "enabled"
            } else {
                "disabled"
            },
            self.cache.refresh_before_expiry_secs
        );

        info!(
            "  logging: {} (colored: {})",
            self.logging.level, self.logging.colored
        );

        if self.vending.is_misconfigured() {
            warn!("  vending is enabled but no role ARN is configured; readiness will fail");
        }
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("TVM_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("TVM_SERVER_PORT", &mut self.server.port);
        Self::apply_env_parse(
            "TVM_SERVER_REQUEST_TIMEOUT_SECS",
            &mut self.server.request_timeout_secs,
        );
        Self::apply_env_parse(
            "TVM_SERVER_MAX_IN_FLIGHT_REQUESTS",
            &mut self.server.max_in_flight_requests,
        );

        // Auth
        Self::apply_env_parse("TVM_AUTH_VERIFICATION", &mut self.auth.verification);
        Self::apply_env_option_string("TVM_AUTH_JWKS_URL", &mut self.auth.jwks_url);
        Self::apply_env_parse("TVM_AUTH_JWKS_REFRESH_SECS", &mut self.auth.jwks_refresh_secs);
        Self::apply_env_option_string("TVM_AUTH_JWT_SECRET", &mut self.auth.jwt_secret);
        Self::apply_env_option_string(
            "TVM_AUTH_JWT_PUBLIC_KEY_PATH",
            &mut self.auth.jwt_public_key_path,
        );
        Self::apply_env_option_string("TVM_AUTH_ISSUER", &mut self.auth.issuer);
        Self::apply_env_option_string("TVM_AUTH_AUDIENCE", &mut self.auth.audience);

        // Vending
        Self::apply_env_bool("TVM_VENDING_ENABLED", &mut self.vending.enabled);
        if std::env::var("TVM_VENDING_ROLE_ARN").is_ok() {
            Self::apply_env_option_string("TVM_VENDING_ROLE_ARN", &mut self.vending.role_arn);
        } else if self.vending.role_arn().is_none() {
            Self::apply_env_option_string(LEGACY_ROLE_ARN_ENV, &mut self.vending.role_arn);
        }
        Self::apply_env_option_string("TVM_VENDING_REGION", &mut self.vending.region);
        Self::apply_env_option_string("TVM_VENDING_STS_ENDPOINT", &mut self.vending.sts_endpoint);
        Self::apply_env_option_string(
            "TVM_VENDING_DYNAMODB_ENDPOINT",
            &mut self.vending.dynamodb_endpoint,
        );
        Self::apply_env_parse(
            "TVM_VENDING_DEFAULT_DURATION_SECS",
            &mut self.vending.default_duration_secs,
        );
        Self::apply_env_parse(
            "TVM_VENDING_EXCHANGE_TIMEOUT_SECS",
            &mut self.vending.exchange_timeout_secs,
        );
        Self::apply_env_parse(
            "TVM_VENDING_MAX_CONCURRENT_EXCHANGES",
            &mut self.vending.max_concurrent_exchanges,
        );
        Self::apply_env_parse(
            "TVM_VENDING_EXCHANGES_PER_SECOND",
            &mut self.vending.exchanges_per_second,
        );
        Self::apply_env_bool(
            "TVM_VENDING_ATTACH_SESSION_POLICY",
            &mut self.vending.attach_session_policy,
        );

        // Cache
        Self::apply_env_bool("TVM_CACHE_ENABLED", &mut self.cache.enabled);
        Self::apply_env_parse(
            "TVM_CACHE_REFRESH_BEFORE_EXPIRY_SECS",
            &mut self.cache.refresh_before_expiry_secs,
        );

        // Logging
        Self::apply_env_parse("TVM_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("TVM_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("TVM_LOG_FILE", &mut self.logging.file);
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Accepts "true"/"1"
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Empty values clear the option
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = if val.trim().is_empty() {
                None
            } else {
                Some(val)
            };
        }
    }
}
