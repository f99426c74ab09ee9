use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_JWKS_REFRESH_SECS, MIN_JWKS_REFRESH_SECS,
    MIN_JWT_SECRET_LENGTH,
};

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

/// How bearer-token signatures are checked before claims are trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Verify against the identity provider's published key set
    Jwks,
    /// Verify with a shared HS256 secret
    Hs256,
    /// Verify with a single RS256 public key (PEM)
    Rs256,
    /// Structural checks only; signatures are NOT verified
    Disabled,
}

impl FromStr for VerificationMode {
    type Err = ConfigError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jwks" => Ok(Self::Jwks),
            "hs256" => Ok(Self::Hs256),
            "rs256" => Ok(Self::Rs256),
            "disabled" => Ok(Self::Disabled),
            other => Err(ConfigError::auth(format!(
                "auth.verification must be one of jwks, hs256, rs256, disabled, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub verification: VerificationMode,
    /// JWKS endpoint of the identity provider (jwks mode)
    pub jwks_url: Option<String>,
    /// Key-set refresh interval (jwks mode)
    pub jwks_refresh_secs: u64,
    /// Shared secret (hs256 mode)
    pub jwt_secret: Option<String>,
    /// PEM public key path relative to the config dir (rs256 mode)
    pub jwt_public_key_path: Option<String>,
    /// Expected `iss` claim, checked when set
    pub issuer: Option<String>,
    /// Expected `aud` claim, checked when set
    pub audience: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verification: VerificationMode::Jwks,
            jwks_url: None,
            jwks_refresh_secs: DEFAULT_JWKS_REFRESH_SECS,
            jwt_secret: None,
            jwt_public_key_path: None,
            issuer: None,
            audience: None,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self, config_dir: &Path) -> ConfigErrorResult<()> {
        match self.verification {
            VerificationMode::Jwks => self.validate_jwks(),
            VerificationMode::Hs256 => self.validate_hs256(),
            VerificationMode::Rs256 => self.validate_rs256(config_dir),
            VerificationMode::Disabled => Ok(()),
        }
    }

    fn validate_jwks(&self) -> ConfigErrorResult<()> {
        let url = self.jwks_url.as_deref().ok_or_else(|| {
            ConfigError::auth("auth.jwks_url is required when auth.verification = \"jwks\"")
        })?;

        let loopback = url.starts_with("http://127.0.0.1") || url.starts_with("http://localhost");
        if !url.starts_with("https://") && !loopback {
            return Err(ConfigError::auth(format!(
                "auth.jwks_url must use https (http only allowed for loopback), got {url}"
            )));
        }

        if self.jwks_refresh_secs < MIN_JWKS_REFRESH_SECS {
            return Err(ConfigError::auth(format!(
                "auth.jwks_refresh_secs must be >= {}, got {}",
                MIN_JWKS_REFRESH_SECS, self.jwks_refresh_secs
            )));
        }

        Ok(())
    }

    fn validate_hs256(&self) -> ConfigErrorResult<()> {
        let secret = self.jwt_secret.as_deref().ok_or_else(|| {
            ConfigError::auth("auth.jwt_secret is required when auth.verification = \"hs256\"")
        })?;

        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::auth(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LENGTH} characters"
            )));
        }

        Ok(())
    }

    fn validate_rs256(&self, config_dir: &Path) -> ConfigErrorResult<()> {
        let key_path = self.jwt_public_key_path.as_deref().ok_or_else(|| {
            ConfigError::auth(
                "auth.jwt_public_key_path is required when auth.verification = \"rs256\"",
            )
        })?;

        let path = Path::new(key_path);
        if path.is_absolute() {
            return Err(ConfigError::auth(
                "auth.jwt_public_key_path must be relative to the config directory",
            ));
        }
        if key_path.contains("..") {
            return Err(ConfigError::auth(
                "auth.jwt_public_key_path cannot contain '..'",
            ));
        }

        let full_path = config_dir.join(path);
        if !full_path.exists() {
            return Err(ConfigError::auth(format!(
                "auth.jwt_public_key_path {} does not exist",
                full_path.display()
            )));
        }

        Ok(())
    }
}
