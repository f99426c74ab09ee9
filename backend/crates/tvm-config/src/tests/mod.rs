
use std::env;

use tempfile::TempDir;

pub(crate) const TEST_JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// RAII guard for environment variables - restores the original value on drop
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::set_var(key, value);
            Self { key, original }
        }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::remove_var(key);
            Self { key, original }
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original {
                Some(val) => env::set_var(self.key, val),
                None => env::remove_var(self.key),
            }
        }
    }
}

/// Temp config directory wired through TVM_CONFIG_DIR, with role variables cleared
pub(crate) fn setup_config_dir() -> (TempDir, Vec<EnvGuard>) {
    let temp = TempDir::new().unwrap();
    let guards = vec![
        EnvGuard::set("TVM_CONFIG_DIR", temp.path().to_str().unwrap()),
        EnvGuard::remove("TVM_VENDING_ROLE_ARN"),
        EnvGuard::remove("IAM_ROLE_ARN"),
    ];
    (temp, guards)
}

/// Env overrides that make the auth section valid without a JWKS endpoint
pub(crate) fn hs256_auth() -> Vec<EnvGuard> {
    vec![
        EnvGuard::set("TVM_AUTH_VERIFICATION", "hs256"),
        EnvGuard::set("TVM_AUTH_JWT_SECRET", TEST_JWT_SECRET),
    ]
}
