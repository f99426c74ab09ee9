use crate::{Result as VendingErrorResult, VendingError};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temporary, tenant-scoped cloud credentials.
///
/// The wire form uses the session-token service's field names. The secret
/// fields never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "AccessKeyId")]
    pub access_key_id: String,
    #[serde(rename = "SecretAccessKey")]
    pub secret_access_key: String,
    #[serde(rename = "SessionToken")]
    pub session_token: String,
    #[serde(rename = "Expiration", default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Parse the transport form produced by the vending machine
    #[track_caller]
    pub fn from_json(json: &str) -> VendingErrorResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            VendingError::credential_unavailable(format!("invalid credential payload: {e}"))
        })
    }

    #[track_caller]
    pub fn to_json(&self) -> VendingErrorResult<String> {
        serde_json::to_string(self).map_err(|e| {
            VendingError::credential_unavailable(format!("credential serialization: {e}"))
        })
    }

    /// Last four characters of the access key id, safe to log
    pub fn access_key_suffix(&self) -> &str {
        let len = self.access_key_id.len();
        self.access_key_id
            .get(len.saturating_sub(4)..)
            .unwrap_or_default()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &format_args!("...{}", self.access_key_suffix()))
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expiration", &self.expiration)
            .finish()
    }
}
