use crate::{Credentials, Result as VendingErrorResult};

use tvm_auth::Claims;

use async_trait::async_trait;

/// Session tag key the role's trust and permission policies match on
pub const SESSION_TAG_KEY: &str = "tenant";

/// The tenant attribute bound to a vended session.
///
/// Only this crate can build one, and only from resolved claims, so no
/// caller-supplied string can become the isolation tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTag {
    value: String,
}

impl SessionTag {
    pub(crate) fn for_tenant(claims: &Claims) -> Self {
        Self {
            value: claims.tenant_id.clone(),
        }
    }

    pub fn key(&self) -> &'static str {
        SESSION_TAG_KEY
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One session-token exchange. Carries exactly one session tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    pub duration_secs: i32,
    pub session_tag: SessionTag,
    /// Inline session policy (JSON) further narrowing the role
    pub policy: Option<String>,
}

/// The remote session-token exchange
#[async_trait]
pub trait SessionTokenService: Send + Sync {
    async fn assume_role(&self, request: AssumeRoleRequest) -> VendingErrorResult<Credentials>;
}
