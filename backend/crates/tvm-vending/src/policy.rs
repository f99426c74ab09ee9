//! Session policy documents.
//!
//! Documents are rendered from fixed-order structs (no maps), so the same
//! policy always renders to the same bytes.

use crate::{Result as VendingErrorResult, VendingError};

use serde::Serialize;

pub const POLICY_VERSION: &str = "2012-10-17";

/// Item-level actions granted on the tenant's partition
pub const DYNAMODB_ITEM_ACTIONS: [&str; 5] = [
    "dynamodb:GetItem",
    "dynamodb:PutItem",
    "dynamodb:Query",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
];

/// How a vended credential is scoped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPolicy {
    /// Keyed-store rows whose leading (partition) key equals the tenant id
    DynamoDbLeadingKey { tenant_id: String },
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyDocument<'a> {
    version: &'static str,
    statement: [Statement<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Statement<'a> {
    effect: &'static str,
    action: &'static [&'static str],
    resource: &'static str,
    condition: Condition<'a>,
}

#[derive(Serialize)]
struct Condition<'a> {
    #[serde(rename = "ForAllValues:StringEquals")]
    for_all_values_string_equals: LeadingKeys<'a>,
}

#[derive(Serialize)]
struct LeadingKeys<'a> {
    #[serde(rename = "dynamodb:LeadingKeys")]
    leading_keys: [&'a str; 1],
}

impl CredentialPolicy {
    pub fn dynamodb_leading_key(tenant_id: impl Into<String>) -> Self {
        Self::DynamoDbLeadingKey {
            tenant_id: tenant_id.into(),
        }
    }

    /// Compact JSON policy document
    #[track_caller]
    pub fn policy_document(&self) -> VendingErrorResult<String> {
        let document = match self {
            Self::DynamoDbLeadingKey { tenant_id } => PolicyDocument {
                version: POLICY_VERSION,
                statement: [Statement {
                    effect: "Allow",
                    action: &DYNAMODB_ITEM_ACTIONS,
                    resource: "*",
                    condition: Condition {
                        for_all_values_string_equals: LeadingKeys {
                            leading_keys: [tenant_id.as_str()],
                        },
                    },
                }],
            },
        };

        serde_json::to_string(&document)
            .map_err(|e| VendingError::config(format!("policy rendering failed: {e}")))
    }
}
