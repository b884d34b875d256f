// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Strategy Data Models
//!
//! Records exchanged with the host. All types derive `Serialize` and
//! `Deserialize` with the host's JSON shapes (lowercase status tags,
//! camelCase field names).
//!
//! ## Model Categories
//!
//! - **Authentication records**: result of issuing a token for an outbound request
//! - **Access responses**: result of validating an inbound bearer token

use serde::{Deserialize, Serialize};

// =============================================================================
// Authentication Records
// =============================================================================

/// Outcome of an issuance attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Granted,
    Refused,
}

/// A signed credential and the bookkeeping needed to reuse it.
///
/// Held by the caller across requests and discarded when replaced.
/// `expire` is an absolute epoch timestamp in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationRecord {
    pub status: AuthStatus,

    /// Signed token; `None` when refused
    pub token: Option<String>,

    /// Absolute expiry in epoch milliseconds; `None` when the token never expires
    pub expire: Option<i64>,

    /// Subject key the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,

    /// Refusal reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthenticationRecord {
    /// A granted record. Callers guarantee `token` is non-empty.
    pub fn granted(token: String, expire: Option<i64>, auth_key: Option<String>) -> Self {
        Self {
            status: AuthStatus::Granted,
            token: Some(token),
            expire,
            auth_key,
            error: None,
        }
    }

    /// A refused record carrying a human-readable reason.
    pub fn refused(error: impl Into<String>) -> Self {
        Self {
            status: AuthStatus::Refused,
            token: None,
            expire: None,
            auth_key: None,
            error: Some(error.into()),
        }
    }

    /// The token, if this record is granted and carries a non-empty one.
    pub fn usable_token(&self) -> Option<&str> {
        match (self.status, self.token.as_deref()) {
            (AuthStatus::Granted, Some(token)) if !token.is_empty() => Some(token),
            _ => None,
        }
    }
}

// =============================================================================
// Access Responses
// =============================================================================

/// Status of a validation response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    Ok,
    NoAccess,
    AuthError,
    Error,
}

/// Machine-readable refusal reason.
///
/// - `NoAuth` - no credentials were presented; retry after logging in
/// - `InvalidAuth` - credentials were presented but are not trusted or valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorReason {
    NoAuth,
    InvalidAuth,
}

/// Identity derived from verified claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    /// Ordered identity tokens: subject token first, email token second
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub ident: Ident,
}

/// Result of validating an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessResponse {
    pub status: AccessStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
}

impl AccessResponse {
    /// An `ok` response granting access to the given identity tokens.
    pub fn ok(tokens: Vec<String>) -> Self {
        Self {
            status: AccessStatus::Ok,
            error: None,
            reason: None,
            access: Some(Access {
                ident: Ident { tokens },
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == AccessStatus::Ok
    }

    /// Identity tokens granted by this response, empty unless `ok`.
    pub fn ident_tokens(&self) -> &[String] {
        self.access
            .as_ref()
            .map(|a| a.ident.tokens.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn granted_record_serializes_camel_case() {
        let record = AuthenticationRecord::granted("t0k3n".into(), Some(1_700_000_000_000), Some("johnf".into()));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({ "status": "granted", "token": "t0k3n", "expire": 1_700_000_000_000i64, "authKey": "johnf" })
        );
    }

    #[test]
    fn refused_record_has_null_token_and_expire() {
        let record = AuthenticationRecord::refused("nope");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({ "status": "refused", "token": null, "expire": null, "error": "nope" })
        );
    }

    #[test]
    fn usable_token_requires_granted_and_non_empty() {
        assert_eq!(
            AuthenticationRecord::granted("abc".into(), None, None).usable_token(),
            Some("abc")
        );
        assert_eq!(AuthenticationRecord::granted(String::new(), None, None).usable_token(), None);
        assert_eq!(AuthenticationRecord::refused("x").usable_token(), None);
    }

    #[test]
    fn ok_response_shape() {
        let response = AccessResponse::ok(vec!["google.com|123".into()]);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "status": "ok", "access": { "ident": { "tokens": ["google.com|123"] } } })
        );
        assert!(response.is_ok());
        assert_eq!(response.ident_tokens(), ["google.com|123".to_string()]);
    }

    #[test]
    fn record_round_trips_from_host_json() {
        let record: AuthenticationRecord = serde_json::from_value(json!({
            "status": "granted", "token": "abc", "expire": null, "authKey": "johnf"
        }))
        .unwrap();
        assert_eq!(record.auth_key.as_deref(), Some("johnf"));
        assert_eq!(record.expire, None);
    }
}
