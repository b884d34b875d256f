// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! Environment variable names and defaults for building [`AuthOptions`]
//! outside a host, e.g. in the operator binary. Hosts embedding the
//! strategy usually deserialize `AuthOptions` from their own config instead.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_AUDIENCE` | Audience embedded in issued tokens | Required for issuance |
//! | `JWT_SIGNING_KEY` | HMAC secret or PEM private key for issuance | Required for issuance |
//! | `JWT_ALGORITHM` | Signing algorithm | `HS256` |
//! | `JWT_SUBJECT_PATH` | Dotted path to the subject in outbound messages | `meta.ident.id` |
//! | `JWT_EXPIRES_IN` | Lifetime of issued tokens (`5m`, `1h`, or milliseconds) | No expiry |
//! | `JWT_REQUIRE_EMAIL_VERIFIED` | Only trust verified emails as identities | `true` |
//! | `JWT_TRUSTED_KEYS` | JSON object of issuer key id to PEM key or secret | Empty |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::str::FromStr;

use crate::auth::options::{DEFAULT_ALGORITHM, DEFAULT_SUBJECT_PATH};
use crate::auth::{AuthOptions, TrustedKeys};
use crate::duration::parse_duration_ms;

/// Environment variable name for the audience of issued tokens.
pub const AUDIENCE_ENV: &str = "JWT_AUDIENCE";

/// Environment variable name for the signing secret or PEM private key.
///
/// Never logged.
pub const SIGNING_KEY_ENV: &str = "JWT_SIGNING_KEY";

/// Environment variable name for the signing algorithm.
///
/// # Default
/// `HS256`
pub const ALGORITHM_ENV: &str = "JWT_ALGORITHM";

/// Environment variable name for the subject path in outbound messages.
///
/// # Default
/// `meta.ident.id`
pub const SUBJECT_PATH_ENV: &str = "JWT_SUBJECT_PATH";

/// Environment variable name for the lifetime of issued tokens.
pub const EXPIRES_IN_ENV: &str = "JWT_EXPIRES_IN";

/// Environment variable name for the email verification requirement.
///
/// Accepts `true`/`false`/`1`/`0`/`yes`/`no`.
pub const REQUIRE_EMAIL_VERIFIED_ENV: &str = "JWT_REQUIRE_EMAIL_VERIFIED";

/// Environment variable name for the trusted issuer keys.
///
/// A JSON object, e.g. `{"accounts.google.com|my-app|kid1": "-----BEGIN PUBLIC KEY-----..."}`.
pub const TRUSTED_KEYS_ENV: &str = "JWT_TRUSTED_KEYS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            name,
            reason: reason.to_string(),
        }
    }
}

/// Log output format for the operator binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(ConfigError::invalid(LOG_FORMAT_ENV, format!("unknown format {other:?}"))),
        }
    }
}

impl LogFormat {
    pub fn from_env() -> Result<Self, ConfigError> {
        match non_empty(std::env::var(LOG_FORMAT_ENV).ok()) {
            Some(value) => value.parse(),
            None => Ok(Self::default()),
        }
    }
}

impl AuthOptions {
    /// Build options from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build options from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| non_empty(lookup(name));

        let expires_in = var(EXPIRES_IN_ENV);
        if let Some(expires_in) = &expires_in {
            parse_duration_ms(expires_in).map_err(|e| ConfigError::invalid(EXPIRES_IN_ENV, e))?;
        }

        let require_email_verified = match var(REQUIRE_EMAIL_VERIFIED_ENV) {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::invalid(REQUIRE_EMAIL_VERIFIED_ENV, format!("expected a boolean, got {value:?}"))
            })?,
            None => true,
        };

        let trusted_keys = match var(TRUSTED_KEYS_ENV) {
            Some(json) => serde_json::from_str::<TrustedKeys>(&json)
                .map_err(|e| ConfigError::invalid(TRUSTED_KEYS_ENV, e))?,
            None => TrustedKeys::new(),
        };

        Ok(Self {
            audience: var(AUDIENCE_ENV),
            signing_key: var(SIGNING_KEY_ENV),
            algorithm: var(ALGORITHM_ENV).unwrap_or_else(|| DEFAULT_ALGORITHM.to_string()),
            subject_path: var(SUBJECT_PATH_ENV).unwrap_or_else(|| DEFAULT_SUBJECT_PATH.to_string()),
            expires_in,
            trusted_keys,
            require_email_verified,
            ..Self::default()
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
