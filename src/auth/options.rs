// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Strategy options supplied by the host on every call.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::trusted_keys::TrustedKeys;

/// Default signing algorithm.
pub const DEFAULT_ALGORITHM: &str = "HS256";

/// Default path to the subject inside an outbound message.
pub const DEFAULT_SUBJECT_PATH: &str = "meta.ident.id";

/// Options for issuing and validating tokens.
///
/// Deserializes from the host's JSON configuration. The older key names
/// `key`, `subPath` and `payload` are accepted as aliases.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthOptions {
    /// Audience embedded in issued tokens (required for issuance)
    pub audience: Option<String>,

    /// Shared secret or PEM private key used for issuance
    #[serde(alias = "key")]
    pub signing_key: Option<String>,

    /// Signing algorithm name, e.g. `HS256`, `RS256`, `ES256`
    pub algorithm: String,

    /// Dotted path to the subject inside outbound messages
    #[serde(alias = "subPath")]
    pub subject_path: String,

    /// Token lifetime (`"5m"`, `"1h"`); issued tokens never expire when unset
    pub expires_in: Option<String>,

    /// Claims merged into every issued token; `sub` always wins
    #[serde(alias = "payload")]
    pub extra_claims: Map<String, Value>,

    /// Keys of trusted issuers, read fresh on every validation
    pub trusted_keys: TrustedKeys,

    /// Only derive an email identity from `email_verified: true` claims
    pub require_email_verified: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            audience: None,
            signing_key: None,
            algorithm: DEFAULT_ALGORITHM.to_string(),
            subject_path: DEFAULT_SUBJECT_PATH.to_string(),
            expires_in: None,
            extra_claims: Map::new(),
            trusted_keys: TrustedKeys::default(),
            require_email_verified: true,
        }
    }
}

impl AuthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_signing_key(mut self, key: impl Into<String>) -> Self {
        self.signing_key = Some(key.into());
        self
    }

    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    pub fn with_subject_path(mut self, path: impl Into<String>) -> Self {
        self.subject_path = path.into();
        self
    }

    pub fn with_expires_in(mut self, expires_in: impl Into<String>) -> Self {
        self.expires_in = Some(expires_in.into());
        self
    }

    pub fn with_extra_claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra_claims.insert(name.into(), value);
        self
    }

    /// Share a caller-owned registry. Later updates through any clone of
    /// `keys` are seen by validation.
    pub fn with_trusted_keys(mut self, keys: TrustedKeys) -> Self {
        self.trusted_keys = keys;
        self
    }

    pub fn with_require_email_verified(mut self, required: bool) -> Self {
        self.require_email_verified = required;
        self
    }
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("audience", &self.audience)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .field("algorithm", &self.algorithm)
            .field("subject_path", &self.subject_path)
            .field("expires_in", &self.expires_in)
            .field("extra_claims", &self.extra_claims)
            .field("trusted_keys", &self.trusted_keys)
            .field("require_email_verified", &self.require_email_verified)
            .finish()
    }
}
