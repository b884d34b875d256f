// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims used for key lookup and identity derivation.

use serde::Deserialize;
use serde_json::Value;

/// Issuer prefix removed before key lookup and identity tokens.
const HTTPS_PREFIX: &str = "https://";

/// Separator inside issuer key ids and identity tokens.
const SEPARATOR: &str = "|";

/// Claims read from a token, verified or not.
///
/// Values are kept as raw JSON so that a claim of an unexpected type is
/// simply not used instead of failing the whole decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub iss: Option<Value>,
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub aud: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub email_verified: Option<Value>,
}

impl IdentityClaims {
    /// Issuer with any `https://` prefix removed, if what remains is non-empty.
    pub fn issuer(&self) -> Option<&str> {
        self.iss
            .as_ref()
            .and_then(Value::as_str)
            .map(strip_https)
            .filter(|iss| !iss.is_empty())
    }

    /// Audience segment of the key id. Multiple audiences are comma-joined.
    fn audience_segment(&self) -> Option<String> {
        match self.aud.as_ref()? {
            Value::String(aud) if !aud.is_empty() => Some(aud.clone()),
            Value::Array(items) if !items.is_empty() => {
                let joined = items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(",");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        }
    }

    /// Trusted key registry id: `"<issuer>|<aud>|<kid>"`, empty segments omitted.
    ///
    /// Built from unverified data; it only selects a key, it does not
    /// establish trust. `None` when every segment is empty.
    pub fn issuer_key_id(&self, kid: Option<&str>) -> Option<String> {
        let mut segments: Vec<String> = self.issuer().map(str::to_string).into_iter().collect();
        segments.extend(self.audience_segment());
        segments.extend(kid.filter(|k| !k.is_empty()).map(str::to_string));

        let key_id = segments.join(SEPARATOR);
        (!key_id.is_empty()).then_some(key_id)
    }

    /// Identity tokens from verified claims, subject token first.
    ///
    /// The email token is only produced for `email_verified: true`, unless
    /// `require_email_verified` is off.
    pub fn identity_tokens(&self, require_email_verified: bool) -> Vec<String> {
        let Some(issuer) = self.issuer() else {
            return Vec::new();
        };

        let subject = self
            .sub
            .as_ref()
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty());

        let email_verified = matches!(self.email_verified, Some(Value::Bool(true)));
        let email = self
            .email
            .as_ref()
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .filter(|_| email_verified || !require_email_verified);

        [subject, email]
            .into_iter()
            .flatten()
            .map(|value| format!("{issuer}{SEPARATOR}{value}"))
            .collect()
    }
}

fn strip_https(url: &str) -> &str {
    url.strip_prefix(HTTPS_PREFIX).unwrap_or(url)
}
