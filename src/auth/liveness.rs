// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reuse check for previously issued authentications.

use chrono::Utc;
use serde_json::Value;

use super::extractor::extract_auth_key;
use super::AuthOptions;
use crate::models::AuthenticationRecord;

/// Whether `authentication` can still be used for `message`.
///
/// True only for a granted record with a non-empty token, no expiry or an
/// expiry (epoch milliseconds) not yet passed, and an auth key equal to the
/// one computed for `message` now. A token minted for one subject is never
/// live for another.
pub fn is_authenticated(
    authentication: Option<&AuthenticationRecord>,
    options: Option<&AuthOptions>,
    message: Option<&Value>,
) -> bool {
    is_authenticated_at(authentication, options, message, Utc::now().timestamp_millis())
}

pub(crate) fn is_authenticated_at(
    authentication: Option<&AuthenticationRecord>,
    options: Option<&AuthOptions>,
    message: Option<&Value>,
    now_ms: i64,
) -> bool {
    let Some(authentication) = authentication else {
        return false;
    };
    if authentication.usable_token().is_none() {
        return false;
    }
    if authentication.expire.is_some_and(|expire| expire < now_ms) {
        return false;
    }

    authentication.auth_key == extract_auth_key(options, message)
}
