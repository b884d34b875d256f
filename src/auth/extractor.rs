// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Values pulled out of host messages: the subject key of an outbound
//! message and the bearer token of an inbound one.
//!
//! Messages are arbitrary nested JSON. Inbound headers live at
//! `payload.headers`:
//!
//! ```json
//! { "type": "GET", "payload": { "headers": { "authorization": "Bearer eyJ..." } } }
//! ```

use serde_json::Value;

use super::AuthOptions;
use crate::path::get_property;

/// Bearer scheme prefix (case-sensitive).
const BEARER_PREFIX: &str = "Bearer ";

/// Path to the header bag inside an inbound message.
const HEADERS_PATH: &str = "payload.headers";

/// Subject key for `message`: the string at the configured subject path.
///
/// Any non-string value (number, object, null) or a missing path yields `None`.
pub fn extract_auth_key(options: Option<&AuthOptions>, message: Option<&Value>) -> Option<String> {
    let path = options
        .map(|o| o.subject_path.as_str())
        .unwrap_or(super::options::DEFAULT_SUBJECT_PATH);

    match get_property(message?, path)? {
        Value::String(key) => Some(key.clone()),
        _ => None,
    }
}

/// Bearer token from the message's `authorization` header.
///
/// The header name is matched case-insensitively, the `Bearer ` prefix is not.
/// Returns `None` for a missing header, another scheme or an empty token.
pub fn bearer_token(message: &Value) -> Option<&str> {
    let headers = get_property(message, HEADERS_PATH)?.as_object()?;

    let value = headers.get("authorization").or_else(|| {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value)
    })?;

    value
        .as_str()?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}
