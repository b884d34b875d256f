// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Uniform error responses returned to the host.

use crate::models::{AccessResponse, AccessStatus, ErrorReason};

/// Build an error response with a status, message and optional reason tag.
pub fn create_error(
    message: impl Into<String>,
    status: AccessStatus,
    reason: Option<ErrorReason>,
) -> AccessResponse {
    AccessResponse {
        status,
        error: Some(message.into()),
        reason,
        access: None,
    }
}

/// No credentials were presented.
pub fn no_auth(message: impl Into<String>) -> AccessResponse {
    create_error(message, AccessStatus::NoAccess, Some(ErrorReason::NoAuth))
}

/// Credentials were presented but cannot be matched to a trusted issuer.
pub fn untrusted(message: impl Into<String>) -> AccessResponse {
    create_error(message, AccessStatus::NoAccess, Some(ErrorReason::InvalidAuth))
}

/// Credentials were matched to an issuer but did not hold up.
pub fn invalid_credentials(message: impl Into<String>) -> AccessResponse {
    create_error(message, AccessStatus::AuthError, Some(ErrorReason::InvalidAuth))
}
