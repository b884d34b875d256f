// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Failures of the JWT primitive calls.
//!
//! These never cross the public operations: issuance turns them into a
//! refused [`AuthenticationRecord`](crate::models::AuthenticationRecord) and
//! validation into an `autherror` response. Only the `Display` text is
//! carried over.

use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

use crate::duration::DurationError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Algorithm name not recognized
    #[error("\"algorithm\" must be a valid algorithm name, got {0:?}")]
    UnsupportedAlgorithm(String),

    /// Key material cannot be used with the requested algorithm
    #[error("Invalid key for {algorithm}: {message}")]
    InvalidKey { algorithm: String, message: String },

    /// Token lifetime string could not be parsed
    #[error("\"expiresIn\" is invalid: {0}")]
    InvalidDuration(#[from] DurationError),

    /// A claim has a value the signer refuses
    #[error("{0}")]
    InvalidClaim(String),

    /// The signing primitive failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Token structure could not be decoded
    #[error("Token is malformed: {0}")]
    MalformedToken(String),

    /// Signature did not verify
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// `exp` is in the past
    #[error("Token has expired")]
    TokenExpired,

    /// `nbf` is in the future
    #[error("Token is not yet valid")]
    TokenNotYetValid,

    /// Token algorithm does not belong to the trusted key's family
    #[error("Token algorithm does not match the trusted key")]
    AlgorithmMismatch,
}

impl AuthError {
    /// Stable tag for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::InvalidKey { .. } => "invalid_key",
            AuthError::InvalidDuration(_) => "invalid_duration",
            AuthError::InvalidClaim(_) => "invalid_claim",
            AuthError::Signing(_) => "signing_failed",
            AuthError::MalformedToken(_) => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::AlgorithmMismatch => "algorithm_mismatch",
        }
    }

    /// Map a verification error from `jsonwebtoken`.
    pub fn from_verify(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => AuthError::AlgorithmMismatch,
            _ => AuthError::MalformedToken(err.to_string()),
        }
    }
}
