// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Validation of inbound bearer tokens against trusted issuer keys.
//!
//! ## Flow
//!
//! 1. Take the bearer token from the message's `authorization` header
//! 2. Decode it WITHOUT verification to read `iss`, `aud` and `kid`
//! 3. Look up `"<iss>|<aud>|<kid>"` in the trusted key registry
//! 4. Verify the signature (and `exp` / `nbf` when present) with that key
//! 5. Derive identity tokens from the verified `sub` and `email` claims
//!
//! Steps 2 and 3 only pick a key. Trust comes from step 4.

use jsonwebtoken::dangerous::insecure_decode;
use jsonwebtoken::{decode, Algorithm, Validation};
use serde_json::Value;

use super::claims::IdentityClaims;
use super::error::AuthError;
use super::extractor::bearer_token;
use super::trusted_keys::decoding_key_for;
use super::AuthOptions;
use crate::error::{invalid_credentials, no_auth, untrusted};
use crate::models::{AccessResponse, AuthenticationRecord};

const AUTHENTICATION_REQUIRED: &str = "Authentication required";
const UNKNOWN_ISSUER: &str = "No access. Unknown issuer or audience";
const JWT_NOT_VALID: &str = "Unauthorized. JWT is not valid";
const CREDENTIALS_NOT_VALID: &str = "Unauthorized. Credentials are not valid";

/// Validate the bearer token of an inbound `message`.
///
/// The previous authentication is not consulted; every call verifies the
/// presented token from scratch. Never fails: every problem is reported as
/// a `noaccess` or `autherror` response.
pub async fn validate(
    _authentication: Option<&AuthenticationRecord>,
    options: Option<&AuthOptions>,
    message: Option<&Value>,
) -> AccessResponse {
    let Some(token) = message.and_then(bearer_token) else {
        tracing::debug!(reason = "noauth", "No bearer token on request");
        return no_auth(AUTHENTICATION_REQUIRED);
    };

    let Some((key_id, algorithm)) = issuer_key_id(token) else {
        tracing::debug!(reason = "invalidauth", "Token has no usable key id");
        return untrusted(UNKNOWN_ISSUER);
    };

    // Read the registry once, at call time.
    let Some(material) = options.and_then(|o| o.trusted_keys.get(&key_id)) else {
        tracing::debug!(reason = "invalidauth", key_id = %key_id, "Issuer is not trusted");
        return untrusted(UNKNOWN_ISSUER);
    };

    let claims = match verify(token, algorithm, &material) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(
                reason = "invalidauth",
                key_id = %key_id,
                error_code = e.error_code(),
                "Token verification failed"
            );
            return invalid_credentials(JWT_NOT_VALID);
        }
    };

    let require_email_verified = options.is_none_or(|o| o.require_email_verified);
    let tokens = claims.identity_tokens(require_email_verified);
    if tokens.is_empty() {
        tracing::debug!(reason = "invalidauth", key_id = %key_id, "Verified token has no identity claims");
        return invalid_credentials(CREDENTIALS_NOT_VALID);
    }

    tracing::debug!(key_id = %key_id, tokens = tokens.len(), "Token validated");
    AccessResponse::ok(tokens)
}

/// Registry key id and declared algorithm, from the unverified token.
fn issuer_key_id(token: &str) -> Option<(String, Algorithm)> {
    let unverified = insecure_decode::<IdentityClaims>(token).ok()?;
    let key_id = unverified.claims.issuer_key_id(unverified.header.kid.as_deref())?;
    Some((key_id, unverified.header.alg))
}

/// Verify `token` with trusted key `material`.
///
/// `exp` and `nbf` are enforced when present, with no leeway; `exp == now`
/// is already expired. No claim is required and the audience is not
/// re-checked; it is already part of the key id.
fn verify(token: &str, algorithm: Algorithm, material: &str) -> Result<IdentityClaims, AuthError> {
    let key = decoding_key_for(algorithm, material)?;

    let mut validation = Validation::new(algorithm);
    validation.required_spec_claims.clear();
    validation.leeway = 0;
    // A token is expired from the second `exp` names.
    validation.reject_tokens_expiring_in_less_than = 1;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.validate_aud = false;

    decode::<IdentityClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(AuthError::from_verify)
}
