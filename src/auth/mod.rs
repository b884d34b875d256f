// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer JWT issuance for outbound requests and verification of inbound
//! ones against a caller-owned registry of trusted issuer keys.
//!
//! ## Auth Flow
//!
//! 1. Outbound: [`authenticate`] signs a token for the message subject
//! 2. The host keeps the [`AuthenticationRecord`] and reuses it while
//!    [`is_authenticated`] holds
//! 3. The token travels as `Authorization: Bearer <JWT>`
//! 4. Inbound: [`validate`]
//!    - Picks the issuer key by `"<iss>|<aud>|<kid>"`
//!    - Verifies signature, `exp` and `nbf`
//!    - Extracts identity tokens:
//!      - `<issuer>|<sub>`
//!      - `<issuer>|<email>` when the email is verified
//!
//! ## Security
//!
//! - Unknown issuers are refused before any signature check
//! - PEM keys never act as HMAC secrets (no algorithm confusion)
//! - No clock skew tolerance on `exp` / `nbf`
//! - Key material and tokens are never logged
//!
//! [`AuthenticationRecord`]: crate::models::AuthenticationRecord

pub mod authenticate;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod liveness;
pub mod options;
pub mod strategy;
pub mod trusted_keys;
pub mod validate;

pub use authenticate::authenticate;
pub use claims::IdentityClaims;
pub use error::AuthError;
pub use extractor::{bearer_token, extract_auth_key};
pub use liveness::is_authenticated;
pub use options::AuthOptions;
pub use strategy::{Authenticator, JwtStrategy};
pub use trusted_keys::TrustedKeys;
pub use validate::validate;
