// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trusted issuer key registry.
//!
//! ## Ownership
//!
//! - The registry is owned by the caller and may be updated at any time,
//!   e.g. by a key refresh task
//! - Clones share the same map, so a handle stored in [`AuthOptions`] sees
//!   every update made through any other handle
//! - Validation reads the registry once per call and never caches a
//!   snapshot, so added and removed keys take effect on the next call
//!
//! ## Key Ids
//!
//! Entries are keyed by `"<issuer>|<audience>|<kid>"` with empty segments
//! omitted and any `https://` prefix removed from the issuer, e.g.
//! `accounts.google.com|my-app|58b429662db0` or just `integreat.io`.
//!
//! [`AuthOptions`]: super::AuthOptions

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Deserializer};

use super::error::AuthError;

/// Shared map from issuer key id to public key (PEM) or shared secret.
#[derive(Clone, Default)]
pub struct TrustedKeys {
    keys: Arc<RwLock<HashMap<String, String>>>,
}

impl TrustedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the key for an issuer key id.
    pub fn insert(&self, key_id: impl Into<String>, key: impl Into<String>) -> Option<String> {
        match self.keys.write() {
            Ok(mut keys) => keys.insert(key_id.into(), key.into()),
            Err(_) => {
                tracing::warn!("Trusted key registry lock poisoned, insert dropped");
                None
            }
        }
    }

    /// Remove the key for an issuer key id.
    pub fn remove(&self, key_id: &str) -> Option<String> {
        self.keys.write().ok()?.remove(key_id)
    }

    /// Current key for an issuer key id.
    ///
    /// A poisoned lock reads as "not trusted".
    pub fn get(&self, key_id: &str) -> Option<String> {
        match self.keys.read() {
            Ok(keys) => keys.get(key_id).cloned(),
            Err(_) => {
                tracing::warn!("Trusted key registry lock poisoned, treating key as unknown");
                None
            }
        }
    }

    pub fn contains(&self, key_id: &str) -> bool {
        self.keys.read().map(|k| k.contains_key(key_id)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.keys.read().map(|k| k.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> FromIterator<(K, V)> for TrustedKeys
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<HashMap<_, _>>();
        Self {
            keys: Arc::new(RwLock::new(map)),
        }
    }
}

impl<'de> Deserialize<'de> for TrustedKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = HashMap::<String, String>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

impl fmt::Debug for TrustedKeys {
    // Key ids only; key material stays out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self
            .keys
            .read()
            .map(|k| k.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("TrustedKeys").field("key_ids", &ids).finish()
    }
}

/// Kind of key material an algorithm signs and verifies with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

/// Key family an algorithm signs and verifies with.
pub(crate) fn family_of(algorithm: Algorithm) -> KeyFamily {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => KeyFamily::Hmac,
        Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
        Algorithm::EdDSA => KeyFamily::Ed,
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => KeyFamily::Rsa,
    }
}

/// Whether key material is a PEM-encoded public key rather than a shared secret.
pub(crate) fn is_pem(material: &str) -> bool {
    material.trim_start().starts_with("-----BEGIN")
}

/// Convert trusted key material into a decoding key for `algorithm`.
///
/// PEM material only verifies asymmetric algorithms of its own family and
/// shared secrets only verify HMAC, so a public key can never be used as an
/// HMAC secret.
pub(crate) fn decoding_key_for(algorithm: Algorithm, material: &str) -> Result<DecodingKey, AuthError> {
    let invalid = |e: jsonwebtoken::errors::Error| AuthError::InvalidKey {
        algorithm: format!("{algorithm:?}"),
        message: e.to_string(),
    };

    match (family_of(algorithm), is_pem(material)) {
        (KeyFamily::Hmac, false) => Ok(DecodingKey::from_secret(material.as_bytes())),
        (KeyFamily::Rsa, true) => DecodingKey::from_rsa_pem(material.as_bytes()).map_err(invalid),
        (KeyFamily::Ec, true) => DecodingKey::from_ec_pem(material.as_bytes()).map_err(invalid),
        (KeyFamily::Ed, true) => DecodingKey::from_ed_pem(material.as_bytes()).map_err(invalid),
        _ => Err(AuthError::AlgorithmMismatch),
    }
}
