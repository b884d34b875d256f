// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance for outbound requests.
//!
//! ## Flow
//!
//! 1. Resolve the subject from the outbound message (`subject_path`)
//! 2. Merge it into the configured extra claims as `sub`
//! 3. Refuse on a falsy subject, then on a missing key or audience
//! 4. Sign with `iat`, `aud` and, when `expires_in` is set, `exp`
//! 5. Record the absolute expiry in milliseconds, one second early

use std::str::FromStr;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{Map, Value};

use super::error::AuthError;
use super::trusted_keys::{family_of, is_pem, KeyFamily};
use super::AuthOptions;
use crate::duration::parse_duration_ms;
use crate::models::AuthenticationRecord;
use crate::path::get_property;

const MISSING_ACTION: &str = "Auth refused due to missing action";
const MISSING_SUBJECT: &str = "Auth refused due to missing subject";
const MISSING_KEY_OR_AUDIENCE: &str = "Auth refused due to missing key or audience";

/// Margin subtracted from the recorded expiry so a follow-up liveness check
/// never sees a token that is about to be rejected downstream.
const EXPIRE_MARGIN_MS: i64 = 1_000;

/// Issue a signed token for the subject of `message`.
///
/// Never fails: every problem is reported as a refused record.
pub async fn authenticate(options: Option<&AuthOptions>, message: Option<&Value>) -> AuthenticationRecord {
    issue(options, message, Utc::now())
}

pub(crate) fn issue(
    options: Option<&AuthOptions>,
    message: Option<&Value>,
    now: DateTime<Utc>,
) -> AuthenticationRecord {
    let Some(message) = message else {
        tracing::debug!(reason = "missing_action", "Auth refused");
        return AuthenticationRecord::refused(MISSING_ACTION);
    };

    let defaults;
    let options = match options {
        Some(options) => options,
        None => {
            defaults = AuthOptions::default();
            &defaults
        }
    };

    let subject = get_property(message, &options.subject_path)
        .cloned()
        .unwrap_or(Value::Null);

    let mut claims = options.extra_claims.clone();
    claims.insert("sub".to_string(), subject.clone());

    if !is_truthy(&subject) {
        tracing::debug!(
            reason = "missing_subject",
            subject_path = %options.subject_path,
            "Auth refused"
        );
        return AuthenticationRecord::refused(MISSING_SUBJECT);
    }

    let key = options.signing_key.as_deref().filter(|k| !k.is_empty());
    let audience = options.audience.as_deref().filter(|a| !a.is_empty());
    let (Some(key), Some(audience)) = (key, audience) else {
        tracing::debug!(reason = "missing_key_or_audience", "Auth refused");
        return AuthenticationRecord::refused(MISSING_KEY_OR_AUDIENCE);
    };

    match sign(claims, key, audience, options, now) {
        Ok((token, expire)) => {
            let auth_key = subject.as_str().map(str::to_string);
            tracing::debug!(
                subject = auth_key.as_deref().unwrap_or_default(),
                audience,
                expire = ?expire,
                "Auth granted"
            );
            AuthenticationRecord::granted(token, expire, auth_key)
        }
        Err(e) => {
            tracing::warn!(error_code = e.error_code(), error = %e, "Auth refused, signing failed");
            AuthenticationRecord::refused(format!("Auth refused. {e}"))
        }
    }
}

/// Sign `claims` and return the token with its absolute expiry in milliseconds.
fn sign(
    mut claims: Map<String, Value>,
    key: &str,
    audience: &str,
    options: &AuthOptions,
    now: DateTime<Utc>,
) -> Result<(String, Option<i64>), AuthError> {
    let algorithm = Algorithm::from_str(&options.algorithm)
        .map_err(|_| AuthError::UnsupportedAlgorithm(options.algorithm.clone()))?;
    let encoding_key = encoding_key_for(algorithm, key)?;

    if !claims.get("sub").is_some_and(Value::is_string) {
        return Err(AuthError::InvalidClaim("\"sub\" must be a string".to_string()));
    }
    if claims.contains_key("aud") {
        return Err(AuthError::InvalidClaim(
            "Bad \"options.audience\" option. The payload already has an \"aud\" property.".to_string(),
        ));
    }

    let lifetime_ms = options.expires_in.as_deref().map(parse_duration_ms).transpose()?;

    let issued_at = claims
        .get("iat")
        .and_then(Value::as_i64)
        .unwrap_or_else(|| now.timestamp());
    claims.insert("iat".to_string(), Value::from(issued_at));

    if let Some(lifetime_ms) = lifetime_ms {
        if claims.contains_key("exp") {
            return Err(AuthError::InvalidClaim(
                "Bad \"options.expiresIn\" option the payload already has an \"exp\" property.".to_string(),
            ));
        }
        let exp = issued_at
            .checked_add(lifetime_ms / 1000)
            .ok_or_else(out_of_range)?;
        claims.insert("exp".to_string(), Value::from(exp));
    }
    claims.insert("aud".to_string(), Value::from(audience));

    let token = encode(&Header::new(algorithm), &claims, &encoding_key)
        .map_err(|e| AuthError::Signing(e.to_string()))?;

    let expire = lifetime_ms
        .map(|ms| {
            now.timestamp_millis()
                .checked_add(ms)
                .and_then(|at| at.checked_sub(EXPIRE_MARGIN_MS))
                .ok_or_else(out_of_range)
        })
        .transpose()?;
    Ok((token, expire))
}

fn out_of_range() -> AuthError {
    AuthError::InvalidClaim("\"expiresIn\" is out of range".to_string())
}

/// Signing key for `algorithm`. HMAC takes the raw secret, the others a PEM private key.
fn encoding_key_for(algorithm: Algorithm, key: &str) -> Result<EncodingKey, AuthError> {
    let invalid = |message: String| AuthError::InvalidKey {
        algorithm: format!("{algorithm:?}"),
        message,
    };

    match family_of(algorithm) {
        KeyFamily::Hmac if is_pem(key) => Err(invalid(format!(
            "secretOrPrivateKey must be a symmetric key when using {algorithm:?}"
        ))),
        KeyFamily::Hmac => Ok(EncodingKey::from_secret(key.as_bytes())),
        KeyFamily::Rsa => EncodingKey::from_rsa_pem(key.as_bytes()).map_err(|e| invalid(e.to_string())),
        KeyFamily::Ec => EncodingKey::from_ec_pem(key.as_bytes()).map_err(|e| invalid(e.to_string())),
        KeyFamily::Ed => EncodingKey::from_ed_pem(key.as_bytes()).map_err(|e| invalid(e.to_string())),
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0` and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{action, EC_PRIVATE_KEY, EC_PUBLIC_KEY};
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use serde_json::json;

    fn options() -> AuthOptions {
        AuthOptions::new().with_audience("waste-iq").with_signing_key("s3cr3t")
    }

    /// Decode without checking signature or expiry.
    fn claims_of(token: &str) -> Map<String, Value> {
        jsonwebtoken::dangerous::insecure_decode::<Map<String, Value>>(token)
            .unwrap()
            .claims
    }

    fn verify_hs256(token: &str, key: &str) -> Map<String, Value> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.set_audience(&["waste-iq"]);
        decode::<Map<String, Value>>(token, &DecodingKey::from_secret(key.as_bytes()), &validation)
            .unwrap()
            .claims
    }

    #[tokio::test]
    async fn generates_token_for_ident() {
        let now = Utc::now().timestamp();

        let record = authenticate(Some(&options()), Some(&action())).await;

        assert_eq!(record.status, crate::models::AuthStatus::Granted);
        assert_eq!(record.expire, None);
        assert_eq!(record.auth_key.as_deref(), Some("johnf"));
        let claims = verify_hs256(record.token.as_deref().unwrap(), "s3cr3t");
        assert_eq!(claims["sub"], json!("johnf"));
        assert_eq!(claims["aud"], json!("waste-iq"));
        let iat = claims["iat"].as_i64().unwrap();
        assert!(iat >= now - 1 && iat <= now + 1);
        assert!(!claims.contains_key("exp"));
    }

    #[tokio::test]
    async fn uses_subject_path() {
        let options = options().with_subject_path("payload.params.userid");
        let message = json!({
            "type": "GET",
            "payload": { "data": null, "params": { "userid": "bettyk" } },
            "meta": { "ident": { "id": "johnf" } }
        });

        let record = authenticate(Some(&options), Some(&message)).await;

        assert_eq!(claims_of(record.token.as_deref().unwrap())["sub"], json!("bettyk"));
        assert_eq!(record.auth_key.as_deref(), Some("bettyk"));
    }

    #[tokio::test]
    async fn merges_extra_claims_with_subject_winning() {
        let options = options()
            .with_extra_claim("permissions", json!(["editor"]))
            .with_extra_claim("sub", json!("impostor"));

        let record = authenticate(Some(&options), Some(&action())).await;

        let claims = claims_of(record.token.as_deref().unwrap());
        assert_eq!(claims["permissions"], json!(["editor"]));
        assert_eq!(claims["sub"], json!("johnf"));
    }

    #[test]
    fn records_expiry_in_milliseconds() {
        let now = Utc::now();
        let options = options().with_expires_in("5m");

        let record = issue(Some(&options), Some(&action()), now);

        let expected = now.timestamp_millis() + 300_000 - 1_000;
        assert_eq!(record.expire, Some(expected));
        let claims = verify_hs256(record.token.as_deref().unwrap(), "s3cr3t");
        assert_eq!(claims["exp"].as_i64(), Some(now.timestamp() + 300));
    }

    #[tokio::test]
    async fn expiry_is_close_to_now_plus_lifetime() {
        let before = Utc::now().timestamp_millis();
        let record = authenticate(Some(&options().with_expires_in("5m")), Some(&action())).await;

        let expire = record.expire.unwrap();
        assert!((expire - (before + 300_000 - 1_000)).abs() < 1_000);
        let exp = claims_of(record.token.as_deref().unwrap())["exp"].as_i64().unwrap();
        assert!((exp - (before / 1000 + 300)).abs() <= 1);
    }

    #[tokio::test]
    async fn refuses_missing_action() {
        let record = authenticate(Some(&options()), None).await;
        assert_eq!(record, AuthenticationRecord::refused("Auth refused due to missing action"));
    }

    #[tokio::test]
    async fn refuses_missing_subject_before_key_check() {
        let message = json!({ "type": "GET", "payload": {}, "meta": {} });

        let with_key = authenticate(Some(&options()), Some(&message)).await;
        let without_key = authenticate(Some(&AuthOptions::new()), Some(&message)).await;

        for record in [with_key, without_key] {
            assert_eq!(record.status, crate::models::AuthStatus::Refused);
            assert_eq!(record.token, None);
            assert_eq!(record.error.as_deref(), Some("Auth refused due to missing subject"));
        }
    }

    #[tokio::test]
    async fn empty_string_subject_is_missing() {
        let message = json!({ "meta": { "ident": { "id": "" } } });
        let record = authenticate(Some(&options()), Some(&message)).await;
        assert_eq!(record.error.as_deref(), Some("Auth refused due to missing subject"));
    }

    #[tokio::test]
    async fn refuses_missing_key_or_audience() {
        let no_key = AuthOptions::new().with_audience("waste-iq");
        let no_audience = AuthOptions::new().with_signing_key("s3cr3t");

        for options in [Some(&no_key), Some(&no_audience), None] {
            let record = authenticate(options, Some(&action())).await;
            assert_eq!(record.error.as_deref(), Some("Auth refused due to missing key or audience"));
            assert_eq!(record.token, None);
            assert_eq!(record.expire, None);
        }
    }

    #[tokio::test]
    async fn refuses_unknown_algorithm() {
        let record = authenticate(Some(&options().with_algorithm("XS256")), Some(&action())).await;

        assert_eq!(record.status, crate::models::AuthStatus::Refused);
        assert_eq!(record.token, None);
        let error = record.error.unwrap();
        assert!(error.starts_with("Auth refused. "));
        assert!(error.contains("XS256"));
    }

    #[tokio::test]
    async fn refuses_secret_for_asymmetric_algorithm() {
        let record = authenticate(Some(&options().with_algorithm("RS256")), Some(&action())).await;
        assert!(record.error.unwrap().starts_with("Auth refused. Invalid key for RS256"));
    }

    #[tokio::test]
    async fn refuses_non_string_subject() {
        let message = json!({ "meta": { "ident": { "id": 42 } } });
        let record = authenticate(Some(&options()), Some(&message)).await;
        assert_eq!(record.error.as_deref(), Some("Auth refused. \"sub\" must be a string"));
    }

    #[tokio::test]
    async fn refuses_colliding_audience_claim() {
        let options = options().with_extra_claim("aud", json!("other"));
        let record = authenticate(Some(&options), Some(&action())).await;
        assert!(record.error.unwrap().contains("already has an \"aud\" property"));
    }

    #[tokio::test]
    async fn refuses_unparseable_lifetime() {
        let record = authenticate(Some(&options().with_expires_in("soon")), Some(&action())).await;
        assert!(record.error.unwrap().starts_with("Auth refused. \"expiresIn\" is invalid"));
    }

    #[tokio::test]
    async fn refuses_lifetime_that_overflows() {
        let record = authenticate(Some(&options().with_expires_in("9223372036854775807")), Some(&action())).await;

        assert_eq!(record.status, crate::models::AuthStatus::Refused);
        assert_eq!(record.token, None);
        assert_eq!(record.error.as_deref(), Some("Auth refused. \"expiresIn\" is out of range"));
    }

    #[tokio::test]
    async fn refuses_issued_at_that_overflows_expiry() {
        let options = options()
            .with_extra_claim("iat", json!(i64::MAX))
            .with_expires_in("5m");

        let record = authenticate(Some(&options), Some(&action())).await;

        assert_eq!(record.status, crate::models::AuthStatus::Refused);
        assert_eq!(record.error.as_deref(), Some("Auth refused. \"expiresIn\" is out of range"));
    }

    #[tokio::test]
    async fn signs_with_ec_private_key() {
        let options = options().with_algorithm("ES256").with_signing_key(EC_PRIVATE_KEY);

        let record = authenticate(Some(&options), Some(&action())).await;

        let mut validation = Validation::new(Algorithm::ES256);
        validation.required_spec_claims.clear();
        validation.set_audience(&["waste-iq"]);
        let key = DecodingKey::from_ec_pem(EC_PUBLIC_KEY.as_bytes()).unwrap();
        let data = decode::<Map<String, Value>>(record.token.as_deref().unwrap(), &key, &validation).unwrap();
        assert_eq!(data.header.alg, Algorithm::ES256);
        assert_eq!(data.claims["sub"], json!("johnf"));
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(7)));
        assert!(is_truthy(&json!({})));
    }
}
