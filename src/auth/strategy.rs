// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pluggable authenticator interface and the JWT implementation of it.

use std::future::Future;

use serde_json::{Map, Value};

use super::AuthOptions;
use crate::models::{AccessResponse, AuthenticationRecord};

/// Operations a host calls on an authentication strategy.
///
/// `authenticate` and `validate` never fail; problems come back as refused
/// records or error responses.
pub trait Authenticator: Send + Sync {
    type Options;
    type Authentication;

    /// Key identifying which subject an authentication belongs to.
    fn extract_auth_key(&self, options: Option<&Self::Options>, message: Option<&Value>) -> Option<String>;

    /// Issue credentials for an outbound message.
    fn authenticate(
        &self,
        options: Option<&Self::Options>,
        message: Option<&Value>,
    ) -> impl Future<Output = Self::Authentication> + Send;

    /// Whether an earlier authentication can be reused for `message`.
    fn is_authenticated(
        &self,
        authentication: Option<&Self::Authentication>,
        options: Option<&Self::Options>,
        message: Option<&Value>,
    ) -> bool;

    /// Check the credentials of an inbound message.
    fn validate(
        &self,
        authentication: Option<&Self::Authentication>,
        options: Option<&Self::Options>,
        message: Option<&Value>,
    ) -> impl Future<Output = AccessResponse> + Send;

    /// Credentials as a plain object.
    fn as_object(&self, authentication: Option<&Self::Authentication>) -> Map<String, Value>;

    /// Credentials as HTTP request headers.
    fn as_http_headers(&self, authentication: Option<&Self::Authentication>) -> Map<String, Value>;
}

/// Bearer JWT strategy. Stateless; all state lives in the options and
/// records passed to each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtStrategy;

impl JwtStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Authenticator for JwtStrategy {
    type Options = AuthOptions;
    type Authentication = AuthenticationRecord;

    fn extract_auth_key(&self, options: Option<&AuthOptions>, message: Option<&Value>) -> Option<String> {
        super::extract_auth_key(options, message)
    }

    async fn authenticate(&self, options: Option<&AuthOptions>, message: Option<&Value>) -> AuthenticationRecord {
        super::authenticate(options, message).await
    }

    fn is_authenticated(
        &self,
        authentication: Option<&AuthenticationRecord>,
        options: Option<&AuthOptions>,
        message: Option<&Value>,
    ) -> bool {
        super::is_authenticated(authentication, options, message)
    }

    async fn validate(
        &self,
        authentication: Option<&AuthenticationRecord>,
        options: Option<&AuthOptions>,
        message: Option<&Value>,
    ) -> AccessResponse {
        super::validate(authentication, options, message).await
    }

    fn as_object(&self, authentication: Option<&AuthenticationRecord>) -> Map<String, Value> {
        let mut object = Map::new();
        if let Some(token) = authentication.and_then(AuthenticationRecord::usable_token) {
            object.insert("token".to_string(), Value::from(token));
        }
        object
    }

    fn as_http_headers(&self, authentication: Option<&AuthenticationRecord>) -> Map<String, Value> {
        let mut headers = Map::new();
        if let Some(token) = authentication.and_then(AuthenticationRecord::usable_token) {
            headers.insert("Authorization".to_string(), Value::from(format!("Bearer {token}")));
        }
        headers
    }
}
