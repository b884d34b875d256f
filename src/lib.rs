// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational JWT Strategy - Bearer Token Authentication
//!
//! This crate provides a pluggable authentication strategy that signs
//! bearer JWTs for outbound requests and validates inbound ones against a
//! caller-owned registry of trusted issuer keys.
//!
//! ## Modules
//!
//! - `auth` - Issuance, liveness, validation and the strategy facade
//! - `config` - Environment configuration
//! - `duration` - Lifetime strings such as `"5m"`
//! - `error` - Access response builders
//! - `models` - Authentication records and access responses
//! - `path` - Dotted-path lookup in JSON messages

pub mod auth;
pub mod config;
pub mod duration;
pub mod error;
pub mod models;
pub mod path;

#[cfg(test)]
mod testutil;

pub use auth::{AuthOptions, Authenticator, JwtStrategy, TrustedKeys};
pub use models::{AccessResponse, AuthenticationRecord};
