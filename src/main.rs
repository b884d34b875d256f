// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operator binary: run the JWT strategy on one message read from stdin.
//!
//! ```text
//! relational-jwt-strategy authenticate < outbound.json
//! relational-jwt-strategy validate < inbound.json
//! ```
//!
//! Options come from the environment (see [`relational_jwt_strategy::config`]).
//! Exit code 0 when granted or ok, 1 otherwise, 2 on usage or config errors.

use std::process::ExitCode;

use relational_jwt_strategy::auth::{AuthOptions, Authenticator, JwtStrategy};
use relational_jwt_strategy::config::{LogFormat, DEFAULT_LOG_FILTER};
use relational_jwt_strategy::models::AuthStatus;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const USAGE: &str = "usage: relational-jwt-strategy <authenticate|validate> < message.json";

enum Command {
    Authenticate,
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let log_format = match LogFormat::from_env() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    init_tracing(log_format);

    let command = match std::env::args().nth(1).as_deref() {
        Some("authenticate") => Command::Authenticate,
        Some("validate") => Command::Validate,
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let options = match AuthOptions::from_env() {
        Ok(options) => options,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    let mut input = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut input).await {
        tracing::error!(error = %e, "Failed to read message from stdin");
        return ExitCode::from(2);
    }
    let message: Value = match serde_json::from_str(&input) {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(error = %e, "Message is not valid JSON");
            return ExitCode::from(2);
        }
    };

    let strategy = JwtStrategy::new();
    match command {
        Command::Authenticate => {
            let record = strategy.authenticate(Some(&options), Some(&message)).await;
            let granted = record.status == AuthStatus::Granted;
            print_json(&record, granted)
        }
        Command::Validate => {
            let response = strategy.validate(None, Some(&options), Some(&message)).await;
            let ok = response.is_ok();
            print_json(&response, ok)
        }
    }
}

/// Logs go to stderr; stdout carries the result.
fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let result = match format {
        LogFormat::Json => Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).json())
            .try_init(),
        LogFormat::Pretty => Registry::default()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).pretty())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn print_json<T: Serialize>(value: &T, success: bool) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize result");
            ExitCode::from(2)
        }
    }
}
