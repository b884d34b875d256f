// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Duration strings for token lifetimes (`"5m"`, `"1h 30m"`, `"2 days"`).
//!
//! A bare integer is a number of milliseconds.

use thiserror::Error;

/// Error returned for duration strings that cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct DurationError {
    input: String,
    reason: String,
}

/// Parse a duration string into milliseconds.
pub fn parse_duration_ms(input: &str) -> Result<i64, DurationError> {
    let trimmed = input.trim();
    let invalid = |reason: String| DurationError {
        input: input.to_string(),
        reason,
    };

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed
            .parse::<i64>()
            .map_err(|e| invalid(e.to_string()));
    }

    let duration = humantime::parse_duration(trimmed).map_err(|e| invalid(e.to_string()))?;
    i64::try_from(duration.as_millis()).map_err(|e| invalid(e.to_string()))
}
