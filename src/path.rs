// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dotted-path reads on nested messages.
//!
//! Paths are `.`-separated segments (`meta.ident.id`). A literal dot inside a
//! segment is written `\.`. Numeric segments index into arrays
//! (`payload.items.0.id`).

use serde_json::Value;

/// Read the value at `path` inside `root`.
///
/// Returns `None` as soon as any segment is absent. An explicit JSON `null`
/// at the end of the path is returned as `Some(Value::Null)`.
pub fn get_property<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    split_path(path)
        .into_iter()
        .try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(&segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => current.push('\\'),
            },
            '.' => segments.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    segments.push(current);
    segments
}
