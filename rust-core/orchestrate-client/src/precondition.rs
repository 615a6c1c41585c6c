// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Optimistic concurrency.
//!
//! Writes can be made conditional on the item's current version using the
//! version tokens ("refs") the service hands out:
//!
//! | precondition | header | write succeeds when |
//! |--------------|--------|---------------------|
//! | [`Precondition::None`] | – | always (last writer wins) |
//! | [`Precondition::IfMatch`] | `If-Match: "<ref>"` | current ref equals `<ref>` |
//! | [`Precondition::IfNoneMatch`] | `If-None-Match: "*"` | no value exists yet |
//!
//! A failed precondition comes back as an ordinary service error (409/412).
//!
//! The service reports the ref of a written or read item in a `Location` /
//! `Content-Location` header. [`RefRule`] is the explicit, versioned rule for
//! pulling the ref out of those headers.

use reqwest::header::{HeaderName, HeaderValue, IF_MATCH, IF_NONE_MATCH};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Condition attached to a single write or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Precondition {
    /// Unconditional.
    #[default]
    None,
    /// Only if the current ref equals this one.
    IfMatch(String),
    /// Only if nothing is stored at the key.
    IfNoneMatch,
}

impl Precondition {
    /// The conditional header this precondition produces, if any.
    pub fn header(&self) -> Result<Option<(HeaderName, HeaderValue)>> {
        match self {
            Precondition::None => Ok(None),
            Precondition::IfMatch(reference) => {
                let value = HeaderValue::from_str(&format!("\"{reference}\""))
                    .map_err(|e| Error::InvalidHeader(format!("If-Match {reference:?}: {e}")))?;
                Ok(Some((IF_MATCH, value)))
            }
            Precondition::IfNoneMatch => {
                Ok(Some((IF_NONE_MATCH, HeaderValue::from_static("\"*\""))))
            }
        }
    }
}

/// Headers for one request, assembled once and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders(Vec<(HeaderName, HeaderValue)>);

impl RequestHeaders {
    pub fn none() -> Self {
        Self::default()
    }

    /// Headers carrying `precondition`.
    pub fn conditional(precondition: &Precondition) -> Result<Self> {
        Ok(Self(precondition.header()?.into_iter().collect()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(HeaderName, HeaderValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a ref is located inside a `Location`-style header.
///
/// Every variant is tied to one API version's path layout so a change in
/// the service's URL scheme shows up as [`Error::MissingRef`] rather than as
/// a wrong ref.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefRule {
    /// `/v0/{collection}/{key}/refs/{ref}`: the ref is the segment after the
    /// `refs` marker, which is the fourth segment below the API root.
    #[default]
    V0,
}

impl RefRule {
    /// Extract the ref from a header value. `header` names the header for
    /// error reporting.
    pub fn extract(&self, header: &'static str, value: &str) -> Result<String> {
        let missing = || Error::MissingRef {
            header,
            value: value.to_string(),
        };

        let path = strip_origin(value);
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match self {
            RefRule::V0 => match segments.as_slice() {
                [_root, _collection, _key, "refs", reference, ..] if !reference.is_empty() => {
                    Ok((*reference).to_string())
                }
                _ => Err(missing()),
            },
        }
    }
}

/// Drop `scheme://authority` from an absolute URL, leaving the path.
fn strip_origin(value: &str) -> &str {
    match value.find("://") {
        Some(i) => {
            let rest = &value[i + 3..];
            rest.find('/').map_or("", |p| &rest[p..])
        }
        None => value,
    }
}
