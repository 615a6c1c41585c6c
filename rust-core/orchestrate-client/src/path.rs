// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Addressing for key/value items.
//!
//! A [`Path`] names one item by `(collection, key)` and optionally pins one
//! historical version of it by `ref`. Reads and writes derive different
//! trailing URIs from the same path:
//!
//! - reads put the ref in the URI (`{collection}/{key}/refs/{ref}`) so a
//!   historical version can be fetched directly;
//! - writes never do (`{collection}/{key}`); a ref on a write is a
//!   precondition on the current version and travels as a header.
//!
//! Identifiers are used exactly as given. Empty or unusual collection and key
//! names are the service's to reject.

use serde::{Deserialize, Deserializer, Serialize};

/// Location of a key/value item, optionally pinned to one version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    /// Collection name.
    pub collection: String,
    /// Key within the collection.
    pub key: String,
    /// Version token assigned by the service. `None` means the current
    /// version, whichever that is.
    #[serde(
        rename = "ref",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference: Option<String>,
}

impl Path {
    /// Path to the current version of `collection/key`.
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
            reference: None,
        }
    }

    /// Path to one specific version of `collection/key`.
    pub fn at_ref(
        collection: impl Into<String>,
        key: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self::new(collection, key).with_ref(reference)
    }

    /// Same item, pinned to `reference`. An empty string clears the ref.
    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        let reference = reference.into();
        self.reference = (!reference.is_empty()).then_some(reference);
        self
    }

    /// The version token, if any.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Whether this path pins a version.
    pub fn has_ref(&self) -> bool {
        self.reference.is_some()
    }

    /// Trailing URI for a GET.
    pub fn read_uri(&self) -> String {
        match &self.reference {
            Some(r) => format!("{}/{}/refs/{}", self.collection, self.key, r),
            None => self.write_uri(),
        }
    }

    /// Trailing URI for a PUT or DELETE. Never contains the ref.
    pub fn write_uri(&self) -> String {
        format!("{}/{}", self.collection, self.key)
    }
}

/// The service reports "no ref" as an empty string.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|r| !r.is_empty()))
}
