// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Result envelopes and pages returned by the resource operations.
//!
//! Every envelope keeps its item payload undecoded as a [`RawValue`]; call
//! `value::<T>()` on the items you actually want.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cursor::Paged;
use crate::error::Result;
use crate::path::Path;
use crate::value::RawValue;

// ---------------------------------------------------------------------------
// Key/value
// ---------------------------------------------------------------------------

/// One key/value item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KvResult {
    /// Where the item lives, including the ref of the version returned.
    pub path: Path,
    /// Stored payload.
    #[serde(rename = "value")]
    pub raw_value: RawValue,
}

impl KvResult {
    /// Decode the payload.
    pub fn value<T: DeserializeOwned>(&self) -> Result<T> {
        self.raw_value.decode()
    }
}

/// A page of a key/value listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KvResults {
    pub count: u64,
    pub results: Vec<KvResult>,
    /// Cursor to the next page; empty on the last page.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next: String,
}

impl Paged for KvResults {
    type Item = KvResult;

    fn next_cursor(&self) -> &str {
        &self.next
    }

    fn into_results(self) -> Vec<KvResult> {
        self.results
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One event in a `(collection, key, kind)` log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Disambiguates events sharing a timestamp.
    #[serde(default)]
    pub ordinal: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "value")]
    pub raw_value: RawValue,
}

impl Event {
    /// Decode the payload.
    pub fn value<T: DeserializeOwned>(&self) -> Result<T> {
        self.raw_value.decode()
    }

    /// The event time, if the timestamp is in chrono's range.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Events read from one log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventResults {
    pub count: u64,
    pub results: Vec<Event>,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// An item reached by a relation traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResult {
    pub path: Path,
    #[serde(rename = "value")]
    pub raw_value: RawValue,
}

impl GraphResult {
    /// Decode the payload.
    pub fn value<T: DeserializeOwned>(&self) -> Result<T> {
        self.raw_value.decode()
    }
}

/// Items at the end of a relation traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResults {
    pub count: u64,
    pub results: Vec<GraphResult>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// One search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub path: Path,
    /// Relevance score assigned by the service.
    pub score: f64,
    #[serde(rename = "value")]
    pub raw_value: RawValue,
}

impl SearchResult {
    /// Decode the payload.
    pub fn value<T: DeserializeOwned>(&self) -> Result<T> {
        self.raw_value.decode()
    }
}

/// A page of search hits. The only page type that links backwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Hits on this page.
    pub count: u64,
    /// Hits across all pages.
    pub total_count: u64,
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prev: String,
}

impl Paged for SearchResults {
    type Item = SearchResult;

    fn next_cursor(&self) -> &str {
        &self.next
    }

    fn prev_cursor(&self) -> &str {
        &self.prev
    }

    fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}
