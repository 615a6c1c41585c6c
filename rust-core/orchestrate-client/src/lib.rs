// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # Orchestrate Client
//!
//! A Rust client for the Orchestrate REST API: key/value storage, event logs,
//! graph relations and full-text search, each addressed by a
//! `collection/key[/ref]` path.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orchestrate_client::{OrchestrateClient, Paged};
//!
//! #[tokio::main]
//! async fn main() -> orchestrate_client::Result<()> {
//!     let client = OrchestrateClient::new("my-api-key")?;
//!
//!     let path = client.put_if_absent("emails", "k1", &serde_json::json!({"subject": "hi"})).await?;
//!     println!("stored at ref {:?}", path.reference());
//!
//!     let mut page = client.list("emails", 10).await?;
//!     while page.has_next() {
//!         page = client.fetch_next(&page).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`path`]: item addressing and read/write URIs.
//! - [`client`]: authentication and the request executor.
//! - [`config`]: timeouts, API root and environment overrides.
//! - [`precondition`]: conditional headers and ref extraction.
//! - [`cursor`]: cursor paging and page walks.
//! - [`kv`], [`events`], [`graph`], [`search`]: resource operations.
//! - [`types`], [`value`]: result envelopes, pages and undecoded payloads.
//! - [`error`]: error types and the crate-level `Result` alias.

pub mod client;
pub mod config;
pub mod cursor;
pub mod error;
pub mod events;
pub mod graph;
pub mod kv;
pub mod path;
pub mod precondition;
pub mod search;
pub mod types;
pub mod value;

pub use client::OrchestrateClient;
pub use config::{ClientConfig, DEFAULT_API_ROOT};
pub use cursor::{PageWalker, Paged};
pub use error::{Error, Result, ServiceError};
pub use path::Path;
pub use precondition::{Precondition, RefRule, RequestHeaders};
pub use types::{
    Event, EventResults, GraphResult, GraphResults, KvResult, KvResults, SearchResult,
    SearchResults,
};
pub use value::RawValue;
