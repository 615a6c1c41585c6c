// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Key/value operations.
//!
//! Items are addressed by [`Path`]. Writes return the new item's path with
//! the ref the service assigned, ready for a follow-up conditional write:
//!
//! ```rust,no_run
//! # use orchestrate_client::OrchestrateClient;
//! # async fn demo(client: OrchestrateClient) -> orchestrate_client::Result<()> {
//! let path = client.put("emails", "k1", &serde_json::json!({"subject": "hi"})).await?;
//! client
//!     .put_if_unmodified(&path, &serde_json::json!({"subject": "re: hi"}))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use reqwest::{Body, Method, StatusCode};
use serde::Serialize;
use tracing::warn;
use url::form_urlencoded;

use crate::client::{drain, json_body, OrchestrateClient};
use crate::error::{Error, Result};
use crate::path::Path;
use crate::precondition::{Precondition, RequestHeaders};
use crate::types::{KvResult, KvResults};
use crate::value::RawValue;

impl OrchestrateClient {
    // -- Reads --------------------------------------------------------------

    /// Current value of `collection/key`.
    pub async fn get(&self, collection: &str, key: &str) -> Result<KvResult> {
        self.get_path(&Path::new(collection, key)).await
    }

    /// Value at `path`. With a ref, that historical version is returned;
    /// without one, the current version is returned and its ref (from
    /// `Content-Location`) is filled into the result's path.
    ///
    /// # Errors
    ///
    /// A service error (404 when absent). [`Error::MissingRef`] if the
    /// service sent a `Content-Location` without a ref.
    pub async fn get_path(&self, path: &Path) -> Result<KvResult> {
        let response = self
            .execute(Method::GET, &path.read_uri(), &RequestHeaders::none(), None)
            .await?;
        let response = self.expect(response, &[StatusCode::OK]).await?;

        let mut path = path.clone();
        if !path.has_ref() {
            match self.ref_from(response.headers(), "Content-Location") {
                Ok(Some(reference)) => path.reference = Some(reference),
                Ok(None) => {}
                Err(e) => {
                    drain(response).await?;
                    return Err(e);
                }
            }
        }

        let body = response.bytes().await?;
        Ok(KvResult {
            path,
            raw_value: RawValue::from_bytes(body),
        })
    }

    // -- Writes -------------------------------------------------------------

    /// Store `value` at `collection/key` unconditionally.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        key: &str,
        value: &T,
    ) -> Result<Path> {
        self.put_raw(collection, key, json_body(value)?).await
    }

    /// Store pre-encoded JSON at `collection/key` unconditionally.
    pub async fn put_raw(
        &self,
        collection: &str,
        key: &str,
        body: impl Into<Body>,
    ) -> Result<Path> {
        self.put_with(&Path::new(collection, key), Precondition::None, body.into())
            .await
    }

    /// Store `value` only if `path`'s ref is still the current version.
    ///
    /// # Errors
    ///
    /// A conflict-classified service error if the item changed since `path`
    /// was obtained.
    pub async fn put_if_unmodified<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<Path> {
        self.put_if_unmodified_raw(path, json_body(value)?).await
    }

    /// Raw-body form of [`put_if_unmodified`](Self::put_if_unmodified).
    pub async fn put_if_unmodified_raw(&self, path: &Path, body: impl Into<Body>) -> Result<Path> {
        self.put_with(path, if_match(path), body.into()).await
    }

    /// Store `value` only if nothing is stored at `collection/key` yet.
    ///
    /// # Errors
    ///
    /// A conflict-classified service error if the key already holds a value.
    pub async fn put_if_absent<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        key: &str,
        value: &T,
    ) -> Result<Path> {
        self.put_if_absent_raw(collection, key, json_body(value)?).await
    }

    /// Raw-body form of [`put_if_absent`](Self::put_if_absent).
    pub async fn put_if_absent_raw(
        &self,
        collection: &str,
        key: &str,
        body: impl Into<Body>,
    ) -> Result<Path> {
        self.put_with(&Path::new(collection, key), Precondition::IfNoneMatch, body.into())
            .await
    }

    /// PUT to `path`'s write URI, expecting 201 and a ref in `Location`.
    async fn put_with(&self, path: &Path, precondition: Precondition, body: Body) -> Result<Path> {
        let headers = RequestHeaders::conditional(&precondition)?;
        let response = self
            .put_expecting(&path.write_uri(), &headers, Some(body), &[StatusCode::CREATED])
            .await?;

        let reference = self.ref_from(response.headers(), "Location");
        drain(response).await?;

        match reference? {
            Some(reference) => Ok(Path::at_ref(&path.collection, &path.key, reference)),
            None => {
                warn!(collection = %path.collection, key = %path.key, "Write response without Location");
                Err(Error::MissingRef {
                    header: "Location",
                    value: String::new(),
                })
            }
        }
    }

    // -- Deletes ------------------------------------------------------------

    /// Delete the current value of `collection/key`. History is kept.
    pub async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        self.delete_at(&Path::new(collection, key).write_uri(), &RequestHeaders::none())
            .await
    }

    /// Delete only if `path`'s ref is still the current version.
    pub async fn delete_if_unmodified(&self, path: &Path) -> Result<()> {
        let headers = RequestHeaders::conditional(&if_match(path))?;
        self.delete_at(&path.write_uri(), &headers).await
    }

    /// Delete the current value and every previous version.
    pub async fn purge(&self, collection: &str, key: &str) -> Result<()> {
        let trailing = format!("{}?purge=true", Path::new(collection, key).write_uri());
        self.delete_at(&trailing, &RequestHeaders::none()).await
    }

    /// Delete a whole collection.
    pub async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.delete_at(&format!("{collection}?force=true"), &RequestHeaders::none())
            .await
    }

    // -- Listing ------------------------------------------------------------

    /// First page of `collection` in key order.
    pub async fn list(&self, collection: &str, limit: usize) -> Result<KvResults> {
        self.list_query(collection, limit, &[]).await
    }

    /// First page of keys strictly after `after`.
    pub async fn list_after(&self, collection: &str, after: &str, limit: usize) -> Result<KvResults> {
        self.list_query(collection, limit, &[("afterKey", after)]).await
    }

    /// First page of keys starting at `start`, inclusive.
    pub async fn list_start(&self, collection: &str, start: &str, limit: usize) -> Result<KvResults> {
        self.list_query(collection, limit, &[("startKey", start)]).await
    }

    /// First page of keys from `start` to `end`.
    pub async fn list_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
        limit: usize,
    ) -> Result<KvResults> {
        self.list_query(collection, limit, &[("startKey", start), ("endKey", end)])
            .await
    }

    /// Page following `results`. Shorthand for
    /// [`fetch_next`](Self::fetch_next).
    pub async fn list_get_next(&self, results: &KvResults) -> Result<KvResults> {
        self.fetch_next(results).await
    }

    async fn list_query(
        &self,
        collection: &str,
        limit: usize,
        params: &[(&str, &str)],
    ) -> Result<KvResults> {
        let limit = limit.to_string();
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("limit", &limit);
        query.extend_pairs(params);

        self.get_json(&format!("{collection}?{}", query.finish())).await
    }
}

fn if_match(path: &Path) -> Precondition {
    Precondition::IfMatch(path.reference().unwrap_or_default().to_owned())
}
