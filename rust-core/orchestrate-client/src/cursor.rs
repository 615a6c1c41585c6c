// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Cursor paging.
//!
//! List and search pages carry `next` (and for search, `prev`) cursors: opaque
//! strings holding the full trailing path and query of the neighbouring page,
//! prefixed with the API root path (`/v0/`). A non-empty cursor is the only
//! signal that a neighbouring page exists.
//!
//! Following a cursor strips the prefix and requests the remainder verbatim.
//! The query it carries is never parsed or re-encoded. A walk that starts with
//! an explicit range (`list_range`, `list_after`, ...) continues through
//! cursors only, and a page with no results but a `next` cursor does not end
//! the walk.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::OrchestrateClient;
use crate::error::{Error, Result};

/// A page of results that may link to its neighbours.
pub trait Paged: DeserializeOwned {
    /// Result envelope type.
    type Item;

    /// Cursor to the following page, empty when this is the last one.
    fn next_cursor(&self) -> &str;

    /// Cursor to the preceding page, empty when this is the first one or the
    /// resource does not page backwards.
    fn prev_cursor(&self) -> &str {
        ""
    }

    /// Consume the page into its results, in service order.
    fn into_results(self) -> Vec<Self::Item>;

    fn has_next(&self) -> bool {
        !self.next_cursor().is_empty()
    }

    fn has_prev(&self) -> bool {
        !self.prev_cursor().is_empty()
    }
}

impl OrchestrateClient {
    /// Page following `page`.
    ///
    /// # Errors
    ///
    /// [`Error::NoMorePages`] without any request when `page` has no `next`
    /// cursor; [`Error::MalformedCursor`] when the cursor does not start with
    /// the API root path.
    pub async fn fetch_next<P: Paged>(&self, page: &P) -> Result<P> {
        self.follow(page.next_cursor()).await
    }

    /// Page preceding `page`. Same contract as [`fetch_next`](Self::fetch_next).
    pub async fn fetch_prev<P: Paged>(&self, page: &P) -> Result<P> {
        self.follow(page.prev_cursor()).await
    }

    async fn follow<P: Paged>(&self, cursor: &str) -> Result<P> {
        if cursor.is_empty() {
            return Err(Error::NoMorePages);
        }
        let trailing = self.cursor_trailing(cursor)?;
        debug!(cursor, "Following page cursor");
        self.get_json(trailing).await
    }
}

/// Walks forward from a first page until the `next` cursors run out.
pub struct PageWalker<'c, P> {
    client: &'c OrchestrateClient,
    pending: Option<P>,
    cursor: Option<String>,
}

impl<'c, P: Paged> PageWalker<'c, P> {
    /// Start at `first`, which is yielded before any request is made.
    pub fn new(client: &'c OrchestrateClient, first: P) -> Self {
        Self {
            client,
            pending: Some(first),
            cursor: None,
        }
    }

    /// The next page, or `None` once a page without a `next` cursor has been
    /// yielded.
    pub async fn next_page(&mut self) -> Result<Option<P>> {
        let page = match self.pending.take() {
            Some(page) => page,
            None => match self.cursor.take() {
                Some(cursor) => self.client.follow(&cursor).await?,
                None => return Ok(None),
            },
        };
        self.cursor = page.has_next().then(|| page.next_cursor().to_owned());
        Ok(Some(page))
    }

    /// Drain the walk into one vector of results.
    pub async fn collect_all(mut self) -> Result<Vec<P::Item>> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page.into_results());
        }
        Ok(all)
    }
}
