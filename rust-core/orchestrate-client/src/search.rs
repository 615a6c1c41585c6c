// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Full-text search within a collection.
//!
//! The query string goes to the service's Lucene-style query parser
//! untouched. Search pages are the only ones with a `prev` cursor.

use url::form_urlencoded;

use crate::client::OrchestrateClient;
use crate::error::Result;
use crate::types::SearchResults;

impl OrchestrateClient {
    /// Search `collection` for `query`, returning `limit` hits starting at
    /// `offset`.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchResults> {
        let params = form_urlencoded::Serializer::new(String::new())
            .append_pair("query", query)
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .finish();

        self.get_json(&format!("{collection}?{params}")).await
    }

    /// Page of hits after `results`.
    pub async fn search_get_next(&self, results: &SearchResults) -> Result<SearchResults> {
        self.fetch_next(results).await
    }

    /// Page of hits before `results`.
    pub async fn search_get_prev(&self, results: &SearchResults) -> Result<SearchResults> {
        self.fetch_prev(results).await
    }
}
