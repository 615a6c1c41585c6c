// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Graph relations.
//!
//! A relation is a directed, typed edge from one `collection/key` item to
//! another. Traversals name a sequence of relation kinds ("hops") that are
//! followed in order from the start item.

use reqwest::StatusCode;

use crate::client::{drain, OrchestrateClient};
use crate::error::Result;
use crate::precondition::RequestHeaders;
use crate::types::GraphResults;

fn relation_uri(
    source_collection: &str,
    source_key: &str,
    kind: &str,
    sink_collection: &str,
    sink_key: &str,
) -> String {
    format!("{source_collection}/{source_key}/relation/{kind}/{sink_collection}/{sink_key}")
}

impl OrchestrateClient {
    /// Items reached from `collection/key` by following `hops` in order.
    ///
    /// ```rust,no_run
    /// # use orchestrate_client::OrchestrateClient;
    /// # async fn demo(client: OrchestrateClient) -> orchestrate_client::Result<()> {
    /// // Friends of friends.
    /// let fof = client.get_relations("users", "u1", &["friend", "friend"]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_relations<S: AsRef<str>>(
        &self,
        collection: &str,
        key: &str,
        hops: &[S],
    ) -> Result<GraphResults> {
        let hops: Vec<&str> = hops.iter().map(|h| h.as_ref()).collect();
        self.get_json(&format!("{collection}/{key}/relations/{}", hops.join("/")))
            .await
    }

    /// Create a `kind` edge from the source item to the sink item.
    pub async fn put_relation(
        &self,
        source_collection: &str,
        source_key: &str,
        kind: &str,
        sink_collection: &str,
        sink_key: &str,
    ) -> Result<()> {
        let trailing = relation_uri(source_collection, source_key, kind, sink_collection, sink_key);
        let response = self
            .put_expecting(&trailing, &RequestHeaders::none(), None, &[StatusCode::NO_CONTENT])
            .await?;
        drain(response).await
    }

    /// Remove a `kind` edge. Relations keep no history, so this always purges.
    pub async fn delete_relation(
        &self,
        source_collection: &str,
        source_key: &str,
        kind: &str,
        sink_collection: &str,
        sink_key: &str,
    ) -> Result<()> {
        let trailing = format!(
            "{}?purge=true",
            relation_uri(source_collection, source_key, kind, sink_collection, sink_key)
        );
        self.delete_at(&trailing, &RequestHeaders::none()).await
    }
}
