// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Event log operations.
//!
//! Each `(collection, key, kind)` triple owns an append-only, time-ordered log.
//! Events are stamped by the service at "now" unless the caller supplies a
//! timestamp (milliseconds since the Unix epoch).

use chrono::{DateTime, Utc};
use reqwest::{Body, StatusCode};
use serde::Serialize;
use url::form_urlencoded;

use crate::client::{drain, json_body, OrchestrateClient};
use crate::error::Result;
use crate::precondition::RequestHeaders;
use crate::types::EventResults;

/// Page size used by [`OrchestrateClient::get_events_in_range`].
pub const DEFAULT_EVENT_LIMIT: i64 = 10;

fn events_uri(collection: &str, key: &str, kind: &str) -> String {
    format!("{collection}/{key}/events/{kind}")
}

impl OrchestrateClient {
    /// Latest events of `kind` for `collection/key`.
    pub async fn get_events(&self, collection: &str, key: &str, kind: &str) -> Result<EventResults> {
        self.get_json(&events_uri(collection, key, kind)).await
    }

    /// Events in `[start, end)` (epoch milliseconds), at most
    /// [`DEFAULT_EVENT_LIMIT`].
    pub async fn get_events_in_range(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        start: i64,
        end: i64,
    ) -> Result<EventResults> {
        self.get_events_in_range_with_limit(collection, key, kind, start, end, DEFAULT_EVENT_LIMIT)
            .await
    }

    /// Events in `[start, end)` (epoch milliseconds), at most `limit`.
    pub async fn get_events_in_range_with_limit(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        start: i64,
        end: i64,
        limit: i64,
    ) -> Result<EventResults> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("start", &start.to_string())
            .append_pair("end", &end.to_string())
            .append_pair("limit", &limit.to_string())
            .finish();

        self.get_json(&format!("{}?{query}", events_uri(collection, key, kind)))
            .await
    }

    /// Append `value` to the log, stamped by the service.
    pub async fn put_event<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        value: &T,
    ) -> Result<()> {
        self.put_event_raw(collection, key, kind, json_body(value)?).await
    }

    /// Append pre-encoded JSON to the log, stamped by the service.
    pub async fn put_event_raw(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        body: impl Into<Body>,
    ) -> Result<()> {
        self.append_event(events_uri(collection, key, kind), body.into())
            .await
    }

    /// Append `value` at an explicit time (epoch milliseconds).
    pub async fn put_event_with_time<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        timestamp: i64,
        value: &T,
    ) -> Result<()> {
        self.put_event_with_time_raw(collection, key, kind, timestamp, json_body(value)?)
            .await
    }

    /// Append pre-encoded JSON at an explicit time (epoch milliseconds).
    pub async fn put_event_with_time_raw(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        timestamp: i64,
        body: impl Into<Body>,
    ) -> Result<()> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("timestamp", &timestamp.to_string())
            .finish();

        self.append_event(
            format!("{}?{query}", events_uri(collection, key, kind)),
            body.into(),
        )
        .await
    }

    /// Append `value` at `time`.
    pub async fn put_event_at<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        time: DateTime<Utc>,
        value: &T,
    ) -> Result<()> {
        self.put_event_with_time(collection, key, kind, time.timestamp_millis(), value)
            .await
    }

    async fn append_event(&self, trailing: String, body: Body) -> Result<()> {
        let response = self
            .put_expecting(
                &trailing,
                &RequestHeaders::none(),
                Some(body),
                &[StatusCode::CREATED, StatusCode::NO_CONTENT],
            )
            .await?;
        drain(response).await
    }
}
