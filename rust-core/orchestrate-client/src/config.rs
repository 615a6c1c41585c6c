// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client configuration.
//!
//! Defaults:
//! - api_root: `https://api.orchestrate.io/v0/`
//! - connect_timeout: 3s
//! - timeout: 30s end to end (connect, send, response)
//! - pool_max_idle_per_host: 4
//!
//! [`ClientConfig::from_env`] overlays `ORCHESTRATE_API_ROOT`,
//! `ORCHESTRATE_TIMEOUT_SECS` and `ORCHESTRATE_CONNECT_TIMEOUT_SECS`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::Result;
use crate::precondition::RefRule;

/// Root every trailing path is appended to.
pub const DEFAULT_API_ROOT: &str = "https://api.orchestrate.io/v0/";

/// Configuration for an [`OrchestrateClient`](crate::OrchestrateClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root URL. Always ends in `/`; its path doubles as the prefix of
    /// page cursors.
    pub api_root: String,
    /// Bound on establishing a connection.
    pub connect_timeout: Duration,
    /// Deadline covering the whole exchange.
    pub timeout: Duration,
    /// Idle pooled connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Where refs live in `Location` headers.
    pub ref_rule: RefRule,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            connect_timeout: Duration::from_secs(3),
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 4,
            user_agent: format!("orchestrate-client/{}", env!("CARGO_PKG_VERSION")),
            ref_rule: RefRule::V0,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `ORCHESTRATE_*` environment variables.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(root) = std::env::var("ORCHESTRATE_API_ROOT") {
            config = config.with_api_root(root);
        }
        if let Some(secs) = env_secs("ORCHESTRATE_TIMEOUT_SECS") {
            config.timeout = secs;
        }
        if let Some(secs) = env_secs("ORCHESTRATE_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = secs;
        }

        config
    }

    /// Replace the API root, adding the trailing `/` if missing.
    pub fn with_api_root(mut self, root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.ends_with('/') {
            root.push('/');
        }
        self.api_root = root;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parsed API root.
    pub(crate) fn root_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.api_root)?)
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            warn!(variable = name, value = %raw, error = %e, "Ignoring invalid timeout");
            None
        }
    }
}
