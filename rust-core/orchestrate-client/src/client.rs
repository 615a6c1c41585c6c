// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Orchestrate client, authentication, and HTTP transport layer.
//!
//! [`OrchestrateClient`] is the entry point for every operation. It owns the
//! API root, the API key, and a pooled `reqwest` client. Resource operations
//! (key/value, events, graph, search) are `impl OrchestrateClient` blocks in
//! their own modules and all go through [`OrchestrateClient::execute`].
//!
//! The executor never retries and never judges a status code; each resource
//! operation states which status it expects. Every response body is read to
//! the end on every path so pooled connections can be reused.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Body, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result, ServiceError};
use crate::precondition::{RefRule, RequestHeaders};

/// Client for one Orchestrate application.
///
/// Cheap to clone; clones share the connection pool. Safe to use from many
/// tasks at once.
///
/// # Examples
///
/// ```rust,no_run
/// use orchestrate_client::OrchestrateClient;
///
/// # #[tokio::main]
/// # async fn main() -> orchestrate_client::Result<()> {
/// let client = OrchestrateClient::new("my-api-key")?;
/// let item = client.get("emails", "k1").await?;
/// println!("ref {:?}", item.path.reference());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OrchestrateClient {
    /// Pooled HTTP client.
    http: reqwest::Client,
    /// Sent as the basic-auth username.
    api_key: String,
    /// API root, ending in `/`.
    root: Url,
    /// Location header layout.
    ref_rule: RefRule,
}

impl fmt::Debug for OrchestrateClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchestrateClient")
            .field("root", &self.root.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OrchestrateClient {
    // -- Constructors -------------------------------------------------------

    /// Client for the public API root with default timeouts.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Client with explicit configuration.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] if `config.api_root` does not parse, or
    /// [`Error::Transport`] if the TLS backend can not be initialised.
    pub fn with_config(api_key: &str, config: ClientConfig) -> Result<Self> {
        let root = config.root_url()?;

        // Already installed is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.to_owned(),
            root,
            ref_rule: config.ref_rule,
        })
    }

    /// The API root every trailing path is appended to.
    pub fn api_root(&self) -> &str {
        self.root.as_str()
    }

    // -- Request executor ---------------------------------------------------

    /// Issue one request against `{api_root}{trailing}`.
    ///
    /// Basic auth is always attached. PUT requests get
    /// `Content-Type: application/json`; `headers` are added verbatim.
    /// The raw response is returned whatever its status.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] for connection, DNS or timeout failures. For a PUT
    /// this means the write may or may not have happened.
    #[instrument(level = "debug", skip(self, method, headers, body), fields(method = %method))]
    pub async fn execute(
        &self,
        method: Method,
        trailing: &str,
        headers: &RequestHeaders,
        body: Option<Body>,
    ) -> Result<Response> {
        let url = self.url(trailing)?;
        let is_put = method == Method::PUT;

        let mut builder = self
            .http
            .request(method, url)
            .basic_auth(&self.api_key, None::<&str>);

        for (name, value) in headers.iter() {
            builder = builder.header(name.clone(), value.clone());
        }
        if is_put {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        debug!(status = response.status().as_u16(), "Response received");
        Ok(response)
    }

    /// Full request URL for a trailing path, appended to the root as text.
    ///
    /// # Errors
    ///
    /// [`Error::DotSegment`] if the path part holds a `.` or `..` segment
    /// (also percent-encoded), since parsing would resolve it against the
    /// root and address another resource.
    pub(crate) fn url(&self, trailing: &str) -> Result<Url> {
        if has_dot_segment(trailing) {
            return Err(Error::DotSegment(trailing.to_string()));
        }
        Ok(Url::parse(&format!("{}{}", self.root.as_str(), trailing))?)
    }

    // -- Status handling ----------------------------------------------------

    /// Pass `response` through if its status is one of `expected`, otherwise
    /// consume it into a service error.
    pub(crate) async fn expect(
        &self,
        response: Response,
        expected: &[StatusCode],
    ) -> Result<Response> {
        if expected.contains(&response.status()) {
            Ok(response)
        } else {
            Err(service_error(response).await)
        }
    }

    // -- Verb helpers -------------------------------------------------------

    /// GET expecting 200 and a JSON body of type `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, trailing: &str) -> Result<T> {
        let response = self
            .execute(Method::GET, trailing, &RequestHeaders::none(), None)
            .await?;
        let response = self.expect(response, &[StatusCode::OK]).await?;
        decode_body(response).await
    }

    /// PUT expecting one of `expected`. The caller inspects headers and then
    /// drains the returned response.
    pub(crate) async fn put_expecting(
        &self,
        trailing: &str,
        headers: &RequestHeaders,
        body: Option<Body>,
        expected: &[StatusCode],
    ) -> Result<Response> {
        let response = self.execute(Method::PUT, trailing, headers, body).await?;
        self.expect(response, expected).await
    }

    /// DELETE expecting 204.
    pub(crate) async fn delete_at(&self, trailing: &str, headers: &RequestHeaders) -> Result<()> {
        let response = self.execute(Method::DELETE, trailing, headers, None).await?;
        let response = self.expect(response, &[StatusCode::NO_CONTENT]).await?;
        drain(response).await
    }

    // -- Location metadata --------------------------------------------------

    /// Ref named by `header` in `headers`, or `None` if the header is absent.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRef`] if the header is present but has no ref segment.
    pub(crate) fn ref_from(
        &self,
        headers: &HeaderMap,
        header: &'static str,
    ) -> Result<Option<String>> {
        match headers.get(header) {
            None => Ok(None),
            Some(value) => {
                let value = value.to_str().map_err(|_| Error::MissingRef {
                    header,
                    value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                })?;
                self.ref_rule.extract(header, value).map(Some)
            }
        }
    }

    /// Trailing path encoded in a page cursor.
    ///
    /// Cursors are opaque apart from their API-root prefix, which is
    /// stripped; the remainder is used verbatim.
    pub(crate) fn cursor_trailing<'a>(&self, cursor: &'a str) -> Result<&'a str> {
        cursor
            .strip_prefix(self.root.path())
            .ok_or_else(|| Error::MalformedCursor(cursor.to_string()))
    }
}

/// True when the path part of `trailing` has a segment the URL parser treats
/// as `.` or `..`. The parser drops tabs and newlines and reads `\` as `/`,
/// so those are accounted for.
fn has_dot_segment(trailing: &str) -> bool {
    let path = trailing.split(['?', '#']).next().unwrap_or_default();
    let path: String = path.chars().filter(|c| !matches!(c, '\t' | '\n' | '\r')).collect();

    path.split(['/', '\\']).any(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment == "." || segment == ".."
    })
}

/// Encode a request body as JSON.
pub(crate) fn json_body<T: Serialize + ?Sized>(value: &T) -> Result<Body> {
    serde_json::to_vec(value).map(Body::from).map_err(Error::Encode)
}

/// Read a successful response to the end and decode it.
pub(crate) async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(Error::Decode)
}

/// Read and discard the rest of a response body.
pub(crate) async fn drain(response: Response) -> Result<()> {
    response.bytes().await?;
    Ok(())
}

/// Consume a non-success response into [`Error::Service`].
async fn service_error(response: Response) -> Error {
    let status = response.status();
    debug!(status = status.as_u16(), "Service returned error status");

    let err = match response.bytes().await {
        Ok(body) => ServiceError::from_body(status, &body),
        Err(e) => ServiceError::unreadable(status, &e),
    };
    Error::Service(err)
}
