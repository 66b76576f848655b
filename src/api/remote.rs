//! Purpose: Provide an HTTP client for the paged rows protocol (v0 JSON).
//! Exports: `RowsClient`, `SourceSpec`, `RemoteSource`, `Connected`, `connect`.
//! Role: Transport boundary; binds a partition pair to the core `RowSource`.
//! Invariants: Requests/response envelopes follow `GET /v0/rows` with
//! Invariants: `partition`, `subpartition`, `offset`, `length` query pairs.
//! Invariants: Every transport or non-success failure surfaces as `Fetch`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use super::ApiResult;
use crate::core::cache::{PagedCache, RowSource, RowsPage};
use crate::core::error::{Error, ErrorKind};
use crate::core::record::Record;

/// Opaque identifier pair selecting one remote ordered sequence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceSpec {
    pub partition: String,
    pub subpartition: String,
}

impl SourceSpec {
    pub fn new(partition: impl Into<String>, subpartition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            subpartition: subpartition.into(),
        }
    }
}

#[derive(Clone)]
pub struct RowsClient {
    inner: Arc<RowsClientInner>,
}

struct RowsClientInner {
    base_url: Url,
    token: Option<String>,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct RowsEnvelope {
    total: usize,
    rows: Vec<Record>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: RemoteError,
}

#[derive(Deserialize)]
struct RemoteError {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RowsClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self {
            inner: Arc::new(RowsClientInner {
                base_url,
                token: None,
                agent,
            }),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.token = Some(token.into());
        } else {
            self.inner = Arc::new(RowsClientInner {
                base_url: self.inner.base_url.clone(),
                token: Some(token.into()),
                agent: self.inner.agent.clone(),
            });
        }
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn fetch(&self, spec: &SourceSpec, offset: usize, length: usize) -> ApiResult<RowsEnvelope> {
        let url = rows_url(&self.inner.base_url, spec, offset, length)?;
        let mut request = self
            .inner
            .agent
            .request("GET", url.as_str())
            .set("Accept", "application/json");
        if let Some(token) = &self.inner.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        match request.call() {
            Ok(resp) => read_json_response(resp),
            Err(ureq::Error::Status(code, resp)) => {
                Err(parse_error_response(code, resp).with_partition(spec.partition.clone()))
            }
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Fetch)
                .with_message("rows request failed")
                .with_partition(spec.partition.clone())
                .with_source(err)),
        }
    }
}

/// One remote sequence bound to its client; the `RowSource` the cache pulls.
pub struct RemoteSource {
    client: RowsClient,
    spec: SourceSpec,
}

impl RemoteSource {
    pub fn new(client: RowsClient, spec: SourceSpec) -> Self {
        Self { client, spec }
    }

    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }
}

impl RowSource for RemoteSource {
    fn fetch_rows(&self, offset: usize, length: usize) -> Result<RowsPage, Error> {
        let envelope = self.client.fetch(&self.spec, offset, length)?;
        Ok(RowsPage {
            total: envelope.total,
            rows: envelope.rows,
        })
    }
}

/// A discovered remote dataset: the winning candidate and its primed cache.
#[derive(Debug)]
pub struct Connected {
    pub spec: SourceSpec,
    pub cache: PagedCache,
}

/// Ordered-candidate discovery. Each candidate gets a 1-row probe at offset
/// 0; the first reporting a non-zero total wins and its probe row seeds the
/// cache. Probe failures and zero totals advance to the next candidate.
pub fn connect(
    client: &RowsClient,
    candidates: &[SourceSpec],
    window: usize,
) -> ApiResult<Connected> {
    for spec in candidates {
        tracing::debug!(
            partition = %spec.partition,
            subpartition = %spec.subpartition,
            "probing rows source"
        );
        let source = RemoteSource::new(client.clone(), spec.clone());
        match source.fetch_rows(0, 1) {
            Ok(page) if page.total > 0 => {
                let cache = PagedCache::with_window(Box::new(source), page.total, window);
                if let Some(record) = page.rows.into_iter().next() {
                    cache.seed(0, record);
                }
                return Ok(Connected {
                    spec: spec.clone(),
                    cache,
                });
            }
            Ok(_) => {
                tracing::debug!(partition = %spec.partition, "candidate reports zero rows");
            }
            Err(err) => {
                tracing::debug!(partition = %spec.partition, %err, "candidate probe failed");
            }
        }
    }
    Err(Error::new(ErrorKind::DiscoveryExhausted)
        .with_message("no candidate source reported any rows")
        .with_hint("Upload a local file instead."))
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid rows base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(
            Error::new(ErrorKind::Usage).with_message("rows base url must use http or https")
        );
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(
            Error::new(ErrorKind::Usage).with_message("rows base url must not include a path")
        );
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn rows_url(base_url: &Url, spec: &SourceSpec, offset: usize, length: usize) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message("rows base url cannot be a base")
        })?;
        path.clear();
        path.push("v0");
        path.push("rows");
    }
    url.query_pairs_mut()
        .append_pair("partition", &spec.partition)
        .append_pair("subpartition", &spec.subpartition)
        .append_pair("offset", &offset.to_string())
        .append_pair("length", &length.to_string());
    Ok(url)
}

fn read_json_response<R>(response: ureq::Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Fetch)
            .with_message("failed to read rows response body")
            .with_source(err)
    })?;
    serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid rows response json")
            .with_source(err)
    })
}

fn parse_error_response(status: u16, response: ureq::Response) -> Error {
    let body = response.into_string().unwrap_or_default();
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let message = match (envelope.error.kind, envelope.error.message) {
            (Some(kind), Some(message)) => format!("{kind}: {message}"),
            (_, Some(message)) => message,
            (Some(kind), None) => kind,
            (None, None) => format!("rows endpoint returned status {status}"),
        };
        return Error::new(ErrorKind::Fetch).with_message(message);
    }
    Error::new(ErrorKind::Fetch).with_message(format!("rows endpoint returned status {status}"))
}
