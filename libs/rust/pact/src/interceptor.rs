//! Interception adapter.
//!
//! Turns requests caught by an HTTP/GraphQL mocking layer into candidate
//! interactions. Two flows are supported:
//!
//! - [`Interceptor::respond`]: test code declares the response as an
//!   [`InteractionTemplate`]; the interaction is recorded before the reply is
//!   returned, and recording errors reach the caller.
//! - [`Interceptor::observe`]: test code already produced a [`MockReply`]; the
//!   reply is queued and recorded later, in observation order. Failures are
//!   logged and dropped so the reply is never affected.

use crate::config::PactOptions;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::RecordOutcome;
use crate::provider::{UNKNOWN_PROVIDER, infer_provider_name};
use crate::registry::ProviderRegistry;
use crate::schema::{
    HeaderValue, Headers, InteractionOptions, MockResponse, RecordedRequest, build_interaction,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinSet;
use tracing::debug;
use url::Url;

/// GraphQL operation carried by an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlOperation {
    /// Query document
    pub query: String,
    /// Operation variables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    /// Operation name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

/// A request caught by the mocking layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterceptedRequest {
    /// HTTP method
    pub method: String,
    /// Absolute request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Decoded request body
    pub body: Option<Value>,
    /// GraphQL operation, recorded as the body when present
    pub graphql: Option<GraphQlOperation>,
}

impl InterceptedRequest {
    /// Create a request.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Mark as a GraphQL operation.
    #[must_use]
    pub fn with_graphql(mut self, operation: GraphQlOperation) -> Self {
        self.graphql = Some(operation);
        self
    }

    /// Provider inferred from the URL.
    #[must_use]
    pub fn provider_name(&self) -> String {
        infer_provider_name(&self.url).unwrap_or_else(|| UNKNOWN_PROVIDER.to_string())
    }

    /// Normalized request for recording.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is not absolute or a GraphQL operation cannot
    /// be represented as JSON.
    pub fn to_recorded(&self) -> LedgerResult<RecordedRequest> {
        let url = Url::parse(&self.url)
            .map_err(|e| LedgerError::InvalidRequest(format!("{}: {e}", self.url)))?;
        let body = match &self.graphql {
            Some(operation) => Some(serde_json::to_value(operation)?),
            None => self.body.clone(),
        };
        Ok(RecordedRequest {
            method: self.method.to_uppercase(),
            path: url.path().to_string(),
            query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
            headers: (!self.headers.is_empty()).then(|| self.headers.clone()),
            body,
        })
    }
}

/// Body of a reply produced by test code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReplyBody {
    /// No body
    #[default]
    Empty,
    /// JSON content
    Json(Value),
    /// Text content
    Text(String),
    /// Binary content; never recorded
    Binary(Vec<u8>),
}

impl ReplyBody {
    /// Body as recordable content; `Err` when it cannot be recorded.
    fn recordable(&self) -> Result<Option<Value>, &'static str> {
        match self {
            Self::Empty => Ok(None),
            Self::Json(value) => Ok(Some(value.clone())),
            Self::Text(text) => Ok(Some(Value::String(text.clone()))),
            Self::Binary(_) => Err("binary body"),
        }
    }
}

/// Reply handed back to the code under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockReply {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: ReplyBody,
}

impl MockReply {
    /// A 200 JSON reply.
    #[must_use]
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            headers: Headers::new(),
            body: ReplyBody::Json(body),
        }
    }

    /// Set the status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Response declared by test code, with its interaction metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionTemplate {
    /// Provider override; inferred from the URL otherwise
    pub provider: Option<String>,
    /// Interaction metadata
    pub options: InteractionOptions,
    /// Declared response
    pub response: MockResponse,
}

impl InteractionTemplate {
    /// A 200 response carrying `content`.
    #[must_use]
    pub fn from_content(content: Value) -> Self {
        Self {
            response: MockResponse::ok(content),
            ..Default::default()
        }
    }

    /// Template around a full response.
    #[must_use]
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            ..Default::default()
        }
    }

    /// Record against `provider` instead of the inferred one.
    #[must_use]
    pub fn for_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the interaction metadata.
    #[must_use]
    pub fn with_options(mut self, options: InteractionOptions) -> Self {
        self.options = options;
        self
    }
}

/// A reply waiting to be recorded.
#[derive(Debug)]
struct Deferred {
    request: InterceptedRequest,
    reply: MockReply,
    options: InteractionOptions,
}

/// Records deferred replies one at a time, in the order they were observed.
#[derive(Debug)]
struct Recorder {
    registry: Arc<ProviderRegistry>,
    queue: Mutex<VecDeque<Deferred>>,
    // Held while recording so queued entries never overtake each other.
    recording: Mutex<()>,
    processed: AtomicUsize,
}

impl Recorder {
    fn enqueue(&self, entry: Deferred) {
        self.queue.lock().push_back(entry);
    }

    fn drain(&self) {
        let _recording = self.recording.lock();
        self.drain_locked();
    }

    fn drain_locked(&self) {
        loop {
            let Some(entry) = self.queue.lock().pop_front() else {
                return;
            };
            if let Err(reason) =
                record_observed(&self.registry, &entry.request, &entry.reply, &entry.options)
            {
                debug!(url = %entry.request.url, %reason, "Interaction not recorded");
            }
            self.processed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Bridges a mocking layer to the provider registry.
pub struct Interceptor {
    recorder: Arc<Recorder>,
    pending: Mutex<JoinSet<()>>,
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("registry", &self.recorder.registry)
            .field("queued", &self.recorder.queue.lock().len())
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

impl Interceptor {
    /// Create an interceptor recording into `registry`.
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            recorder: Arc::new(Recorder {
                registry,
                queue: Mutex::new(VecDeque::new()),
                recording: Mutex::new(()),
                processed: AtomicUsize::new(0),
            }),
            pending: Mutex::new(JoinSet::new()),
        }
    }

    /// Registry interactions are recorded into.
    #[must_use]
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.recorder.registry
    }

    /// Record the templated interaction and build the reply.
    ///
    /// Replies still queued by [`Self::observe`] are recorded first.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be normalized, the ledger cannot
    /// be provisioned, or the interaction conflicts in deterministic mode.
    pub fn respond(
        &self,
        request: &InterceptedRequest,
        template: &InteractionTemplate,
    ) -> LedgerResult<MockReply> {
        let _recording = self.recorder.recording.lock();
        self.recorder.drain_locked();

        let provider = template
            .provider
            .clone()
            .unwrap_or_else(|| request.provider_name());
        let pact = self
            .registry()
            .get_or_create_with(&provider, &PactOptions::default())?;
        let mut pact = pact.lock();

        let interaction = build_interaction(
            pact.version(),
            request.to_recorded()?,
            template.response.clone(),
            &template.options,
        );
        let reply = MockReply {
            status: interaction.status(),
            headers: interaction.reply_headers().cloned().unwrap_or_default(),
            body: interaction
                .reply_body()
                .cloned()
                .map_or(ReplyBody::Empty, ReplyBody::Json),
        };
        pact.record(interaction)?;
        Ok(reply)
    }

    /// Queue best-effort recording of a reply test code already produced.
    ///
    /// Queued replies are recorded in call order on the blocking pool of the
    /// current tokio runtime when there is one, inline otherwise.
    pub fn observe(&self, request: InterceptedRequest, reply: &MockReply, options: InteractionOptions) {
        self.recorder.enqueue(Deferred {
            request,
            reply: reply.clone(),
            options,
        });

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let recorder = Arc::clone(&self.recorder);
                self.pending
                    .lock()
                    .spawn_blocking_on(move || recorder.drain(), &handle);
            }
            Err(_) => self.recorder.drain(),
        }
    }

    /// Wait for every queued recording. Returns how many were processed
    /// since the previous flush, failures included.
    pub async fn flush(&self) -> usize {
        let mut pending = std::mem::take(&mut *self.pending.lock());
        while let Some(result) = pending.join_next().await {
            if let Err(err) = result {
                debug!(error = %err, "Deferred recording aborted");
            }
        }
        self.recorder.drain();
        self.recorder.processed.swap(0, Ordering::Relaxed)
    }
}

fn record_observed(
    registry: &ProviderRegistry,
    request: &InterceptedRequest,
    reply: &MockReply,
    options: &InteractionOptions,
) -> Result<RecordOutcome, String> {
    let body = reply.body.recordable()?;
    let recorded = request.to_recorded().map_err(|e| e.to_string())?;
    let pact = registry
        .get_or_create(&request.provider_name())
        .map_err(|e| e.to_string())?;
    let mut pact = pact.lock();

    let response = MockResponse {
        status: reply.status,
        headers: (!reply.headers.is_empty()).then(|| reply.headers.clone()),
        body,
    };
    let interaction = build_interaction(pact.version(), recorded, response, options);
    pact.record(interaction).map_err(|e| e.to_string())
}
