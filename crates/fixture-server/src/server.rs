use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Path, Request, State};
use axum::http::{self, header, HeaderMap, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::FixtureServerConfig;
use crate::error::{FixtureServerError, Result};
use crate::multipart;
use crate::signing::{load_private_key, sign_payload};
use crate::state::{FixtureState, RecordedRequest};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// HTTP test double for an update endpoint.
///
/// Records what clients send to it and serves whatever the test staged. Clones
/// share the same state, so one clone can drive waits while the router holds
/// another.
#[derive(Clone)]
pub struct FixtureServer {
    inner: Arc<Inner>,
}

struct Inner {
    config: FixtureServerConfig,
    state: Mutex<FixtureState>,
    running: Mutex<Option<RunningServer>>,
}

struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl FixtureServer {
    pub fn new(config: FixtureServerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(FixtureState::default()),
                running: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &FixtureServerConfig {
        &self.inner.config
    }

    /// Start listening on `port` (0 picks a free port). Returns the bound
    /// address; calling it while already running returns the existing one.
    pub async fn start(&self, port: u16) -> Result<SocketAddr> {
        if let Some(addr) = self.local_addr() {
            return Ok(addr);
        }

        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
            .await
            .map_err(|source| FixtureServerError::Bind { port, source })?;
        let addr = listener.local_addr()?;

        let mut running = self.lock_running();
        if let Some(existing) = running.as_ref() {
            return Ok(existing.addr);
        }

        let app = router(self.clone());
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let signal = async {
                let _ = shutdown_rx.await;
            };
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
            {
                error!(target: "fixture_server", error = %err, "server loop failed");
            }
        });

        *running = Some(RunningServer {
            addr,
            shutdown,
            task,
        });
        info!(target: "fixture_server", %addr, "fixture server listening");
        Ok(addr)
    }

    /// Stop listening and forget everything recorded or staged.
    ///
    /// State is cleared only once the serve loop has finished, so requests
    /// that were in flight when `stop` was called do not leak into the next
    /// `start`.
    pub async fn stop(&self) {
        let running = self.lock_running().take();

        if let Some(running) = running {
            let _ = running.shutdown.send(());
            let abort = running.task.abort_handle();
            if tokio::time::timeout(SHUTDOWN_GRACE, running.task).await.is_err() {
                warn!(target: "fixture_server", "graceful shutdown timed out; aborting server task");
                abort.abort();
            }
            info!(target: "fixture_server", addr = %running.addr, "fixture server stopped");
        }

        self.lock_state().clear();
    }

    pub fn is_running(&self) -> bool {
        self.lock_running().is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_running().as_ref().map(|running| running.addr)
    }

    /// Wait for the next `/notify` or `/post` message and remove it from the
    /// queue. `response_to_serve` is queued first and answers the next such
    /// request instead of the plain acknowledgement.
    pub async fn wait_for_request(
        &self,
        timeout: Duration,
        response_to_serve: Option<Value>,
    ) -> Result<Value> {
        if let Some(response) = response_to_serve {
            self.lock_state().responses_to_serve.push_back(response);
        }
        self.poll_until(timeout, "message", |state| state.messages.pop_front())
            .await
    }

    /// Wait until a non-empty `/log` submission has been recorded.
    pub async fn wait_for_log_entries(&self, timeout: Duration) -> Result<Vec<Value>> {
        self.poll_until(timeout, "log entries", |state| {
            (!state.log_entries.is_empty()).then(|| state.log_entries.clone())
        })
        .await
    }

    /// Wait for the next `/update` request and consume it.
    pub async fn wait_for_update_request(&self, timeout: Duration) -> Result<RecordedRequest> {
        self.poll_until(timeout, "update request", |state| state.update_request.take())
            .await
    }

    /// Sign `manifest` with the key under `key_dir` and stage it for `/update`.
    pub async fn serve_signed_manifest(&self, manifest: &Value, key_dir: &FsPath) -> Result<()> {
        let key = load_private_key(key_dir).await?;
        let part = sign_payload(manifest, &key)?;
        debug!(target: "fixture_server", bytes = part.body.len(), "staged signed manifest");
        self.lock_state().multipart.manifest = Some(part);
        Ok(())
    }

    /// Sign `directive` with the key under `key_dir` and stage it for `/update`.
    pub async fn serve_signed_directive(&self, directive: &Value, key_dir: &FsPath) -> Result<()> {
        let key = load_private_key(key_dir).await?;
        let part = sign_payload(directive, &key)?;
        debug!(target: "fixture_server", bytes = part.body.len(), "staged signed directive");
        self.lock_state().multipart.directive = Some(part);
        Ok(())
    }

    /// File names requested under `/static` since the last call.
    pub fn consume_requested_static_files(&self) -> Vec<String> {
        std::mem::take(&mut self.lock_state().requested_static_files)
    }

    async fn poll_until<T>(
        &self,
        timeout: Duration,
        waiting_for: &'static str,
        mut take: impl FnMut(&mut FixtureState) -> Option<T>,
    ) -> Result<T> {
        let deadline = Instant::now() + timeout;
        // Only a stop that happens during the wait cancels it.
        let running_at_start = self.is_running();
        loop {
            let found = {
                let mut state = self.lock_state();
                take(&mut *state)
            };
            if let Some(found) = found {
                return Ok(found);
            }
            if running_at_start && !self.is_running() {
                warn!(target: "fixture_server", waiting_for, "server stopped while waiting");
                return Err(FixtureServerError::ServerStopped { waiting_for });
            }
            if Instant::now() >= deadline {
                warn!(target: "fixture_server", waiting_for, ?timeout, "wait timed out");
                return Err(FixtureServerError::TimedOut { waiting_for });
            }
            tokio::time::sleep(self.inner.config.poll_interval).await;
        }
    }

    fn record_message(&self, message: Value) -> Response {
        let next_response = {
            let mut state = self.lock_state();
            state.messages.push_back(message);
            debug!(target: "fixture_server", queued = state.messages.len(), "recorded message");
            state.responses_to_serve.pop_front()
        };

        let no_store = [(header::CACHE_CONTROL, "no-store")];
        match next_response {
            Some(response) => (no_store, Json(response)).into_response(),
            None => (no_store, "Received request").into_response(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, FixtureState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<RunningServer>> {
        self.inner
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn router(server: FixtureServer) -> Router {
    let static_files = Router::new()
        .nest_service("/static", ServeDir::new(&server.inner.config.static_dir))
        .layer(middleware::from_fn_with_state(
            server.clone(),
            track_static_file,
        ));

    Router::new()
        .route("/notify/:string", get(notify))
        .route("/post", post(record_post))
        .route("/log", post(record_log))
        .route("/update", get(serve_update))
        .merge(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

async fn notify(State(server): State<FixtureServer>, Path(message): Path<String>) -> Response {
    server.record_message(Value::String(message))
}

/// Parse a request body the way a lenient JSON body parser would: bodies not
/// labelled as JSON, and empty ones, read as `{}`.
fn json_body(headers: &HeaderMap, body: &[u8]) -> std::result::Result<Value, Response> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("json"));
    if !is_json || body.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|err| {
        warn!(target: "fixture_server", error = %err, "rejecting malformed JSON body");
        (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {err}")).into_response()
    })
}

async fn record_post(
    State(server): State<FixtureServer>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match json_body(&headers, &body) {
        Ok(message) => server.record_message(message),
        Err(rejection) => rejection,
    }
}

async fn record_log(
    State(server): State<FixtureServer>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = match json_body(&headers, &body) {
        Ok(body) => body,
        Err(rejection) => return rejection,
    };
    let entries = body
        .get("logEntries")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    debug!(target: "fixture_server", entries = entries.len(), "recorded log entries");
    server.lock_state().log_entries = entries;

    ([(header::CACHE_CONTROL, "no-store")], "Received request").into_response()
}

async fn track_static_file(
    State(server): State<FixtureServer>,
    request: Request,
    next: Next,
) -> Response {
    let file_name = FsPath::new(request.uri().path())
        .file_name()
        .and_then(OsStr::to_str)
        .map(str::to_string);
    if let Some(file_name) = file_name {
        debug!(target: "fixture_server", %file_name, "static file requested");
        server.lock_state().requested_static_files.push(file_name);
    }
    next.run(request).await
}

async fn serve_update(
    State(server): State<FixtureServer>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let rendered = {
        let mut state = server.lock_state();
        state.update_request = Some(RecordedRequest::capture(&method, &uri, &headers));
        debug!(target: "fixture_server", %uri, "recorded update request");
        multipart::render(&state.multipart)
    };

    let Some(rendered) = rendered else {
        debug!(target: "fixture_server", "no update staged");
        return (StatusCode::NOT_FOUND, "No update available").into_response();
    };

    let response = http::Response::builder()
        .status(StatusCode::OK)
        .header("expo-protocol-version", "1")
        .header("expo-sfv-version", "0")
        .header(header::CACHE_CONTROL, "private, max-age=0")
        .header(header::CONTENT_TYPE, rendered.content_type())
        .body(Body::from(rendered.body));
    match response {
        Ok(response) => response,
        Err(err) => {
            error!(target: "fixture_server", error = %err, "failed to build update response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
