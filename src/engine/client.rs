//! Async client for communicating with the engine sidecar process.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};

use super::error::{EngineError, EngineResult};
use super::protocol::{self, methods, RequestEnvelope, ResponseEnvelope};
use crate::config::Settings;

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Async client for the engine sidecar.
///
/// The client spawns the engine as a child process and communicates via
/// NDJSON (newline-delimited JSON) over stdin/stdout. Each request has a
/// unique ID for correlation with responses, enabling concurrent requests.
///
/// Timeouts live here; the metadata and session layers impose none of
/// their own.
///
/// # Example
///
/// ```ignore
/// use gantry::engine::EngineClient;
///
/// let client = EngineClient::spawn("./gantry-engine").await?;
/// let response = client.catalog_sql(source, "SELECT version()").await?;
/// ```
pub struct EngineClient {
    /// Writer for sending requests to engine stdin.
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,

    /// Map of pending request IDs to response channels.
    pending: Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>,

    /// Handle to the engine child process.
    _child: Child,

    /// Handle to the background reader task.
    _reader_task: tokio::task::JoinHandle<()>,

    /// Request timeout duration.
    timeout: Duration,
}

impl EngineClient {
    /// Spawn a new engine sidecar process.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine process cannot be spawned.
    pub async fn spawn<P: AsRef<Path>>(engine_path: P) -> EngineResult<Self> {
        Self::spawn_with_timeout(engine_path, Duration::from_secs(DEFAULT_TIMEOUT_SECS)).await
    }

    /// Spawn the engine using settings configuration.
    ///
    /// Resolves the binary from the settings file (falling back to a path
    /// search) and applies the configured request timeout.
    pub async fn spawn_with_settings(settings: &Settings) -> EngineResult<Self> {
        let engine_path = settings.engine_path().ok_or_else(|| {
            EngineError::SpawnFailed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Engine binary not found. Set engine.path in gantry.toml",
            ))
        })?;

        Self::spawn_with_timeout(
            engine_path,
            Duration::from_secs(settings.engine.timeout_secs),
        )
        .await
    }

    /// Spawn a new engine process with a custom timeout.
    pub async fn spawn_with_timeout<P: AsRef<Path>>(
        engine_path: P,
        timeout: Duration,
    ) -> EngineResult<Self> {
        let mut child = Command::new(engine_path.as_ref())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::SpawnFailed)?;

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");

        let stdin = Arc::new(Mutex::new(BufWriter::new(stdin)));
        let pending: Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        // Spawn background reader task
        let reader_task = Self::spawn_reader_task(stdout, pending.clone());

        Ok(Self {
            stdin,
            pending,
            _child: child,
            _reader_task: reader_task,
            timeout,
        })
    }

    /// Spawn the background task that reads responses from the engine.
    fn spawn_reader_task(
        stdout: ChildStdout,
        pending: Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        // EOF - engine exited
                        break;
                    }
                    Ok(_) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                        Ok(resp) => {
                            let mut pending = pending.lock().await;
                            if let Some(tx) = pending.remove(&resp.id) {
                                let _ = tx.send(resp);
                            }
                        }
                        Err(e) => {
                            eprintln!("engine: failed to parse response: {}", e);
                        }
                    },
                    Err(e) => {
                        eprintln!("engine: read error: {}", e);
                        break;
                    }
                }
            }

            // Engine exited - notify all pending requests with error responses
            let mut pending = pending.lock().await;
            for (id, tx) in pending.drain() {
                let error_response = ResponseEnvelope {
                    id,
                    success: false,
                    result: None,
                    error: Some(protocol::ErrorInfo {
                        code: "ENGINE_EXITED".to_string(),
                        message: "Engine process exited unexpectedly".to_string(),
                    }),
                };
                let _ = tx.send(error_response);
            }
        })
    }

    /// Send a request to the engine and wait for a response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Serialization fails
    /// - Writing to the engine fails
    /// - The request times out
    /// - The engine returns an error response
    /// - Deserialization of the response fails
    pub async fn request<P, R>(&self, method: &str, params: P) -> EngineResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();

        let request = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(EngineError::SerializeFailed)?,
        };

        // Register response channel
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id.clone(), tx);
        }

        // Send request
        {
            let mut stdin = self.stdin.lock().await;
            let line =
                serde_json::to_string(&request).map_err(EngineError::SerializeFailed)? + "\n";
            stdin
                .write_all(line.as_bytes())
                .await
                .map_err(EngineError::WriteFailed)?;
            stdin.flush().await.map_err(EngineError::WriteFailed)?;
        }

        // Wait for response with timeout
        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) => {
                // Channel closed - engine exited
                return Err(EngineError::ChannelClosed);
            }
            Err(_) => {
                // Timeout - clean up pending request to prevent memory leak
                let mut pending = self.pending.lock().await;
                pending.remove(&id);
                return Err(EngineError::Timeout(self.timeout.as_secs()));
            }
        };

        // Process response
        if response.success {
            let result = response.result.unwrap_or(serde_json::Value::Null);
            serde_json::from_value(result).map_err(EngineError::DeserializeFailed)
        } else {
            let error = response.error.unwrap_or_else(|| protocol::ErrorInfo {
                code: "UNKNOWN".to_string(),
                message: "Unknown error".to_string(),
            });
            Err(Self::classify_error(&error.code, &error.message))
        }
    }

    /// Classify an engine error code into a more specific error type.
    fn classify_error(code: &str, message: &str) -> EngineError {
        match code {
            "CONNECTION_FAILED" | "AUTH_FAILED" => EngineError::ConnectionFailed(message.to_string()),
            "QUERY_REJECTED" => EngineError::QueryRejected(message.to_string()),
            "INVALID_REQUEST" => EngineError::InvalidRequest(message.to_string()),
            "METHOD_NOT_FOUND" => EngineError::MethodNotFound(message.to_string()),
            "ENGINE_EXITED" => EngineError::EngineExited,
            _ => EngineError::remote(code, message),
        }
    }

    /// Check if the engine is still running.
    ///
    /// Returns `true` if the engine process appears to be running,
    /// `false` if the reader task has finished (indicating engine exit).
    pub fn is_alive(&self) -> bool {
        !self._reader_task.is_finished()
    }

    /// Get the current request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the request timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

// Convenience methods for the supported engine operations
impl EngineClient {
    /// Run a SQL statement against a source database's catalog.
    pub async fn catalog_sql(
        &self,
        source: protocol::SourceParams,
        sql: &str,
    ) -> EngineResult<protocol::CatalogSqlResponse> {
        self.request(
            methods::CATALOG_SQL,
            protocol::CatalogSqlParams {
                source,
                sql: sql.to_string(),
            },
        )
        .await
    }

    /// Construct an engine session.
    pub async fn create_session(
        &self,
        params: protocol::SessionCreateParams,
    ) -> EngineResult<protocol::SessionCreateResponse> {
        self.request(methods::SESSION_CREATE, params).await
    }
}

/// Companion extractor capability for manifest payloads.
///
/// Parsing a manifest into structured introspection results is the engine's
/// job; this type only carries the payload to it and hands the result back
/// as an opaque document.
pub struct ManifestExtractor {
    client: Arc<EngineClient>,
    manifest: String,
}

impl ManifestExtractor {
    /// Create an extractor for a manifest payload.
    pub fn new(client: Arc<EngineClient>, manifest: impl Into<String>) -> Self {
        Self {
            client,
            manifest: manifest.into(),
        }
    }

    /// Parse the manifest payload into its structured form.
    pub async fn extract(&self) -> EngineResult<serde_json::Value> {
        let response: protocol::ManifestExtractResponse = self
            .client
            .request(
                methods::MANIFEST_EXTRACT,
                protocol::ManifestExtractParams {
                    manifest: self.manifest.clone(),
                },
            )
            .await?;

        Ok(response.manifest)
    }

    /// The raw manifest payload this extractor was built from.
    pub fn manifest(&self) -> &str {
        &self.manifest
    }
}
