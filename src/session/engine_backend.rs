//! SessionBackend implementation over the engine sidecar.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::{SessionBackend, SessionContext};
use super::key::SessionKey;
use crate::engine::protocol::SessionCreateParams;
use crate::engine::{EngineClient, EngineResult};

/// Constructs engine sessions through the `session.create` RPC.
pub struct EngineSessionBackend {
    client: Arc<EngineClient>,
}

impl EngineSessionBackend {
    /// Create a backend over a shared engine client.
    pub fn new(client: Arc<EngineClient>) -> Self {
        Self { client }
    }

    /// Create a backend over an owned engine client.
    pub fn with_client(client: EngineClient) -> Self {
        Self::new(Arc::new(client))
    }
}

#[async_trait]
impl SessionBackend for EngineSessionBackend {
    async fn create_session(&self, key: &SessionKey) -> EngineResult<SessionContext> {
        let response = self
            .client
            .create_session(SessionCreateParams {
                manifest: key.manifest.clone(),
                function_path: key.function_path.clone(),
                properties: key.properties.clone(),
            })
            .await?;

        Ok(SessionContext::new(response.session_id, key))
    }
}
