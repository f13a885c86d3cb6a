//! In-process doubles for exercising the dispatcher without a network.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::transport::{OutboundRequest, SyncTransport, TransportError, TransportResponse};

/// Replays scripted outcomes in order and repeats the last one once the
/// script runs out. Every request is recorded.
pub struct StubTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl StubTransport {
    /// # Panics
    ///
    /// Panics if `outcomes` is empty.
    pub fn new(outcomes: Vec<Result<TransportResponse, TransportError>>) -> Self {
        assert!(!outcomes.is_empty(), "StubTransport needs at least one outcome");
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `status` and `body`.
    pub fn always(status: u16, body: &str) -> Self {
        Self::new(vec![Self::reply(status, body)])
    }

    pub fn reply(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status,
            body: body.to_string(),
        })
    }

    pub fn network_error(message: &str) -> Result<TransportResponse, TransportError> {
        Err(TransportError(message.to_string()))
    }

    pub async fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl SyncTransport for StubTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().await.push(request);
        let mut outcomes = self.outcomes.lock().await;
        match outcomes.len() {
            0 => Err(TransportError("no scripted outcome".into())),
            1 => outcomes[0].clone(),
            _ => outcomes
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no scripted outcome".into()))),
        }
    }
}
