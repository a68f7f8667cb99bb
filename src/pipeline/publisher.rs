//! Result publisher - serializes replies and routes them to the originating client

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use super::connections::{ClientId, Roster};
use super::PipelineError;
use crate::types::{AnalysisResponse, AnalysisResult, ErrorResponse};

/// A reply to one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Result(AnalysisResponse),
    Error(ErrorResponse),
}

impl Reply {
    pub fn error(err: &PipelineError) -> Self {
        Self::Error(ErrorResponse {
            error: err.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string(self).map_err(|e| PipelineError::Transport(e.to_string()))
    }
}

impl From<AnalysisResult> for Reply {
    fn from(result: AnalysisResult) -> Self {
        Self::Result(result.into())
    }
}

/// Sends replies to exactly one client's outbound queue.
///
/// A full queue makes [`send`](Self::send) wait, so a slow reader stalls only
/// its own worker and never loses a reply. A closed queue removes the client
/// from the roster.
#[derive(Clone)]
pub struct ResultPublisher {
    roster: Arc<Roster>,
}

impl ResultPublisher {
    pub(crate) fn new(roster: Arc<Roster>) -> Self {
        Self { roster }
    }

    /// Deliver `reply` to `client`, waiting while its outbound queue is full.
    pub async fn send(&self, client: ClientId, reply: &Reply) -> Result<(), PipelineError> {
        let payload = reply.to_json()?;
        let outbound = self.outbound(client)?;

        if outbound.send(payload).await.is_err() {
            return Err(self.closed(client));
        }
        debug!(client_id = %client, "Reply queued");
        Ok(())
    }

    fn outbound(&self, client: ClientId) -> Result<mpsc::Sender<String>, PipelineError> {
        self.roster
            .outbound(client)
            .ok_or_else(|| PipelineError::Transport(format!("{client} is not connected")))
    }

    fn closed(&self, client: ClientId) -> PipelineError {
        self.roster.remove(client);
        PipelineError::Transport(format!("connection {client} already closed"))
    }
}
