//! Connection manager - client roster and per-message dispatch
//!
//! The transport layer reports three events per client: connect, message and
//! disconnect. Each message runs synchronously through
//! decode -> analyze -> history append -> reply, with no shared state other
//! than the history store, so one client's bad input never touches another.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::publisher::{Reply, ResultPublisher};
use super::PipelineError;
use crate::acquisition;
use crate::processing;
use crate::storage::HistoryStore;
use crate::types::{AnalysisResult, HistoryEntry};

// ============================================================================
// Client Identity
// ============================================================================

/// Opaque identifier for one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClientId(u64);

impl ClientId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

// ============================================================================
// Roster
// ============================================================================

struct ClientHandle {
    outbound: mpsc::Sender<String>,
    peer: Option<SocketAddr>,
    connected_at: DateTime<Utc>,
}

/// Public view of a connected client.
#[derive(Debug, Clone, Serialize)]
pub struct ClientInfo {
    pub id: ClientId,
    pub peer: Option<SocketAddr>,
    pub connected_at: DateTime<Utc>,
}

/// One item on a connection's inbound queue.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Payload to decode and analyze
    Text(String),
    /// Frame the transport could not turn into text
    Rejected(PipelineError),
}

impl From<String> for InboundFrame {
    fn from(raw: String) -> Self {
        Self::Text(raw)
    }
}

/// Active connections keyed by id. Shared with the publisher.
#[derive(Default)]
pub(crate) struct Roster {
    next_id: AtomicU64,
    clients: Mutex<HashMap<ClientId, ClientHandle>>,
}

impl Roster {
    pub(crate) fn insert(
        &self,
        outbound: mpsc::Sender<String>,
        peer: Option<SocketAddr>,
    ) -> ClientId {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.lock().insert(
            id,
            ClientHandle {
                outbound,
                peer,
                connected_at: Utc::now(),
            },
        );
        id
    }

    pub(crate) fn remove(&self, id: ClientId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub(crate) fn outbound(&self, id: ClientId) -> Option<mpsc::Sender<String>> {
        self.lock().get(&id).map(|c| c.outbound.clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn clients(&self) -> Vec<ClientInfo> {
        let mut clients: Vec<ClientInfo> = self
            .lock()
            .iter()
            .map(|(&id, c)| ClientInfo {
                id,
                peer: c.peer,
                connected_at: c.connected_at,
            })
            .collect();
        clients.sort_by_key(|c| c.id);
        clients
    }

    fn total_connections(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, ClientHandle>> {
        self.clients.lock().unwrap_or_else(|e| {
            warn!("Roster mutex poisoned, recovering");
            e.into_inner()
        })
    }
}

// ============================================================================
// Connection Manager
// ============================================================================

/// Counters for the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionStats {
    pub active_connections: usize,
    pub total_connections: u64,
    pub messages_processed: u64,
    pub messages_rejected: u64,
}

/// Routes client events through the analysis pipeline.
pub struct ConnectionManager {
    roster: Arc<Roster>,
    publisher: ResultPublisher,
    history: Arc<HistoryStore>,
    messages_processed: AtomicU64,
    messages_rejected: AtomicU64,
}

impl ConnectionManager {
    pub fn new(history: Arc<HistoryStore>) -> Self {
        let roster = Arc::new(Roster::default());
        Self {
            publisher: ResultPublisher::new(Arc::clone(&roster)),
            roster,
            history,
            messages_processed: AtomicU64::new(0),
            messages_rejected: AtomicU64::new(0),
        }
    }

    /// Register a new client whose replies go to `outbound`.
    pub fn on_connect(&self, outbound: mpsc::Sender<String>, peer: Option<SocketAddr>) -> ClientId {
        let id = self.roster.insert(outbound, peer);
        info!(
            client_id = %id,
            peer = ?peer,
            active = self.roster.len(),
            "New client connected"
        );
        id
    }

    /// Remove a client from the roster. Safe to call more than once.
    pub fn on_disconnect(&self, client: ClientId) {
        if self.roster.remove(client) {
            info!(client_id = %client, active = self.roster.len(), "Client disconnected");
        }
    }

    /// Process one raw message from `client` and deliver the reply, waiting
    /// for room in the client's outbound queue.
    ///
    /// Returns the analysis outcome. Delivery failures are logged and do not
    /// change the outcome.
    pub async fn on_message(
        &self,
        client: ClientId,
        raw: &str,
    ) -> Result<AnalysisResult, PipelineError> {
        let outcome = acquisition::decode(raw).and_then(|request| processing::analyze(&request));

        let reply = match &outcome {
            Ok(result) => {
                self.history.append(HistoryEntry::now(*result));
                self.messages_processed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    client_id = %client,
                    rms = result.rms,
                    dominant_frequency = result.dominant_frequency,
                    "Analysis complete"
                );
                Reply::from(*result)
            }
            Err(e) => {
                self.count_rejected(client, e);
                Reply::error(e)
            }
        };

        self.deliver(client, &reply).await;
        outcome
    }

    /// Answer a frame the transport could not turn into text.
    pub async fn on_rejected(&self, client: ClientId, err: &PipelineError) {
        self.count_rejected(client, err);
        self.deliver(client, &Reply::error(err)).await;
    }

    fn count_rejected(&self, client: ClientId, err: &PipelineError) {
        self.messages_rejected.fetch_add(1, Ordering::Relaxed);
        warn!(client_id = %client, kind = %err.kind(), error = %err, "Rejected message");
    }

    async fn deliver(&self, client: ClientId, reply: &Reply) {
        if let Err(e) = self.publisher.send(client, reply).await {
            warn!(client_id = %client, error = %e, "Failed to deliver reply");
        }
    }

    /// Spawn the per-connection worker that drains a bounded inbound queue.
    ///
    /// The returned sender is the only way to feed the worker; when it is
    /// dropped the worker finishes the queued frames and exits. The worker
    /// waits on a full outbound queue, which in turn fills the inbound queue
    /// and makes the reader's `send().await` wait. Only this client slows down.
    ///
    /// Cancelling `shutdown` stops the worker even while it waits on delivery;
    /// frames still queued are dropped.
    pub fn spawn_worker(
        self: &Arc<Self>,
        client: ClientId,
        queue_depth: usize,
        shutdown: CancellationToken,
    ) -> (mpsc::Sender<InboundFrame>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<InboundFrame>(queue_depth.max(1));
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                let frame = tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    frame = rx.recv() => match frame {
                        Some(frame) => frame,
                        None => break,
                    },
                };

                let work = async {
                    match frame {
                        InboundFrame::Text(raw) => {
                            // Counted and logged inside on_message.
                            let _outcome = manager.on_message(client, &raw).await;
                        }
                        InboundFrame::Rejected(err) => manager.on_rejected(client, &err).await,
                    }
                };

                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => {
                        debug!(client_id = %client, "Worker cancelled during delivery");
                        break;
                    }
                    () = work => {}
                }
            }
            debug!(client_id = %client, "Inbound worker finished");
        });
        (tx, handle)
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn active_count(&self) -> usize {
        self.roster.len()
    }

    pub fn clients(&self) -> Vec<ClientInfo> {
        self.roster.clients()
    }

    pub fn stats(&self) -> ConnectionStats {
        ConnectionStats {
            active_connections: self.roster.len(),
            total_connections: self.roster.total_connections(),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            messages_rejected: self.messages_rejected.load(Ordering::Relaxed),
        }
    }
}
