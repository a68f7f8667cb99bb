//! WebSocket transport for sensor clients
//!
//! Each socket gets three pieces:
//! - the reader (this handler) forwarding frames into a bounded inbound queue
//! - a worker draining that queue through the analysis pipeline
//! - a writer draining the client's outbound queue back onto the socket

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::handlers::DashboardState;
use crate::pipeline::{InboundFrame, PipelineError};

/// GET / (upgrade) - Sensor ingestion socket
pub async fn ws_handler(
    State(state): State<DashboardState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    upgrade: WebSocketUpgrade,
) -> impl IntoResponse {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    upgrade.on_upgrade(move |socket| handle_socket(state, socket, peer))
}

async fn handle_socket(state: DashboardState, socket: WebSocket, peer: Option<SocketAddr>) {
    let (mut sink, mut stream) = socket.split();
    let manager = Arc::clone(&state.connections);

    let (out_tx, mut out_rx) = mpsc::channel::<String>(state.queues.outbound_queue_depth.max(1));
    let client = manager.on_connect(out_tx, peer);
    let (inbound, worker) =
        manager.spawn_worker(client, state.queues.inbound_queue_depth, state.shutdown.child_token());

    let writer = tokio::spawn(async move {
        while let Some(payload) = out_rx.recv().await {
            if let Err(e) = sink.send(Message::Text(payload)).await {
                warn!(client_id = %client, error = %e, "WebSocket send failed");
                return;
            }
        }
        let _ = sink.close().await;
    });

    loop {
        let frame = tokio::select! {
            () = state.shutdown.cancelled() => {
                debug!(client_id = %client, "Closing socket for shutdown");
                break;
            }
            frame = stream.next() => frame,
        };

        let inbound_frame = match frame {
            Some(Ok(Message::Text(text))) => InboundFrame::Text(text),
            Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                Ok(text) => InboundFrame::Text(text),
                Err(_) => InboundFrame::Rejected(PipelineError::Decode(
                    "binary frame is not valid UTF-8".to_string(),
                )),
            },
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                let err = PipelineError::Transport(e.to_string());
                warn!(client_id = %client, kind = %err.kind(), error = %err, "Connection dropped");
                break;
            }
        };

        if inbound.send(inbound_frame).await.is_err() {
            error!(client_id = %client, "Inbound worker stopped unexpectedly");
            break;
        }
    }

    // Let queued messages finish before the roster drops the reply channel.
    drop(inbound);
    if let Err(e) = worker.await {
        error!(client_id = %client, error = %e, "Inbound worker join failed");
    }
    manager.on_disconnect(client);

    if let Err(e) = writer.await {
        error!(client_id = %client, error = %e, "Writer task join failed");
    }
    info!(client_id = %client, "Socket closed");
}
