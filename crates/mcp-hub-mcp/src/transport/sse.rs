// crates/mcp-hub-mcp/src/transport/sse.rs
// ============================================================================
// Module: Push-Stream Transport Adapter
// Description: Legacy SSE transport with a paired message endpoint.
// Purpose: Allocate a session per open stream and push replies down it.
// Dependencies: axum, serde, tokio, tokio-stream
// ============================================================================

//! ## Overview
//! `GET <sse-path>` registers a session immediately and opens an event
//! stream whose first event names the message endpoint for that session.
//! Client messages posted to `<messages-path>?sessionId=` are queued to a
//! per-session worker; replies and notifications go out on the stream.
//! When the client disconnects, the stream is dropped and the session with
//! it.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;
use std::time::Instant;

use axum::body::Body;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::sse::Event;
use axum::response::sse::KeepAlive;
use axum::response::sse::Sse;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use super::audit_message;
use super::read_body;
use super::reject;
use crate::audit::HubSessionEvent;
use crate::audit::SessionAction;
use crate::error::TransportError;
use crate::jsonrpc::InboundMessage;
use crate::jsonrpc::handle_request;
use crate::jsonrpc::parse_request;
use crate::server::HubState;
use crate::sessions::Session;
use crate::sessions::SessionChannel;
use crate::sessions::TransportKind;

/// Queued client messages per session.
const INBOX_CAPACITY: usize = 64;
/// Queued outbound events per session.
const OUTBOX_CAPACITY: usize = 256;
/// Keep-alive comment interval.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Query parameters of the message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageParams {
    /// Target session.
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Removes the session when the downstream stream is dropped.
struct StreamGuard {
    /// Hub state owning the registry.
    state: Arc<HubState>,
    /// Session bound to the stream.
    session_id: String,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if self.state.sessions.remove(&self.session_id).is_some() {
            self.state.audit.record_session(&HubSessionEvent::new(
                &self.session_id,
                TransportKind::Sse,
                SessionAction::Closed,
                "stream_closed",
            ));
        }
    }
}

/// Handles `GET <sse-path>`: opens the downstream stream.
pub async fn handle_open(State(state): State<Arc<HubState>>) -> Response {
    let (inbox, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
    let (outbox, outbox_rx) = mpsc::channel::<Value>(OUTBOX_CAPACITY);
    let session = state.sessions.create(SessionChannel::Push {
        inbox,
        outbox,
    });
    let session_id = session.id().to_string();
    state.audit.record_session(&HubSessionEvent::new(
        &session_id,
        TransportKind::Sse,
        SessionAction::Opened,
        "stream_opened",
    ));
    tokio::spawn(run_session_worker(Arc::clone(&state), Arc::downgrade(&session), inbox_rx));
    drop(session);

    let endpoint = format!("{}?sessionId={session_id}", state.paths.messages);
    let guard = StreamGuard {
        state: Arc::clone(&state),
        session_id,
    };
    let messages = ReceiverStream::new(outbox_rx).map(move |message| {
        let _bound = &guard;
        Event::default().event("message").data(message.to_string())
    });
    let stream = tokio_stream::once(Event::default().event("endpoint").data(endpoint))
        .chain(messages)
        .map(Ok::<_, Infallible>);
    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)).into_response()
}

/// Handles `POST <messages-path>?sessionId=`.
pub async fn handle_message(
    State(state): State<Arc<HubState>>,
    Query(params): Query<MessageParams>,
    body: Body,
) -> Response {
    let path = state.paths.messages.as_str();
    let session = params.session_id.as_deref().and_then(|id| state.sessions.lookup(id));
    let Some(session) = session else {
        return reject(&state, path, TransportError::NoTransportForSession);
    };
    let SessionChannel::Push {
        inbox,
        ..
    } = session.channel()
    else {
        return reject(&state, path, TransportError::NoTransportForSession);
    };
    let bytes = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => return reject(&state, path, err),
    };
    let request = match parse_request(&bytes) {
        Ok(request) => request,
        Err(err) => return reject(&state, path, err),
    };
    let message = InboundMessage {
        request,
        bytes: bytes.len(),
    };
    if inbox.send(message).await.is_err() {
        return reject(&state, path, TransportError::NoTransportForSession);
    }
    (StatusCode::ACCEPTED, "Accepted").into_response()
}

/// Handles a push session's messages in arrival order.
///
/// Exits once the session is gone and its inbox closes.
async fn run_session_worker(
    state: Arc<HubState>,
    session: Weak<Session>,
    mut inbox: mpsc::Receiver<InboundMessage>,
) {
    while let Some(message) = inbox.recv().await {
        let Some(session) = session.upgrade() else {
            break;
        };
        let started = Instant::now();
        let (reply, report) = {
            let _turn = session.turn().await;
            handle_request(&state.dispatcher, &session, message.request).await
        };
        if let Some(reply) = reply
            && let SessionChannel::Push {
                outbox,
                ..
            } = session.channel()
        {
            let _ = outbox.send(reply.to_value()).await;
        }
        audit_message(&state, &session, report, message.bytes, started);
    }
}
