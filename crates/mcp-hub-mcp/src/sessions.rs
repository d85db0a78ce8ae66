// crates/mcp-hub-mcp/src/sessions.rs
// ============================================================================
// Module: Session Registry
// Description: Maps opaque session ids to live transport bindings.
// Purpose: Own session creation, lookup, and teardown for both transports.
// Dependencies: rand, tokio
// ============================================================================

//! ## Overview
//! A [`SessionRegistry`] is an explicit object owned by the hub state; there
//! is no process-global map, so several hubs can coexist in one test binary.
//! Session ids are random UUIDv4 strings drawn from the OS RNG.
//!
//! Streaming sessions queue server-initiated messages until the client
//! drains them. Push sessions carry an inbox (client messages, consumed by a
//! per-session worker) and an outbox feeding the open downstream stream.
//! Each session serializes its own message handling through `turn`.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use mcp_hub_core::time::unix_millis;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::jsonrpc::InboundMessage;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum queued server-initiated messages per streaming session.
pub const MAX_PENDING_MESSAGES: usize = 256;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Transport a session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Session-header request/response transport.
    Streaming,
    /// Legacy push-stream (SSE) transport.
    Sse,
}

impl TransportKind {
    /// Stable label for audit events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Sse => "sse",
        }
    }
}

/// MCP logging severity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Notice.
    Notice,
    /// Warning.
    Warning,
    /// Error.
    Error,
    /// Critical.
    Critical,
    /// Alert.
    Alert,
    /// Emergency.
    Emergency,
}

impl LogLevel {
    /// Parses an MCP level name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "notice" => Some(Self::Notice),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            "alert" => Some(Self::Alert),
            "emergency" => Some(Self::Emergency),
            _ => None,
        }
    }
}

/// Outbound side of a session.
#[derive(Debug)]
pub enum SessionChannel {
    /// Messages queued for the next drain request.
    Streaming {
        /// Pending server-initiated messages.
        pending: Mutex<VecDeque<Value>>,
    },
    /// Messages pushed onto the open downstream stream.
    Push {
        /// Client messages awaiting the session worker.
        inbox: mpsc::Sender<InboundMessage>,
        /// Replies and notifications for the downstream stream.
        outbox: mpsc::Sender<Value>,
    },
}

/// One live client session.
#[derive(Debug)]
pub struct Session {
    /// Opaque identifier.
    id: String,
    /// Creation time (unix milliseconds).
    created_at_ms: i64,
    /// Outbound binding.
    channel: SessionChannel,
    /// Minimum level for log notifications; `None` disables them.
    log_level: Mutex<Option<LogLevel>>,
    /// Serializes message handling within the session.
    turn: tokio::sync::Mutex<()>,
}

/// Locks a std mutex, recovering the data from a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time (unix milliseconds).
    #[must_use]
    pub const fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    /// Transport the session is bound to.
    #[must_use]
    pub const fn transport(&self) -> TransportKind {
        match self.channel {
            SessionChannel::Streaming {
                ..
            } => TransportKind::Streaming,
            SessionChannel::Push {
                ..
            } => TransportKind::Sse,
        }
    }

    /// Outbound binding.
    #[must_use]
    pub const fn channel(&self) -> &SessionChannel {
        &self.channel
    }

    /// Waits for this session's turn to handle a message.
    pub async fn turn(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    /// Sets the minimum log notification level.
    pub fn set_log_level(&self, level: LogLevel) {
        *lock(&self.log_level) = Some(level);
    }

    /// Returns true when a notification at `level` should be sent.
    #[must_use]
    pub fn wants_log(&self, level: LogLevel) -> bool {
        lock(&self.log_level).is_some_and(|minimum| level >= minimum)
    }

    /// Queues or pushes a server-initiated message without waiting.
    ///
    /// Streaming sessions drop the oldest message when the queue is full;
    /// push sessions drop the message when the stream is full or closed.
    pub fn notify(&self, message: Value) {
        match &self.channel {
            SessionChannel::Streaming {
                pending,
            } => {
                let mut pending = lock(pending);
                if pending.len() >= MAX_PENDING_MESSAGES {
                    pending.pop_front();
                }
                pending.push_back(message);
            }
            SessionChannel::Push {
                outbox,
                ..
            } => {
                let _ = outbox.try_send(message);
            }
        }
    }

    /// Takes every queued message (streaming sessions only).
    #[must_use]
    pub fn drain(&self) -> Vec<Value> {
        match &self.channel {
            SessionChannel::Streaming {
                pending,
            } => lock(pending).drain(..).collect(),
            SessionChannel::Push {
                ..
            } => Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Concurrency-safe map from session id to session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Live sessions.
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session with a fresh unique id.
    pub fn create(&self, channel: SessionChannel) -> Arc<Session> {
        let mut sessions = lock(&self.sessions);
        let mut id = new_session_id();
        while sessions.contains_key(&id) {
            id = new_session_id();
        }
        let session = Arc::new(Session {
            id: id.clone(),
            created_at_ms: unix_millis(),
            channel,
            log_level: Mutex::new(None),
            turn: tokio::sync::Mutex::new(()),
        });
        sessions.insert(id, Arc::clone(&session));
        session
    }

    /// Registers a new streaming session.
    pub fn create_streaming(&self) -> Arc<Session> {
        self.create(SessionChannel::Streaming {
            pending: Mutex::new(VecDeque::new()),
        })
    }

    /// Resolves the session a streaming message addresses.
    ///
    /// With no id, a session is created only for `initialize`. A supplied id
    /// must already exist; unknown ids never create a session.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MissingSessionId`] or
    /// [`TransportError::SessionNotFound`].
    pub fn create_or_resolve(
        &self,
        id: Option<&str>,
        is_initialize: bool,
    ) -> Result<(Arc<Session>, bool), TransportError> {
        match id {
            Some(id) => {
                self.lookup(id).map(|session| (session, false)).ok_or(TransportError::SessionNotFound)
            }
            None if is_initialize => Ok((self.create_streaming(), true)),
            None => Err(TransportError::MissingSessionId),
        }
    }

    /// Looks up a live session.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<Arc<Session>> {
        lock(&self.sessions).get(id).cloned()
    }

    /// Removes a session, returning it when it was live.
    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        lock(&self.sessions).remove(id)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    /// Returns true when no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generates a random UUIDv4 string.
#[must_use]
pub fn new_session_id() -> String {
    let mut bytes = [0_u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("{}-{}-{}-{}-{}", &hex[0..8], &hex[8..12], &hex[12..16], &hex[16..20], &hex[20..32])
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
