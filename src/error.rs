//! Error types for the chat room
//!
//! Defines application-level errors, mailbox send errors and the
//! admission refusals a room can hand back as `SessionDenied`.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (connection or actor termination) and
/// business errors (send error message to client).
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The room actor has stopped (fatal for a connection)
    #[error("Chat room is not running")]
    RoomUnavailable,

    /// Client posted before a session was granted
    #[error("Not joined")]
    NotJoined,

    /// Client asked for a second session on one connection
    #[error("Already joined")]
    AlreadyJoined,

    /// A watched actor task panicked or was aborted
    #[error("Actor failed: {0}")]
    ActorFailed(#[from] tokio::task::JoinError),
}

/// Message send errors
///
/// Occurs when attempting to send to an actor whose mailbox is gone.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}

impl From<SendError> for AppError {
    fn from(_: SendError) -> Self {
        AppError::RoomUnavailable
    }
}

/// Reasons a room refuses a join
///
/// The display text is the `reason` carried by `SessionDenied`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// Another session already uses this screen name
    #[error("name already taken")]
    NameTaken,

    /// The room reached its configured session limit
    #[error("room is full")]
    RoomFull,
}
