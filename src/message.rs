//! WebSocket message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. These are the gateway's
//! wire shapes; the actors never see them.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::protocol::MessagePosted;

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join the room under a screen name
    Join { screen_name: String },
    /// Post a chat message through the granted session
    Post { message: String },
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Join accepted
    SessionGranted { session_id: String },
    /// Join refused by the room
    SessionDenied { reason: String },
    /// Broadcast from the room
    MessagePosted { screen_name: String, message: String },
    /// Error occurred
    Error { code: ErrorCode, message: String },
}

/// Error codes for ServerMessage::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Posted before a session was granted
    NotJoined,
    /// Joined twice on one connection
    AlreadyJoined,
    /// Invalid message format
    InvalidMessage,
    /// The room has stopped; the connection closes after this
    RoomUnavailable,
}

impl From<MessagePosted> for ServerMessage {
    fn from(posted: MessagePosted) -> Self {
        ServerMessage::MessagePosted {
            screen_name: posted.screen_name,
            message: posted.message,
        }
    }
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let (code, message) = match &err {
            AppError::NotJoined => {
                (ErrorCode::NotJoined, "You have not joined the room".to_string())
            }
            AppError::AlreadyJoined => {
                (ErrorCode::AlreadyJoined, "You have already joined the room".to_string())
            }
            AppError::RoomUnavailable => {
                (ErrorCode::RoomUnavailable, "Chat room is not running".to_string())
            }
            AppError::Json(e) => {
                (ErrorCode::InvalidMessage, format!("Invalid message format: {}", e))
            }
            // Fatal errors are not typically converted (connection closes)
            _ => (ErrorCode::InvalidMessage, "Internal error".to_string()),
        };
        ServerMessage::Error { code, message }
    }
}
