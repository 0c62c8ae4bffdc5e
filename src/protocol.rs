//! Actor message protocol
//!
//! Three message families, one per receiving role:
//! - `RoomCommand`: handled by the room
//! - `SessionCommand`: handled by a session
//! - `SessionEvent`: handled by a client

use crate::address::Addr;
use crate::session::PostHandle;

/// Messages accepted by the room actor
#[derive(Debug)]
pub enum RoomCommand {
    /// Ask for a new session under `screen_name`; the outcome goes to `reply_to`
    Join {
        screen_name: String,
        reply_to: Addr<SessionEvent>,
    },
    /// Broadcast `message` on behalf of `screen_name` (sent by sessions)
    Publish {
        screen_name: String,
        message: String,
    },
}

/// Messages delivered to a client
#[derive(Debug)]
pub enum SessionEvent {
    /// Join accepted; `handle` is the only way to post into the room
    SessionGranted { handle: PostHandle },
    /// Join refused
    SessionDenied { reason: String },
    /// Someone in the room posted a message
    MessagePosted(MessagePosted),
}

/// A broadcast chat line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePosted {
    pub screen_name: String,
    pub message: String,
}

/// Messages accepted by a session actor
///
/// Crate-private: clients only ever see a `PostHandle`, so they cannot
/// forge `NotifyClient`.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    /// Sent by the owning client
    Post { message: String },
    /// Sent by the room during fan-out
    NotifyClient { payload: MessagePosted },
}
