//! Session actor
//!
//! One session per joined client. It relays the client's posts to the room
//! under the screen name captured at creation, and relays the room's
//! broadcasts back to the client. Its identity never changes. A session
//! stops once its client's mailbox is gone.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::address::{mailbox, Addr, Behavior, Mailbox};
use crate::error::SendError;
use crate::protocol::{RoomCommand, SessionCommand, SessionEvent};
use crate::types::SessionId;

/// Post-only view of a session's address
///
/// This is what a client receives in `SessionGranted`. It can post into the
/// room and nothing else.
#[derive(Clone)]
pub struct PostHandle {
    id: SessionId,
    screen_name: String,
    addr: Addr<SessionCommand>,
}

impl PostHandle {
    /// Session this handle points at
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Screen name the session posts under
    pub fn screen_name(&self) -> &str {
        &self.screen_name
    }

    /// Post a message to the room (fire-and-forget)
    pub fn post(&self, message: impl Into<String>) {
        self.addr.tell(SessionCommand::Post {
            message: message.into(),
        });
    }

    /// Post a message, reporting a stopped session
    pub fn try_post(&self, message: impl Into<String>) -> Result<(), SendError> {
        self.addr.try_tell(SessionCommand::Post {
            message: message.into(),
        })
    }
}

impl std::fmt::Debug for PostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostHandle")
            .field("id", &self.id)
            .field("screen_name", &self.screen_name)
            .finish()
    }
}

/// A spawned session as seen by the room
///
/// Holds the full address so the room can send `NotifyClient`.
#[derive(Debug)]
pub(crate) struct SessionRef {
    pub id: SessionId,
    pub screen_name: String,
    pub addr: Addr<SessionCommand>,
    pub client: Addr<SessionEvent>,
}

impl SessionRef {
    /// Both the session and its client are still running
    pub fn is_live(&self) -> bool {
        !self.addr.is_stopped() && !self.client.is_stopped()
    }

    /// Narrow to the client-facing capability
    pub fn post_handle(&self) -> PostHandle {
        PostHandle {
            id: self.id,
            screen_name: self.screen_name.clone(),
            addr: self.addr.clone(),
        }
    }
}

pub(crate) struct Session {
    id: SessionId,
    room: Addr<RoomCommand>,
    screen_name: String,
    client: Addr<SessionEvent>,
    receiver: Mailbox<SessionCommand>,
    cancel_token: CancellationToken,
}

impl Session {
    /// Spawn a session task
    pub fn spawn(
        room: Addr<RoomCommand>,
        screen_name: String,
        client: Addr<SessionEvent>,
        cancel_token: CancellationToken,
    ) -> (SessionRef, JoinHandle<()>) {
        let (addr, receiver) = mailbox();
        let id = SessionId::new();

        let session = Self {
            id,
            room,
            screen_name: screen_name.clone(),
            client: client.clone(),
            receiver,
            cancel_token,
        };
        let task = tokio::spawn(session.run());

        (
            SessionRef {
                id,
                screen_name,
                addr,
                client,
            },
            task,
        )
    }

    async fn run(mut self) {
        debug!(session_id = %self.id, screen_name = %self.screen_name, "Session started");

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => break,
                () = self.client.closed() => {
                    debug!(session_id = %self.id, "Client gone");
                    break;
                }
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if self.handle_command(cmd) == Behavior::Stopped {
                        break;
                    }
                }
            }
        }

        debug!(session_id = %self.id, "Session stopped");
    }

    fn handle_command(&self, cmd: SessionCommand) -> Behavior {
        match cmd {
            SessionCommand::Post { message } => {
                // Always the captured name, never one supplied by the client
                self.room.tell(RoomCommand::Publish {
                    screen_name: self.screen_name.clone(),
                    message,
                });
            }
            SessionCommand::NotifyClient { payload } => {
                if self
                    .client
                    .try_tell(SessionEvent::MessagePosted(payload))
                    .is_err()
                {
                    return Behavior::Stopped;
                }
            }
        }
        Behavior::Same
    }
}
