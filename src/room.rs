//! Room actor
//!
//! The single source of truth for who is in the room and the only fan-out
//! point for published messages. Sessions are appended on join. There is no
//! leave protocol: a session whose client has stopped is pruned the next
//! time the room looks at its registry.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::address::{mailbox, Addr, Behavior, Mailbox};
use crate::error::{AdmissionError, SendError};
use crate::protocol::{MessagePosted, RoomCommand, SessionCommand, SessionEvent};
use crate::session::{Session, SessionRef};

/// Admission policy for a room
///
/// The default admits every join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomConfig {
    /// Refuse a join whose screen name is already registered
    pub unique_screen_names: bool,
    /// Refuse joins once this many sessions exist
    pub max_sessions: Option<usize>,
}

/// Join-only view of the room's address
///
/// Publishing goes through a session, so clients never get the full address.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    addr: Addr<RoomCommand>,
}

impl RoomHandle {
    /// Request a session; the outcome is delivered to `reply_to`
    pub fn join(&self, screen_name: impl Into<String>, reply_to: Addr<SessionEvent>) {
        self.addr.tell(RoomCommand::Join {
            screen_name: screen_name.into(),
            reply_to,
        });
    }

    /// Like `join`, but reports a stopped room
    pub fn try_join(
        &self,
        screen_name: impl Into<String>,
        reply_to: Addr<SessionEvent>,
    ) -> Result<(), SendError> {
        self.addr.try_tell(RoomCommand::Join {
            screen_name: screen_name.into(),
            reply_to,
        })
    }

    /// Check whether the room has stopped
    pub fn is_stopped(&self) -> bool {
        self.addr.is_stopped()
    }
}

/// The chat room actor
pub struct ChatRoom {
    config: RoomConfig,
    /// Live sessions in join order
    sessions: Vec<SessionRef>,
    /// Own address, handed to every spawned session
    myself: Addr<RoomCommand>,
    receiver: Mailbox<RoomCommand>,
    cancel_token: CancellationToken,
}

impl ChatRoom {
    /// Create a room without starting it
    pub fn new(config: RoomConfig, cancel_token: CancellationToken) -> (Self, RoomHandle) {
        let (myself, receiver) = mailbox();
        let handle = RoomHandle {
            addr: myself.clone(),
        };
        let room = Self {
            config,
            sessions: Vec::new(),
            myself,
            receiver,
            cancel_token,
        };
        (room, handle)
    }

    /// Create a room and run it on its own task
    ///
    /// The room and all of its sessions stop when `cancel_token` is cancelled.
    pub fn spawn(
        config: RoomConfig,
        cancel_token: CancellationToken,
    ) -> (RoomHandle, JoinHandle<()>) {
        let (room, handle) = Self::new(config, cancel_token);
        let task = tokio::spawn(room.run());
        (handle, task)
    }

    /// Run the room event loop
    ///
    /// Processes one command at a time until cancelled.
    pub async fn run(mut self) {
        info!("ChatRoom started");

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => break,
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if self.handle_command(cmd) == Behavior::Stopped {
                        break;
                    }
                }
            }
        }

        // Sessions hold child tokens
        self.cancel_token.cancel();
        info!("ChatRoom shutting down with {} sessions", self.sessions.len());
    }

    /// Number of registered sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions whose actor or client has stopped
    fn prune_sessions(&mut self) {
        let before = self.sessions.len();
        self.sessions.retain(SessionRef::is_live);

        let pruned = before - self.sessions.len();
        if pruned > 0 {
            debug!("Pruned {} stopped sessions", pruned);
        }
    }

    fn handle_command(&mut self, cmd: RoomCommand) -> Behavior {
        self.prune_sessions();

        match cmd {
            RoomCommand::Join {
                screen_name,
                reply_to,
            } => self.handle_join(screen_name, reply_to),
            RoomCommand::Publish {
                screen_name,
                message,
            } => self.handle_publish(screen_name, message),
        }
        Behavior::Same
    }

    fn handle_join(&mut self, screen_name: String, reply_to: Addr<SessionEvent>) {
        if let Err(reason) = self.admit(&screen_name) {
            info!("Denied session for '{}': {}", screen_name, reason);
            reply_to.tell(SessionEvent::SessionDenied {
                reason: reason.to_string(),
            });
            return;
        }

        let (session, _task) = Session::spawn(
            self.myself.clone(),
            screen_name,
            reply_to.clone(),
            self.cancel_token.child_token(),
        );

        info!("Granted session {} to '{}'", session.id, session.screen_name);

        reply_to.tell(SessionEvent::SessionGranted {
            handle: session.post_handle(),
        });
        self.sessions.push(session);

        debug!("Total sessions: {}", self.sessions.len());
    }

    fn handle_publish(&self, screen_name: String, message: String) {
        debug!(
            "'{}' published to {} sessions",
            screen_name,
            self.sessions.len()
        );

        let posted = MessagePosted {
            screen_name,
            message,
        };
        for session in &self.sessions {
            session.addr.tell(SessionCommand::NotifyClient {
                payload: posted.clone(),
            });
        }
    }

    fn admit(&self, screen_name: &str) -> Result<(), AdmissionError> {
        if let Some(max) = self.config.max_sessions {
            if self.sessions.len() >= max {
                return Err(AdmissionError::RoomFull);
            }
        }

        if self.config.unique_screen_names
            && self.sessions.iter().any(|s| s.screen_name == screen_name)
        {
            return Err(AdmissionError::NameTaken);
        }

        Ok(())
    }
}
