//! Actor addresses and mailboxes
//!
//! Every actor in this crate is a tokio task that owns exclusive state and
//! drains a single unbounded FIFO channel. The sending half of that channel
//! is the actor's address; handing it around is the only way to reach the
//! actor.

use std::fmt;

use tokio::sync::mpsc;
use tracing::trace;

use crate::error::SendError;

/// Receiving side of an actor's inbox
pub type Mailbox<M> = mpsc::UnboundedReceiver<M>;

/// Create a fresh inbox and the address that feeds it
pub fn mailbox<M>() -> (Addr<M>, Mailbox<M>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Addr { sender }, receiver)
}

/// Address of an actor accepting messages of type `M`
///
/// Cheap to clone and safe to send between tasks.
pub struct Addr<M> {
    sender: mpsc::UnboundedSender<M>,
}

impl<M> Addr<M> {
    /// Send without waiting.
    ///
    /// Messages to a stopped actor are dropped silently (at-most-once).
    pub fn tell(&self, msg: M) {
        if self.sender.send(msg).is_err() {
            trace!("Dropping message for stopped actor");
        }
    }

    /// Send without waiting, reporting whether the actor is still there
    pub fn try_tell(&self, msg: M) -> Result<(), SendError> {
        self.sender.send(msg).map_err(|_| SendError::ChannelClosed)
    }

    /// Check whether the actor behind this address has stopped
    pub fn is_stopped(&self) -> bool {
        self.sender.is_closed()
    }

    /// Wait until the actor behind this address has stopped
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    /// Check whether two addresses point at the same actor
    pub fn same_actor(&self, other: &Addr<M>) -> bool {
        self.sender.same_channel(&other.sender)
    }
}

impl<M> Clone for Addr<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M> fmt::Debug for Addr<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Addr")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// What an actor does after handling a message
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Keep the current behavior for the next message
    Same,
    /// Stop the actor
    Stopped,
}
