//! Demonstration client actor
//!
//! The gabbler joins the room, posts a single greeting once its session is
//! granted, and stops as soon as it hears anything back.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::address::{mailbox, Addr, Behavior, Mailbox};
use crate::protocol::{MessagePosted, SessionEvent};
use crate::session::PostHandle;

/// Greeting posted once a session is granted
pub const DEFAULT_GREETING: &str = "Hello World!";

/// Why a gabbler stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GabblerOutcome {
    /// The room refused the join
    Denied(String),
    /// First broadcast seen after joining
    Posted(MessagePosted),
    /// Stopped by its supervisor before anything arrived
    Cancelled,
}

/// A client that says hello once
pub struct Gabbler {
    greeting: String,
    /// Kept so the session stays reachable until the gabbler stops
    handle: Option<PostHandle>,
    outcome: Option<GabblerOutcome>,
    receiver: Mailbox<SessionEvent>,
    cancel_token: CancellationToken,
}

impl Gabbler {
    /// Spawn a gabbler posting `greeting`
    ///
    /// The task resolves to the reason it stopped.
    pub fn spawn(
        greeting: impl Into<String>,
        cancel_token: CancellationToken,
    ) -> (Addr<SessionEvent>, JoinHandle<GabblerOutcome>) {
        let (addr, receiver) = mailbox();
        let gabbler = Self {
            greeting: greeting.into(),
            handle: None,
            outcome: None,
            receiver,
            cancel_token,
        };
        (addr, tokio::spawn(gabbler.run()))
    }

    async fn run(mut self) -> GabblerOutcome {
        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => break,
                event = self.receiver.recv() => {
                    let Some(event) = event else { break };
                    if self.handle_event(event) == Behavior::Stopped {
                        break;
                    }
                }
            }
        }

        self.outcome.unwrap_or(GabblerOutcome::Cancelled)
    }

    fn handle_event(&mut self, event: SessionEvent) -> Behavior {
        match event {
            SessionEvent::SessionDenied { reason } => {
                info!("Cannot start chat room session: {}", reason);
                self.outcome = Some(GabblerOutcome::Denied(reason));
                Behavior::Stopped
            }
            SessionEvent::SessionGranted { handle } => {
                debug!("Session {} granted, posting greeting", handle.id());
                handle.post(self.greeting.clone());
                self.handle = Some(handle);
                Behavior::Same
            }
            SessionEvent::MessagePosted(posted) => {
                info!(
                    "Message has been posted by '{}': {}",
                    posted.screen_name, posted.message
                );
                self.outcome = Some(GabblerOutcome::Posted(posted));
                Behavior::Stopped
            }
        }
    }
}
