//! Chat system context
//!
//! Owns the root cancellation token and the room task. Clients are spawned
//! under child tokens, watched through their join handles, and the whole
//! system is torn down with `shutdown`.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::client::{Gabbler, GabblerOutcome, DEFAULT_GREETING};
use crate::error::AppError;
use crate::room::{ChatRoom, RoomConfig, RoomHandle};

/// Screen name the demo client joins under
pub const DEMO_SCREEN_NAME: &str = "ol' Gabbler";

/// Root of a running chat room and its actors
pub struct ChatSystem {
    name: String,
    room: RoomHandle,
    room_task: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl ChatSystem {
    /// Start the room actor
    pub fn start(name: impl Into<String>, config: RoomConfig) -> Self {
        let name = name.into();
        let cancel_token = CancellationToken::new();
        let (room, room_task) = ChatRoom::spawn(config, cancel_token.child_token());

        info!("Chat system '{}' started", name);

        Self {
            name,
            room,
            room_task,
            cancel_token,
        }
    }

    /// Join-only handle to the room
    pub fn room(&self) -> &RoomHandle {
        &self.room
    }

    /// Token for actors that should stop with this system
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    /// Wait for a watched actor to terminate
    ///
    /// A panicked actor surfaces as `AppError::ActorFailed`.
    pub async fn watch<T>(&self, task: JoinHandle<T>) -> Result<T, AppError> {
        task.await.map_err(|e| {
            error!("Watched actor in '{}' failed: {}", self.name, e);
            AppError::from(e)
        })
    }

    /// Stop every actor and wait for the room to finish
    pub async fn shutdown(self) -> Result<(), AppError> {
        info!("Chat system '{}' shutting down", self.name);
        self.cancel_token.cancel();
        self.room_task.await?;
        Ok(())
    }
}

/// Run-once demo: one gabbler joins, greets, and the system stops with it
pub async fn run_demo(config: RoomConfig) -> Result<GabblerOutcome, AppError> {
    let system = ChatSystem::start("ChatRoomDemo", config);

    let (gabbler, gabbler_task) = Gabbler::spawn(DEFAULT_GREETING, system.child_token());
    system.room().join(DEMO_SCREEN_NAME, gabbler);

    let outcome = system.watch(gabbler_task).await;
    system.shutdown().await?;
    outcome
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::address::mailbox;
    use crate::protocol::{MessagePosted, SessionEvent};

    const WAIT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_demo_runs_to_completion() {
        let outcome = timeout(WAIT, run_demo(RoomConfig::default()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            outcome,
            GabblerOutcome::Posted(MessagePosted {
                screen_name: DEMO_SCREEN_NAME.to_string(),
                message: DEFAULT_GREETING.to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_room() {
        let system = ChatSystem::start("test", RoomConfig::default());
        let room = system.room().clone();

        timeout(WAIT, system.shutdown()).await.unwrap().unwrap();
        assert!(room.is_stopped());

        // A join after shutdown is never answered
        let (client, mut inbox) = mailbox::<SessionEvent>();
        room.join("late", client.clone());
        assert!(timeout(Duration::from_millis(100), inbox.recv()).await.is_err());
        drop(client);
    }

    #[tokio::test]
    async fn test_watch_reports_panicked_actor() {
        let system = ChatSystem::start("test", RoomConfig::default());

        let task = tokio::spawn(async {
            panic!("boom");
        });
        let result: Result<(), AppError> = system.watch(task).await;

        assert!(matches!(result, Err(AppError::ActorFailed(_))));
        system.shutdown().await.unwrap();
    }
}
