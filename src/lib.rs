//! Broadcast Chat Room Library
//!
//! A chat room built from tokio tasks that talk only through typed,
//! asynchronous messages. No state is shared between actors.
//!
//! # Actors
//! - `ChatRoom`: singleton registry of sessions and the fan-out point
//! - `Session`: one per joined client, relays posts to the room and
//!   broadcasts back to the client
//! - clients: anything holding an `Addr<SessionEvent>`, such as the demo
//!   `Gabbler` or a WebSocket connection
//!
//! # Flow
//! Client → Room (`Join`) → Room spawns Session and replies with a
//! post-only `PostHandle` → Client → Session (`post`) → Room (`Publish`)
//! → every Session (`NotifyClient`) → every Client (`MessagePosted`).
//!
//! # Example
//! ```ignore
//! use chat_room_actors::{mailbox, ChatSystem, RoomConfig, SessionEvent};
//!
//! #[tokio::main]
//! async fn main() {
//!     let system = ChatSystem::start("example", RoomConfig::default());
//!     let (me, mut inbox) = mailbox::<SessionEvent>();
//!
//!     system.room().join("alice", me);
//!     if let Some(SessionEvent::SessionGranted { handle }) = inbox.recv().await {
//!         handle.post("hi");
//!     }
//!     // Some(SessionEvent::MessagePosted(..)) arrives next
//!     let _ = inbox.recv().await;
//!
//!     system.shutdown().await.unwrap();
//! }
//! ```

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod greeter;
pub mod handler;
pub mod message;
pub mod protocol;
pub mod room;
pub mod session;
pub mod system;
pub mod types;

// Re-export main types for convenience
pub use address::{mailbox, Addr, Behavior, Mailbox};
pub use client::{Gabbler, GabblerOutcome};
pub use config::{Config, ConfigError, Mode};
pub use error::{AdmissionError, AppError, SendError};
pub use greeter::{Greet, Greeted, Greeter};
pub use handler::{handle_connection, serve};
pub use message::{ClientMessage, ErrorCode, ServerMessage};
pub use protocol::{MessagePosted, RoomCommand, SessionEvent};
pub use room::{ChatRoom, RoomConfig, RoomHandle};
pub use session::PostHandle;
pub use system::{run_demo, ChatSystem};
pub use types::{ClientId, SessionId};
