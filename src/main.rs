//! Broadcast Chat Room - Entry Point
//!
//! Either runs the single-client demo or serves the WebSocket gateway
//! in front of one chat room.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_room_actors::{run_demo, serve, ChatSystem, Config, Mode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_room_actors=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_room_actors=info")),
        )
        .init();

    let config = Config::from_env()?;

    match config.mode {
        Mode::Demo => {
            let outcome = run_demo(config.room).await?;
            info!("Demo finished: {:?}", outcome);
        }
        Mode::Serve { addr } => {
            let listener = TcpListener::bind(&addr).await?;
            info!("WebSocket Chat Room listening on {}", addr);

            let system = ChatSystem::start("ChatRoom", config.room);
            let gateway_token = system.child_token();

            let gateway = tokio::spawn(serve(
                listener,
                system.room().clone(),
                gateway_token.clone(),
            ));

            tokio::signal::ctrl_c().await?;
            info!("Received Ctrl-C");

            gateway_token.cancel();
            system.watch(gateway).await??;
            system.shutdown().await?;
        }
    }

    Ok(())
}
