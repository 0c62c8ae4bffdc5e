//! WebSocket gateway
//!
//! Each connection plays the client role: it owns a client mailbox, joins
//! the room on request, posts through its granted handle and forwards
//! broadcasts to the socket as JSON.

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::address::{mailbox, Addr};
use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::protocol::SessionEvent;
use crate::room::RoomHandle;
use crate::session::PostHandle;
use crate::types::ClientId;

/// Where a connection is in the join handshake
#[derive(Debug)]
pub enum ConnectionState {
    /// Not joined yet, or the last join was denied
    Idle,
    /// Join sent, waiting for the room
    Joining,
    /// Session granted
    Joined(PostHandle),
}

impl ConnectionState {
    /// Apply a message read from the socket
    ///
    /// Business errors come back as a reply for the client; a stopped room
    /// is fatal for the connection.
    pub fn apply(
        &mut self,
        msg: ClientMessage,
        room: &RoomHandle,
        client: &Addr<SessionEvent>,
    ) -> Result<Option<ServerMessage>, AppError> {
        match msg {
            ClientMessage::Join { screen_name } => {
                if !matches!(self, ConnectionState::Idle) {
                    return Ok(Some(AppError::AlreadyJoined.into()));
                }
                room.try_join(screen_name, client.clone())?;
                *self = ConnectionState::Joining;
                Ok(None)
            }
            ClientMessage::Post { message } => match self {
                ConnectionState::Joined(handle) => {
                    handle.post(message);
                    Ok(None)
                }
                _ => Ok(Some(AppError::NotJoined.into())),
            },
        }
    }

    /// Apply an event from the room and build the message for the socket
    pub fn on_event(&mut self, event: SessionEvent) -> ServerMessage {
        match event {
            SessionEvent::SessionGranted { handle } => {
                let session_id = handle.id().to_string();
                *self = ConnectionState::Joined(handle);
                ServerMessage::SessionGranted { session_id }
            }
            SessionEvent::SessionDenied { reason } => {
                *self = ConnectionState::Idle;
                ServerMessage::SessionDenied { reason }
            }
            SessionEvent::MessagePosted(posted) => posted.into(),
        }
    }
}

/// Accept connections until `cancel_token` is cancelled
///
/// Every connection gets a child token and closes when the gateway stops.
pub async fn serve(
    listener: TcpListener,
    room: RoomHandle,
    cancel_token: CancellationToken,
) -> Result<(), AppError> {
    loop {
        let accepted = tokio::select! {
            () = cancel_token.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let room = room.clone();
                let connection_token = cancel_token.child_token();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, room, connection_token).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }

    info!("Gateway stopped accepting connections");
    Ok(())
}

/// Handle a new TCP connection
///
/// Performs WebSocket handshake, then multiplexes socket frames and room
/// events until either side goes away or `cancel_token` is cancelled.
/// A close frame is sent on every exit after the handshake.
pub async fn handle_connection(
    stream: TcpStream,
    room: RoomHandle,
    cancel_token: CancellationToken,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    // This connection's client mailbox
    let (client, mut events) = mailbox::<SessionEvent>();
    let mut state = ConnectionState::Idle;
    let mut result = Ok(());

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                debug!("Closing client {} on shutdown", client_id);
                break;
            }
            frame = ws_receiver.next() => {
                let Some(frame) = frame else { break };
                match frame {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => match state.apply(msg, &room, &client) {
                                Ok(reply) => reply,
                                Err(e) => {
                                    // Only a stopped room fails here; tell the peer before closing
                                    error!("Client {} lost the room: {}", client_id, e);
                                    let reply = ServerMessage::from(e);
                                    let _ = send_json(&mut ws_sender, &reply).await;
                                    result = Err(AppError::RoomUnavailable);
                                    break;
                                }
                            },
                            Err(e) => {
                                warn!("Invalid JSON from {}: {}", client_id, e);
                                Some(AppError::from(e).into())
                            }
                        };
                        if let Some(reply) = reply {
                            send_json(&mut ws_sender, &reply).await?;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("Client {} sent close frame", client_id);
                        break;
                    }
                    Ok(_) => {
                        // Pong is handled automatically by tungstenite; binary is ignored
                    }
                    Err(e) => {
                        error!("WebSocket error for {}: {}", client_id, e);
                        break;
                    }
                }
            }
            Some(event) = events.recv() => {
                let msg = state.on_event(event);
                send_json(&mut ws_sender, &msg).await?;
            }
        }
    }

    // Release the client mailbox first so the room sees this client as gone
    drop(state);
    drop(events);

    // Send close frame when done
    let _ = ws_sender.close().await;

    info!("Client {} disconnected", client_id);

    result
}

async fn send_json<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), AppError>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let json = serde_json::to_string(msg)?;
    sink.send(Message::Text(json.into())).await?;
    Ok(())
}
