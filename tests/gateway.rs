use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use chat_room_actors::{
    serve, ChatRoom, ChatSystem, ClientMessage, ErrorCode, RoomConfig, ServerMessage,
};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(2);

async fn start(config: RoomConfig) -> (ChatSystem, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let system = ChatSystem::start("gateway-test", config);
    tokio::spawn(serve(listener, system.room().clone(), system.child_token()));
    (system, format!("ws://{}", addr))
}

async fn connect(url: &str) -> Ws {
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

async fn send(ws: &mut Ws, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(Message::Text(json.into())).await.unwrap();
}

async fn recv(ws: &mut Ws) -> ServerMessage {
    loop {
        let frame = timeout(WAIT, ws.next()).await.unwrap().unwrap().unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Wait until the server ends the connection
async fn expect_closed(ws: &mut Ws) {
    loop {
        match timeout(WAIT, ws.next()).await.unwrap() {
            None | Some(Ok(Message::Close(_))) | Some(Err(_)) => return,
            Some(Ok(Message::Text(text))) => panic!("Unexpected message: {}", text),
            Some(Ok(_)) => {}
        }
    }
}

async fn assert_quiet(ws: &mut Ws) {
    if let Ok(frame) = timeout(Duration::from_millis(100), ws.next()).await {
        panic!("Expected no further frames, got {:?}", frame);
    }
}

/// Join, retrying while the room still counts a just-closed connection
async fn join_eventually(ws: &mut Ws, name: &str) -> ServerMessage {
    for _ in 0..50 {
        match join(ws, name).await {
            ServerMessage::SessionDenied { .. } => {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            other => return other,
        }
    }
    join(ws, name).await
}

async fn join(ws: &mut Ws, name: &str) -> ServerMessage {
    send(
        ws,
        &ClientMessage::Join {
            screen_name: name.to_string(),
        },
    )
    .await;
    recv(ws).await
}

#[tokio::test]
async fn test_client_receives_own_post() {
    let (system, url) = start(RoomConfig::default()).await;
    let mut alice = connect(&url).await;

    assert!(matches!(
        join(&mut alice, "alice").await,
        ServerMessage::SessionGranted { .. }
    ));

    send(
        &mut alice,
        &ClientMessage::Post {
            message: "hi".to_string(),
        },
    )
    .await;

    assert_eq!(
        recv(&mut alice).await,
        ServerMessage::MessagePosted {
            screen_name: "alice".to_string(),
            message: "hi".to_string(),
        }
    );

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_broadcast_reaches_every_member() {
    let (system, url) = start(RoomConfig::default()).await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;

    assert!(matches!(
        join(&mut alice, "alice").await,
        ServerMessage::SessionGranted { .. }
    ));
    assert!(matches!(
        join(&mut bob, "bob").await,
        ServerMessage::SessionGranted { .. }
    ));

    send(
        &mut alice,
        &ClientMessage::Post {
            message: "hello".to_string(),
        },
    )
    .await;

    let expected = ServerMessage::MessagePosted {
        screen_name: "alice".to_string(),
        message: "hello".to_string(),
    };
    assert_eq!(recv(&mut alice).await, expected);
    assert_eq!(recv(&mut bob).await, expected);

    // One copy each, and nothing attributed to bob
    assert_quiet(&mut alice).await;
    assert_quiet(&mut bob).await;

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_name_denied() {
    let (system, url) = start(RoomConfig {
        unique_screen_names: true,
        ..RoomConfig::default()
    })
    .await;
    let mut first = connect(&url).await;
    let mut second = connect(&url).await;

    assert!(matches!(
        join(&mut first, "alice").await,
        ServerMessage::SessionGranted { .. }
    ));
    assert_eq!(
        join(&mut second, "alice").await,
        ServerMessage::SessionDenied {
            reason: "name already taken".to_string()
        }
    );

    // Denied connections may try again under another name
    assert!(matches!(
        join(&mut second, "alice2").await,
        ServerMessage::SessionGranted { .. }
    ));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_protocol_errors_keep_connection_open() {
    let (system, url) = start(RoomConfig::default()).await;
    let mut ws = connect(&url).await;

    send(
        &mut ws,
        &ClientMessage::Post {
            message: "too early".to_string(),
        },
    )
    .await;
    assert!(matches!(
        recv(&mut ws).await,
        ServerMessage::Error {
            code: ErrorCode::NotJoined,
            ..
        }
    ));

    ws.send(Message::Text("not json".to_string().into()))
        .await
        .unwrap();
    assert!(matches!(
        recv(&mut ws).await,
        ServerMessage::Error {
            code: ErrorCode::InvalidMessage,
            ..
        }
    ));

    assert!(matches!(
        join(&mut ws, "alice").await,
        ServerMessage::SessionGranted { .. }
    ));
    assert!(matches!(
        join(&mut ws, "alice").await,
        ServerMessage::Error {
            code: ErrorCode::AlreadyJoined,
            ..
        }
    ));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_disconnected_client_can_rejoin() {
    let (system, url) = start(RoomConfig {
        unique_screen_names: true,
        max_sessions: Some(1),
    })
    .await;

    let mut alice = connect(&url).await;
    assert!(matches!(
        join(&mut alice, "alice").await,
        ServerMessage::SessionGranted { .. }
    ));
    alice.close(None).await.unwrap();
    expect_closed(&mut alice).await;

    // Nobody is connected, so the slot and the name are free again
    let mut alice = connect(&url).await;
    assert!(matches!(
        join_eventually(&mut alice, "alice").await,
        ServerMessage::SessionGranted { .. }
    ));

    let mut bob = connect(&url).await;
    assert_eq!(
        join(&mut bob, "bob").await,
        ServerMessage::SessionDenied {
            reason: "room is full".to_string()
        }
    );

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stopped_room_reports_error_and_closes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let room_token = CancellationToken::new();
    let (room, room_task) = ChatRoom::spawn(RoomConfig::default(), room_token.clone());
    let gateway_token = CancellationToken::new();
    tokio::spawn(serve(listener, room, gateway_token.clone()));

    let mut ws = connect(&url).await;
    room_token.cancel();
    room_task.await.unwrap();

    send(
        &mut ws,
        &ClientMessage::Join {
            screen_name: "alice".to_string(),
        },
    )
    .await;
    assert!(matches!(
        recv(&mut ws).await,
        ServerMessage::Error {
            code: ErrorCode::RoomUnavailable,
            ..
        }
    ));
    expect_closed(&mut ws).await;

    gateway_token.cancel();
}

#[tokio::test]
async fn test_shutdown_closes_open_connections() {
    let (system, url) = start(RoomConfig::default()).await;
    let mut ws = connect(&url).await;
    assert!(matches!(
        join(&mut ws, "alice").await,
        ServerMessage::SessionGranted { .. }
    ));

    system.shutdown().await.unwrap();

    expect_closed(&mut ws).await;
}
