use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use gatilho::{
    AppState,
    config::{NotifyPermission, Settings},
    controllers::realtime_controller,
    models::{AlertNotification, Session},
    services::{
        notification_listener::{ListenerState, NotificationListener},
        notifier::Notifier,
        session_store::MemorySessionStore,
    },
};
use tokio::sync::{Mutex, mpsc};

#[derive(Clone)]
struct FakeServer {
    frames: Vec<String>,
    hang_up: bool,
    seen_tx: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &AlertNotification) {
        self.seen.lock().await.push(notification.ticker.clone());
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<i64>,
    State(server): State<FakeServer>,
) -> Response {
    let _ = server.seen_tx.send(format!("connect:{user_id}"));
    ws.on_upgrade(move |socket| feed(socket, server))
}

async fn feed(mut socket: WebSocket, server: FakeServer) {
    for frame in &server.frames {
        if socket.send(Message::Text(frame.clone())).await.is_err() {
            return;
        }
    }

    if server.hang_up {
        let _ = socket.close().await;
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        if let Message::Close(_) = msg {
            let _ = server.seen_tx.send("close".to_string());
            break;
        }
    }
}

async fn spawn_server(
    frames: &[&str],
    hang_up: bool,
) -> (String, mpsc::UnboundedReceiver<String>) {
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    let state = FakeServer {
        frames: frames.iter().map(|f| f.to_string()).collect(),
        hang_up,
        seen_tx,
    };

    let app = Router::new()
        .route("/ws/:user_id", get(ws_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{addr}/ws"), seen_rx)
}

async fn wait_for_entries(listener: &NotificationListener, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if listener.inbox().lock().await.len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("notifications did not arrive");
}

#[tokio::test]
async fn one_entry_per_event_in_arrival_order() {
    let frames = [
        r#"{"ticker":"PETR4","alert_type":"price","condition":">","target_value":40.0}"#,
        r#"{"ticker":"VALE3","alertType":"volume","condition":"<","targetValue":2.5}"#,
        r#"{"ticker":"PETR4","alert_type":"price","condition":">","target_value":40.0}"#,
    ];
    let (ws_base, mut seen_rx) = spawn_server(&frames, true).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut listener = NotificationListener::connect(&ws_base, 7, notifier.clone())
        .await
        .unwrap();

    assert_eq!(seen_rx.recv().await.unwrap(), "connect:7");

    tokio::time::timeout(Duration::from_secs(5), listener.disconnected())
        .await
        .expect("server hang-up was not noticed");
    assert_eq!(listener.state(), ListenerState::Disconnected);

    let tickers: Vec<String> = listener
        .notifications()
        .await
        .into_iter()
        .map(|n| n.ticker)
        .collect();
    // repeated events are not deduplicated
    assert_eq!(tickers, ["PETR4", "VALE3", "PETR4"]);
    assert_eq!(*notifier.seen.lock().await, ["PETR4", "VALE3", "PETR4"]);

    listener.close().await;
}

#[tokio::test]
async fn malformed_frames_do_not_produce_entries() {
    let frames = [
        "hello",
        r#"{"ticker":"ITUB4","message":"ITUB4 caiu abaixo de R$ 30"}"#,
        r#"{"type":"ping"}"#,
    ];
    let (ws_base, _seen_rx) = spawn_server(&frames, true).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut listener = NotificationListener::connect(&ws_base, 3, notifier.clone())
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), listener.disconnected())
        .await
        .unwrap();

    let received = listener.notifications().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message.as_deref(), Some("ITUB4 caiu abaixo de R$ 30"));
    assert_eq!(notifier.seen.lock().await.len(), 1);
}

#[tokio::test]
async fn web_client_shaped_events_are_kept() {
    let frames = [
        r#"{"ticker":"PETR4","alertType":"price","condition":"gt","targetValue":40,"message":"PETR4 acima de R$ 40"}"#,
        r#"{"ticker":"MGLU3","alert_type":"info","condition":"lte","target_value":"12.50"}"#,
    ];
    let (ws_base, _seen_rx) = spawn_server(&frames, true).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut listener = NotificationListener::connect(&ws_base, 4, notifier.clone())
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), listener.disconnected())
        .await
        .unwrap();

    let received = listener.notifications().await;
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].summary(), "PETR4 > 40");
    assert_eq!(received[1].alert_type, None);
    assert_eq!(received[1].summary(), "MGLU3 <= 12.5");
    assert_eq!(*notifier.seen.lock().await, ["PETR4", "MGLU3"]);
}

#[tokio::test]
async fn close_sends_close_frame_to_server() {
    let frames = [r#"{"ticker":"WEGE3"}"#];
    let (ws_base, mut seen_rx) = spawn_server(&frames, false).await;

    let listener = NotificationListener::connect(&ws_base, 11, Arc::new(RecordingNotifier::default()))
        .await
        .unwrap();

    assert_eq!(seen_rx.recv().await.unwrap(), "connect:11");
    wait_for_entries(&listener, 1).await;
    assert_eq!(listener.state(), ListenerState::Connected);

    listener.close().await;

    let seen = tokio::time::timeout(Duration::from_secs(5), seen_rx.recv())
        .await
        .expect("server never saw the close frame");
    assert_eq!(seen.as_deref(), Some("close"));
}

#[tokio::test]
async fn connect_fails_without_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let res = NotificationListener::connect(
        &format!("ws://{addr}/ws"),
        1,
        Arc::new(RecordingNotifier::default()),
    )
    .await;

    assert!(res.is_err());
}

fn watch_state(ws_base: &str, permission: NotifyPermission) -> AppState {
    let settings = Settings {
        ws_url: ws_base.to_string(),
        notify_permission: permission,
        ..Settings::default()
    };
    let store = Arc::new(MemorySessionStore::with_session(Session {
        token: "tok".into(),
        user_id: 7,
    }));
    AppState::new(settings, store).unwrap()
}

#[tokio::test]
async fn watch_records_events_even_when_notifications_are_denied() {
    let frames = [
        r#"{"ticker":"PETR4","condition":"gt","targetValue":40}"#,
        r#"{"ticker":"VALE3","condition":"<","target_value":60.5}"#,
    ];
    let (ws_base, mut seen_rx) = spawn_server(&frames, true).await;
    let state = watch_state(&ws_base, NotifyPermission::Denied);

    // never stops on its own; the server hang-up ends the watch
    let out = tokio::time::timeout(
        Duration::from_secs(5),
        realtime_controller::watch(&state, false, std::future::pending::<()>()),
    )
    .await
    .expect("watch did not notice the hang-up")
    .unwrap();

    assert_eq!(seen_rx.recv().await.unwrap(), "connect:7");
    assert!(out.contains("Notifications (2 unread)"));
    assert!(out.contains("PETR4 > 40"));
    assert!(out.contains("VALE3 < 60.5"));
    // newest first
    assert!(out.find("VALE3").unwrap() < out.find("PETR4").unwrap());
}

#[tokio::test]
async fn watch_stop_closes_the_socket() {
    let frames = [r#"{"ticker":"WEGE3","condition":">=","targetValue":50}"#];
    let (ws_base, mut seen_rx) = spawn_server(&frames, false).await;
    let state = watch_state(&ws_base, NotifyPermission::Default);

    let out = realtime_controller::watch(
        &state,
        false,
        tokio::time::sleep(Duration::from_millis(500)),
    )
    .await
    .unwrap();

    assert_eq!(seen_rx.recv().await.unwrap(), "connect:7");
    let seen = tokio::time::timeout(Duration::from_secs(5), seen_rx.recv())
        .await
        .expect("server never saw the close frame");
    assert_eq!(seen.as_deref(), Some("close"));
    assert!(out.contains("WEGE3 >= 50"));
}
