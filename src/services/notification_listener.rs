use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::TcpStream,
    sync::{Mutex, oneshot, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message as TMessage,
};

use crate::{
    error::Result,
    models::AlertNotification,
    services::{notification_inbox::NotificationInbox, notifier::Notifier},
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Connected,
    Disconnected,
}

/// One socket per user session, pushing alert events into an inbox.
///
/// There is no reconnect: once the server closes the socket (or it errors)
/// the listener stays disconnected. Dropping the listener closes the socket.
pub struct NotificationListener {
    inbox: Arc<Mutex<NotificationInbox>>,
    state_rx: watch::Receiver<ListenerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

pub fn socket_url(ws_base: &str, user_id: i64) -> String {
    format!("{}/{}", ws_base.trim_end_matches('/'), user_id)
}

impl NotificationListener {
    pub async fn connect(
        ws_base: &str,
        user_id: i64,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let url = socket_url(ws_base, user_id);
        tracing::info!("connecting to notification socket {}", url);

        let (socket, _) = connect_async(url.as_str()).await?;
        tracing::info!("notification socket connected for user {}", user_id);

        let inbox = Arc::new(Mutex::new(NotificationInbox::new()));
        let (state_tx, state_rx) = watch::channel(ListenerState::Connected);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_socket(
            socket,
            inbox.clone(),
            notifier,
            state_tx,
            shutdown_rx,
        ));

        Ok(Self {
            inbox,
            state_rx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn state(&self) -> ListenerState {
        *self.state_rx.borrow()
    }

    /// Resolves once the socket is gone, whoever closed it.
    pub async fn disconnected(&mut self) {
        let _ = self
            .state_rx
            .wait_for(|s| *s == ListenerState::Disconnected)
            .await;
    }

    pub fn inbox(&self) -> Arc<Mutex<NotificationInbox>> {
        self.inbox.clone()
    }

    /// Received events in arrival order.
    pub async fn notifications(&self) -> Vec<AlertNotification> {
        self.inbox
            .lock()
            .await
            .entries()
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("notification task ended abnormally: {}", e);
            }
        }
    }
}

/// Decodes one text frame. Anything that is not an alert event is dropped.
pub fn decode_event(text: &str) -> Option<AlertNotification> {
    match serde_json::from_str::<AlertNotification>(text) {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!("ignoring malformed notification frame: {}", e);
            None
        }
    }
}

async fn deliver(
    text: &str,
    inbox: &Mutex<NotificationInbox>,
    notifier: &dyn Notifier,
) {
    let Some(notification) = decode_event(text) else {
        return;
    };

    tracing::info!("notification received: {}", notification.summary());
    inbox.lock().await.push(notification.clone());
    notifier.notify(&notification).await;
}

async fn run_socket(
    socket: Socket,
    inbox: Arc<Mutex<NotificationInbox>>,
    notifier: Arc<dyn Notifier>,
    state_tx: watch::Sender<ListenerState>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            // fires on close() and on drop of the listener
            _ = &mut shutdown_rx => {
                tracing::info!("closing notification socket");
                if let Err(e) = write.send(TMessage::Close(None)).await {
                    tracing::debug!("close frame not sent: {}", e);
                }
                break;
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(TMessage::Text(txt))) => {
                        deliver(&txt, &inbox, notifier.as_ref()).await;
                    }
                    Some(Ok(TMessage::Binary(bin))) => match String::from_utf8(bin) {
                        Ok(txt) => deliver(&txt, &inbox, notifier.as_ref()).await,
                        Err(_) => tracing::warn!("ignoring non-UTF-8 binary frame"),
                    },
                    // tungstenite queues the pong itself
                    Some(Ok(TMessage::Ping(_) | TMessage::Pong(_))) => {}
                    Some(Ok(TMessage::Close(_))) | None => {
                        tracing::info!("notification socket closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("notification socket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    let _ = state_tx.send(ListenerState::Disconnected);
}
