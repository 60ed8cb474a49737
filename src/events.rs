use tokio::sync::broadcast;

/// Signals broadcast by the client to whatever front end is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A request came back 401; the stored session is gone.
    RedirectToLogin,
    /// An alert was created or deleted; cached lists are stale.
    AlertsUpdated,
}

pub type EventSender = broadcast::Sender<ClientEvent>;

pub fn channel() -> (EventSender, broadcast::Receiver<ClientEvent>) {
    broadcast::channel(16)
}

/// Sending with no subscriber attached is not an error.
pub fn emit(tx: &EventSender, event: ClientEvent) {
    if tx.send(event.clone()).is_err() {
        tracing::trace!("no listener for {:?}", event);
    }
}
