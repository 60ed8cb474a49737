use std::{future::Future, sync::Arc};

use crate::{
    AppState,
    error::Result,
    render,
    services::{
        notification_listener::NotificationListener,
        notifier::{LogNotifier, Notifier, TerminalNotifier},
    },
};

/// Listens for alert events until `stop` resolves or the server hangs up,
/// then returns a summary of what arrived.
pub async fn watch<F>(state: &AppState, quiet: bool, stop: F) -> Result<String>
where
    F: Future<Output = ()>,
{
    let session = state.require_session()?;

    let notifier: Arc<dyn Notifier> = if quiet {
        Arc::new(LogNotifier)
    } else {
        Arc::new(TerminalNotifier::new(
            state.settings.notify_permission,
            state.hbs.clone(),
        ))
    };

    let mut listener =
        NotificationListener::connect(&state.settings.ws_url, session.user_id, notifier).await?;

    tokio::select! {
        _ = stop => {
            tracing::info!("stopping notification listener");
        }
        _ = listener.disconnected() => {
            tracing::warn!("notification socket closed, not reconnecting");
        }
    }

    let inbox = listener.inbox();
    listener.close().await;

    let inbox = inbox.lock().await;
    render::render_inbox(&state.hbs, &inbox)
}
