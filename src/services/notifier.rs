use async_trait::async_trait;

use crate::{config::NotifyPermission, models::AlertNotification, render, templates::Hbs};

/// Sink for the user-visible side effect of a received alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &AlertNotification);
}

/// Prints a desktop-style notification to the terminal (with a bell).
///
/// Like the browser API it only fires when permission is `granted`; it
/// never asks for it.
pub struct TerminalNotifier {
    permission: NotifyPermission,
    hbs: Hbs,
}

impl TerminalNotifier {
    pub fn new(permission: NotifyPermission, hbs: Hbs) -> Self {
        Self { permission, hbs }
    }

    /// Text to show for `notification`, or `None` when permission is not
    /// `granted` (or the template fails).
    pub fn display_text(&self, notification: &AlertNotification) -> Option<String> {
        if self.permission != NotifyPermission::Granted {
            tracing::debug!(
                "notification permission is {:?}, skipping {}",
                self.permission,
                notification.ticker
            );
            return None;
        }

        match render::render_notification(&self.hbs, notification) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!("failed to render notification: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(&self, notification: &AlertNotification) {
        if let Some(text) = self.display_text(notification) {
            println!("\x07{text}");
        }
    }
}

/// Logs only; used when output should stay machine-readable.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &AlertNotification) {
        tracing::info!("alert triggered: {}", notification.summary());
    }
}
