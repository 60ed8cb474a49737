use std::collections::BTreeSet;

use crate::{
    error::Result,
    models::{Alert, AlertStats},
    services::api_client::ApiClient,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Active,
    History,
}

/// Everything the dashboard shows, fetched together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub alerts: Vec<Alert>,
    pub history: Vec<Alert>,
    pub stats: AlertStats,
}

/// Fetches active alerts, history and stats concurrently.
///
/// All-or-nothing: if any of the three requests fails the whole load fails.
pub async fn load_dashboard(api: &ApiClient, user_id: i64) -> Result<Dashboard> {
    let (alerts, history, stats) = tokio::try_join!(
        api.list_active(user_id),
        api.history(user_id),
        api.stats(user_id),
    )?;

    tracing::debug!(
        "dashboard loaded: {} active, {} in history",
        alerts.len(),
        history.len()
    );

    Ok(Dashboard {
        alerts,
        history,
        stats,
    })
}

/// Deletes on the server, then applies the local bookkeeping.
pub async fn delete_alert(
    api: &ApiClient,
    dashboard: &mut Dashboard,
    user_id: i64,
    alert_id: i64,
) -> Result<()> {
    api.delete_alert(alert_id, user_id).await?;
    dashboard.remove_alert(alert_id);
    Ok(())
}

impl Dashboard {
    /// Drops `alert_id` from the active list and adjusts the counters to
    /// match, without refetching stats. Returns false if it was not listed.
    pub fn remove_alert(&mut self, alert_id: i64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != alert_id);

        if self.alerts.len() == before {
            return false;
        }

        self.stats.active_alerts = self.stats.active_alerts.saturating_sub(1);
        self.stats.total_alerts = self.stats.total_alerts.saturating_sub(1);
        true
    }

    /// Alerts for a tab. Triggered alerts never show up under `Active`, even
    /// if the server still lists them there.
    pub fn tab(&self, tab: DashboardTab) -> Vec<&Alert> {
        match tab {
            DashboardTab::Active => self.alerts.iter().filter(|a| a.is_live()).collect(),
            DashboardTab::History => self.history.iter().collect(),
        }
    }

    pub fn tickers(&self) -> BTreeSet<&str> {
        self.alerts.iter().map(|a| a.ticker.as_str()).collect()
    }
}
