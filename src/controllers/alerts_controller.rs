use crate::{
    AppState,
    error::Result,
    models::{AlertKind, Condition},
    render,
    services::{
        alert_form::{self, AlertForm},
        dashboard_service,
    },
};

pub async fn dashboard(state: &AppState) -> Result<String> {
    let session = state.require_session()?;
    let dashboard = dashboard_service::load_dashboard(&state.api, session.user_id).await?;
    render::render_dashboard(&state.hbs, &dashboard)
}

pub async fn list(state: &AppState, include_inactive: bool) -> Result<String> {
    let session = state.require_session()?;

    let alerts = if include_inactive {
        state.api.list_all(session.user_id).await?
    } else {
        state.api.list_active(session.user_id).await?
    };

    let shown: Vec<_> = if include_inactive {
        alerts.iter().collect()
    } else {
        alerts.iter().filter(|a| a.is_live()).collect()
    };

    let title = if include_inactive { "All alerts" } else { "Active alerts" };
    render::render_alerts(&state.hbs, title, &shown, "No alerts found.")
}

pub async fn history(state: &AppState) -> Result<String> {
    let session = state.require_session()?;
    let alerts = state.api.history(session.user_id).await?;
    let shown: Vec<_> = alerts.iter().collect();
    render::render_alerts(&state.hbs, "History", &shown, "No alert has been triggered yet.")
}

pub async fn stats(state: &AppState) -> Result<String> {
    let session = state.require_session()?;
    let stats = state.api.stats(session.user_id).await?;
    render::render_stats(&state.hbs, &stats)
}

/// Runs the inputs through the same step-by-step form the web flow used.
pub async fn create(
    state: &AppState,
    ticker: &str,
    kind: AlertKind,
    condition: Condition,
    target_value: &str,
) -> Result<String> {
    let session = state.require_session()?;

    let mut form = AlertForm::new();
    form.select_ticker(ticker)?;
    form.select_kind(kind);
    form.select_condition(condition);
    form.set_target_value(target_value)?;

    let payload = form.to_payload(session.user_id)?;
    let alert = state.api.create_alert(&payload).await?;

    Ok(format!(
        "Alert #{} created: {} {} {} {}.",
        alert.id,
        alert.ticker,
        alert.alert_type.label().to_lowercase(),
        alert.condition.label(),
        render::format_target(alert.alert_type, alert.target_value)
    ))
}

pub async fn delete(state: &AppState, alert_id: i64) -> Result<String> {
    let session = state.require_session()?;

    let mut dashboard = dashboard_service::load_dashboard(&state.api, session.user_id).await?;
    dashboard_service::delete_alert(&state.api, &mut dashboard, session.user_id, alert_id).await?;

    Ok(format!(
        "Alert #{alert_id} removed. {} active alert(s) left.",
        dashboard.stats.active_alerts
    ))
}

pub fn popular(query: Option<&str>) -> String {
    let stocks = alert_form::search_stocks(query.unwrap_or(""));
    if stocks.is_empty() {
        return "No matching stocks.".to_string();
    }

    stocks
        .iter()
        .map(|s| format!("{:<6}  {:<16} {}", s.ticker, s.name, s.sector))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn suggest_tickers(state: &AppState) -> Result<String> {
    let tickers = state.api.popular_tickers().await?;
    if tickers.is_empty() {
        return Ok("No suggestions yet.".to_string());
    }

    Ok(tickers
        .iter()
        .map(|t| format!("{:<6}  {} alert(s)", t.ticker, t.count))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub async fn suggest_values(state: &AppState, ticker: &str, kind: AlertKind) -> Result<String> {
    let values = state.api.suggested_values(ticker, kind).await?;

    let Some(avg) = values.average else {
        return Ok(format!("No other alerts on {} yet.", ticker.to_uppercase()));
    };

    let listed: Vec<String> = values
        .suggestions
        .iter()
        .map(|v| render::format_target(kind, *v))
        .collect();

    Ok(format!(
        "Average target: {}\nCommon targets: {}",
        render::format_target(kind, avg),
        listed.join(", ")
    ))
}
