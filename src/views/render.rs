use chrono::{DateTime, Local};
use serde_json::json;

use crate::{
    error::Result,
    models::{
        Alert, AlertKind, AlertNotification, AlertStats, ChartPoint, DashboardAnalytics,
        UserProfile, alert::parse_timestamp,
    },
    services::{
        dashboard_service::{Dashboard, DashboardTab},
        notification_inbox::NotificationInbox,
    },
    templates::Hbs,
};

fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

/// "01 Mar 2025 09:00" in local time; unparsable input is shown as is.
pub fn format_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => format_local(dt.with_timezone(&Local)),
        None => raw.to_string(),
    }
}

fn format_local(dt: DateTime<Local>) -> String {
    dt.format("%d %b %Y %H:%M").to_string()
}

pub fn format_target(kind: AlertKind, value: f64) -> String {
    match kind {
        AlertKind::Price => format!("{} {}", kind.unit(), fmt2(value)),
        AlertKind::Percentage | AlertKind::Volume => format!("{}{}", fmt2(value), kind.unit()),
    }
}

fn alert_json(a: &Alert) -> serde_json::Value {
    json!({
        "id": a.id,
        "ticker": a.ticker,
        "kind": a.alert_type.label(),
        "condition": a.condition.symbol(),
        "target": format_target(a.alert_type, a.target_value),
        "status": a.status().as_str(),
        "created": format_date(&a.created_at),
        "triggered_at": a.triggered_at.as_deref().map(format_date),
    })
}

pub fn render_alerts(hbs: &Hbs, title: &str, alerts: &[&Alert], empty_message: &str) -> Result<String> {
    let items: Vec<serde_json::Value> = alerts.iter().map(|a| alert_json(a)).collect();

    let ctx = json!({
        "title": title,
        "count": items.len(),
        "has_alerts": !items.is_empty(),
        "alerts": items,
        "empty_message": empty_message,
    });

    Ok(hbs.render("alerts_list", &ctx)?)
}

pub fn render_stats(hbs: &Hbs, stats: &AlertStats) -> Result<String> {
    Ok(hbs.render("stats", stats)?)
}

pub fn render_dashboard(hbs: &Hbs, dashboard: &Dashboard) -> Result<String> {
    let stats = render_stats(hbs, &dashboard.stats)?;
    let active = render_alerts(
        hbs,
        "Active alerts",
        &dashboard.tab(DashboardTab::Active),
        "No active alerts. Create one with `gatilho alerts create`.",
    )?;
    let history = render_alerts(
        hbs,
        "History",
        &dashboard.tab(DashboardTab::History),
        "No alert has been triggered yet.",
    )?;

    Ok(format!("{stats}\n{active}\n{history}"))
}

pub fn render_notification(hbs: &Hbs, n: &AlertNotification) -> Result<String> {
    let ctx = json!({
        "title": n.title(),
        "summary": n.summary(),
        "kind": n.alert_type.map(|k| k.label()),
        "message": n.message,
        "timestamp": n.timestamp.as_deref().map(format_date),
    });

    Ok(hbs.render("notification", &ctx)?)
}

pub fn render_inbox(hbs: &Hbs, inbox: &NotificationInbox) -> Result<String> {
    let entries: Vec<serde_json::Value> = inbox
        .latest_first()
        .into_iter()
        .map(|e| {
            json!({
                "id": e.id,
                "read": e.read,
                "received": format_local(e.received_at.with_timezone(&Local)),
                "summary": e.notification.summary(),
                "message": e.notification.message,
            })
        })
        .collect();

    let ctx = json!({
        "has_entries": !entries.is_empty(),
        "unread": inbox.unread_count(),
        "entries": entries,
    });

    Ok(hbs.render("inbox", &ctx)?)
}

pub fn render_profile(hbs: &Hbs, profile: &UserProfile) -> Result<String> {
    let ctx = json!({
        "id": profile.id,
        "name": profile.name,
        "email": profile.email,
        "created": profile.created_at.as_deref().map(format_date),
    });

    Ok(hbs.render("profile", &ctx)?)
}

pub fn render_analytics(
    hbs: &Hbs,
    analytics: &DashboardAnalytics,
    chart: &[ChartPoint],
    days: u32,
) -> Result<String> {
    let by_type: Vec<serde_json::Value> = analytics
        .alerts_by_type
        .iter()
        .map(|(kind, count)| {
            let label = kind
                .parse::<AlertKind>()
                .map(|k| k.label().to_string())
                .unwrap_or_else(|_| kind.clone());
            json!({ "label": label, "count": count })
        })
        .collect();

    let peak = chart.iter().map(|p| p.alerts).max().unwrap_or(0).max(1);
    let points: Vec<serde_json::Value> = chart
        .iter()
        .map(|p| {
            let width = (p.alerts.saturating_mul(30) / peak).max(if p.alerts > 0 { 1 } else { 0 });
            json!({ "date": p.date, "alerts": p.alerts, "bar": "#".repeat(width as usize) })
        })
        .collect();

    let ctx = json!({
        "total_created": analytics.total_created,
        "total_triggered": analytics.total_triggered,
        "success_rate": fmt2(analytics.success_rate),
        "recent_triggers": analytics.recent_triggers,
        "has_by_type": !by_type.is_empty(),
        "by_type": by_type,
        "has_chart": !points.is_empty(),
        "chart": points,
        "days": days,
    });

    Ok(hbs.render("analytics", &ctx)?)
}
