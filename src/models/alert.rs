use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatilhoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Price,
    Percentage,
    Volume,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Price => "price",
            AlertKind::Percentage => "percentage",
            AlertKind::Volume => "volume",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::Price => "Target price",
            AlertKind::Percentage => "Daily change",
            AlertKind::Volume => "Traded volume",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            AlertKind::Price => "R$",
            AlertKind::Percentage => "%",
            AlertKind::Volume => "M",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = GatilhoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(AlertKind::Price),
            "percentage" | "percent" | "%" => Ok(AlertKind::Percentage),
            "volume" => Ok(AlertKind::Volume),
            other => Err(GatilhoError::validation(format!(
                "invalid alert type '{other}', use: price, percentage, volume"
            ))),
        }
    }
}

/// Comparison between the observed market value and the alert target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = ">", alias = "gt")]
    Above,
    #[serde(rename = "<", alias = "lt")]
    Below,
    #[serde(rename = ">=", alias = "gte")]
    AtOrAbove,
    #[serde(rename = "<=", alias = "lte")]
    AtOrBelow,
}

impl Condition {
    pub fn symbol(&self) -> &'static str {
        match self {
            Condition::Above => ">",
            Condition::Below => "<",
            Condition::AtOrAbove => ">=",
            Condition::AtOrBelow => "<=",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Above => "rises above",
            Condition::Below => "falls below",
            Condition::AtOrAbove => "reaches",
            Condition::AtOrBelow => "drops to",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Condition {
    type Err = GatilhoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            ">" | "gt" | "above" => Ok(Condition::Above),
            "<" | "lt" | "below" => Ok(Condition::Below),
            ">=" | "gte" => Ok(Condition::AtOrAbove),
            "<=" | "lte" => Ok(Condition::AtOrBelow),
            other => Err(GatilhoError::validation(format!(
                "invalid condition '{other}', use: >, <, >=, <="
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    Active,
    Triggered,
    Inactive,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Triggered => "triggered",
            AlertStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub ticker: String,
    pub alert_type: AlertKind,
    pub target_value: f64,
    pub condition: Condition,

    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub triggered: bool,

    pub created_at: String,
    #[serde(default)]
    pub triggered_at: Option<String>,

    // the list endpoints omit it
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl Alert {
    /// `triggered` is terminal, so it takes precedence over `is_active`.
    pub fn status(&self) -> AlertStatus {
        if self.triggered {
            AlertStatus::Triggered
        } else if self.is_active {
            AlertStatus::Active
        } else {
            AlertStatus::Inactive
        }
    }

    pub fn is_live(&self) -> bool {
        self.status() == AlertStatus::Active
    }
}

/// The API emits either RFC 3339 or naive ISO timestamps (assumed UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    pub total_alerts: u64,
    pub active_alerts: u64,
    pub triggered_alerts: u64,
    pub total_tickers: u64,
}

/// Exact body of `POST /alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAlertPayload {
    pub user_id: i64,
    pub ticker: String,
    pub alert_type: AlertKind,
    pub target_value: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAlertResponse {
    pub message: String,
    pub alert_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alert(is_active: bool, triggered: bool) -> Alert {
        Alert {
            id: 1,
            ticker: "PETR4".into(),
            alert_type: AlertKind::Price,
            target_value: 40.0,
            condition: Condition::Above,
            is_active,
            triggered,
            created_at: "2025-03-01T12:00:00".into(),
            triggered_at: None,
            user_id: None,
        }
    }

    #[test]
    fn triggered_alert_is_never_active() {
        assert_eq!(alert(true, true).status(), AlertStatus::Triggered);
        assert_eq!(alert(false, true).status(), AlertStatus::Triggered);
        assert!(!alert(true, true).is_live());
    }

    #[test]
    fn live_and_inactive_statuses() {
        assert_eq!(alert(true, false).status(), AlertStatus::Active);
        assert_eq!(alert(false, false).status(), AlertStatus::Inactive);
    }

    #[test]
    fn decodes_api_alert() {
        let raw = json!({
            "id": 7,
            "ticker": "VALE3",
            "alert_type": "percentage",
            "target_value": 5.0,
            "condition": ">=",
            "is_active": true,
            "triggered": false,
            "created_at": "2025-03-01T12:00:00.123456"
        });

        let a: Alert = serde_json::from_value(raw).unwrap();
        assert_eq!(a.alert_type, AlertKind::Percentage);
        assert_eq!(a.condition, Condition::AtOrAbove);
        assert_eq!(a.triggered_at, None);
        assert!(parse_timestamp(&a.created_at).is_some());
    }

    #[test]
    fn condition_accepts_symbols_and_short_names() {
        assert_eq!("gt".parse::<Condition>().unwrap(), Condition::Above);
        assert_eq!("<=".parse::<Condition>().unwrap(), Condition::AtOrBelow);
        assert!("==".parse::<Condition>().is_err());
    }

    #[test]
    fn condition_decodes_short_names_from_json() {
        let c: Condition = serde_json::from_str(r#""gte""#).unwrap();
        assert_eq!(c, Condition::AtOrAbove);
        assert_eq!(serde_json::to_string(&c).unwrap(), r#"">=""#);
    }

    #[test]
    fn parses_offset_timestamps() {
        let dt = parse_timestamp("2025-03-01T12:00:00-03:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T15:00:00+00:00");
        assert!(parse_timestamp("yesterday").is_none());
    }
}
