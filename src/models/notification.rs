use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::alert::{AlertKind, Condition};

/// Push event sent by the server when one of the user's alerts fires.
///
/// Both snake_case and camelCase field names are accepted; the server and the
/// older web client disagree on the casing. Only `ticker` is required; any
/// other field that does not decode is treated as absent rather than
/// rejecting the whole event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotification {
    pub ticker: String,

    // "info" and other non-alert kinds end up as None
    #[serde(default, alias = "alertType", deserialize_with = "lenient")]
    pub alert_type: Option<AlertKind>,

    #[serde(default, deserialize_with = "lenient_condition")]
    pub condition: Option<Condition>,

    #[serde(default, alias = "targetValue", deserialize_with = "lenient_number")]
    pub target_value: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
}

fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(de)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_condition<'de, D>(de: D) -> Result<Option<Condition>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

// the server sometimes sends Decimal targets as strings
fn lenient_number<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    })
}

impl AlertNotification {
    pub fn title(&self) -> &'static str {
        "🔔 Alert triggered!"
    }

    /// "<ticker> <condition> <target>", with missing parts left out.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.ticker.clone()];
        if let Some(c) = self.condition {
            parts.push(c.symbol().to_string());
        }
        if let Some(v) = self.target_value {
            parts.push(format!("{v}"));
        }
        parts.join(" ")
    }
}
