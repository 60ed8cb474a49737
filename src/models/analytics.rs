use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardAnalytics {
    #[serde(default)]
    pub alerts_by_type: BTreeMap<String, u64>,
    #[serde(default)]
    pub recent_triggers: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub total_created: u64,
    #[serde(default)]
    pub total_triggered: u64,
}

/// Triggers per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub alerts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularTicker {
    pub ticker: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestedValues {
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub suggestions: Vec<f64>,
}
