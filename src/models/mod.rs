pub mod alert;
pub mod analytics;
pub mod notification;
pub mod user;

pub use alert::{Alert, AlertKind, AlertStats, AlertStatus, Condition, CreateAlertPayload};
pub use analytics::{ChartPoint, DashboardAnalytics, PopularTicker, SuggestedValues};
pub use notification::AlertNotification;
pub use user::{Session, UserProfile, UserUpdate};
