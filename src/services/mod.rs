pub mod api_client;
pub mod session_store;

pub mod alert_form;
pub mod dashboard_service;
pub mod notification_inbox;
pub mod notification_listener;
pub mod notifier;
