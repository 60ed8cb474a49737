pub mod alerts_controller;
pub mod auth_controller;
pub mod realtime_controller;
pub mod user_controller;
