//! Client library for the Gatilho stock-alert API.
//!
//! The binary in `main.rs` is a thin terminal front end; everything it does
//! goes through the controllers here so integration tests under `tests/` can
//! drive the same code paths.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub mod services;

#[path = "views/render.rs"]
pub mod render;
pub mod templates;

pub mod cli;
pub mod controllers;

use error::{GatilhoError, Result};
use models::Session;
use services::{api_client::ApiClient, session_store::SessionStorage};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub session: Arc<dyn SessionStorage>,
    pub api: ApiClient,
    pub events_tx: events::EventSender,
}

impl AppState {
    pub fn new(settings: config::Settings, session: Arc<dyn SessionStorage>) -> Result<Self> {
        let (events_tx, _events_rx) = events::channel();
        let api = ApiClient::new(settings.api_url.clone(), session.clone(), events_tx.clone());

        Ok(Self {
            hbs: templates::build_handlebars()?,
            settings,
            session,
            api,
            events_tx,
        })
    }

    /// The stored session, or `NotLoggedIn`. An unreadable session file
    /// counts as logged out and is removed.
    pub fn require_session(&self) -> Result<Session> {
        self.session.load_or_reset().ok_or(GatilhoError::NotLoggedIn)
    }
}
