use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::{GatilhoError, Result},
    events::{self, ClientEvent, EventSender},
    models::{
        Alert, AlertKind, AlertStats, ChartPoint, CreateAlertPayload, DashboardAnalytics,
        PopularTicker, SuggestedValues, UserProfile, UserUpdate,
        alert::DeleteAlertResponse,
        user::{
            DeleteAccountResponse, LoginRequest, LoginResponse, MessageResponse, PasswordChange,
            SignupRequest, SignupResponse, UpdateProfileResponse,
        },
    },
    services::session_store::SessionStorage,
};

/// Thin typed wrapper over the Gatilho REST API.
///
/// Every request carries the stored bearer token when there is one. A 401
/// from any endpoint wipes the session and broadcasts
/// [`ClientEvent::RedirectToLogin`]; nothing else is retried or rewritten.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionStorage>,
    events_tx: EventSender,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<dyn SessionStorage>,
        events_tx: EventSender,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            events_tx,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.http.request(method, self.url(path));
        match self.session.load_or_reset() {
            Some(session) => rb.bearer_auth(session.token),
            None => rb,
        }
    }

    async fn check(&self, res: Response) -> Result<Response> {
        let status = res.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("{} answered 401, clearing session", res.url().path());
            if let Err(e) = self.session.clear() {
                tracing::error!("failed to clear session: {}", e);
            }
            events::emit(&self.events_tx, ClientEvent::RedirectToLogin);
            return Err(GatilhoError::Unauthorized);
        }

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GatilhoError::Http {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        Ok(res)
    }

    async fn send<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T> {
        let res = rb.send().await?;
        let res = self.check(res).await?;
        Ok(res.json::<T>().await?)
    }

    // ---------------- Auth ----------------

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let rb = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        self.send(rb).await
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<SignupResponse> {
        let rb = self
            .request(Method::POST, "/auth/signup")
            .json(&SignupRequest {
                name,
                email,
                password,
            });
        self.send(rb).await
    }

    // ---------------- Alerts ----------------

    pub async fn list_active(&self, user_id: i64) -> Result<Vec<Alert>> {
        self.list_alerts(user_id, true).await
    }

    pub async fn list_all(&self, user_id: i64) -> Result<Vec<Alert>> {
        self.list_alerts(user_id, false).await
    }

    async fn list_alerts(&self, user_id: i64, active_only: bool) -> Result<Vec<Alert>> {
        let rb = self
            .request(Method::GET, "/alerts")
            .query(&[("user_id", user_id.to_string()), ("active_only", active_only.to_string())]);
        self.send(rb).await
    }

    pub async fn history(&self, user_id: i64) -> Result<Vec<Alert>> {
        let rb = self
            .request(Method::GET, "/alerts/history")
            .query(&[("user_id", user_id)]);
        self.send(rb).await
    }

    pub async fn stats(&self, user_id: i64) -> Result<AlertStats> {
        let rb = self
            .request(Method::GET, "/alerts/stats")
            .query(&[("user_id", user_id)]);
        self.send(rb).await
    }

    pub async fn create_alert(&self, payload: &CreateAlertPayload) -> Result<Alert> {
        let rb = self.request(Method::POST, "/alerts").json(payload);
        let alert: Alert = self.send(rb).await?;

        tracing::info!("created alert {} on {}", alert.id, alert.ticker);
        events::emit(&self.events_tx, ClientEvent::AlertsUpdated);
        Ok(alert)
    }

    pub async fn delete_alert(&self, alert_id: i64, user_id: i64) -> Result<DeleteAlertResponse> {
        let rb = self
            .request(Method::DELETE, &format!("/alerts/{alert_id}"))
            .query(&[("user_id", user_id)]);
        let res: DeleteAlertResponse = self.send(rb).await?;

        tracing::info!("deleted alert {}", alert_id);
        events::emit(&self.events_tx, ClientEvent::AlertsUpdated);
        Ok(res)
    }

    // ---------------- User ----------------

    pub async fn profile(&self, user_id: i64) -> Result<UserProfile> {
        let rb = self
            .request(Method::GET, "/user/me")
            .query(&[("user_id", user_id)]);
        self.send(rb).await
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &UserUpdate,
    ) -> Result<UpdateProfileResponse> {
        let rb = self
            .request(Method::PUT, "/user/me")
            .query(&[("user_id", user_id)])
            .json(update);
        self.send(rb).await
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        let rb = self
            .request(Method::POST, "/user/change-password")
            .query(&[("user_id", user_id)])
            .json(&PasswordChange {
                current_password,
                new_password,
            });
        self.send(rb).await
    }

    pub async fn delete_account(&self, user_id: i64) -> Result<DeleteAccountResponse> {
        let rb = self
            .request(Method::DELETE, "/user/me")
            .query(&[("user_id", user_id)]);
        self.send(rb).await
    }

    // ---------------- Analytics & suggestions ----------------

    pub async fn dashboard_analytics(&self, user_id: i64) -> Result<DashboardAnalytics> {
        let rb = self
            .request(Method::GET, "/analytics/dashboard")
            .query(&[("user_id", user_id)]);
        self.send(rb).await
    }

    pub async fn analytics_chart(&self, user_id: i64, days: u32) -> Result<Vec<ChartPoint>> {
        let rb = self
            .request(Method::GET, "/analytics/chart")
            .query(&[("user_id", user_id.to_string()), ("days", days.to_string())]);
        self.send(rb).await
    }

    pub async fn popular_tickers(&self) -> Result<Vec<PopularTicker>> {
        let rb = self.request(Method::GET, "/suggestions/tickers");
        self.send(rb).await
    }

    pub async fn suggested_values(&self, ticker: &str, kind: AlertKind) -> Result<SuggestedValues> {
        let rb = self
            .request(Method::GET, "/suggestions/values")
            .query(&[("ticker", ticker.to_uppercase().as_str()), ("alert_type", kind.as_str())]);
        self.send(rb).await
    }
}

/// Pulls `detail` out of an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
