use serde::{Deserialize, Serialize};

/// Bearer token plus the user it belongs to, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user_id: i64,
}

impl LoginResponse {
    pub fn into_session(self) -> Session {
        Session {
            token: self.access_token,
            user_id: self.user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: String,
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileResponse {
    #[serde(default)]
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAccountResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub deleted: bool,
}
