use std::sync::LazyLock;

use regex::Regex;

use crate::{
    AppState,
    error::{GatilhoError, Result},
};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

fn fail_if_any(errors: Vec<&str>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(GatilhoError::validation(errors.join("\n")))
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<String> {
    let email = email.trim();
    let mut errors = Vec::new();

    if email.is_empty() {
        errors.push("Email is required.");
    } else if !is_valid_email(email) {
        errors.push("Invalid email.");
    }

    if password.is_empty() {
        errors.push("Password is required.");
    }

    fail_if_any(errors)?;

    let res = state.api.login(email, password).await?;
    let session = res.into_session();
    state.session.save(&session)?;

    tracing::info!("logged in as user {}", session.user_id);
    Ok(format!("Logged in as user {}.", session.user_id))
}

pub async fn signup(state: &AppState, name: &str, email: &str, password: &str) -> Result<String> {
    let name = name.trim();
    let email = email.trim();
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push("Name is required.");
    } else if name.chars().count() < 2 {
        errors.push("Name must be at least 2 characters.");
    }

    if email.is_empty() {
        errors.push("Email is required.");
    } else if !is_valid_email(email) {
        errors.push("Invalid email.");
    }

    if password.is_empty() {
        errors.push("Password is required.");
    } else if password.chars().count() < 6 {
        errors.push("Password must be at least 6 characters.");
    }

    fail_if_any(errors)?;

    let res = state.api.signup(name, email, password).await?;
    tracing::info!("account {} created", res.user_id);

    Ok(format!(
        "Account created for {}. Run `gatilho login` to continue.",
        res.email
    ))
}

pub fn logout(state: &AppState) -> Result<String> {
    state.session.clear()?;
    Ok("Logged out.".to_string())
}
