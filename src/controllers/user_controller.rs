use crate::{
    AppState,
    controllers::auth_controller::is_valid_email,
    error::{GatilhoError, Result},
    models::UserUpdate,
    render,
};

pub async fn show_profile(state: &AppState) -> Result<String> {
    let session = state.require_session()?;
    let profile = state.api.profile(session.user_id).await?;
    render::render_profile(&state.hbs, &profile)
}

pub async fn update_profile(
    state: &AppState,
    name: Option<String>,
    email: Option<String>,
) -> Result<String> {
    let session = state.require_session()?;

    let update = UserUpdate {
        name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        email: email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
    };

    if update.is_empty() {
        return Err(GatilhoError::validation("Nothing to update."));
    }
    if update.name.as_ref().is_some_and(|n| n.chars().count() < 2) {
        return Err(GatilhoError::validation("Name must be at least 2 characters."));
    }
    if update.email.as_deref().is_some_and(|e| !is_valid_email(e)) {
        return Err(GatilhoError::validation("Invalid email."));
    }

    let res = state.api.update_profile(session.user_id, &update).await?;
    render::render_profile(&state.hbs, &res.user)
}

pub async fn change_password(state: &AppState, current: &str, new: &str) -> Result<String> {
    let session = state.require_session()?;

    if current.is_empty() {
        return Err(GatilhoError::validation("Current password is required."));
    }
    if new.chars().count() < 6 {
        return Err(GatilhoError::validation("New password must be at least 6 characters."));
    }

    let res = state.api.change_password(session.user_id, current, new).await?;
    Ok(if res.message.is_empty() {
        "Password changed.".to_string()
    } else {
        res.message
    })
}

/// Permanently removes the account and its alerts, then forgets the session.
pub async fn delete_account(state: &AppState, confirmed: bool) -> Result<String> {
    let session = state.require_session()?;

    if !confirmed {
        return Err(GatilhoError::validation(
            "This deletes your account and every alert. Re-run with --yes to confirm.",
        ));
    }

    let res = state.api.delete_account(session.user_id).await?;
    if !res.deleted {
        return Err(GatilhoError::Http {
            status: 200,
            detail: "server did not confirm the deletion".to_string(),
        });
    }

    state.session.clear()?;
    tracing::info!("account {} deleted", session.user_id);
    Ok("Account deleted.".to_string())
}

pub async fn analytics(state: &AppState, days: u32) -> Result<String> {
    let session = state.require_session()?;

    let (summary, chart) = tokio::try_join!(
        state.api.dashboard_analytics(session.user_id),
        state.api.analytics_chart(session.user_id, days),
    )?;

    render::render_analytics(&state.hbs, &summary, &chart, days)
}
