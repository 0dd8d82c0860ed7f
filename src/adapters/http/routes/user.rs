use axum::{
    Extension, Json, Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    adapters::http::{app_state::AppState, middleware::require_auth, routes::EntryResponse},
    app_error::{AppError, AppResult},
    entities::waitlist_entry::WaitlistEntry,
    identity::AuthUser,
};

/// Routes for any signed-in user.
pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/waitlist", get(my_waitlist_entry))
        .route("/waitlist/link", post(link_waitlist_entry))
        .route_layer(middleware::from_fn_with_state(app_state, require_auth))
}

#[derive(Serialize)]
struct WaitlistEntryResponse {
    user: WaitlistEntry,
}

/// GET /api/user/profile
async fn profile(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}

/// The caller's entry, looked up by their verified token email.
async fn entry_for(app_state: &AppState, user: &AuthUser) -> AppResult<WaitlistEntry> {
    let email = user.verified_email()?;

    app_state
        .waitlist_use_cases
        .find_by_email(email)
        .await?
        .ok_or(AppError::NotFound)
}

/// GET /api/user/waitlist
async fn my_waitlist_entry(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let entry = entry_for(&app_state, &user).await?;
    Ok(Json(WaitlistEntryResponse { user: entry }))
}

/// POST /api/user/waitlist/link
///
/// Records the caller's identity-provider id on the waitlist entry matching
/// their verified token email. An entry already linked to another id is left
/// alone (409).
async fn link_waitlist_entry(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let entry = entry_for(&app_state, &user).await?;

    let linked = app_state
        .waitlist_use_cases
        .link_identity(entry.id, &user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(entry_id = %linked.id, user_id = %user.id, "Linked waitlist entry");

    Ok(Json(EntryResponse {
        message: "Waitlist entry linked",
        user: linked,
    }))
}
