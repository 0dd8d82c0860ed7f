use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        middleware::{require_admin, require_auth},
        routes::{EntriesResponse, EntryResponse},
    },
    app_error::{AppError, AppResult},
    entities::waitlist_entry::WaitlistEntry,
};

/// Admin-only routes. Every route requires a valid token whose
/// `publicMetadata.role` is "admin".
pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/waitlist", get(list_waitlist))
        .route("/waitlist/pending", get(list_pending))
        .route("/waitlist/stats", get(waitlist_stats))
        .route("/waitlist/{id}", get(get_entry))
        .route("/approve-user", post(approve_user))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(app_state, require_auth))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApprovePayload {
    user_id: Option<String>,
}

#[derive(Serialize)]
struct SingleEntryResponse {
    user: WaitlistEntry,
}

/// Unparseable ids cannot name a stored entry.
fn parse_entry_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound)
}

/// GET /api/admin/waitlist
async fn list_waitlist(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let users = app_state.waitlist_use_cases.list_all().await?;
    Ok(Json(EntriesResponse { users }))
}

/// GET /api/admin/waitlist/pending
async fn list_pending(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let users = app_state.waitlist_use_cases.list_pending().await?;
    Ok(Json(EntriesResponse { users }))
}

/// GET /api/admin/waitlist/stats
async fn waitlist_stats(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = app_state.waitlist_use_cases.stats().await?;
    Ok(Json(stats))
}

/// GET /api/admin/waitlist/{id}
async fn get_entry(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_entry_id(&id)?;
    let user = app_state
        .waitlist_use_cases
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(SingleEntryResponse { user }))
}

/// POST /api/admin/approve-user
async fn approve_user(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<ApprovePayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let Some(raw_id) = payload.user_id.filter(|id| !id.trim().is_empty()) else {
        return Err(AppError::InvalidInput("userId is required".into()));
    };
    let id = parse_entry_id(&raw_id)?;

    let user = app_state
        .waitlist_use_cases
        .approve(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(EntryResponse {
        message: "User approved successfully",
        user,
    }))
}
