use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, routes::EntryResponse},
    app_error::{AppError, AppResult},
    use_cases::waitlist::{JoinOutcome, JoinRequest},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/join", post(join))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinPayload {
    email: Option<String>,
    full_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    metadata: Option<serde_json::Value>,
    /// Identity-provider user id, when the client already signed up.
    #[serde(alias = "clerkUserId", alias = "cognitoUserId")]
    external_user_id: Option<String>,
}

/// POST /api/waitlist/join
async fn join(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<JoinPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let request = JoinRequest {
        email: payload.email,
        full_name: payload.full_name,
        first_name: payload.first_name,
        last_name: payload.last_name,
        external_user_id: payload.external_user_id,
        metadata: payload.metadata,
    };

    match app_state.waitlist_use_cases.add(request).await? {
        JoinOutcome::Joined(user) => Ok(Json(EntryResponse {
            message: "Successfully joined waitlist",
            user,
        })),
        JoinOutcome::AlreadyOnWaitlist => Err(AppError::DuplicateEmail),
    }
}
