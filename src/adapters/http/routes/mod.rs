pub mod admin;
pub mod health;
pub mod user;
pub mod waitlist;

use axum::Router;
use serde::Serialize;

use crate::{adapters::http::app_state::AppState, entities::waitlist_entry::WaitlistEntry};

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/waitlist", waitlist::router())
        .nest("/admin", admin::router(app_state.clone()))
        .nest("/user", user::router(app_state))
}

#[derive(Serialize)]
struct EntryResponse {
    message: &'static str,
    user: WaitlistEntry,
}

#[derive(Serialize)]
struct EntriesResponse {
    users: Vec<WaitlistEntry>,
}
