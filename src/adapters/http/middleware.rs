use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{adapters::http::app_state::AppState, app_error::AppError, identity::AuthUser};

/// Verifies the bearer token and attaches the resulting `AuthUser` to the
/// request extensions.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Err(AppError::Unauthenticated);
    };

    let user = app_state.identity.verify(bearer.token()).await?;

    tracing::debug!(user_id = %user.id, "Authenticated request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Admits only users whose `publicMetadata.role` is "admin".
/// Must run after `require_auth`; without an attached user it answers 401.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let is_admin = request
        .extensions()
        .get::<AuthUser>()
        .map(AuthUser::is_admin)
        .ok_or(AppError::Unauthenticated)?;

    if !is_admin {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
