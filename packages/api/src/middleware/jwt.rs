use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sea_orm::EntityTrait;

use crate::{
    entity::{owner, prelude::*},
    error::ApiError,
    state::AppState,
    token::{self, TokenPurpose},
};

/// Authenticated owner identity, inserted into request extensions by
/// [`require_owner`].
#[derive(Debug, Clone)]
pub struct AuthOwner {
    pub id: i32,
    pub email: String,
}

impl AuthOwner {
    /// Full owner row, for flows that need the name or verification state.
    pub async fn get_owner(&self, state: &AppState) -> Result<owner::Model, ApiError> {
        Owner::find_by_id(self.id)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::kick_out("This account no longer exists"))
    }
}

/// Rejects the request unless a valid session token is presented as a Bearer
/// header. Failures carry `kick_out` so the frontend drops its stored token.
pub async fn require_owner(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response<Body>, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::kick_out("Missing authentication token"))?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    let claims = token::verify(&state.config.jwt_secret, token, TokenPurpose::Session)?;

    request.extensions_mut().insert(AuthOwner {
        id: claims.sub,
        email: claims.email,
    });
    Ok(next.run(request).await)
}
