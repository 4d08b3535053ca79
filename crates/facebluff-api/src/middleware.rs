use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use facebluff_types::api::Claims;

use crate::AppState;
use crate::error::ApiError;

/// Extract and validate the JWT from the Authorization header and expose
/// its claims to handlers as an `Extension<Claims>`. The token's session id
/// must still be the account's current one; a profile update rotates it, so
/// a token for a since-renamed email cannot reach whoever registers it next.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    let claims = token_data.claims;
    let current = state.users.session_id(&claims.sub).await?;
    if current.as_deref() != Some(claims.sid.as_str()) {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
