use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;

use facebluff_db::models::NewUser;
use facebluff_types::api::{
    Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};

use crate::AppState;
use crate::error::ApiError;

const TOKEN_LIFETIME_DAYS: i64 = 30;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_account(&req.email, &req.password, &req.name)?;

    let user = NewUser {
        email: req.email,
        password: req.password,
        name: req.name,
        gender: req.gender,
        birthdate: req.birthdate,
        profile_picture: req.profile_picture,
        points: 0,
    };

    state.users.create_user(&user).await.map_err(|e| {
        if e.is_constraint() {
            ApiError::Conflict("email already registered".into())
        } else {
            e.into()
        }
    })?;
    info!("Registered {}", user.email);

    let sid = state
        .users
        .session_id(&user.email)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("{} vanished after registration", user.email)))?;
    let token = create_token(&state.jwt_secret, &user.email, &sid, &user.name)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            email: user.email,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.users.verify_credentials(&req.email, &req.password).await? {
        return Err(ApiError::Unauthorized);
    }

    let user = state
        .users
        .get_user(&req.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token = create_token(&state.jwt_secret, &user.email, &user.session_id, &user.name)?;

    Ok(Json(LoginResponse {
        email: user.email,
        name: user.name,
        token,
    }))
}

/// Shape checks shared by registration and profile edits.
pub(crate) fn validate_account(email: &str, password: &str, name: &str) -> Result<(), ApiError> {
    let email_ok = email.len() <= 254
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !email_ok {
        return Err(ApiError::BadRequest("invalid email address".into()));
    }
    if password.len() < 8 {
        return Err(ApiError::BadRequest("password must be at least 8 characters".into()));
    }
    if name.trim().is_empty() || name.len() > 64 {
        return Err(ApiError::BadRequest("name must be 1 to 64 characters".into()));
    }
    Ok(())
}

pub(crate) fn create_token(
    secret: &str,
    email: &str,
    sid: &str,
    name: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: email.to_string(),
        sid: sid.to_string(),
        name: name.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp()
            as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
