use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use facebluff_db::models::{ProfileUpdate, UserRow};
use facebluff_types::api::{
    Claims, ProfilePictureResponse, UpdateProfileRequest, UpdateProfileResponse,
};
use facebluff_types::models::Profile;

use crate::AppState;
use crate::auth::{create_token, validate_account};
use crate::error::ApiError;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .get_user(&claims.sub)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(profile_from_row(user)))
}

/// Rewrite the caller's profile. Points stay as stored, and the session is
/// rotated, so the caller gets a fresh token and every older one is dead.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_account(&req.email, &req.password, &req.name)?;

    let updated = ProfileUpdate {
        email: req.email,
        password: req.password,
        name: req.name,
        gender: req.gender,
        birthdate: req.birthdate,
        profile_picture: req.profile_picture,
    };

    let found = state
        .users
        .update_user(&claims.sub, &updated)
        .await
        .map_err(|e| {
            if e.is_constraint() {
                ApiError::Conflict("email already registered".into())
            } else {
                e.into()
            }
        })?;
    if !found {
        return Err(ApiError::NotFound);
    }

    let user = state
        .users
        .get_user(&updated.email)
        .await?
        .ok_or(ApiError::NotFound)?;
    let token = create_token(&state.jwt_secret, &user.email, &user.session_id, &user.name)?;

    Ok(Json(UpdateProfileResponse {
        email: user.email,
        token,
    }))
}

pub async fn get_profile_picture(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile_picture = state.users.get_profile_picture_name(&email).await?;
    Ok(Json(ProfilePictureResponse { profile_picture }))
}

fn profile_from_row(row: UserRow) -> Profile {
    Profile {
        email: row.email,
        name: row.name,
        gender: row.gender,
        birthdate: row.birthdate,
        profile_picture: row.profile_picture,
        points: row.points,
    }
}
