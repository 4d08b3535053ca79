use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FriendSummary, Relation};

// -- JWT Claims --

/// JWT claims issued at login. `sub` is the user's email, the primary key of
/// the users table. `sid` must match the account's current session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub sid: String,
    pub name: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub gender: String,
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub email: String,
    pub name: String,
    pub token: String,
}

// -- Profile --

/// Full profile rewrite. Points are not client-controlled and carry over.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub gender: String,
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProfileResponse {
    pub email: String,
    /// Every update rotates the session, so earlier tokens stop working.
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfilePictureResponse {
    pub profile_picture: Option<String>,
}

// -- Friends --

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendsResponse {
    pub friends: Vec<FriendSummary>,
    pub requests: Vec<FriendSummary>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FriendRequestBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RespondRequestBody {
    /// The requester whose pending request is being resolved.
    pub email: String,
    pub accept: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelationResponse {
    pub relation: Option<Relation>,
}

// -- Questions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewQuestionRequest {
    pub text: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub op1: Option<String>,
    #[serde(default)]
    pub op2: Option<String>,
    #[serde(default)]
    pub op3: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewQuestionResponse {
    pub id: i64,
}
