use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use facebluff_db::models::{FriendEdgeRow, FriendRelation, FriendStatus};
use facebluff_types::api::{
    Claims, FriendRequestBody, FriendsResponse, RelationResponse, RespondRequestBody, SearchQuery,
};
use facebluff_types::models::{FriendSummary, Relation, RelationState};

use crate::AppState;
use crate::error::ApiError;

/// Confirmed friends and incoming pending requests, as one page.
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (friends, requests) = tokio::try_join!(
        state.users.get_friends(&claims.sub),
        state.users.get_pending_requests(&claims.sub),
    )?;

    Ok(Json(FriendsResponse {
        friends: summaries(friends),
        requests: summaries(requests),
    }))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hits = state.users.search_users(&query.q, &claims.sub).await?;
    Ok(Json(summaries(hits)))
}

pub async fn send_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<FriendRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email == claims.sub {
        return Err(ApiError::BadRequest("cannot befriend yourself".into()));
    }
    if state.users.get_user(&req.email).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    if !state.users.send_friend_request(&claims.sub, &req.email).await? {
        return Err(ApiError::Conflict("already related to this user".into()));
    }
    info!("{} sent a friend request to {}", claims.sub, req.email);

    Ok((
        StatusCode::CREATED,
        Json(RelationResponse {
            relation: Some(Relation {
                requester: claims.sub,
                recipient: req.email,
                state: RelationState::Pending,
            }),
        }),
    ))
}

/// Accept or reject a request the caller received from `req.email`.
pub async fn respond_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RespondRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .users
        .resolve_friend_request(&req.email, &claims.sub, req.accept)
        .await?
    {
        return Err(ApiError::NotFound);
    }

    let relation = state.users.friend_relation(&req.email, &claims.sub).await?;
    Ok(Json(RelationResponse {
        relation: relation.map(relation_to_wire),
    }))
}

pub async fn get_relation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let relation = state.users.friend_relation(&claims.sub, &email).await?;
    Ok(Json(RelationResponse {
        relation: relation.map(relation_to_wire),
    }))
}

fn summaries(rows: Vec<FriendEdgeRow>) -> Vec<FriendSummary> {
    rows.into_iter()
        .map(|row| FriendSummary {
            name: row.name,
            email: row.email,
        })
        .collect()
}

fn relation_to_wire(relation: FriendRelation) -> Relation {
    Relation {
        requester: relation.requester,
        recipient: relation.recipient,
        state: match relation.status {
            FriendStatus::Pending => RelationState::Pending,
            FriendStatus::Confirmed => RelationState::Confirmed,
        },
    }
}
