pub mod auth;
pub mod error;
pub mod friends;
pub mod middleware;
pub mod profile;
pub mod questions;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use facebluff_db::{Database, QuestionRepository, UserRepository};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: UserRepository,
    pub questions: QuestionRepository,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: String) -> AppState {
        Arc::new(Self {
            users: UserRepository::new(db.clone()),
            questions: QuestionRepository::new(db),
            jwt_secret,
        })
    }
}

/// All `/api` routes. CORS and tracing layers are added by the server.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/users/{email}/picture", get(profile::get_profile_picture))
        .route("/friends", get(friends::list_friends))
        .route("/friends/search", get(friends::search))
        .route("/friends/requests", post(friends::send_request))
        .route("/friends/requests/respond", post(friends::respond_request))
        .route("/friends/{email}", get(friends::get_relation))
        .route("/questions", post(questions::create_question))
        .route("/questions/random", get(questions::random_questions))
        .route("/questions/{id}", get(questions::get_question))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
