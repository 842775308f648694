use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod summary;
pub mod system;
pub mod transactions;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Endpoints behind the bearer-token gate.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/summary", get(summary::get_summary))
        .nest("/transactions", transactions::router())
}
