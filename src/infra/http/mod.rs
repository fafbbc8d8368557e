mod error;
mod handlers;
mod middleware;
pub mod models;
mod state;

pub use error::{ApiError, ApiErrorBody, ApiErrorMessage, codes};
pub use state::HttpState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use self::middleware::log_responses;

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/v1/books/info", post(handlers::get_books_info))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
}
