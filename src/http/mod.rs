use axum::http::{header, HeaderName, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::AuthUser;
pub use error::AppError;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-user-id")])
        .allow_origin(Any)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::notifications())
        .merge(routes::bills())
        .merge(routes::debts())
        .merge(routes::goals())
        .layer(cors())
        .with_state(state)
}
