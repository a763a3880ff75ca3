use axum::{routing::delete, routing::get, routing::patch, routing::post, routing::put, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn notifications() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::list_notifications))
        .route(
            "/notifications/read-all",
            put(handlers::mark_all_notifications_read),
        )
        .route(
            "/notifications/clear-all",
            delete(handlers::clear_notifications),
        )
        .route(
            "/notifications/:id/read",
            put(handlers::mark_notification_read),
        )
        .route("/notifications/:id", delete(handlers::delete_notification))
}

pub fn bills() -> Router<AppState> {
    Router::new()
        .route("/bills", post(handlers::create_bill))
        .route("/bills", get(handlers::list_bills))
        .route("/bills/:id", patch(handlers::update_bill))
        .route("/bills/:id", delete(handlers::delete_bill))
        .route("/bills/:id/pay", post(handlers::pay_bill))
}

pub fn debts() -> Router<AppState> {
    Router::new()
        .route("/debts", post(handlers::create_debt))
        .route("/debts", get(handlers::list_debts))
        .route("/debts/:id", patch(handlers::update_debt))
        .route("/debts/:id", delete(handlers::delete_debt))
        .route("/debts/:id/pay", post(handlers::pay_debt))
}

pub fn goals() -> Router<AppState> {
    Router::new()
        .route("/goals", post(handlers::create_goal))
        .route("/goals", get(handlers::list_goals))
        .route("/goals/:id", patch(handlers::update_goal))
        .route("/goals/:id", delete(handlers::delete_goal))
        .route("/goals/:id/contribute", post(handlers::contribute_goal))
}
