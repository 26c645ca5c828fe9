//! API route handlers

pub mod health;
pub mod invoke;
pub mod query;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(health::health_check))
        // Write endpoints; the path segment carries @-separated arguments
        .route("/add_cont/:groot", get(invoke::add_cont))
        .route("/add_client/:client", get(invoke::add_client))
        .route("/change_term/:term", get(invoke::change_term))
        .route("/add_content/:content", get(invoke::add_content))
        // Read endpoints
        .route("/get_cert_verify/:cert", get(query::get_cert_verify))
        .route("/get_tech/:id", get(query::get_tech))
        .route("/get_all_tech", get(query::get_all_tech))
        .route("/query_tech", get(query::query_tech))
        // State
        .with_state(state)
}
