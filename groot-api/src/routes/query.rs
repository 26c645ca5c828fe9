//! Read endpoints
//!
//! Read-only chaincode evaluations. The raw peer payload is returned as
//! the response body; a missing record maps to 404.

use axum::extract::{Path, State};

use groot_core::Operation;

use crate::error::ApiResult;
use crate::state::AppState;

/// Verify a certificate record
pub async fn get_cert_verify(
    State(state): State<AppState>,
    Path(cert): Path<String>,
) -> ApiResult<String> {
    run_query(&state, "get_cert_verify", vec![cert]).await
}

/// Fetch one technology record by key
pub async fn get_tech(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    run_query(&state, "get_tech", vec![id]).await
}

/// List every technology record
pub async fn get_all_tech(State(state): State<AppState>) -> ApiResult<String> {
    run_query(&state, "get_all_tech", vec![String::new()]).await
}

/// Rich query over technology records
pub async fn query_tech(State(state): State<AppState>) -> ApiResult<String> {
    run_query(&state, "query_tech", vec![String::new()]).await
}

async fn run_query(state: &AppState, name: &str, args: Vec<String>) -> ApiResult<String> {
    let payload = state.executor.query(Operation::new(name, args)).await?;
    Ok(String::from_utf8_lossy(&payload).into_owned())
}
