//! Write endpoints
//!
//! Each route takes its chaincode arguments as one `@`-separated path
//! segment and resolves to exactly one outcome: the committed
//! transaction id as a JSON string, or a categorized error status.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use groot_core::Operation;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Record a new technology contract
pub async fn add_cont(
    State(state): State<AppState>,
    Path(groot): Path<String>,
) -> ApiResult<Json<String>> {
    submit(&state, "add_cont", split_args(&groot, 9)?).await
}

/// Register a client against a technology
pub async fn add_client(
    State(state): State<AppState>,
    Path(client): Path<String>,
) -> ApiResult<Json<String>> {
    submit(&state, "add_client", split_args(&client, 4)?).await
}

/// Change the terms of an existing contract
pub async fn change_term(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> ApiResult<Json<String>> {
    submit(&state, "change_term", split_args(&term, 3)?).await
}

/// Attach content to an existing contract
pub async fn add_content(
    State(state): State<AppState>,
    Path(content): Path<String>,
) -> ApiResult<Json<String>> {
    submit(&state, "add_content", split_args(&content, 4)?).await
}

/// Split one `@`-separated path segment into exactly `expected` arguments.
fn split_args(raw: &str, expected: usize) -> Result<Vec<String>, ApiError> {
    let args: Vec<String> = raw.split('@').map(str::to_string).collect();
    if args.len() != expected {
        return Err(ApiError::BadRequest(format!(
            "expected {expected} @-separated arguments, got {}",
            args.len()
        )));
    }
    Ok(args)
}

async fn submit(state: &AppState, name: &str, args: Vec<String>) -> ApiResult<Json<String>> {
    let tx_id = state.coordinator.submit(Operation::new(name, args)).await?;
    info!(operation = name, tx_id = %tx_id, "transaction committed");
    Ok(Json(tx_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::split_args;

    #[test]
    fn splits_the_expected_arity() {
        let args = split_args("LIDAR@patent@AcmeCo", 3).unwrap();
        assert_eq!(args, ["LIDAR", "patent", "AcmeCo"]);
    }

    #[test]
    fn preserves_empty_fields() {
        let args = split_args("LIDAR@@AcmeCo", 3).unwrap();
        assert_eq!(args, ["LIDAR", "", "AcmeCo"]);
    }

    #[test]
    fn wrong_arity_is_a_bad_request() {
        assert!(split_args("LIDAR@patent", 3).is_err());
        assert!(split_args("a@b@c@d", 3).is_err());
    }
}
