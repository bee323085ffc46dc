//! Passenger log export endpoints.
//!
//! - GET /api/v1/log/ - Start an export, returns the operation
//! - GET /api/v1/log/status/ - Poll an export by id

use crate::passenger_log::ExportArtifact;
use crate::server::state::AppState;
use axum::{Json, extract::State};
use flight_control_runtime::{Operation, OperationId};
use flight_control_web::{AppError, Validate, ValidatedQuery};
use serde::{Deserialize, Serialize};

/// Operation as returned to clients.
///
/// `result` stays `null` until the export has written the file.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationResponse {
    /// Handle to poll with
    pub id: OperationId,
    /// Whether the export has finished (successfully or not)
    pub done: bool,
    /// Location of the written file
    pub result: Option<ExportArtifactBody>,
    /// Failure reason, present only for failed exports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result payload of a finished export.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportArtifactBody {
    /// Path of the written file
    pub path: String,
}

impl From<Operation<ExportArtifact>> for OperationResponse {
    fn from(operation: Operation<ExportArtifact>) -> Self {
        Self {
            id: operation.id,
            done: operation.is_done(),
            result: operation.result().map(|artifact| ExportArtifactBody {
                path: artifact.path.display().to_string(),
            }),
            error: operation.error().map(str::to_string),
        }
    }
}

/// Query naming an operation.
#[derive(Debug, Deserialize)]
pub struct OperationIdQuery {
    /// Operation handle (UUID)
    pub id: OperationId,
}

impl Validate for OperationIdQuery {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Start a passenger log export.
///
/// Returns immediately; the operation is usually still pending.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8000/api/v1/log/
/// # {"id":"6f1c...","done":false,"result":null}
/// ```
pub async fn submit_log_export(
    State(state): State<AppState>,
) -> Result<Json<OperationResponse>, AppError> {
    let operation_id = state.control.submit_log_export();
    let operation = state.control.poll_operation(operation_id)?;
    Ok(Json(operation.into()))
}

/// Poll a passenger log export.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8000/api/v1/log/status/?id=6f1c..."
/// # {"id":"6f1c...","done":true,"result":{"path":"static/log/passengers.csv"}}
/// ```
pub async fn log_export_status(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<OperationIdQuery>,
) -> Result<Json<OperationResponse>, AppError> {
    let operation = state.control.poll_operation(query.id)?;
    Ok(Json(operation.into()))
}
