/*
 * POST /api/v1/admin/sync — the admin trigger for the Sync Orchestrator's (C5) async variant.
 * Returns immediately; the ingestion pass itself runs on a detached background task.
 */

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SyncTriggerResponse {
    pub message: String,
    pub status: String,
}

/// `POST /api/v1/admin/sync`. Always 202 — the caller is told the run was launched, not that it
/// completed; check `/api/v1/health` or logs for the outcome of the background pass.
pub async fn trigger_sync(State(state): State<AppState>) -> (StatusCode, Json<SyncTriggerResponse>) {
    state.sync_orchestrator.sync_all_async(CancellationToken::new());

    (
        StatusCode::ACCEPTED,
        Json(SyncTriggerResponse {
            message: "sync triggered".to_string(),
            status: "running".to_string(),
        }),
    )
}
