//! HB-07: IPC command surface.
//!
//! Catalog commands live in `catalog`, workflow commands in
//! `workflow`. This module keeps the two cross-cutting commands the
//! frontend calls on startup.

pub mod catalog;
pub mod workflow;

use std::sync::Arc;

use tauri::State;

use crate::catalog::client::{HubApi, HubClient};
use crate::core_state::CoreState;

/// Health check IPC command. Verifies the backend side of the bridge
/// is alive.
#[tauri::command]
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}

/// Hub connectivity for the frontend status indicator.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BackendStatus {
    /// Whether the Hub API answered its health endpoint.
    pub hub_reachable: bool,
    /// Base URL the client is pointed at.
    pub base_url: String,
    /// Human-readable status summary.
    pub summary: String,
    /// Seconds since the last command touched shared state.
    pub idle_secs: u64,
}

/// Probe the Hub API and report connectivity.
///
/// Runs on a blocking thread: the probe uses the blocking HTTP client
/// and may wait out its timeout.
#[tauri::command]
pub async fn backend_status(state: State<'_, Arc<CoreState>>) -> Result<BackendStatus, String> {
    let state = state.inner().clone();
    tauri::async_runtime::spawn_blocking(move || {
        let client = HubClient::from_config();
        let base_url = client.base_url().to_string();
        let hub_reachable = client.health().map(|h| h.is_ok()).unwrap_or(false);

        let summary = if hub_reachable {
            format!("Hub online em {base_url}")
        } else {
            format!("Hub indisponível em {base_url}")
        };

        tracing::debug!(reachable = hub_reachable, url = %base_url, "Backend status probed");
        BackendStatus {
            hub_reachable,
            base_url,
            summary,
            idle_secs: state.idle_secs(),
        }
    })
    .await
    .map_err(|e| format!("Task failed: {e}"))
}
