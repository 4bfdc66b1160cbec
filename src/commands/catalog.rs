//! Catalog IPC commands.
//!
//! Refresh commands hit the Hub API on a blocking thread and fall
//! back to the cached catalog contract of the store: a failed fetch
//! returns an error but never clears what the frontend already has.

use std::sync::Arc;

use tauri::State;

use crate::catalog::client::{HubApi, HubClient};
use crate::core_state::CoreState;
use crate::models::license::LicenseRecord;
use crate::models::module::{Area, CatalogEntry, ModuleDescriptor};

/// Refresh the grouped area catalog from the Hub.
#[tauri::command]
pub async fn load_catalog(state: State<'_, Arc<CoreState>>) -> Result<Vec<Area>, String> {
    let state = state.inner().clone();
    tauri::async_runtime::spawn_blocking(move || {
        let client = HubClient::from_config();
        let areas = state
            .catalog()
            .refresh_catalog(&client)
            .map_err(|e| e.to_string())?;

        state.update_activity();
        Ok(areas)
    })
    .await
    .map_err(|e| format!("Task failed: {e}"))?
}

/// Refresh license records from the Hub.
#[tauri::command]
pub async fn load_licenses(state: State<'_, Arc<CoreState>>) -> Result<Vec<LicenseRecord>, String> {
    let state = state.inner().clone();
    tauri::async_runtime::spawn_blocking(move || {
        let client = HubClient::from_config();
        let licenses = state
            .catalog()
            .refresh_licenses(&client)
            .map_err(|e| e.to_string())?;

        state.update_activity();
        Ok(licenses)
    })
    .await
    .map_err(|e| format!("Task failed: {e}"))?
}

/// Cached areas, as last refreshed (or the built-in catalog).
#[tauri::command]
pub fn get_areas(state: State<'_, Arc<CoreState>>) -> Vec<Area> {
    state.update_activity();
    state.catalog().areas()
}

/// Modules of one area, for the area landing screen.
#[tauri::command]
pub fn get_area_modules(
    area_id: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<Vec<ModuleDescriptor>, String> {
    state.update_activity();
    area_modules(&state, &area_id)
}

fn area_modules(state: &CoreState, area_id: &str) -> Result<Vec<ModuleDescriptor>, String> {
    state
        .catalog()
        .areas()
        .into_iter()
        .find(|a| a.id == area_id)
        .map(|a| a.modules)
        .ok_or_else(|| format!("Unknown area: {area_id}"))
}

/// Flat module catalog for the admin listing. Fetched straight from
/// the Hub, never cached.
#[tauri::command]
pub async fn load_module_catalog(
    state: State<'_, Arc<CoreState>>,
) -> Result<Vec<CatalogEntry>, String> {
    let state = state.inner().clone();
    tauri::async_runtime::spawn_blocking(move || {
        let client = HubClient::from_config();
        let catalog = client.fetch_catalog().map_err(|e| e.to_string())?;

        state.update_activity();
        Ok(catalog)
    })
    .await
    .map_err(|e| format!("Task failed: {e}"))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_modules_returns_known_area() {
        let state = CoreState::new();
        let modules = area_modules(&state, "efd-icms").unwrap();
        assert_eq!(modules.len(), 3);
        assert!(modules.iter().any(|m| m.id == "editor-cnpj-ie"));
    }

    #[test]
    fn area_modules_rejects_unknown_area() {
        let state = CoreState::new();
        let err = area_modules(&state, "simples").unwrap_err();
        assert_eq!(err, "Unknown area: simples");
    }
}
