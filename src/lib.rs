pub mod catalog; // HB-01/HB-02/HB-05: Hub client, resolver, store
pub mod commands; // HB-07: IPC command surface
pub mod config;
pub mod core_state; // HB-06: Shared application state
pub mod models;
pub mod workflow; // HB-03/HB-04: Session engine + progress driver

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Hansu Hub starting v{}", config::APP_VERSION);

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(Arc::new(core_state::CoreState::new()))
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::backend_status,
            // HB-01/HB-05: Catalog aggregation
            commands::catalog::load_catalog,
            commands::catalog::load_licenses,
            commands::catalog::get_areas,
            commands::catalog::get_area_modules,
            commands::catalog::load_module_catalog,
            // HB-03/HB-04: Module workflows
            commands::workflow::start_module,
            commands::workflow::begin_session,
            commands::workflow::supply_input,
            commands::workflow::start_processing,
            commands::workflow::confirm_edit,
            commands::workflow::cancel_session,
            commands::workflow::get_session,
            commands::workflow::discard_session,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Hansu Hub")
}
