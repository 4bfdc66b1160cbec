//! Workflow IPC commands.
//!
//! One command per operator action on a module card. Transitions run
//! under the session lock in `CoreState`; progress streaming and
//! toasts reach the frontend over the two event channels below.

use std::sync::Arc;

use tauri::{AppHandle, Emitter, State};
use uuid::Uuid;

use crate::core_state::CoreState;
use crate::workflow::driver::{self, TickConfig};
use crate::workflow::extraction::SimulatedExtraction;
use crate::workflow::notify::{Notification, Notifier};
use crate::workflow::session::WorkflowSession;
use crate::workflow::types::{EditDraft, InputArtifact, ProgressEvent, SessionSnapshot};

/// Channel for `ProgressEvent` payloads.
pub const PROGRESS_CHANNEL: &str = "workflow-progress";
/// Channel for operator toasts.
pub const NOTIFICATION_CHANNEL: &str = "workflow-notification";

/// Notifier that forwards toasts to the window.
struct EventNotifier {
    app: AppHandle,
}

impl Notifier for EventNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.app.emit(NOTIFICATION_CHANNEL, &notification);
    }
}

fn parse_session_id(session_id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(session_id).map_err(|e| format!("Invalid session ID: {e}"))
}

/// Open a module: create a session in `Selecting` for the descriptor
/// registered under (area, module).
#[tauri::command]
pub fn start_module(
    area_id: String,
    module_id: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionSnapshot, String> {
    let descriptor = state
        .catalog()
        .find_module(&area_id, &module_id)
        .ok_or_else(|| format!("Unknown module: {area_id}/{module_id}"))?;

    let session = WorkflowSession::new(&area_id, descriptor);
    let snapshot = session.snapshot();
    state.insert_session(session).map_err(|e| e.to_string())?;

    state.update_activity();
    tracing::info!(session = %snapshot.id, module = %snapshot.module_id, "Module opened");
    Ok(snapshot)
}

/// Move a fresh session out of `Selecting`.
#[tauri::command]
pub fn begin_session(
    session_id: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionSnapshot, String> {
    let id = parse_session_id(&session_id)?;

    state
        .with_session_mut(&id, |s| s.begin())
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    state.update_activity();
    state.session_snapshot(&id).map_err(|e| e.to_string())
}

/// Record the operator's file pick or typed token.
#[tauri::command]
pub fn supply_input(
    session_id: String,
    artifact: InputArtifact,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionSnapshot, String> {
    let id = parse_session_id(&session_id)?;

    state
        .with_session_mut(&id, |s| s.supply_input(artifact))
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    state.update_activity();
    state.session_snapshot(&id).map_err(|e| e.to_string())
}

/// Start the processing run and spawn its progress driver.
///
/// A refused start (no usable input) surfaces both ways: the operator
/// gets the toast, the caller gets the error.
#[tauri::command]
pub fn start_processing(
    session_id: String,
    app: AppHandle,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionSnapshot, String> {
    let id = parse_session_id(&session_id)?;
    let notifier = Arc::new(EventNotifier { app: app.clone() });

    state
        .with_session_mut(&id, |s| s.start_processing(notifier.as_ref()))
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    // The driver thread exits on its own once the session leaves
    // Processing, so the handle is not retained.
    let _ = driver::start_driver(
        state.inner().clone(),
        id,
        TickConfig::default(),
        Arc::new(SimulatedExtraction),
        notifier,
        move |event| {
            let _ = app.emit(PROGRESS_CHANNEL, &event);
        },
    );

    state.update_activity();
    state.session_snapshot(&id).map_err(|e| e.to_string())
}

/// Confirm an edit draft for a session in `ReviewingEdit`.
#[tauri::command]
pub fn confirm_edit(
    session_id: String,
    draft: EditDraft,
    app: AppHandle,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionSnapshot, String> {
    let id = parse_session_id(&session_id)?;
    let notifier = EventNotifier { app };

    state
        .with_session_mut(&id, |s| s.confirm_edit(draft, &notifier))
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    state.update_activity();
    state.session_snapshot(&id).map_err(|e| e.to_string())
}

/// Cancel a session from any non-terminal phase. A running driver
/// notices on its next tick and stops.
#[tauri::command]
pub fn cancel_session(
    session_id: String,
    app: AppHandle,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionSnapshot, String> {
    let id = parse_session_id(&session_id)?;
    let notifier = EventNotifier { app: app.clone() };

    state
        .with_session_mut(&id, |s| s.cancel(&notifier))
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    let _ = app.emit(PROGRESS_CHANNEL, &ProgressEvent::Cancelled { session_id: id });

    state.update_activity();
    state.session_snapshot(&id).map_err(|e| e.to_string())
}

/// Current snapshot of one session.
#[tauri::command]
pub fn get_session(
    session_id: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<SessionSnapshot, String> {
    let id = parse_session_id(&session_id)?;
    state.session_snapshot(&id).map_err(|e| e.to_string())
}

/// Forget a session. Closing the module screen calls this; a still
/// running driver stops on its next tick.
#[tauri::command]
pub fn discard_session(
    session_id: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<(), String> {
    let id = parse_session_id(&session_id)?;
    let snapshot = state.remove_session(&id).map_err(|e| e.to_string())?;

    state.update_activity();
    tracing::debug!(session = %id, phase = %snapshot.phase, "Session discarded");
    Ok(())
}
