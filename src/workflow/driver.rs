//! HB-04: Background progress driver.
//!
//! Spawns one thread per processing run. The thread ticks the session
//! forward at a configurable cadence, streams progress events, and
//! finishes the run through the extraction backend when progress hits
//! 100. All session mutation goes through `CoreState`, so the driver
//! observes cancellation the same way every other caller does: the
//! transition refuses and the thread stops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config;
use crate::core_state::CoreState;
use crate::workflow::extraction::ExtractionBackend;
use crate::workflow::notify::Notifier;
use crate::workflow::types::ProgressEvent;

/// Tick cadence for a simulated run. Defaults walk 0 to 100 in about
/// three seconds.
#[derive(Debug, Clone, Copy)]
pub struct TickConfig {
    pub interval: Duration,
    pub step: u8,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(config::TICK_INTERVAL_MS),
            step: config::TICK_STEP,
        }
    }
}

/// Handle for a running driver thread.
///
/// Dropping the handle detaches the thread; it exits on its own once
/// the session reaches a terminal phase. `shutdown()` stops it early
/// without touching the session.
pub struct DriverHandle {
    shutdown: Arc<AtomicBool>,
    handle: std::thread::JoinHandle<()>,
}

impl DriverHandle {
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the driver thread to exit. Tests use this to make
    /// run outcomes deterministic.
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

enum TickOutcome {
    Continue,
    Finished,
    Stopped,
}

/// Start driving a session that just entered `Processing`.
///
/// `on_progress` receives every event in emission order, on the
/// driver thread.
pub fn start_driver(
    state: Arc<CoreState>,
    session_id: Uuid,
    tick: TickConfig,
    backend: Arc<dyn ExtractionBackend>,
    notifier: Arc<dyn Notifier>,
    on_progress: impl Fn(ProgressEvent) + Send + 'static,
) -> DriverHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!(
            session = %session_id,
            interval_ms = tick.interval.as_millis() as u64,
            step = tick.step,
            "Progress driver started"
        );
        on_progress(ProgressEvent::Started { session_id });
        drive_loop(&state, session_id, tick, &flag, backend, notifier, &on_progress);
    });

    DriverHandle { shutdown, handle }
}

fn drive_loop(
    state: &CoreState,
    session_id: Uuid,
    tick: TickConfig,
    shutdown: &AtomicBool,
    backend: Arc<dyn ExtractionBackend>,
    notifier: Arc<dyn Notifier>,
    on_progress: &dyn Fn(ProgressEvent),
) {
    loop {
        std::thread::sleep(tick.interval);

        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!(session = %session_id, "Progress driver shut down");
            return;
        }

        match tick_once(state, session_id, tick.step, on_progress) {
            TickOutcome::Continue => {}
            TickOutcome::Finished => {
                finish(state, session_id, backend.as_ref(), notifier.as_ref(), on_progress);
                return;
            }
            TickOutcome::Stopped => {
                tracing::debug!(session = %session_id, "Progress driver stopped, session no longer processing");
                return;
            }
        }
    }
}

fn tick_once(
    state: &CoreState,
    session_id: Uuid,
    step: u8,
    on_progress: &dyn Fn(ProgressEvent),
) -> TickOutcome {
    // A refused advance means the session was cancelled, finished or
    // discarded since the last tick.
    let progress = match state.with_session_mut(&session_id, |s| s.advance(step)) {
        Ok(Ok(progress)) => progress,
        Ok(Err(_)) | Err(_) => return TickOutcome::Stopped,
    };

    on_progress(ProgressEvent::Tick {
        session_id,
        progress,
    });

    if progress >= 100 {
        TickOutcome::Finished
    } else {
        TickOutcome::Continue
    }
}

/// Run the extraction backend and land the session in its terminal
/// phase. The backend runs without any lock held; only the final
/// transition re-acquires the session.
fn finish(
    state: &CoreState,
    session_id: Uuid,
    backend: &dyn ExtractionBackend,
    notifier: &dyn Notifier,
    on_progress: &dyn Fn(ProgressEvent),
) {
    let source = state.read_sessions().ok().and_then(|sessions| {
        sessions
            .get(&session_id)
            .map(|s| (s.descriptor.clone(), s.input_artifact().cloned()))
    });

    let Some((descriptor, Some(artifact))) = source else {
        tracing::debug!(session = %session_id, "Session vanished before extraction");
        return;
    };

    match backend.extract(&descriptor, &artifact) {
        Ok(rows) => {
            let row_count = rows.len();
            let completed =
                state.with_session_mut(&session_id, |s| s.complete(rows, notifier));
            if matches!(completed, Ok(Ok(()))) {
                on_progress(ProgressEvent::Completed {
                    session_id,
                    row_count,
                });
            }
        }
        Err(e) => {
            let reason = e.to_string();
            let failed =
                state.with_session_mut(&session_id, |s| s.fail(&reason, notifier));
            if matches!(failed, Ok(Ok(()))) {
                on_progress(ProgressEvent::Failed {
                    session_id,
                    error: reason,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::resolver;
    use crate::models::module::ModuleStub;
    use crate::workflow::extraction::{FailingExtraction, SimulatedExtraction};
    use crate::workflow::notify::{BufferNotifier, NotifyKind, NullNotifier};
    use crate::workflow::session::WorkflowSession;
    use crate::workflow::types::{InputArtifact, Phase};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn fast_tick() -> TickConfig {
        TickConfig {
            interval: Duration::from_millis(1),
            step: 50,
        }
    }

    /// State holding one session already in `Processing` with the
    /// given artifact.
    fn processing_state(artifact: InputArtifact) -> (Arc<CoreState>, Uuid) {
        let descriptor = resolver::resolve_stub(&ModuleStub {
            id: "darf".to_string(),
            label: "Extrair Darf".to_string(),
            ..ModuleStub::default()
        })
        .unwrap();

        let mut session = WorkflowSession::new("ecac", descriptor);
        session.begin().unwrap();
        session.supply_input(artifact).unwrap();
        session.start_processing(&NullNotifier).unwrap();

        let state = Arc::new(CoreState::new());
        let id = state.insert_session(session).unwrap();
        (state, id)
    }

    fn collector() -> (
        Arc<Mutex<Vec<ProgressEvent>>>,
        impl Fn(ProgressEvent) + Send + 'static,
    ) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let push = move |event| {
            if let Ok(mut v) = sink.lock() {
                v.push(event);
            }
        };
        (events, push)
    }

    fn token() -> InputArtifact {
        InputArtifact::Token {
            value: "ecac-token".to_string(),
        }
    }

    #[test]
    fn default_tick_walks_to_completion() {
        let tick = TickConfig::default();
        assert_eq!(tick.interval, Duration::from_millis(config::TICK_INTERVAL_MS));
        assert_eq!(tick.step, config::TICK_STEP);
        assert_eq!(100 % tick.step, 0);
    }

    #[test]
    fn driver_completes_a_run() {
        let (state, id) = processing_state(token());
        let (events, push) = collector();
        let notifier = Arc::new(BufferNotifier::new());

        let handle = start_driver(
            Arc::clone(&state),
            id,
            fast_tick(),
            Arc::new(SimulatedExtraction),
            notifier.clone(),
            push,
        );
        handle.join();

        let snapshot = state.session_snapshot(&id).unwrap();
        assert_eq!(snapshot.phase, Phase::Completed);
        assert_eq!(snapshot.progress, 100);
        assert_eq!(snapshot.result_rows.len(), 4);

        let events = events.lock().unwrap();
        assert!(matches!(events[0], ProgressEvent::Started { .. }));
        assert!(matches!(
            events.last(),
            Some(ProgressEvent::Completed { row_count: 4, .. })
        ));

        let ticks: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Tick { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![50, 100]);

        assert_eq!(notifier.count(), 1);
        assert_eq!(notifier.sent()[0].kind, NotifyKind::Success);
    }

    #[test]
    fn driver_reports_backend_failure() {
        let (state, id) = processing_state(token());
        let (events, push) = collector();
        let notifier = Arc::new(BufferNotifier::new());

        let handle = start_driver(
            Arc::clone(&state),
            id,
            fast_tick(),
            Arc::new(FailingExtraction::new("PDF corrompido")),
            notifier.clone(),
            push,
        );
        handle.join();

        let snapshot = state.session_snapshot(&id).unwrap();
        assert_eq!(snapshot.phase, Phase::Failed);
        assert!(snapshot.failure_reason.unwrap().contains("PDF corrompido"));

        let events = events.lock().unwrap();
        assert!(matches!(events.last(), Some(ProgressEvent::Failed { .. })));
        assert_eq!(notifier.sent()[0].kind, NotifyKind::Error);
    }

    #[test]
    fn missing_source_file_fails_the_run() {
        let (state, id) = processing_state(InputArtifact::FilePath {
            path: PathBuf::from("/nonexistent/efd-icms.txt"),
        });
        let (events, push) = collector();

        let handle = start_driver(
            Arc::clone(&state),
            id,
            fast_tick(),
            Arc::new(SimulatedExtraction),
            Arc::new(NullNotifier),
            push,
        );
        handle.join();

        let snapshot = state.session_snapshot(&id).unwrap();
        assert_eq!(snapshot.phase, Phase::Failed);
        assert!(snapshot.failure_reason.unwrap().contains("efd-icms.txt"));
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Failed { .. })));
    }

    #[test]
    fn existing_source_file_completes_the_run() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "|0000|014|0|").unwrap();

        let (state, id) = processing_state(InputArtifact::FilePath {
            path: file.path().to_path_buf(),
        });
        let (_, push) = collector();

        let handle = start_driver(
            Arc::clone(&state),
            id,
            fast_tick(),
            Arc::new(SimulatedExtraction),
            Arc::new(NullNotifier),
            push,
        );
        handle.join();

        assert_eq!(state.session_snapshot(&id).unwrap().phase, Phase::Completed);
    }

    #[test]
    fn cancellation_stops_the_driver() {
        let (state, id) = processing_state(token());
        let (events, push) = collector();
        let notifier = BufferNotifier::new();

        let handle = start_driver(
            Arc::clone(&state),
            id,
            TickConfig {
                interval: Duration::from_millis(20),
                step: 5,
            },
            Arc::new(SimulatedExtraction),
            Arc::new(NullNotifier),
            push,
        );

        std::thread::sleep(Duration::from_millis(50));
        state
            .with_session_mut(&id, |s| s.cancel(&notifier))
            .unwrap()
            .unwrap();
        let progress_at_cancel = state.session_snapshot(&id).unwrap().progress;

        handle.join();

        let snapshot = state.session_snapshot(&id).unwrap();
        assert_eq!(snapshot.phase, Phase::Cancelled);
        assert_eq!(snapshot.progress, progress_at_cancel);
        assert!(snapshot.result_rows.is_empty());

        // The driver never emits a terminal event for a cancelled run.
        let events = events.lock().unwrap();
        assert!(!events.iter().any(|e| matches!(
            e,
            ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. }
        )));
        assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn shutdown_before_first_tick_leaves_session_processing() {
        let (state, id) = processing_state(token());
        let (events, push) = collector();

        let handle = start_driver(
            Arc::clone(&state),
            id,
            TickConfig {
                interval: Duration::from_millis(100),
                step: 5,
            },
            Arc::new(SimulatedExtraction),
            Arc::new(NullNotifier),
            push,
        );
        handle.shutdown();
        handle.join();

        let snapshot = state.session_snapshot(&id).unwrap();
        assert_eq!(snapshot.phase, Phase::Processing);
        assert_eq!(snapshot.progress, 0);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::Started { .. }));
    }

    #[test]
    fn removed_session_stops_the_driver() {
        let (state, id) = processing_state(token());
        let (events, push) = collector();

        state.remove_session(&id).unwrap();

        let handle = start_driver(
            Arc::clone(&state),
            id,
            fast_tick(),
            Arc::new(SimulatedExtraction),
            Arc::new(NullNotifier),
            push,
        );
        handle.join();

        let events = events.lock().unwrap();
        assert!(!events.iter().any(|e| matches!(
            e,
            ProgressEvent::Completed { .. } | ProgressEvent::Failed { .. }
        )));
    }
}
