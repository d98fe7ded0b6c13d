//! Fixed-cadence status polling for the active transcription task.
//!
//! One loop per submitted task. The loop owns nothing but the task id it
//! was armed with: every cycle fetches the status, re-checks that the id is
//! still the active one and applies the payload under a single state lock.
//! Mutations land in state and on disk before the matching events go out.

use std::ops::ControlFlow;
use std::time::Duration;

use subflow_bridge::MessageFromBackend;
use subflow_bridge::workflow::WorkflowStep;
use subflow_timeline::store::TrackKind;
use tokio::time::MissedTickBehavior;

use crate::api::{ApiError, RemoteStatus, TaskStatus};
use crate::services::{self, AppContextHandle};
use crate::state::TaskPhase;
use crate::timer::{self, TickHandle};

/// Wall-clock cadence of status fetches.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Spawns the poll loop for `task_id`. The first fetch happens immediately,
/// later ones every [`POLL_INTERVAL`].
pub(crate) fn spawn_status_poll(context: AppContextHandle, task_id: String) -> TickHandle {
    let task = tokio::spawn(async move {
        let mut ticks = tokio::time::interval(POLL_INTERVAL);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut partial_seen = false;

        loop {
            ticks.tick().await;
            let client = {
                let state = context.state.read().await;
                state.client.clone()
            };
            let result = client.task_status(&task_id).await;
            if handle_poll_result(&context, &task_id, result, &mut partial_seen)
                .await
                .is_break()
            {
                break;
            }
        }
    });
    TickHandle::new(task)
}

/// Folds one fetch outcome into the session. `Break` ends the loop.
pub(crate) async fn handle_poll_result(
    context: &AppContextHandle,
    task_id: &str,
    result: Result<TaskStatus, ApiError>,
    partial_seen: &mut bool,
) -> ControlFlow<()> {
    match result {
        Ok(status) => apply_status(context, task_id, status, partial_seen).await,
        Err(ApiError::TaskNotFound) => {
            // The service forgot the task (restart, eviction). The local
            // session may still be useful, so stop quietly.
            log::info!("Task {task_id} is gone on the service, polling stops");
            ControlFlow::Break(())
        }
        Err(err) => {
            log::warn!("Status poll for task {task_id} failed: {err}");
            ControlFlow::Continue(())
        }
    }
}

/// Applies one status payload to the session.
pub(crate) async fn apply_status(
    context: &AppContextHandle,
    task_id: &str,
    status: TaskStatus,
    partial_seen: &mut bool,
) -> ControlFlow<()> {
    let mut events: Vec<MessageFromBackend> = Vec::new();
    let mut persisted = None;
    let outcome;

    {
        let mut state = context.state.write().await;
        if state.session.task_id.as_deref() != Some(task_id) {
            // A reset or a newer task took over while this cycle was in
            // flight; its results no longer belong to anyone.
            log::info!("Dropping a status payload for superseded task {task_id}");
            return ControlFlow::Break(());
        }

        match status.status {
            RemoteStatus::Completed => {
                if let Some(ticker) = state.runtime_timer.take() {
                    ticker.stop();
                }
                state.poll = None;
                state.session.phase = TaskPhase::Completed;
                state
                    .timeline
                    .replace(TrackKind::Original, status.subtitles.clone());
                if let Some(translated) = &status.translated_subtitles {
                    state
                        .timeline
                        .replace(TrackKind::Translated, translated.clone());
                }

                events.push(MessageFromBackend::TrackUpdated {
                    track: TrackKind::Original,
                    entries: status.subtitles,
                });
                if let Some(translated) = status.translated_subtitles {
                    events.push(MessageFromBackend::TrackUpdated {
                        track: TrackKind::Translated,
                        entries: translated,
                    });
                }
                events.push(MessageFromBackend::TranscriptionProgress {
                    percent: 100,
                    message: String::from("Completed!"),
                });
                events.push(MessageFromBackend::TranscriptionCompleted {
                    elapsed_secs: state.session.elapsed_secs(),
                    download_url: status
                        .download_url
                        .map(|reference| state.client.absolute_url(&reference)),
                });
                events.push(MessageFromBackend::WorkflowStepChanged(WorkflowStep::Results));

                persisted = Some((state.store.clone(), state.snapshot()));
                outcome = ControlFlow::Break(());
            }
            RemoteStatus::Failed => {
                if let Some(ticker) = state.runtime_timer.take() {
                    ticker.stop();
                }
                state.poll = None;
                state.session.phase = TaskPhase::Failed;
                events.push(MessageFromBackend::TranscriptionFailed {
                    error: status.error.unwrap_or_else(|| String::from("task failed")),
                });
                outcome = ControlFlow::Break(());
            }
            _ => {
                if status.subtitles.is_empty() {
                    events.push(MessageFromBackend::TranscriptionProgress {
                        percent: 50,
                        message: String::from("Processing..."),
                    });
                } else {
                    let generated = status.subtitles.len();
                    state
                        .timeline
                        .replace(TrackKind::Original, status.subtitles.clone());
                    events.push(MessageFromBackend::TrackUpdated {
                        track: TrackKind::Original,
                        entries: status.subtitles,
                    });
                    events.push(MessageFromBackend::TranscriptionProgress {
                        percent: 30,
                        message: format!("Processing... ({generated} lines generated)"),
                    });
                    if !*partial_seen {
                        *partial_seen = true;
                        events.push(MessageFromBackend::WorkflowStepChanged(WorkflowStep::Results));
                    }
                    persisted = Some((state.store.clone(), state.snapshot()));
                }

                // The anchor survives a restart, the ticker does not. Re-arm
                // it whenever the task is alive and no ticker runs.
                if let Some(anchor) = state.session.started_at_ms {
                    let ticker_gone = state
                        .runtime_timer
                        .as_ref()
                        .is_none_or(TickHandle::is_finished);
                    if ticker_gone {
                        state.runtime_timer =
                            Some(timer::spawn_runtime_ticker(context.clone(), anchor));
                    }
                }
                outcome = ControlFlow::Continue(());
            }
        }
    }

    if let Some((store, snapshot)) = persisted {
        services::persist(&store, &snapshot).await;
    }
    for event in events {
        context.send(event).await;
    }
    outcome
}
