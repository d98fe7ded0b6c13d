//! Cancellable periodic background loops.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use subflow_bridge::MessageFromBackend;
use tokio::task::JoinHandle;

use crate::services::AppContextHandle;

/// Cadence of the elapsed-runtime display ticks.
const RUNTIME_TICK: Duration = Duration::from_secs(1);

/// Handle to a spawned background loop (status polling, runtime ticking).
///
/// Stopping is idempotent: the task is aborted at its next suspension point
/// and stopping an already finished loop is a no-op. A fresh loop can be
/// armed afterwards against the same timing anchor.
#[derive(Debug)]
pub struct TickHandle {
    task: JoinHandle<()>,
}

impl TickHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Stops the loop. Safe to call any number of times.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Whether the loop already ended, by finishing or by being stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Arms the one-second runtime ticker against an existing anchor.
///
/// The anchor is never reset here: resuming after a restart continues the
/// elapsed display from the original start of the transcription.
pub(crate) fn spawn_runtime_ticker(context: AppContextHandle, anchor_ms: u64) -> TickHandle {
    let task = tokio::spawn(async move {
        let mut ticks = tokio::time::interval(RUNTIME_TICK);
        loop {
            ticks.tick().await;
            let elapsed_secs = now_epoch_ms().saturating_sub(anchor_ms) / 1000;
            context
                .send(MessageFromBackend::RuntimeTimerTick { elapsed_secs })
                .await;
        }
    });
    TickHandle::new(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;

    #[tokio::test(start_paused = true)]
    async fn ticker_stops_idempotently_and_can_be_rearmed() {
        let (context, mut rx, _dir) = testing::context().await;

        let anchor = now_epoch_ms();
        let handle = spawn_runtime_ticker(context.clone(), anchor);
        assert!(matches!(
            rx.recv().await,
            Some(MessageFromBackend::RuntimeTimerTick { .. })
        ));

        handle.stop();
        handle.stop();
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }

        // No further ticks arrive after the stop.
        let silence = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(silence.is_err());

        // Re-arming against the same anchor picks the count back up.
        let rearmed = spawn_runtime_ticker(context.clone(), anchor);
        assert!(matches!(
            rx.recv().await,
            Some(MessageFromBackend::RuntimeTimerTick { .. })
        ));
        rearmed.stop();
    }
}
