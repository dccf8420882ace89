//! Scheduled-task submission for the engine's two kinds of suspension:
//! single-shot deferred callbacks and the recurring autoplay tick. Runs on the
//! ambient tokio runtime; paused-clock test runtimes drive it deterministically.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Fire `task` once after `delay`. Deferred work is never cancelled; callers
/// rely on the work itself being idempotent when it arrives stale.
pub fn defer<F>(delay: Duration, task: F)
where
    F: FnOnce() + Send + 'static,
{
    // Capture the deadline at submission time so a paused test clock that
    // advances before the task's first poll still fires it on schedule.
    let deadline = tokio::time::Instant::now() + delay;
    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        task();
    });
}

/// Cancel handle for a recurring task. Once cancelled the tick never fires
/// again; dropping the handle cancels too.
#[derive(Debug)]
pub struct Recurring {
    token: CancellationToken,
}

impl Recurring {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for Recurring {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Fire `tick` every `period` until the returned handle is cancelled. The
/// first tick happens one full period after submission.
pub fn every<F>(period: Duration, mut tick: F) -> Recurring
where
    F: FnMut() + Send + 'static,
{
    let token = CancellationToken::new();
    let ticker = token.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval yields immediately on the first tick; swallow it so the
        // cadence starts one period out
        interval.tick().await;
        loop {
            tokio::select! {
                _ = ticker.cancelled() => break,
                _ = interval.tick() => tick(),
            }
        }
    });
    Recurring { token }
}
