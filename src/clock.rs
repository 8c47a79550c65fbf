//! One-second tick source and the deferred resume after an interval ends.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep};
use tracing::debug;

use crate::event::{AppEvent, EventSender};
use crate::timer::ResumeToken;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Pause between one activity ending and the next one starting.
pub const GRACE_DELAY: Duration = Duration::from_secs(3);

/// Spawns the ticker. The first tick arrives one period after the call.
pub fn spawn_ticker(tx: EventSender, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            ticks.tick().await;
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    })
}

/// Holds at most one scheduled resume.
///
/// The timer itself rejects stale tokens; aborting the task here only stops
/// a sleeper that no longer has anything to do.
#[derive(Default)]
pub struct DeferredResume {
    task: Option<JoinHandle<()>>,
}

impl DeferredResume {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `Resume(token)` after `delay`, replacing any earlier schedule.
    pub fn schedule(&mut self, tx: EventSender, token: ResumeToken, delay: Duration) {
        self.cancel();
        self.task = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(AppEvent::Resume(token));
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("aborting scheduled resume");
            }
            task.abort();
        }
    }
}

impl Drop for DeferredResume {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event;
    use crate::queue::SessionQueue;
    use crate::timer::{ActivityTimer, TickOutcome};

    fn ended_token() -> ResumeToken {
        let mut q = SessionQueue::new();
        let mut timer = ActivityTimer::new(1, 1);
        timer.start(&mut q);
        loop {
            if let TickOutcome::IntervalEnded { resume, .. } = timer.tick(&mut q) {
                return resume;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_fires_once_per_period() {
        let (tx, mut rx) = event::channel();
        let handle = spawn_ticker(tx, TICK_PERIOD);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let mut ticks = 0;
        while let Ok(ev) = rx.try_recv() {
            assert!(matches!(ev, AppEvent::Tick));
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn resume_arrives_after_grace_delay() {
        let (tx, mut rx) = event::channel();
        let token = ended_token();
        let mut deferred = DeferredResume::new();
        deferred.schedule(tx, token, GRACE_DELAY);

        tokio::time::sleep(GRACE_DELAY - Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        match rx.try_recv() {
            Ok(AppEvent::Resume(t)) => assert_eq!(t, token),
            other => panic!("expected resume, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_resume_never_arrives() {
        let (tx, mut rx) = event::channel();
        let mut deferred = DeferredResume::new();
        deferred.schedule(tx, ended_token(), GRACE_DELAY);

        deferred.cancel();
        tokio::time::sleep(GRACE_DELAY * 2).await;
        assert!(rx.try_recv().is_err());
    }
}
