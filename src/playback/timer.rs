//! Owned periodic tick source
//!
//! The tick task lives exactly as long as its [`TickTimer`]; dropping the
//! handle aborts the task and discards queued ticks.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct TickTimer {
    handle: JoinHandle<()>,
    ticks: mpsc::UnboundedReceiver<()>,
}

impl TickTimer {
    /// Spawn the tick task. Must be called inside a tokio runtime.
    pub fn spawn(period: Duration) -> Self {
        let (tx, ticks) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        debug!("tick timer started ({:?})", period);
        Self { handle, ticks }
    }

    /// Take one queued tick, if any
    pub fn try_tick(&mut self) -> bool {
        self.ticks.try_recv().is_ok()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("tick timer cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timer_delivers_ticks() {
        let mut timer = TickTimer::spawn(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(timer.try_tick());
    }

    #[tokio::test]
    async fn test_no_tick_before_first_period() {
        let mut timer = TickTimer::spawn(Duration::from_secs(60));
        tokio::task::yield_now().await;
        assert!(!timer.try_tick());
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let timer = TickTimer::spawn(Duration::from_millis(10));
        let handle = timer.handle.abort_handle();
        timer.cancel();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(handle.is_finished());
    }
}
