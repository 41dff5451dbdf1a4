//! Playback host: a session plus the single tick timer driving it

use std::time::Duration;

use tracing::{debug, info};

use super::session::{PlaybackEvent, Session};
use super::timer::{TICK_PERIOD, TickTimer};

/// Owns a [`Session`] and keeps at most one live [`TickTimer`] for it.
///
/// Every call that can change the run state re-syncs the timer: a running
/// session gets a timer if it has none, any other state drops it.
pub struct PlaybackController {
    session: Session,
    timer: Option<TickTimer>,
    period: Duration,
}

impl PlaybackController {
    pub fn new(session: Session) -> Self {
        Self::with_period(session, TICK_PERIOD)
    }

    pub fn with_period(session: Session, period: Duration) -> Self {
        Self { session, timer: None, period }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn timer_live(&self) -> bool {
        self.timer.is_some()
    }

    pub fn start(&mut self) {
        self.session.start();
        self.sync_timer();
    }

    pub fn pause(&mut self) {
        self.session.pause();
        self.sync_timer();
    }

    /// Start when paused or idle, pause when running
    pub fn toggle(&mut self) {
        if self.session.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn advance(&mut self) -> Option<PlaybackEvent> {
        let event = self.session.advance();
        self.sync_timer();
        log_event(event);
        event
    }

    pub fn retreat(&mut self) -> Option<PlaybackEvent> {
        let event = self.session.retreat();
        self.sync_timer();
        log_event(event);
        event
    }

    pub fn reset_timer(&mut self) {
        self.session.reset_timer();
    }

    /// Feed queued ticks into the session; returns how many were applied
    pub fn pump_ticks(&mut self) -> u32 {
        let mut applied = 0;
        if let Some(timer) = self.timer.as_mut() {
            while timer.try_tick() {
                self.session.tick();
                applied += 1;
            }
        }
        applied
    }

    fn sync_timer(&mut self) {
        match (self.session.is_running(), self.timer.is_some()) {
            (true, false) => self.timer = Some(TickTimer::spawn(self.period)),
            (false, true) => {
                if let Some(timer) = self.timer.take() {
                    timer.cancel();
                }
            }
            _ => {}
        }
    }
}

fn log_event(event: Option<PlaybackEvent>) {
    match event {
        Some(PlaybackEvent::StepChanged { index, phase, phase_changed: true }) => {
            info!("entered {} phase at step {}", phase.label(), index + 1);
        }
        Some(PlaybackEvent::StepChanged { index, .. }) => debug!("step {}", index + 1),
        Some(PlaybackEvent::Completed) => info!("session completed"),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::{Difficulty, Exercise, Step};
    use crate::playback::session::assemble;

    const FAST: Duration = Duration::from_millis(10);

    fn create_controller() -> PlaybackController {
        let exercise = Exercise {
            id: "ex".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            difficulty: Difficulty::Easy,
            duration_minutes: 5,
            equipment: vec![],
            steps: vec![Step::new("A", 60), Step::new("B", 60)],
            warmup_steps: vec![],
            cooldown_steps: vec![],
            benefits: vec![],
            contact: None,
            is_custom: false,
            image_url: None,
        };
        let session = assemble(&exercise, false, &[], &[]).unwrap();
        PlaybackController::with_period(session, FAST)
    }

    #[tokio::test]
    async fn test_start_spawns_single_timer() {
        let mut controller = create_controller();
        assert!(!controller.timer_live());
        controller.start();
        assert!(controller.timer_live());
        controller.start();
        assert!(controller.timer_live());
    }

    #[tokio::test]
    async fn test_ticks_reach_session() {
        let mut controller = create_controller();
        controller.start();
        tokio::time::sleep(Duration::from_millis(80)).await;
        let applied = controller.pump_ticks();
        assert!(applied > 0);
        assert_eq!(controller.session().remaining_seconds(), 60 - applied.min(60));
    }

    #[tokio::test]
    async fn test_pause_cancels_timer() {
        let mut controller = create_controller();
        controller.start();
        controller.pause();
        assert!(!controller.timer_live());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(controller.pump_ticks(), 0);
        assert_eq!(controller.session().remaining_seconds(), 60);
    }

    #[tokio::test]
    async fn test_navigation_cancels_timer() {
        let mut controller = create_controller();
        controller.start();
        controller.advance();
        assert!(!controller.timer_live());

        controller.start();
        controller.retreat();
        assert!(!controller.timer_live());
    }

    #[tokio::test]
    async fn test_completion_cancels_timer() {
        let mut controller = create_controller();
        controller.advance();
        controller.start();
        assert_eq!(controller.advance(), Some(PlaybackEvent::Completed));
        assert!(!controller.timer_live());
        assert!(controller.session().is_completed());
    }

    #[tokio::test]
    async fn test_toggle() {
        let mut controller = create_controller();
        controller.toggle();
        assert!(controller.session().is_running());
        controller.toggle();
        assert!(!controller.session().is_running());
        assert!(!controller.timer_live());
    }
}
