//! Session assembly and the playback state machine
//!
//! A session is `warmup ++ main ++ cooldown`, each step tagged with its
//! phase. Navigation saturates at the ends, so none of the operations here
//! can fail once a session exists.

use serde::Serialize;

use crate::error::{PlaybackError, Result};
use crate::exercises::Exercise;

/// Duration of each warmup and cooldown step
pub const PHASE_STEP_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Warmup,
    Main,
    Cooldown,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Warmup => "warmup",
            Phase::Main => "main",
            Phase::Cooldown => "cooldown",
        }
    }
}

/// One playable entry of the assembled sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStep {
    pub text: String,
    pub duration_seconds: u32,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Assembled, start not pressed yet
    Idle,
    Running,
    Paused,
    /// Advanced past the last step. Terminal.
    Completed,
}

/// What a navigation call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    StepChanged {
        index: usize,
        phase: Phase,
        phase_changed: bool,
    },
    Completed,
}

/// One playback run of an exercise
#[derive(Debug, Clone)]
pub struct Session {
    sequence: Vec<SessionStep>,
    warmup_len: usize,
    main_len: usize,
    current_index: usize,
    remaining_seconds: u32,
    state: PlaybackState,
}

/// Build the playback sequence for an exercise.
///
/// Exercise-specific warmup and cooldown lists replace the defaults when
/// non-empty, each phase on its own. With `skip_warmup` playback starts at
/// the first main step.
pub fn assemble(
    exercise: &Exercise,
    skip_warmup: bool,
    default_warmup: &[String],
    default_cooldown: &[String],
) -> Result<Session> {
    let warmup = effective(&exercise.warmup_steps, default_warmup);
    let cooldown = effective(&exercise.cooldown_steps, default_cooldown);

    let mut sequence = Vec::with_capacity(warmup.len() + exercise.steps.len() + cooldown.len());
    sequence.extend(warmup.iter().map(|text| SessionStep {
        text: text.clone(),
        duration_seconds: PHASE_STEP_SECS,
        phase: Phase::Warmup,
    }));
    sequence.extend(exercise.steps.iter().map(|step| SessionStep {
        text: step.text.clone(),
        duration_seconds: step.duration_seconds,
        phase: Phase::Main,
    }));
    sequence.extend(cooldown.iter().map(|text| SessionStep {
        text: text.clone(),
        duration_seconds: PHASE_STEP_SECS,
        phase: Phase::Cooldown,
    }));

    if sequence.is_empty() {
        return Err(PlaybackError::EmptySession);
    }

    // Warmup-only sessions have no main step to jump to
    let current_index = if skip_warmup {
        warmup.len().min(sequence.len() - 1)
    } else {
        0
    };
    let remaining_seconds = sequence[current_index].duration_seconds;

    Ok(Session {
        sequence,
        warmup_len: warmup.len(),
        main_len: exercise.steps.len(),
        current_index,
        remaining_seconds,
        state: PlaybackState::Idle,
    })
}

fn effective<'a>(own: &'a [String], default: &'a [String]) -> &'a [String] {
    if own.is_empty() { default } else { own }
}

impl Session {
    pub fn sequence(&self) -> &[SessionStep] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn warmup_len(&self) -> usize {
        self.warmup_len
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self) -> &SessionStep {
        &self.sequence[self.current_index]
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn is_completed(&self) -> bool {
        self.state == PlaybackState::Completed
    }

    /// Start or resume the countdown of the current step.
    ///
    /// A countdown that already hit zero starts over from the full duration.
    pub fn start(&mut self) {
        match self.state {
            PlaybackState::Idle | PlaybackState::Paused => {
                if self.remaining_seconds == 0 {
                    self.remaining_seconds = self.current_step().duration_seconds;
                }
                self.state = PlaybackState::Running;
            }
            PlaybackState::Running | PlaybackState::Completed => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Running {
            self.state = PlaybackState::Paused;
        }
    }

    /// One second elapsed. Stops at zero and leaves the step on screen.
    pub fn tick(&mut self) {
        if self.state == PlaybackState::Running {
            self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        }
    }

    /// Move to the next step, or complete the session from the last one.
    pub fn advance(&mut self) -> Option<PlaybackEvent> {
        if self.is_completed() {
            return None;
        }
        if self.current_index + 1 >= self.sequence.len() {
            self.state = PlaybackState::Completed;
            return Some(PlaybackEvent::Completed);
        }

        let previous = self.current_phase();
        self.current_index += 1;
        Some(self.enter_step(previous))
    }

    /// Move to the previous step; nothing happens at the first one.
    pub fn retreat(&mut self) -> Option<PlaybackEvent> {
        if self.is_completed() || self.current_index == 0 {
            return None;
        }

        let previous = self.current_phase();
        self.current_index -= 1;
        Some(self.enter_step(previous))
    }

    pub fn reset_timer(&mut self) {
        if !self.is_completed() {
            self.remaining_seconds = self.current_step().duration_seconds;
        }
    }

    /// Share of steps reached, counting the current one
    pub fn progress_fraction(&self) -> f64 {
        ((self.current_index + 1) as f64 / self.sequence.len() as f64).clamp(0.0, 1.0)
    }

    pub fn current_phase(&self) -> Phase {
        if self.current_index < self.warmup_len {
            Phase::Warmup
        } else if self.current_index >= self.warmup_len + self.main_len {
            Phase::Cooldown
        } else {
            Phase::Main
        }
    }

    fn enter_step(&mut self, previous: Phase) -> PlaybackEvent {
        self.remaining_seconds = self.current_step().duration_seconds;
        if self.state == PlaybackState::Running {
            self.state = PlaybackState::Paused;
        }

        let phase = self.current_phase();
        PlaybackEvent::StepChanged {
            index: self.current_index,
            phase,
            phase_changed: phase != previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::{Difficulty, Step};

    fn create_exercise(steps: Vec<Step>) -> Exercise {
        Exercise {
            id: "ex".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            difficulty: Difficulty::Easy,
            duration_minutes: 5,
            equipment: vec![],
            steps,
            warmup_steps: vec![],
            cooldown_steps: vec![],
            benefits: vec![],
            contact: None,
            is_custom: false,
            image_url: None,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ab_session(skip_warmup: bool) -> Session {
        let exercise = create_exercise(vec![Step::new("A", 60), Step::new("B", 60)]);
        assemble(&exercise, skip_warmup, &strings(&["W1"]), &strings(&["C1"])).unwrap()
    }

    #[test]
    fn test_assemble_default_phases() {
        let session = ab_session(false);
        let expected = vec![
            SessionStep { text: "W1".into(), duration_seconds: 30, phase: Phase::Warmup },
            SessionStep { text: "A".into(), duration_seconds: 60, phase: Phase::Main },
            SessionStep { text: "B".into(), duration_seconds: 60, phase: Phase::Main },
            SessionStep { text: "C1".into(), duration_seconds: 30, phase: Phase::Cooldown },
        ];
        assert_eq!(session.sequence(), expected.as_slice());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.remaining_seconds(), 30);
        assert_eq!(session.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_assemble_skip_warmup() {
        let session = ab_session(true);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.current_phase(), Phase::Main);
        assert_eq!(session.remaining_seconds(), 60);
    }

    #[test]
    fn test_assemble_skip_without_warmup_starts_at_zero() {
        let exercise = create_exercise(vec![Step::new("A", 10)]);
        let session = assemble(&exercise, true, &[], &[]).unwrap();
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_assemble_exercise_overrides_each_phase() {
        let mut exercise = create_exercise(vec![Step::new("A", 60)]);
        exercise.warmup_steps = strings(&["own warmup 1", "own warmup 2"]);
        let session = assemble(&exercise, false, &strings(&["W1"]), &strings(&["C1"])).unwrap();

        // warmup overridden, cooldown from defaults
        assert_eq!(session.len(), 2 + 1 + 1);
        assert_eq!(session.sequence()[0].text, "own warmup 1");
        assert_eq!(session.sequence()[3].text, "C1");
        assert_eq!(session.warmup_len(), 2);
    }

    #[test]
    fn test_assemble_length_is_sum_of_phases() {
        let exercise = create_exercise(vec![Step::new("A", 5), Step::new("B", 5), Step::new("C", 5)]);
        let warmup = strings(&["w1", "w2"]);
        let cooldown = strings(&["c1", "c2", "c3"]);
        let session = assemble(&exercise, false, &warmup, &cooldown).unwrap();
        assert_eq!(session.len(), warmup.len() + 3 + cooldown.len());
    }

    #[test]
    fn test_assemble_without_main_steps() {
        let exercise = create_exercise(vec![]);
        let session = assemble(&exercise, false, &strings(&["W1"]), &strings(&["C1"])).unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.sequence()[1].phase, Phase::Cooldown);
    }

    #[test]
    fn test_assemble_empty_fails() {
        let exercise = create_exercise(vec![]);
        let result = assemble(&exercise, false, &[], &[]);
        assert_eq!(result.unwrap_err(), PlaybackError::EmptySession);
    }

    #[test]
    fn test_skip_warmup_on_warmup_only_session_clamps() {
        let exercise = create_exercise(vec![]);
        let session = assemble(&exercise, true, &strings(&["W1", "W2"]), &[]).unwrap();
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_start_pause_resume_keeps_remaining() {
        let mut session = ab_session(false);
        session.start();
        session.tick();
        session.tick();
        assert_eq!(session.remaining_seconds(), 28);

        for _ in 0..3 {
            session.pause();
            assert_eq!(session.state(), PlaybackState::Paused);
            session.start();
        }
        assert_eq!(session.remaining_seconds(), 28);
        assert!(session.is_running());
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut session = ab_session(false);
        session.start();
        session.tick();
        session.start();
        assert_eq!(session.remaining_seconds(), 29);
    }

    #[test]
    fn test_tick_floors_at_zero_without_advancing() {
        let mut session = ab_session(false);
        session.start();
        for _ in 0..45 {
            session.tick();
        }
        assert_eq!(session.remaining_seconds(), 0);
        assert_eq!(session.current_index(), 0);
        assert!(session.is_running());
    }

    #[test]
    fn test_tick_ignored_when_not_running() {
        let mut session = ab_session(false);
        session.tick();
        assert_eq!(session.remaining_seconds(), 30);
    }

    #[test]
    fn test_start_after_countdown_finished_restarts() {
        let mut session = ab_session(false);
        session.start();
        for _ in 0..30 {
            session.tick();
        }
        session.pause();
        session.start();
        assert_eq!(session.remaining_seconds(), 30);
    }

    #[test]
    fn test_advance_resets_timer_and_pauses() {
        let mut session = ab_session(false);
        session.start();
        session.tick();

        let event = session.advance();
        assert_eq!(
            event,
            Some(PlaybackEvent::StepChanged { index: 1, phase: Phase::Main, phase_changed: true })
        );
        assert_eq!(session.remaining_seconds(), 60);
        assert!(!session.is_running());
        assert_eq!(session.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_advance_from_idle_stays_idle() {
        let mut session = ab_session(false);
        session.advance();
        assert_eq!(session.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_advance_len_times_completes() {
        let mut session = ab_session(false);
        let len = session.len();
        let mut last = None;
        for i in 0..len {
            session.start();
            if i % 2 == 0 {
                session.tick();
            }
            last = session.advance();
        }
        assert_eq!(last, Some(PlaybackEvent::Completed));
        assert!(session.is_completed());
        assert!(!session.is_running());
        assert_eq!(session.current_index(), len - 1);
        assert_eq!(session.progress_fraction(), 1.0);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut session = ab_session(true);
        while !session.is_completed() {
            session.advance();
        }
        assert_eq!(session.advance(), None);
        assert_eq!(session.retreat(), None);
        session.start();
        assert_eq!(session.state(), PlaybackState::Completed);
    }

    #[test]
    fn test_retreat_at_zero_is_noop() {
        let mut session = ab_session(false);
        session.start();
        session.tick();
        assert_eq!(session.retreat(), None);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.remaining_seconds(), 29);
        assert!(session.is_running());
    }

    #[test]
    fn test_retreat_moves_back_and_pauses() {
        let mut session = ab_session(true);
        session.start();
        let event = session.retreat();
        assert_eq!(
            event,
            Some(PlaybackEvent::StepChanged { index: 0, phase: Phase::Warmup, phase_changed: true })
        );
        assert_eq!(session.remaining_seconds(), 30);
        assert_eq!(session.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_reset_timer_keeps_index_and_run_state() {
        let mut session = ab_session(true);
        session.start();
        for _ in 0..10 {
            session.tick();
        }
        session.reset_timer();
        assert_eq!(session.remaining_seconds(), 60);
        assert_eq!(session.current_index(), 1);
        assert!(session.is_running());
    }

    #[test]
    fn test_progress_fraction() {
        let mut session = ab_session(false);
        assert_eq!(session.progress_fraction(), 0.25);
        session.advance();
        assert_eq!(session.progress_fraction(), 0.5);
    }

    #[test]
    fn test_current_phase_walk() {
        let mut session = ab_session(false);
        let mut phases = vec![session.current_phase()];
        while let Some(PlaybackEvent::StepChanged { phase, .. }) = session.advance() {
            phases.push(phase);
        }
        assert_eq!(phases, vec![Phase::Warmup, Phase::Main, Phase::Main, Phase::Cooldown]);
    }

    #[test]
    fn test_phase_changed_flag_within_phase() {
        let mut session = ab_session(true);
        let event = session.advance();
        assert_eq!(
            event,
            Some(PlaybackEvent::StepChanged { index: 2, phase: Phase::Main, phase_changed: false })
        );
    }
}
