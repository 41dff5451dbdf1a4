//! Error types for the playback core
//!
//! Only conditions without a safe default reach the caller. Step duration
//! problems are recovered inside the normalizer.

use thiserror::Error;

/// Why an exercise could not be located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No profile to generate fallbacks from; send the user to profile setup
    NoProfile,
    /// A profile exists but the id matches nothing; send the user to the listing
    StaleId,
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundReason::NoProfile => write!(f, "no dog profile available"),
            NotFoundReason::StaleId => write!(f, "id not in any exercise pool"),
        }
    }
}

/// Errors surfaced by assembly and resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Warmup, main and cooldown are all empty
    #[error("exercise has no steps to play")]
    EmptySession,

    #[error("exercise not found: {0}")]
    NotFound(NotFoundReason),
}

/// Problems with a single structured step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    #[error("invalid step duration {duration:?} for step {text:?}")]
    InvalidStepDuration { text: String, duration: Option<f64> },
}

/// Generator response could not be read
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but neither a list nor a wrapped list nor a single exercise
    #[error("unexpected response shape")]
    UnexpectedShape,
}

impl PlaybackError {
    /// What the user should do next
    pub fn hint(&self) -> &'static str {
        match self {
            PlaybackError::NotFound(NotFoundReason::NoProfile) => {
                "exercise not found; create a profile first with `dogfit profile add <name>`"
            }
            PlaybackError::NotFound(NotFoundReason::StaleId) | PlaybackError::EmptySession => {
                "this exercise can't be played; pick one from `dogfit list`"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
