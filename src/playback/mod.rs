//! Playback module - timed warmup/main/cooldown sessions
//!
//! Features:
//! - Session assembly from a normalized exercise
//! - Step state machine with saturating navigation
//! - One owned tick timer per running session

pub mod controller;
pub mod presets;
pub mod session;
pub mod timer;

pub use controller::PlaybackController;
pub use presets::Presets;
pub use session::{Phase, PlaybackEvent, PlaybackState, Session, SessionStep, assemble};
pub use timer::TickTimer;
