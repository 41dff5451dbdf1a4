//! dogfit - guided exercise playback for dog fitness sessions
//!
//! Exercises come from imported recommendations, the owner's own custom
//! list, or a local generator working off the dog's profile.

pub mod db;
pub mod error;
pub mod exercises;
pub mod history;
pub mod playback;
pub mod profile;
pub mod recommend;
pub mod tui;

pub use db::Database;
