//! Student progression service: XP levels, badges, avatar unlocks and
//! curriculum units over a simple record store.

pub mod api;
pub mod avatars;
pub mod config;
pub mod context;
pub mod data;
pub mod database;
pub mod error;
pub mod gamification;
pub mod progression;
pub mod units;

pub use avatars::is_avatar_unlocked;
pub use error::{ProgressError, Result};
pub use progression::{evaluate, has_unlocked_perk, Level, ProgressionState};
