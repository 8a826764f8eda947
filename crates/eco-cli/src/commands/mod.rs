//! CLI subcommand implementations.

pub mod activities;
pub mod leaderboard;
pub mod log;
pub mod quiz;
pub mod score;
pub mod user;
pub mod util;
