//! Sustainability activity ledger CLI library.
//!
//! This crate provides the command-line request layer over the ledger.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, QuizAction, UserAction};
pub use config::Config;
