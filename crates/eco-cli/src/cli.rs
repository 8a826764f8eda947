//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::activities::ActivitiesArgs;
use crate::commands::leaderboard::LeaderboardArgs;
use crate::commands::log::LogArgs;
use crate::commands::quiz::{CompleteArgs, GenerateArgs, TakeArgs};
use crate::commands::score::ScoreArgs;
use crate::commands::user::AddUserArgs;

/// Sustainability activity ledger.
///
/// Logs recycling, home temperature, travel and quiz results per user, and
/// ranks users by the score those activities earn.
#[derive(Debug, Parser)]
#[command(name = "eco", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage users.
    #[command(subcommand)]
    User(UserAction),

    /// Log an activity for a user.
    Log(LogArgs),

    /// List a user's entries of one category.
    Activities(ActivitiesArgs),

    /// Show a user's score for a period.
    Score(ScoreArgs),

    /// Rank every user by score for a period.
    Leaderboard(LeaderboardArgs),

    /// Generate and complete sustainability quizzes.
    #[command(subcommand)]
    Quiz(QuizAction),
}

/// User management actions.
#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Register a new user.
    Add(AddUserArgs),

    /// List registered users.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Quiz actions.
#[derive(Debug, Subcommand)]
pub enum QuizAction {
    /// Generate a quiz and print it.
    Generate(GenerateArgs),

    /// Generate a quiz, answer it interactively and log the points.
    Take(TakeArgs),

    /// Log points for a quiz answered elsewhere.
    Complete(CompleteArgs),
}
