use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use eco_cli::commands::{activities, leaderboard, log, quiz, score, user};
use eco_cli::{Cli, Commands, Config, QuizAction, UserAction};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::User(UserAction::Add(args)) => user::add(&mut stdout, args, &config)?,
        Commands::User(UserAction::List { json }) => user::list(&mut stdout, *json, &config)?,
        Commands::Log(args) => {
            log::run(&mut stdout, args, &config)?;
        }
        Commands::Activities(args) => activities::run(&mut stdout, args, &config)?,
        Commands::Score(args) => {
            score::run(&mut stdout, args, &config)?;
        }
        Commands::Leaderboard(args) => leaderboard::run(&mut stdout, args, &config)?,
        Commands::Quiz(QuizAction::Generate(args)) => quiz::generate(&mut stdout, args, &config)?,
        Commands::Quiz(QuizAction::Take(args)) => {
            quiz::take(&mut io::stdin().lock(), &mut stdout, args, &config)?;
        }
        Commands::Quiz(QuizAction::Complete(args)) => {
            quiz::complete(&mut stdout, args, &config)?;
        }
    }

    Ok(())
}
