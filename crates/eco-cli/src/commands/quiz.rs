//! Generating quizzes and logging the points they earn.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;

use eco_core::{ActivityType, LogOutcome, Quiz, points_earned};
use eco_quiz::{Client, DEFAULT_TOPIC, QuizResponse};

use super::util::{format_score, open_ledger, resolve_user};
use crate::Config;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// What the questions should be about.
    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TakeArgs {
    /// Username or user ID.
    pub user: String,

    /// What the questions should be about.
    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub topic: String,
}

#[derive(Debug, Args)]
pub struct CompleteArgs {
    /// Username or user ID.
    pub user: String,

    /// Number of questions answered correctly.
    #[arg(long)]
    pub correct: usize,
}

fn fetch_quiz(config: &Config, topic: &str) -> Result<QuizResponse> {
    let api_key = config
        .quiz_api_key
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("missing quiz API key (set ECO_QUIZ_API_KEY or config.toml)"))?;

    let client = Client::new(api_key, config.quiz_api_url.as_str())
        .context("failed to create quiz client")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime
        .block_on(client.generate_quiz(&config.quiz_model, topic))
        .context("failed to generate quiz")
}

pub fn generate<W: Write>(writer: &mut W, args: &GenerateArgs, config: &Config) -> Result<()> {
    match fetch_quiz(config, &args.topic)? {
        QuizResponse::Parsed(quiz) if args.json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(&quiz)?)?;
        }
        QuizResponse::Parsed(quiz) => {
            write_questions(writer, &quiz)?;
            writeln!(writer, "Answers:")?;
            for (number, question) in quiz.questions.iter().enumerate() {
                writeln!(writer, "  {}. {}", number + 1, question.answer)?;
            }
        }
        QuizResponse::Raw(text) => {
            writeln!(writer, "{text}")?;
        }
    }
    Ok(())
}

/// Generates a quiz, reads one answer per question from `reader` and logs
/// the points earned.
pub fn take<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    args: &TakeArgs,
    config: &Config,
) -> Result<Option<LogOutcome>> {
    let mut ledger = open_ledger(config)?;
    let user_id = resolve_user(ledger.store(), &args.user)?;
    if ledger.store().get_user(&user_id)?.is_none() {
        bail!("User not found");
    }

    let quiz = match fetch_quiz(config, &args.topic)? {
        QuizResponse::Parsed(quiz) => quiz,
        QuizResponse::Raw(text) => {
            writeln!(writer, "The quiz generator did not return a usable quiz:")?;
            writeln!(writer, "{text}")?;
            return Ok(None);
        }
    };

    let answers = ask_questions(reader, writer, &quiz)?;
    let correct = quiz.grade(&answers);
    writeln!(
        writer,
        "You answered {correct} of {} correctly.",
        quiz.questions.len()
    )?;
    if correct == 0 {
        writeln!(writer, "No points earned.")?;
        return Ok(None);
    }

    let points = points_earned(correct);
    let outcome = ledger.log_activity(&user_id, ActivityType::QuizCompleted, points)?;
    tracing::debug!(quiz_id = %quiz.id, correct, "quiz completed");
    writeln!(writer, "Earned {} points. {outcome}", format_score(points))?;
    Ok(Some(outcome))
}

/// Logs points for a quiz graded outside the CLI.
pub fn complete<W: Write>(writer: &mut W, args: &CompleteArgs, config: &Config) -> Result<LogOutcome> {
    if args.correct == 0 {
        bail!("You must specify the units");
    }
    let points = points_earned(args.correct);

    let mut ledger = open_ledger(config)?;
    let user_id = resolve_user(ledger.store(), &args.user)?;
    let outcome = ledger.log_activity(&user_id, ActivityType::QuizCompleted, points)?;
    writeln!(writer, "Earned {} points. {outcome}", format_score(points))?;
    Ok(outcome)
}

fn write_questions<W: Write>(writer: &mut W, quiz: &Quiz) -> Result<()> {
    for (number, question) in quiz.questions.iter().enumerate() {
        writeln!(writer, "{}. {}", number + 1, question.question)?;
        for (letter, option) in ('A'..='Z').zip(&question.options) {
            writeln!(writer, "   {letter}) {option}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Prompts for each question and returns the chosen option texts.
///
/// A letter picks the option at that position; anything else is taken as
/// the answer text itself. End of input leaves remaining questions blank.
fn ask_questions<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    quiz: &Quiz,
) -> Result<Vec<String>> {
    let mut answers = Vec::with_capacity(quiz.questions.len());
    for (number, question) in quiz.questions.iter().enumerate() {
        writeln!(writer, "{}. {}", number + 1, question.question)?;
        for (letter, option) in ('A'..='Z').zip(&question.options) {
            writeln!(writer, "   {letter}) {option}")?;
        }
        write!(writer, "> ")?;
        writer.flush()?;

        let mut line = String::new();
        reader.read_line(&mut line)?;
        answers.push(choose_option(line.trim(), &question.options));
    }
    Ok(answers)
}

fn choose_option(input: &str, options: &[String]) -> String {
    let mut chars = input.chars();
    let picked = match (chars.next(), chars.next()) {
        (Some(letter), None) => ('A'..='Z')
            .position(|candidate| candidate == letter.to_ascii_uppercase())
            .and_then(|index| options.get(index)),
        _ => None,
    };
    picked.map_or_else(|| input.to_string(), Clone::clone)
}
