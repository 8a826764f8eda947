//! User registration and listing.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;

use eco_core::{NewUser, User};

use super::util::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct AddUserArgs {
    /// Username shown on the leaderboard.
    pub username: String,

    /// Contact email.
    #[arg(long)]
    pub email: Option<String>,

    /// Full name.
    #[arg(long)]
    pub name: Option<String>,
}

pub fn add<W: Write>(writer: &mut W, args: &AddUserArgs, config: &Config) -> Result<()> {
    let username = args.username.trim();
    if username.is_empty() {
        bail!("username cannot be empty");
    }

    let mut db = open_database(config)?;
    let user = db
        .insert_user(NewUser {
            username: Some(username.to_string()),
            email: args.email.clone(),
            name: args.name.clone(),
        })
        .context("failed to register user")?;

    writeln!(writer, "Registered {username} ({})", user.id)?;
    Ok(())
}

#[derive(Serialize)]
struct JsonUser<'a> {
    id: &'a str,
    username: Option<&'a str>,
    email: Option<&'a str>,
    name: Option<&'a str>,
    entries: usize,
    created_at: String,
}

impl<'a> From<&'a User> for JsonUser<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id.as_str(),
            username: user.username.as_deref(),
            email: user.email.as_deref(),
            name: user.name.as_deref(),
            entries: user.activities.len(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

pub fn list<W: Write>(writer: &mut W, json: bool, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let users = db.get_users().context("failed to list users")?;

    if json {
        let rows: Vec<JsonUser<'_>> = users.iter().map(JsonUser::from).collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    if users.is_empty() {
        writeln!(writer, "No users registered.")?;
        return Ok(());
    }

    for user in &users {
        writeln!(
            writer,
            "{:<16} {:<12} {} entries",
            user.username.as_deref().unwrap_or("(no username)"),
            user.id,
            user.activities.len()
        )?;
    }
    Ok(())
}
