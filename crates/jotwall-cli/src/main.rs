//! Jotwall CLI - color-tagged notes on a masonry wall
//!
//! Sign in, capture notes and render the board from the terminal.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::board::run_board;
use crate::commands::colors::run_colors;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, EditOverrides};
use crate::commands::list::run_list;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "jotwall=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Some(Commands::Add {
            title,
            color,
            content,
        }) => run_add(title, &content, color, profile).await?,
        Some(Commands::List { limit, color, json }) => {
            run_list(limit, color, json, profile).await?;
        }
        Some(Commands::Board {
            columns,
            width,
            card_width,
        }) => run_board(columns, width, card_width, profile).await?,
        Some(Commands::Edit {
            id,
            title,
            content,
            color,
        }) => {
            let overrides = EditOverrides {
                title,
                content,
                color,
            };
            run_edit(&id, overrides, profile).await?;
        }
        Some(Commands::Delete { id, yes }) => run_delete(&id, yes, profile).await?,
        Some(Commands::Colors) => run_colors(),
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        Some(Commands::Config { command }) => run_config(command, profile)?,
        Some(Commands::Auth { command }) => run_auth(command, profile).await?,
        None => run_board(None, 390.0, 28, profile).await?,
    }

    Ok(())
}
