use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jotwall_core::NoteColor;

#[derive(Parser)]
#[command(name = "jotwall")]
#[command(about = "Color-tagged notes on a masonry wall, from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name for Supabase configuration and session
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title
        #[arg(short, long)]
        title: Option<String>,
        /// Card color (name or hex, see `jotwall colors`)
        #[arg(short, long, value_parser = parse_color, default_value = "white")]
        color: NoteColor,
        /// Note content
        content: Vec<String>,
    },
    /// List notes, most recently edited first
    #[command(alias = "ls")]
    List {
        /// Number of notes to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only show notes of this color
        #[arg(long, value_parser = parse_color)]
        color: Option<NoteColor>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render notes as a masonry board
    Board {
        /// Number of columns (overrides --width)
        #[arg(long, value_name = "N")]
        columns: Option<usize>,
        /// Screen width in points used to pick 2 or 3 columns
        #[arg(long, value_name = "POINTS", default_value = "390")]
        width: f32,
        /// Characters per card line
        #[arg(long, value_name = "CHARS", default_value = "28")]
        card_width: usize,
    },
    /// Edit an existing note
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// Replace the title
        #[arg(short, long)]
        title: Option<String>,
        /// Replace the content
        #[arg(long)]
        content: Option<String>,
        /// Change the card color
        #[arg(short, long, value_parser = parse_color)]
        color: Option<NoteColor>,
    },
    /// Delete an existing note
    #[command(alias = "rm")]
    Delete {
        /// Note ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the color palette
    Colors,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Authenticate CLI profile with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show the resolved profile config
    Show {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email/password and store the session in the keychain
    Login {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account
    Signup {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password (at least 6 characters)
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for profile
    Status {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
    /// Sign out profile and clear stored session
    Logout {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}

pub fn parse_color(value: &str) -> Result<NoteColor, String> {
    value.parse::<NoteColor>().map_err(|error| error.to_string())
}
