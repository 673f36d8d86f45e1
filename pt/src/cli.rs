//! CLI argument parsing for promptstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::template::Theme;

#[derive(Parser, Debug)]
#[command(name = "pt")]
#[command(author, version, about = "Reusable prompt templates", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the starter templates if the store has never been used
    Init,

    /// List stored templates
    List {
        /// Only show templates in this category
        #[arg(short = 'k', long)]
        category: Option<String>,
    },

    /// Show a template and its placeholders
    Show {
        #[arg(required = true)]
        id: String,
    },

    /// Add a new template
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short = 'b', long)]
        content: String,

        #[arg(short = 'k', long)]
        category: Option<String>,
    },

    /// Edit an existing template
    Edit {
        #[arg(required = true)]
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short = 'b', long)]
        content: Option<String>,

        /// New category (empty string clears it)
        #[arg(short = 'k', long)]
        category: Option<String>,
    },

    /// Delete a template
    Rm {
        #[arg(required = true)]
        id: String,
    },

    /// Export all templates as JSON
    Export {
        /// Output file, or `-` for stdout (default: prompt-templates.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import templates from a JSON file, merging with existing ones
    Import {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Fill a template's placeholders and print the result
    Render {
        #[arg(required = true)]
        id: String,

        /// Placeholder value as key=value (repeatable)
        #[arg(short, long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Keep unfilled placeholders visible instead of leaving empty values empty
        #[arg(short, long)]
        preview: bool,
    },

    /// Insert the first stored template into a fresh editor and print it
    Insert {
        /// Placeholder value as key=value (repeatable)
        #[arg(short, long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Keep unfilled placeholders visible instead of leaving empty values empty
        #[arg(short, long)]
        preview: bool,
    },

    /// Show or set the theme
    Theme {
        /// light or dark
        theme: Option<Theme>,
    },
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}
