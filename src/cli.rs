//! CLI definitions for pinion
//!
//! Flags for the tool itself are long options (`--config`). Everything after
//! them, including single-dash field flags like `-p 8080`, is handed to the
//! configuration resolver untouched.

use crate::format::OutputFormat;
use crate::profile::Profile;
use clap::Parser;
use std::path::PathBuf;

/// Resolve and print typed configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the base INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Application name
    #[arg(short, long, default_value = "pinion")]
    pub name: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    /// Initial profile, used instead of ACTIVE_PROFILE to pick the profile config file
    #[arg(long, value_parser = parse_profile)]
    pub profile: Option<Profile>,

    /// Load the database field set
    #[arg(long)]
    pub database: bool,

    /// Field flags and arguments passed to the resolver
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

fn parse_profile(s: &str) -> Result<Profile, String> {
    s.parse::<Profile>().map_err(|e| e.to_string())
}

impl Cli {
    /// Resolver command line: the application name followed by the trailing arguments.
    pub fn resolver_args(&self) -> Vec<String> {
        std::iter::once(self.name.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}
