//! Pinion
//!
//! Bootstraps an application from a layered INI file, the environment and
//! the trailing command line, then prints every resolved field with the
//! source that supplied it.

use anyhow::{Context, Result};
use clap::Parser;
use pinion::app::Application;
use pinion::cli::Cli;
use pinion::database::{self, DbConfig};
use pinion::format::{OutputFormat, format_values_json, format_values_markdown};
use pinion::profile::{self, Profile};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.profile {
        Some(profile) => profile::override_profile(profile),
        None => profile::load_profile(Profile::Production)?,
    }

    let mut builder = Application::builder(cli.name.as_str()).args(cli.resolver_args());
    if let Some(ref path) = cli.config {
        builder = builder.config_file(path);
    }
    if cli.database {
        builder = builder.fields(database::register_fields);
    }
    let app = builder.build().context("failed to bootstrap configuration")?;

    if cli.database {
        let db = DbConfig::from_configuration(app.configuration())?;
        info!(host = %db.host, name = %db.name, schema = %db.schema, "database settings resolved");
    }

    let configuration = app.configuration();
    let values = configuration.resolved_values();
    let anonymous_args = configuration.anonymous_args();
    match cli.format {
        OutputFormat::Markdown => {
            let md = format_values_markdown(app.name(), app.profile(), &values, anonymous_args);
            print!("{}", md);
        }
        OutputFormat::Json => {
            let out = format_values_json(app.name(), app.profile(), &values, anonymous_args);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
