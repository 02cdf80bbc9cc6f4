//! Application bootstrap.
//!
//! Registers the core fields every process needs (log level, log format and
//! active profile) next to the embedding application's fields, resolves them,
//! switches to the resolved profile and configures the root logger.
//!
//! ```no_run
//! use pinion::app::Application;
//!
//! let app = Application::create_with_builder("config/application.ini", "billing", |registry| {
//!     registry
//!         .create_int_field("port")
//!         .arg_name("p")
//!         .env_var("PORT")
//!         .config_name("Server", "Port")
//!         .default(3000)
//!         .register()?;
//!     Ok(())
//! })?;
//! let port = app.configuration().get_int_value("port")?;
//! # Ok::<(), pinion::error::AppError>(())
//! ```

use crate::config::{
    Configuration, EnvSource, Field, FieldRegistry, LayeredFileStore, ProcessEnv, Specifier, Value,
};
use crate::error::{AppError, AppResult};
use crate::logging::{self, LogLevel, LoggingConfig};
use crate::profile::{self, Profile};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub const UNSTRUCTURED_LOGGER_FIELD: &str = "unstructuredLogger";
pub const LOG_LEVEL_FIELD: &str = "logLevel";
pub const ACTIVE_PROFILE_FIELD: &str = "activeProfile";

/// Callback that registers application-specific fields.
pub type FieldsFn = Box<dyn FnOnce(&mut FieldRegistry) -> AppResult<()>>;

/// Where the configuration file comes from.
#[derive(Debug, Clone)]
enum ConfigSource {
    File(PathBuf),
    Contents(String),
    Empty,
}

/// A bootstrapped application: resolved configuration plus active profile.
#[derive(Debug)]
pub struct Application {
    name: String,
    configuration: Configuration,
    profile: Profile,
}

impl Application {
    pub fn builder(name: impl Into<String>) -> ApplicationBuilder {
        ApplicationBuilder::new(name)
    }

    /// Bootstrap from `config_path` and the process arguments.
    pub fn create(config_path: impl Into<PathBuf>, name: impl Into<String>) -> AppResult<Self> {
        Self::builder(name).config_file(config_path).build()
    }

    /// Bootstrap from `config_path` and the process arguments, with
    /// application fields registered by `fields`.
    pub fn create_with_builder<F>(
        config_path: impl Into<PathBuf>,
        name: impl Into<String>,
        fields: F,
    ) -> AppResult<Self>
    where
        F: FnOnce(&mut FieldRegistry) -> AppResult<()> + 'static,
    {
        Self::builder(name)
            .config_file(config_path)
            .fields(fields)
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn into_configuration(self) -> Configuration {
        self.configuration
    }
}

/// Step-by-step bootstrap configuration.
pub struct ApplicationBuilder {
    name: String,
    source: ConfigSource,
    args: Option<Vec<String>>,
    env: Arc<dyn EnvSource>,
    fields: Vec<FieldsFn>,
    init_logging: bool,
}

impl ApplicationBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ConfigSource::Empty,
            args: None,
            env: Arc::new(ProcessEnv),
            fields: Vec::new(),
            init_logging: true,
        }
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = ConfigSource::File(path.into());
        self
    }

    /// Use INI text instead of a file. No profile file is consulted.
    pub fn config_contents(mut self, contents: impl Into<String>) -> Self {
        self.source = ConfigSource::Contents(contents.into());
        self
    }

    /// Command line to resolve, program name first. Defaults to the process arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Register application fields. They may replace core fields of the same name.
    pub fn fields<F>(mut self, fields: F) -> Self
    where
        F: FnOnce(&mut FieldRegistry) -> AppResult<()> + 'static,
    {
        self.fields.push(Box::new(fields));
        self
    }

    /// Whether to install the global logger. Enabled by default.
    pub fn init_logging(mut self, init_logging: bool) -> Self {
        self.init_logging = init_logging;
        self
    }

    pub fn build(self) -> AppResult<Application> {
        let args = self.args.unwrap_or_else(|| std::env::args().collect());
        let store_profile = profile::get_active_profile();

        let store = match self.source {
            ConfigSource::File(ref path) => LayeredFileStore::open(path, store_profile)?,
            ConfigSource::Contents(ref contents) => LayeredFileStore::from_contents(contents)?,
            ConfigSource::Empty => LayeredFileStore::empty(),
        };
        let mut configuration = Configuration::with_store(store);
        configuration.set_env(self.env);

        register_core_fields(configuration.registry_mut(), store_profile)?;

        // Application flags must be known before the first pass or the
        // parser rejects them as unknown arguments.
        let mut app_fields = FieldRegistry::new();
        for register in self.fields {
            register(&mut app_fields)?;
        }
        configuration.merge_registry(app_fields);
        configuration.load_fields(args.as_slice())?;

        let profile = resolve_profile(&configuration)?;
        if profile != store_profile && configuration.store().base_path().is_some() {
            debug!(%profile, previous = %store_profile, "reloading profile config file");
            configuration.store_mut().load_profile_overrides(profile)?;
            // The new override file may no longer name the profile.
            default_active_profile(configuration.registry_mut(), profile)?;
            configuration.load_fields(args.as_slice())?;
        }

        let logging_config = resolve_logging(&configuration, profile)?;
        profile::override_profile(profile);
        if self.init_logging {
            logging::init(&logging_config);
        }

        info!(
            application = %self.name,
            %profile,
            fields = configuration.registry().len(),
            "configuration loaded"
        );

        Ok(Application {
            name: self.name,
            configuration,
            profile,
        })
    }
}

/// Register the fields every application resolves before its own.
pub fn register_core_fields(
    registry: &mut FieldRegistry,
    default_profile: Profile,
) -> AppResult<()> {
    registry
        .create_bool_field(UNSTRUCTURED_LOGGER_FIELD)
        .arg_name("ul")
        .env_var("UNSTRUCTURED_LOGGER")
        .config_name("Logging", "UseUnstructuredLogger")
        .short_desc("Use text based (unstructured) logger")
        .default(false)
        .register()?;

    registry
        .create_string_field(LOG_LEVEL_FIELD)
        .arg_name("ll")
        .env_var("LOG_LEVEL")
        .config_name("Logging", "Level")
        .short_desc("Logging level")
        .default("INFO")
        .register()?;

    registry
        .create_string_field(ACTIVE_PROFILE_FIELD)
        .arg_name("pr")
        .env_var(profile::PROFILE_ENV_VAR)
        .config_name("Application", "Profile")
        .short_desc("Profile to start the application under")
        .default(default_profile.as_str())
        .register()?;

    Ok(())
}

/// Make `profile` the default of the `activeProfile` field, keeping the rest
/// of its definition.
fn default_active_profile(registry: &mut FieldRegistry, profile: Profile) -> AppResult<()> {
    let Some(field) = registry.get(ACTIVE_PROFILE_FIELD) else {
        return Ok(());
    };
    let mut field = Field::clone(field);
    field.default_value = Some(Value::String(profile.as_str().to_string()));
    registry.insert(field)?;
    Ok(())
}

fn resolve_profile(configuration: &Configuration) -> AppResult<Profile> {
    let value = configuration
        .get_string_value(ACTIVE_PROFILE_FIELD)?
        .unwrap_or_default();
    value.parse::<Profile>().map_err(|e| {
        AppError::system_configuration("Cannot start the application under an unknown profile")
            .with_str("profile", value.as_str())
            .with_cause(e)
    })
}

fn resolve_logging(configuration: &Configuration, profile: Profile) -> AppResult<LoggingConfig> {
    let raw_level = configuration
        .get_string_value(LOG_LEVEL_FIELD)?
        .unwrap_or_default();
    let level = raw_level.parse::<LogLevel>().map_err(|e| {
        AppError::system_configuration("Error interpreting configured log level")
            .with_str("logLevel", raw_level.as_str())
            .with_cause(e)
    })?;

    let configured = configuration
        .get_bool_value(UNSTRUCTURED_LOGGER_FIELD)?
        .unwrap_or(false);
    let specifier = configuration
        .value_metadata(UNSTRUCTURED_LOGGER_FIELD)
        .map(|md| md.specifier)
        .unwrap_or(Specifier::None);

    Ok(LoggingConfig {
        level,
        unstructured: logging::use_unstructured(configured, specifier, profile),
    })
}
