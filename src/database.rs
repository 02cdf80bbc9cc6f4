//! Database connection settings.
//!
//! Registers the fields needed to reach a database and collects their
//! resolved values into a [`DbConfig`]. Opening connections is left to the
//! driver of the embedding application.

use crate::config::{Configuration, FieldRegistry, FieldType};
use crate::error::{AppError, AppResult};

const SECTION: &str = "Database";

pub const DB_HOST_FIELD: &str = "dbHost";
pub const DB_NAME_FIELD: &str = "dbName";
pub const DB_SCHEMA_FIELD: &str = "dbSchema";
pub const DB_USER_FIELD: &str = "dbUser";
pub const DB_PASSWORD_FIELD: &str = "dbPassword";
pub const MAX_IDLE_CONNECTIONS_FIELD: &str = "maxIdleConnections";
pub const MAX_OPEN_CONNECTIONS_FIELD: &str = "maxOpenConnections";

pub const DEFAULT_MAX_IDLE_CONNECTIONS: u32 = 30;
pub const DEFAULT_MAX_OPEN_CONNECTIONS: u32 = 20;

/// Values required to connect to a database.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub name: String,
    pub schema: String,
    pub user: String,
    pub password: String,
    pub max_idle_connections: u32,
    pub max_open_connections: u32,
}

// Keeps the password out of logs.
impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("user", &self.user)
            .field("password", &"***")
            .field("max_idle_connections", &self.max_idle_connections)
            .field("max_open_connections", &self.max_open_connections)
            .finish()
    }
}

/// Register the database field definitions.
pub fn register_fields(registry: &mut FieldRegistry) -> AppResult<()> {
    // e.g. localhost:5432
    registry
        .create_string_field(DB_HOST_FIELD)
        .arg_name("db-host")
        .env_var("DB_HOST")
        .config_name(SECTION, "Host")
        .short_desc("Database host URI")
        .required()
        .register()?;

    registry
        .create_string_field(DB_NAME_FIELD)
        .arg_name("db-name")
        .env_var("DB_NAME")
        .config_name(SECTION, "Name")
        .short_desc("Database name")
        .required()
        .register()?;

    registry
        .create_string_field(DB_SCHEMA_FIELD)
        .arg_name("db-schema")
        .env_var("DB_SCHEMA")
        .config_name(SECTION, "Schema")
        .short_desc("Database schema")
        .required()
        .register()?;

    registry
        .create_string_field(DB_USER_FIELD)
        .arg_name("db-user")
        .env_var("DB_USER")
        .config_name(SECTION, "User")
        .short_desc("Database user")
        .required()
        .register()?;

    registry
        .create_string_field(DB_PASSWORD_FIELD)
        .arg_name("db-password")
        .config_name(SECTION, "Password")
        .short_desc("Database password")
        .required()
        .register()?;

    registry
        .create_uint_field(MAX_IDLE_CONNECTIONS_FIELD)
        .arg_name("max-idle-connections")
        .config_name(SECTION, "MaxIdleConnections")
        .short_desc("Max number of idle database connections")
        .default(DEFAULT_MAX_IDLE_CONNECTIONS)
        .register()?;

    registry
        .create_uint_field(MAX_OPEN_CONNECTIONS_FIELD)
        .arg_name("max-open-connections")
        .config_name(SECTION, "MaxOpenConnections")
        .short_desc("Max number of open database connections")
        .default(DEFAULT_MAX_OPEN_CONNECTIONS)
        .register()?;

    Ok(())
}

impl DbConfig {
    /// Collect the database settings from a resolved configuration.
    pub fn from_configuration(cfg: &Configuration) -> AppResult<Self> {
        Ok(Self {
            host: require(cfg, DB_HOST_FIELD)?,
            name: require(cfg, DB_NAME_FIELD)?,
            schema: require(cfg, DB_SCHEMA_FIELD)?,
            user: require(cfg, DB_USER_FIELD)?,
            password: require(cfg, DB_PASSWORD_FIELD)?,
            max_idle_connections: require(cfg, MAX_IDLE_CONNECTIONS_FIELD)?,
            max_open_connections: require(cfg, MAX_OPEN_CONNECTIONS_FIELD)?,
        })
    }
}

fn require<T: FieldType>(cfg: &Configuration, field_name: &str) -> AppResult<T> {
    cfg.get_value(field_name)?.ok_or_else(|| {
        AppError::system_configuration("Database field has no value")
            .with_str("fieldName", field_name)
    })
}
