//! Integration tests for the application bootstrap.
//!
//! Every test holds a `ProfileGuard`: the bootstrap overrides the process
//! profile, and the guard serializes tests and restores it afterwards.

use pinion::app::{ACTIVE_PROFILE_FIELD, Application, LOG_LEVEL_FIELD};
use pinion::config::{Specifier, Value};
use pinion::database::{self, DbConfig};
use pinion::error::ErrorCode;
use pinion::profile::{self, Profile, ProfileGuard};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const APPLICATION_INI: &str = r#"
[Application]
Profile = production

[Logging]
Level = info

[Server]
Port = 3000
"#;

const DEVELOPMENT_INI: &str = r#"
[Server]
Port = 9999
Debug = true
"#;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Write the base and development files, returning the base path.
fn write_config(temp: &TempDir) -> PathBuf {
    let base = temp.path().join("application.ini");
    fs::write(&base, APPLICATION_INI).unwrap();
    fs::write(temp.path().join("application.development.ini"), DEVELOPMENT_INI).unwrap();
    base
}

#[test]
fn test_bootstrap_with_application_fields() {
    let _guard = ProfileGuard::new(Profile::Production);
    let temp = TempDir::new().unwrap();

    let app = Application::builder("billing")
        .config_file(write_config(&temp))
        .args(["billing", "-p", "6000", "-ll", "debug", "report.csv"])
        .env(HashMap::new())
        .init_logging(false)
        .fields(|registry| {
            registry
                .create_int_field("port")
                .arg_name("p")
                .env_var("PORT")
                .config_name("Server", "Port")
                .default(8000)
                .register()?;
            Ok(())
        })
        .build()
        .unwrap();

    assert_eq!(app.name(), "billing");
    assert_eq!(app.profile(), Profile::Production);

    let cfg = app.configuration();
    assert_eq!(cfg.get_int_value("port").unwrap(), Some(6000));
    assert_eq!(cfg.get_string_value(LOG_LEVEL_FIELD).unwrap(), Some("debug".to_string()));
    assert_eq!(
        cfg.value_metadata(ACTIVE_PROFILE_FIELD).unwrap().specifier,
        Specifier::File
    );
    assert_eq!(cfg.anonymous_args(), ["report.csv"]);
}

#[test]
fn test_profile_switch_reloads_profile_file() {
    let _guard = ProfileGuard::new(Profile::Production);
    let temp = TempDir::new().unwrap();

    let app = Application::builder("billing")
        .config_file(write_config(&temp))
        .args(["billing"])
        .env(env(&[("ACTIVE_PROFILE", "Development")]))
        .init_logging(false)
        .fields(|registry| {
            registry
                .create_bool_field("debug")
                .config_name("Server", "Debug")
                .default(false)
                .register()?;
            Ok(())
        })
        .build()
        .unwrap();

    assert_eq!(app.profile(), Profile::Development);
    assert_eq!(profile::get_active_profile(), Profile::Development);

    let cfg = app.configuration();
    assert_eq!(cfg.get_bool_value("debug").unwrap(), Some(true));
    assert_eq!(cfg.value_metadata("debug").unwrap().specifier, Specifier::File);
    assert_eq!(
        cfg.value_metadata(ACTIVE_PROFILE_FIELD).unwrap().specifier,
        Specifier::EnvironmentVar
    );
}

#[test]
fn test_profile_named_by_override_file() {
    let _guard = ProfileGuard::new(Profile::Production);
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("app.ini");
    fs::write(&base, "[Server]\nPort = 3000\n").unwrap();
    fs::write(
        temp.path().join("app.production.ini"),
        "[Application]\nProfile = development\n",
    )
    .unwrap();

    let app = Application::builder("svc")
        .config_file(&base)
        .args(["svc"])
        .env(HashMap::new())
        .init_logging(false)
        .build()
        .unwrap();

    assert_eq!(app.profile(), Profile::Development);
    let cfg = app.configuration();
    assert_eq!(
        cfg.get_string_value(ACTIVE_PROFILE_FIELD).unwrap(),
        Some("development".to_string())
    );
    assert_eq!(
        cfg.value_metadata(ACTIVE_PROFILE_FIELD).unwrap().specifier,
        Specifier::None
    );
}

#[test]
fn test_unknown_profile() {
    let _guard = ProfileGuard::new(Profile::Test);

    let err = Application::builder("svc")
        .args(["svc", "-pr", "staging"])
        .env(HashMap::new())
        .init_logging(false)
        .build()
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::SystemConfiguration);
    assert_eq!(err.metadata_value("profile"), Some("staging"));
    assert_eq!(profile::get_active_profile(), Profile::Test);
}

#[test]
fn test_unknown_log_level() {
    let _guard = ProfileGuard::new(Profile::Test);

    let err = Application::builder("svc")
        .config_contents("[Logging]\nLevel = loud\n")
        .args(["svc", "-pr", "development"])
        .env(HashMap::new())
        .init_logging(false)
        .build()
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::SystemConfiguration);
    assert_eq!(err.metadata_value("logLevel"), Some("loud"));
    // A failed bootstrap leaves the process profile alone
    assert_eq!(profile::get_active_profile(), Profile::Test);
}

#[test]
fn test_missing_config_file() {
    let _guard = ProfileGuard::new(Profile::Test);

    let err = Application::builder("svc")
        .config_file("./doesNotExist.ini")
        .args(["svc"])
        .init_logging(false)
        .build()
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::SystemConfiguration);
    assert_eq!(err.metadata_value("path"), Some("./doesNotExist.ini"));
}

#[test]
fn test_application_field_replaces_core_field() {
    let _guard = ProfileGuard::new(Profile::Test);

    let app = Application::builder("svc")
        .args(["svc"])
        .env(HashMap::new())
        .init_logging(false)
        .fields(|registry| {
            registry
                .create_string_field(LOG_LEVEL_FIELD)
                .arg_name("ll")
                .default("WARN")
                .register()?;
            Ok(())
        })
        .build()
        .unwrap();

    let md = app.configuration().value_metadata(LOG_LEVEL_FIELD).unwrap();
    assert_eq!(md.value, Some(Value::String("WARN".to_string())));
    assert_eq!(md.specifier, Specifier::None);
    assert_eq!(
        app.configuration().get_string_value(ACTIVE_PROFILE_FIELD).unwrap(),
        Some("test".to_string())
    );
}

#[test]
fn test_database_field_set() {
    let _guard = ProfileGuard::new(Profile::Test);

    let app = Application::builder("svc")
        .config_contents(
            "[Database]\nHost = localhost:5432\nName = orders\nSchema = public\nUser = svc\n",
        )
        .args(["svc", "-db-password", "hunter2", "-max-open-connections", "40"])
        .env(env(&[("DB_HOST", "db.internal:5432")]))
        .init_logging(false)
        .fields(database::register_fields)
        .build()
        .unwrap();

    let db = DbConfig::from_configuration(app.configuration()).unwrap();
    assert_eq!(db.host, "db.internal:5432");
    assert_eq!(db.name, "orders");
    assert_eq!(db.user, "svc");
    assert_eq!(db.password, "hunter2");
    assert_eq!(db.max_idle_connections, 30);
    assert_eq!(db.max_open_connections, 40);
}
