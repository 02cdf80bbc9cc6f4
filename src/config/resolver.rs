//! Configuration resolution.
//!
//! [`Configuration::load_fields`] resolves every registered field from, in
//! order of precedence:
//!
//! 1. its environment variable (trimmed, blank means unset),
//! 2. its command line flag,
//! 3. the layered configuration file (base file, then profile file),
//! 4. its default value.
//!
//! A required field that none of the sources specify fails the whole pass.
//!
//! ## Concurrency
//!
//! Resolution is a bootstrap activity. `load_fields` takes `&mut self`, so a
//! pass can never overlap another pass or a reader; there is no internal
//! locking. Once a pass has completed, `&Configuration` can be shared freely
//! between reader threads.

use super::args::{ParsedArguments, parse_args};
use super::env::{EnvSource, ProcessEnv, non_blank_var};
use super::field::{Field, FieldType, ResolvedValue, Specifier, ValueType};
use super::registry::{FieldBuilder, FieldRegistry};
use super::store::LayeredFileStore;
use crate::error::{AppError, AppResult};
use crate::profile::{Profile, get_active_profile};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Registered fields, their sources and the values resolved from them.
pub struct Configuration {
    store: LayeredFileStore,
    registry: FieldRegistry,
    env: Arc<dyn EnvSource>,
    values: HashMap<String, ResolvedValue>,
    anonymous_args: Vec<String>,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("values", &self.values)
            .field("anonymous_args", &self.anonymous_args)
            .finish_non_exhaustive()
    }
}

impl Configuration {
    /// Open the configuration file at `path` for the active profile.
    pub fn new(path: impl AsRef<Path>) -> AppResult<Self> {
        Self::open(path, get_active_profile())
    }

    /// Open the configuration file at `path` with the override file for `profile`.
    pub fn open(path: impl AsRef<Path>, profile: Profile) -> AppResult<Self> {
        Ok(Self::with_store(LayeredFileStore::open(path, profile)?))
    }

    /// Configuration backed by in-memory INI contents.
    pub fn from_contents(contents: &str) -> AppResult<Self> {
        Ok(Self::with_store(LayeredFileStore::from_contents(contents)?))
    }

    pub fn with_store(store: LayeredFileStore) -> Self {
        Self {
            store,
            registry: FieldRegistry::new(),
            env: Arc::new(ProcessEnv),
            values: HashMap::new(),
            anonymous_args: Vec::new(),
        }
    }

    /// Read environment variables from `env` instead of the process environment.
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn set_env(&mut self, env: Arc<dyn EnvSource>) {
        self.env = env;
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Register fields directly; they take part in the next `load_fields` pass.
    pub fn registry_mut(&mut self) -> &mut FieldRegistry {
        &mut self.registry
    }

    /// Add the fields of `other` to this configuration's registry.
    pub fn merge_registry(&mut self, other: FieldRegistry) {
        self.registry.merge(other);
    }

    pub fn store(&self) -> &LayeredFileStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LayeredFileStore {
        &mut self.store
    }

    pub fn create_int_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, i32> {
        self.registry.create_int_field(name)
    }

    pub fn create_uint_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, u32> {
        self.registry.create_uint_field(name)
    }

    pub fn create_float_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, f64> {
        self.registry.create_float_field(name)
    }

    pub fn create_bool_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, bool> {
        self.registry.create_bool_field(name)
    }

    pub fn create_string_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, String> {
        self.registry.create_string_field(name)
    }

    /// Resolve every registered field from `args` (program name first), the
    /// environment, the configuration file and the defaults.
    ///
    /// Values from an earlier pass are replaced only if the whole pass
    /// succeeds; on error they are left as they were.
    pub fn load_fields<S: AsRef<str>>(&mut self, args: &[S]) -> AppResult<()> {
        if self.registry.is_empty() {
            debug!("No configuration fields were registered");
            return Ok(());
        }

        let parsed = parse_args(args, &self.registry.fields_by_arg_name())?;

        let mut values = HashMap::with_capacity(self.registry.len());
        for field in self.registry.fields() {
            trace!(field = %field.name, "loading field");
            let resolved = self.load_field(field, &parsed)?;
            debug!(
                field = %field.name,
                specifier = %resolved.specifier,
                "resolved configuration field"
            );
            values.insert(field.name.clone(), resolved);
        }

        self.values = values;
        self.anonymous_args = parsed.anonymous().to_vec();
        Ok(())
    }

    fn load_field(&self, field: &Arc<Field>, args: &ParsedArguments) -> AppResult<ResolvedValue> {
        if let Some(ref env_var) = field.env_var
            && let Some(value) = non_blank_var(self.env.as_ref(), env_var)
        {
            return ResolvedValue::coerce(field, &value, Specifier::EnvironmentVar);
        }

        if let Some(value) = args.value(&field.name) {
            return ResolvedValue::coerce(field, value, Specifier::CommandLine);
        }

        if let (Some(section), Some(key)) = (&field.config_section, &field.config_key)
            && let Some((value, layer)) = self.store.get(section, key)
        {
            trace!(field = %field.name, %layer, "value found in config file");
            return ResolvedValue::coerce(field, value, Specifier::File);
        }

        if field.required {
            return Err(
                AppError::system_configuration("No value specified for required field")
                    .with_str("fieldName", field.name.as_str()),
            );
        }

        match field.default_value {
            Some(ref default) => {
                ResolvedValue::coerce(field, &default.to_string(), Specifier::None)
            }
            None => Ok(ResolvedValue::unset(field)),
        }
    }

    /// Resolved value and provenance of `field_name`.
    pub fn value_metadata(&self, field_name: &str) -> Option<&ResolvedValue> {
        self.values.get(field_name)
    }

    /// All resolved values, ordered by field name.
    pub fn resolved_values(&self) -> Vec<&ResolvedValue> {
        let mut values: Vec<&ResolvedValue> = self.values.values().collect();
        values.sort_by(|a, b| a.field.name.cmp(&b.field.name));
        values
    }

    /// Command line tokens from the last pass that were not bound to a flag.
    pub fn anonymous_args(&self) -> &[String] {
        &self.anonymous_args
    }

    /// Typed value of `field_name`.
    ///
    /// Returns `Ok(None)` for an optional field nothing specified, a
    /// not-found error for a field that was never resolved, and an
    /// illegal-state error when `T` does not match the declared type.
    pub fn get_value<T: FieldType>(&self, field_name: &str) -> AppResult<Option<T>> {
        let expected = T::VALUE_TYPE;
        let Some(resolved) = self.values.get(field_name) else {
            return Err(AppError::not_found(format!("{} field not found", expected))
                .with_str("fieldName", field_name)
                .with_str("valueType", expected.as_str()));
        };

        if resolved.field.value_type != expected {
            return Err(mismatch(field_name, resolved.field.value_type, expected));
        }

        match resolved.value {
            Some(ref value) => T::from_value(value)
                .map(Some)
                .ok_or_else(|| mismatch(field_name, value.value_type(), expected)),
            None => Ok(None),
        }
    }

    pub fn get_int_value(&self, field_name: &str) -> AppResult<Option<i32>> {
        self.get_value(field_name)
    }

    pub fn get_uint_value(&self, field_name: &str) -> AppResult<Option<u32>> {
        self.get_value(field_name)
    }

    pub fn get_float_value(&self, field_name: &str) -> AppResult<Option<f64>> {
        self.get_value(field_name)
    }

    pub fn get_bool_value(&self, field_name: &str) -> AppResult<Option<bool>> {
        self.get_value(field_name)
    }

    pub fn get_string_value(&self, field_name: &str) -> AppResult<Option<String>> {
        self.get_value(field_name)
    }
}

fn mismatch(field_name: &str, actual: ValueType, expected: ValueType) -> AppError {
    AppError::illegal_state("Field value type does not match expected value type")
        .with_str("fieldName", field_name)
        .with_str("fieldValueType", actual.as_str())
        .with_str("expectedValueType", expected.as_str())
}
