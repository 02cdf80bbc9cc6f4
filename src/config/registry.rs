//! Field registration.
//!
//! Fields are declared through typed builders:
//!
//! ```
//! use pinion::config::FieldRegistry;
//!
//! let mut registry = FieldRegistry::new();
//! let port = registry
//!     .create_int_field("port")
//!     .arg_name("p")
//!     .env_var("PORT")
//!     .config_name("Server", "Port")
//!     .descriptions("Http port", "Http server port")
//!     .default(3000)
//!     .register()
//!     .unwrap();
//! assert_eq!(port.arg_name.as_deref(), Some("p"));
//! ```

use super::field::{Field, FieldType};
use crate::error::{AppError, AppResult};
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Field definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: BTreeMap<String, Arc<Field>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_int_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, i32> {
        FieldBuilder::new(self, name.into())
    }

    pub fn create_uint_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, u32> {
        FieldBuilder::new(self, name.into())
    }

    pub fn create_float_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, f64> {
        FieldBuilder::new(self, name.into())
    }

    pub fn create_bool_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, bool> {
        FieldBuilder::new(self, name.into())
    }

    pub fn create_string_field(&mut self, name: impl Into<String>) -> FieldBuilder<'_, String> {
        FieldBuilder::new(self, name.into())
    }

    /// Store a field, replacing any earlier field with the same name.
    pub fn insert(&mut self, field: Field) -> AppResult<Arc<Field>> {
        if field.name.trim().is_empty() {
            return Err(AppError::illegal_argument("Field name must not be empty")
                .with_context("RegisterField"));
        }
        let field = Arc::new(field);
        if self
            .fields
            .insert(field.name.clone(), Arc::clone(&field))
            .is_some()
        {
            debug!(field = %field.name, "field definition replaced");
        }
        Ok(field)
    }

    /// Add every field of `other`. Fields of `other` win on name conflicts.
    pub fn merge(&mut self, other: FieldRegistry) {
        for (name, field) in other.fields {
            self.fields.insert(name, field);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields.get(name)
    }

    /// Fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = &Arc<Field>> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields that declare a command line flag, keyed by that flag.
    pub fn fields_by_arg_name(&self) -> HashMap<&str, &Field> {
        self.fields
            .values()
            .filter_map(|field| {
                field
                    .arg_name
                    .as_deref()
                    .map(|arg_name| (arg_name, field.as_ref()))
            })
            .collect()
    }
}

/// Builder for a [`Field`] of type `T`.
#[must_use = "a field is only stored once `register` is called"]
pub struct FieldBuilder<'r, T: FieldType> {
    registry: &'r mut FieldRegistry,
    field: Field,
    _type: PhantomData<T>,
}

impl<'r, T: FieldType> FieldBuilder<'r, T> {
    fn new(registry: &'r mut FieldRegistry, name: String) -> Self {
        Self {
            registry,
            field: Field {
                name,
                arg_name: None,
                env_var: None,
                config_section: None,
                config_key: None,
                default_value: None,
                required: false,
                value_type: T::VALUE_TYPE,
                short_description: String::new(),
                long_description: String::new(),
            },
            _type: PhantomData,
        }
    }

    pub fn descriptions(
        mut self,
        short_desc: impl Into<String>,
        long_desc: impl Into<String>,
    ) -> Self {
        self.field.short_description = short_desc.into();
        self.field.long_description = long_desc.into();
        self
    }

    pub fn short_desc(mut self, short_desc: impl Into<String>) -> Self {
        self.field.short_description = short_desc.into();
        self
    }

    /// Command line flag, without the leading dash.
    pub fn arg_name(mut self, arg_name: impl Into<String>) -> Self {
        self.field.arg_name = Some(arg_name.into());
        self
    }

    pub fn env_var(mut self, env_var: impl Into<String>) -> Self {
        self.field.env_var = Some(env_var.into());
        self
    }

    /// Section and key the value is read from in the configuration file.
    pub fn config_name(mut self, section: impl Into<String>, key: impl Into<String>) -> Self {
        self.field.config_section = Some(section.into());
        self.field.config_key = Some(key.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.field.required = true;
        self
    }

    /// Store the field in the registry and return it.
    pub fn register(self) -> AppResult<Arc<Field>> {
        self.registry.insert(self.field)
    }

    fn with_default(mut self, default_value: T) -> Self {
        self.field.default_value = Some(default_value.into_value());
        self
    }
}

macro_rules! scalar_default {
    ($($ty:ty),*) => {
        $(
            impl FieldBuilder<'_, $ty> {
                pub fn default(self, default_value: $ty) -> Self {
                    self.with_default(default_value)
                }
            }
        )*
    };
}

scalar_default!(i32, u32, f64, bool);

impl FieldBuilder<'_, String> {
    pub fn default(self, default_value: impl Into<String>) -> Self {
        self.with_default(default_value.into())
    }
}
