//! Typed, multi-source configuration.
//!
//! Fields are declared once through a [`FieldRegistry`] and resolved by a
//! [`Configuration`] from four sources, highest precedence first:
//! 1. **Environment variable** - one name per field, trimmed
//! 2. **Command line** - single-dash flags (`-p 8080`, bare `-verbose`)
//! 3. **Configuration file** - INI `[Section]`/`Key`, base file then
//!    the `<stem>.<profile>.<ext>` file
//! 4. **Default** - declared on the field
//!
//! Each resolved value records its [`Specifier`] (the source that won).

mod args;
mod env;
mod field;
mod registry;
mod resolver;
mod store;

pub use args::{ParsedArguments, parse_args};
pub use env::{EnvSource, ProcessEnv};
pub use field::{Field, FieldType, ResolvedValue, Specifier, Value, ValueType};
pub use registry::{FieldBuilder, FieldRegistry};
pub use resolver::Configuration;
pub use store::{FileLayer, LayeredFileStore, profile_override_path};
