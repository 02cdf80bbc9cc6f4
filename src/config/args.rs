//! POSIX-like command line parsing: `-flag value`, bare `-boolFlag`, and
//! anonymous arguments.

use super::field::{Field, ValueType};
use crate::error::{AppError, AppResult};
use std::collections::HashMap;

/// Parsed command line: raw values keyed by field name plus anonymous arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArguments {
    values: HashMap<String, String>,
    anonymous: Vec<String>,
}

impl ParsedArguments {
    /// Raw value given for the field named `field_name`.
    pub fn value(&self, field_name: &str) -> Option<&str> {
        self.values.get(field_name).map(String::as_str)
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Tokens not associated with any flag, in order.
    pub fn anonymous(&self) -> &[String] {
        &self.anonymous
    }
}

/// Parse `args` against the known flags.
///
/// `args[0]` is the program name and is skipped. A token is a flag when it
/// starts with `-`. Boolean fields take no value and are set to `"true"`;
/// any other flag consumes the next token verbatim, even if it looks like a
/// flag. A value flag at the end of input is dropped.
pub fn parse_args<S: AsRef<str>>(
    args: &[S],
    fields_by_arg_name: &HashMap<&str, &Field>,
) -> AppResult<ParsedArguments> {
    let mut parsed = ParsedArguments::default();
    let mut pending: Option<&Field> = None;

    for token in args.iter().skip(1).map(AsRef::as_ref) {
        if let Some(field) = pending.take() {
            parsed.values.insert(field.name.clone(), token.to_string());
            continue;
        }

        let Some(arg_name) = token.strip_prefix('-') else {
            parsed.anonymous.push(token.to_string());
            continue;
        };

        let Some(field) = fields_by_arg_name.get(arg_name).copied() else {
            return Err(AppError::system_configuration("Unknown command line argument")
                .with_str("argument", arg_name));
        };

        if field.value_type == ValueType::Boolean {
            parsed.values.insert(field.name.clone(), "true".to_string());
        } else {
            pending = Some(field);
        }
    }

    if let Some(field) = pending {
        tracing::debug!(field = %field.name, "command line flag has no value; ignoring");
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldRegistry;
    use crate::error::ErrorCode;

    fn registry() -> FieldRegistry {
        let mut registry = FieldRegistry::new();
        registry.create_string_field("host").arg_name("h").register().unwrap();
        registry.create_int_field("port").arg_name("p").register().unwrap();
        registry.create_bool_field("verbose").arg_name("verbose").register().unwrap();
        registry
    }

    fn parse(args: &[&str]) -> AppResult<ParsedArguments> {
        let registry = registry();
        parse_args(args, &registry.fields_by_arg_name())
    }

    #[test]
    fn test_value_flags() {
        let parsed = parse(&["appName", "-h", "app.com", "-p", "6000"]).unwrap();
        assert_eq!(parsed.value("host"), Some("app.com"));
        assert_eq!(parsed.value("port"), Some("6000"));
        assert!(parsed.anonymous().is_empty());
    }

    #[test]
    fn test_bool_flag_does_not_consume_next_token() {
        let parsed = parse(&["appName", "-verbose", "input.txt", "-p", "1"]).unwrap();
        assert_eq!(parsed.value("verbose"), Some("true"));
        assert_eq!(parsed.value("port"), Some("1"));
        assert_eq!(parsed.anonymous(), ["input.txt".to_string()]);
    }

    #[test]
    fn test_value_flag_consumes_flag_shaped_token() {
        let parsed = parse(&["appName", "-p", "-5", "-h", "-verbose"]).unwrap();
        assert_eq!(parsed.value("port"), Some("-5"));
        assert_eq!(parsed.value("host"), Some("-verbose"));
        assert_eq!(parsed.value("verbose"), None);
    }

    #[test]
    fn test_anonymous_arguments_keep_order() {
        let parsed = parse(&["appName", "one", "-p", "1", "two", "three"]).unwrap();
        assert_eq!(parsed.anonymous(), ["one", "two", "three"].map(String::from));
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse(&["appName", "-h", "x", "-bogus"]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SystemConfiguration);
        assert_eq!(err.metadata_value("argument"), Some("bogus"));
    }

    #[test]
    fn test_dangling_value_flag_is_dropped() {
        let parsed = parse(&["appName", "-h", "x", "-p"]).unwrap();
        assert_eq!(parsed.value("host"), Some("x"));
        assert_eq!(parsed.value("port"), None);
    }

    #[test]
    fn test_program_name_is_skipped() {
        let parsed = parse(&["-p"]).unwrap();
        assert!(parsed.values().is_empty());
        assert!(parse(&[]).unwrap().values().is_empty());
    }
}
