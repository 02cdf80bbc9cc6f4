//! Environment variable lookup.

use std::collections::HashMap;

/// Source of environment variables consulted during resolution.
pub trait EnvSource: Send + Sync {
    /// Raw value of `name`, or `None` when unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Trimmed value of `name`; blank values count as unset.
pub(crate) fn non_blank_var(env: &dyn EnvSource, name: &str) -> Option<String> {
    env.var(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
