//! Layered INI file store.
//!
//! A base file plus an optional profile-specific file named
//! `<stem>.<profile>.<ext>` next to it. Lookups check the base file first
//! and only fall back to the profile file when the base lacks the key.

use crate::error::{AppError, AppResult};
use crate::profile::Profile;
use ini::Ini;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Layer of the store a value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLayer {
    Base,
    Profile,
}

impl std::fmt::Display for FileLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileLayer::Base => write!(f, "base"),
            FileLayer::Profile => write!(f, "profile"),
        }
    }
}

/// Base configuration file plus optional profile override file.
#[derive(Debug, Clone)]
pub struct LayeredFileStore {
    base: Ini,
    base_path: Option<PathBuf>,
    overrides: Option<Ini>,
    overrides_path: Option<PathBuf>,
}

impl Default for LayeredFileStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl LayeredFileStore {
    /// A store with no entries.
    pub fn empty() -> Self {
        Self {
            base: Ini::new(),
            base_path: None,
            overrides: None,
            overrides_path: None,
        }
    }

    /// Open `path` and, if present, the override file for `profile`.
    ///
    /// A missing base file is a system configuration error; a missing
    /// override file is not.
    pub fn open(path: impl AsRef<Path>, profile: Profile) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(
                AppError::system_configuration("Config file does not exist")
                    .with_str("path", path.display().to_string()),
            );
        }

        let base = Ini::load_from_file(path).map_err(|e| {
            AppError::system_configuration("Error loading base config file")
                .with_cause(e)
                .with_str("path", path.display().to_string())
        })?;

        let mut store = Self {
            base,
            base_path: Some(path.to_path_buf()),
            overrides: None,
            overrides_path: None,
        };
        store.load_profile_overrides(profile)?;
        Ok(store)
    }

    /// Build a single-layer store from INI text.
    pub fn from_contents(contents: &str) -> AppResult<Self> {
        let base = Ini::load_from_str(contents).map_err(|e| {
            AppError::system_configuration("Error loading ini file from contents")
                .with_cause(e)
                .with_str("contents", contents)
        })?;
        Ok(Self {
            base,
            ..Self::empty()
        })
    }

    /// Replace the override layer with the file for `profile`.
    ///
    /// No-op for stores that were not opened from a file. If the profile file
    /// does not exist the override layer is cleared.
    pub fn load_profile_overrides(&mut self, profile: Profile) -> AppResult<()> {
        let Some(ref base_path) = self.base_path else {
            return Ok(());
        };

        let overrides_path = profile_override_path(base_path, profile);
        if !overrides_path.is_file() {
            debug!(path = %overrides_path.display(), "no profile config file");
            self.overrides = None;
            self.overrides_path = None;
            return Ok(());
        }

        let overrides = Ini::load_from_file(&overrides_path).map_err(|e| {
            AppError::system_configuration("Error loading environment config file")
                .with_cause(e)
                .with_str("path", overrides_path.display().to_string())
        })?;
        debug!(path = %overrides_path.display(), %profile, "loaded profile config file");
        self.overrides = Some(overrides);
        self.overrides_path = Some(overrides_path);
        Ok(())
    }

    /// Add an override layer from INI text.
    pub fn with_override_contents(mut self, contents: &str) -> AppResult<Self> {
        let overrides = Ini::load_from_str(contents).map_err(|e| {
            AppError::system_configuration("Error loading ini file from contents")
                .with_cause(e)
                .with_str("contents", contents)
        })?;
        self.overrides = Some(overrides);
        Ok(self)
    }

    /// Value of `section`/`key`, base layer first. Empty values count as absent.
    pub fn get(&self, section: &str, key: &str) -> Option<(&str, FileLayer)> {
        if let Some(value) = lookup(&self.base, section, key) {
            return Some((value, FileLayer::Base));
        }
        let value = self
            .overrides
            .as_ref()
            .and_then(|overrides| lookup(overrides, section, key))?;
        trace!(section, key, "value read from profile config file");
        Some((value, FileLayer::Profile))
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    pub fn overrides_path(&self) -> Option<&Path> {
        self.overrides_path.as_deref()
    }

    pub fn has_overrides(&self) -> bool {
        self.overrides.is_some()
    }
}

fn lookup<'a>(file: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    let section = if section.is_empty() { None } else { Some(section) };
    file.section(section)
        .and_then(|properties| properties.get(key))
        .filter(|value| !value.is_empty())
}

/// Path of the override file for `profile`: the lowercase profile name is
/// inserted before the extension (`app.ini` → `app.development.ini`).
pub fn profile_override_path(base: &Path, profile: Profile) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match base.extension() {
        Some(ext) => format!("{}.{}.{}", stem, profile.as_str(), ext.to_string_lossy()),
        None => format!("{}.{}", stem, profile.as_str()),
    };
    base.with_file_name(file_name)
}
