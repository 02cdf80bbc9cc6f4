//! Process-wide deployment profile.
//!
//! The active profile starts as [`Profile::Production`]. The bootstrap
//! overrides it once after resolving the `activeProfile` field; afterwards
//! it should only change for test isolation, through [`ProfileGuard`].

use crate::config::{EnvSource, ProcessEnv};
use crate::error::{AppError, AppResult};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Environment variable consulted by [`load_profile`].
pub const PROFILE_ENV_VAR: &str = "ACTIVE_PROFILE";

/// Deployment profile the process runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Production,
    Development,
    Test,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Production, Profile::Development, Profile::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Production => "production",
            Profile::Development => "development",
            Profile::Test => "test",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Profile::Production => 1,
            Profile::Development => 2,
            Profile::Test => 3,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            2 => Profile::Development,
            3 => Profile::Test,
            _ => Profile::Production,
        }
    }

    /// Match a trimmed, lowercased value against the known profiles.
    fn lookup(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase();
        Profile::ALL
            .into_iter()
            .find(|profile| profile.as_str() == normalized)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = AppError;

    fn from_str(value: &str) -> AppResult<Self> {
        if value.trim().is_empty() {
            return Err(AppError::illegal_argument("Cannot parse blank string into a Profile")
                .with_context("ParseProfile"));
        }
        Profile::lookup(value).ok_or_else(|| {
            AppError::illegal_argument(format!("invalid active profile value '{}'", value))
                .with_context("ParseProfile")
                .with_str("profile", value)
        })
    }
}

static ACTIVE_PROFILE: AtomicU8 = AtomicU8::new(1);

/// Returns the profile the process is running under.
pub fn get_active_profile() -> Profile {
    Profile::from_u8(ACTIVE_PROFILE.load(Ordering::Acquire))
}

/// Replace the active profile.
pub fn override_profile(profile: Profile) {
    ACTIVE_PROFILE.store(profile.to_u8(), Ordering::Release);
}

/// Parse `value` and make it the active profile. `None` leaves the profile untouched.
pub fn override_profile_value(value: Option<&str>) -> AppResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    override_profile(value.parse()?);
    Ok(())
}

/// Load the active profile from `ACTIVE_PROFILE`, falling back to `default_profile`
/// when the variable is unset or blank.
pub fn load_profile(default_profile: Profile) -> AppResult<()> {
    load_profile_from(default_profile, &ProcessEnv)
}

/// Same as [`load_profile`], reading the variable from `env`.
pub fn load_profile_from(default_profile: Profile, env: &dyn EnvSource) -> AppResult<()> {
    let profile = fetch_profile(default_profile, env)?;
    override_profile(profile);
    Ok(())
}

fn fetch_profile(default_profile: Profile, env: &dyn EnvSource) -> AppResult<Profile> {
    let raw = env.var(PROFILE_ENV_VAR).unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(default_profile);
    }
    Profile::lookup(&raw).ok_or_else(|| {
        AppError::system_configuration("Cannot start the application under an unknown profile")
            .with_cause(format!("invalid active profile value '{}'", raw))
            .with_str("profile", raw)
    })
}

static OVERRIDE_LOCK: Mutex<()> = Mutex::new(());

/// Scoped profile override.
///
/// Sets the active profile on creation and restores the previous one on drop.
/// Guards are serialized through a process-wide lock, so two guards never
/// interleave; do not create a second guard on the same thread while one is alive.
pub struct ProfileGuard {
    previous: Profile,
    _lock: MutexGuard<'static, ()>,
}

impl ProfileGuard {
    pub fn new(profile: Profile) -> Self {
        let lock = OVERRIDE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = get_active_profile();
        override_profile(profile);
        Self {
            previous,
            _lock: lock,
        }
    }

    /// Profile that will be restored when the guard drops.
    pub fn previous(&self) -> Profile {
        self.previous
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        override_profile(self.previous);
    }
}
