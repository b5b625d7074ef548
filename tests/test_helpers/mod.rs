//! Scoped `FIELDOPS_*` environment for settings tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use fieldops::config::SETTINGS_VARS;

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Settings environment for one test.
///
/// Starts with every settings variable cleared, so a developer's shell or
/// `.env` values never leak in. Holds a process-wide lock and restores the
/// saved values on drop.
pub struct FieldopsEnv {
    saved: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl FieldopsEnv {
    /// Clears every variable in [`SETTINGS_VARS`].
    pub fn cleared() -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let saved = SETTINGS_VARS
            .into_iter()
            .map(|key| (key, env::var_os(key)))
            .collect();
        for key in SETTINGS_VARS {
            // SAFETY: ENV_MUTEX serialises environment mutation across tests.
            unsafe { env::remove_var(key) };
        }
        Self { saved, _lock: lock }
    }

    /// Sets one settings variable for the guard's lifetime.
    ///
    /// # Panics
    ///
    /// Panics when `key` is not a settings variable, since restoring it on
    /// drop would be skipped.
    pub fn with(self, key: &'static str, value: &str) -> Self {
        assert!(
            SETTINGS_VARS.contains(&key),
            "{key} is not a FIELDOPS settings variable"
        );
        // SAFETY: ENV_MUTEX serialises environment mutation across tests.
        unsafe { env::set_var(key, value) };
        self
    }
}

impl Drop for FieldopsEnv {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            // SAFETY: the guard still holds ENV_MUTEX.
            unsafe {
                match value {
                    Some(previous) => env::set_var(key, previous),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
