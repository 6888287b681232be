use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub(crate) fn unix_epoch_nanos_now() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}

/// Exclusive access to the process environment for one test.
///
/// Holds the global env lock for its whole lifetime and restores every
/// variable it touched, newest first, before releasing it.
pub(crate) struct ScopedEnv {
    saved: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    pub(crate) fn lock() -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        Self {
            saved: Vec::new(),
            _lock: lock,
        }
    }

    pub(crate) fn set(&mut self, key: &'static str, value: impl AsRef<OsStr>) -> &mut Self {
        self.saved.push((key, std::env::var_os(key)));
        unsafe {
            std::env::set_var(key, value);
        }
        self
    }

    pub(crate) fn remove(&mut self, key: &'static str) -> &mut Self {
        self.saved.push((key, std::env::var_os(key)));
        unsafe {
            std::env::remove_var(key);
        }
        self
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        while let Some((key, prev)) = self.saved.pop() {
            unsafe {
                match prev {
                    Some(prev) => std::env::set_var(key, prev),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScopedEnv;

    const VAR: &str = "WAYPOINT_TEST_SCOPED_ENV";

    #[test]
    fn restores_unset_variable_after_repeated_changes() {
        {
            let mut env = ScopedEnv::lock();
            env.remove(VAR);
            env.set(VAR, "first").remove(VAR).set(VAR, "second");
            assert_eq!(std::env::var(VAR).as_deref(), Ok("second"));
        }
        let _env = ScopedEnv::lock();
        assert!(std::env::var_os(VAR).is_none());
    }
}
