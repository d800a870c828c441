//! The process-wide default [`FirebaseApp`].
//!
//! The default app is created at most once per process. Concurrent first
//! callers block until the single initialisation finishes and then all see
//! the same instance. A failed initialisation leaves nothing behind, and an
//! initialised app is never torn down.

use once_cell::sync::OnceCell;

use crate::{
    app::{FirebaseApp, FirebaseAppOptions},
    config::EnvLoader,
    error::FirebaseError,
    ServiceAccount,
};

static DEFAULT_APP: AppSlot = AppSlot::new();

/// Returns the default app, initialising it from the environment on first use.
///
/// Environment variables are read through [`EnvLoader::default`]. Any missing
/// variable fails with [`FirebaseError::Configuration`] before Google is
/// contacted.
///
/// ```no_run
/// # fn main() -> Result<(), kindling::error::FirebaseError> {
/// let app = kindling::get_client()?;
/// println!("Connected to {}", app.project_id());
/// # Ok(())
/// # }
/// ```
pub fn get_client() -> Result<&'static FirebaseApp, FirebaseError> {
    get_client_with(&EnvLoader::default())
}

/// Like [`get_client`], but reads the environment with `loader`. The loader
/// is only consulted if the default app does not exist yet.
pub fn get_client_with(loader: &EnvLoader) -> Result<&'static FirebaseApp, FirebaseError> {
    DEFAULT_APP.get_or_try_init(|| {
        let service_account = loader.load()?;
        FirebaseApp::initialise(service_account, FirebaseAppOptions::default())
    })
}

/// Explicitly initialises the default app.
///
/// Fails with [`FirebaseError::AlreadyInitialised`] if the default app
/// already exists, whether it was created here or by [`get_client`].
pub fn initialise_default_app(
    service_account: ServiceAccount,
    options: FirebaseAppOptions,
) -> Result<&'static FirebaseApp, FirebaseError> {
    DEFAULT_APP.initialise(|| FirebaseApp::initialise(service_account, options))
}

/// The default app, if it has been initialised.
pub fn try_get_client() -> Option<&'static FirebaseApp> {
    DEFAULT_APP.get()
}

struct AppSlot {
    cell: OnceCell<FirebaseApp>,
}

impl AppSlot {
    const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    fn get(&self) -> Option<&FirebaseApp> {
        self.cell.get()
    }

    fn get_or_try_init(
        &self,
        init: impl FnOnce() -> Result<FirebaseApp, FirebaseError>,
    ) -> Result<&FirebaseApp, FirebaseError> {
        self.cell.get_or_try_init(|| {
            tracing::debug!("Initialising default Firebase app");
            init().map_err(|e| {
                tracing::error!("Failed to initialise default Firebase app: {}", e);
                e
            })
        })
    }

    fn initialise(
        &self,
        init: impl FnOnce() -> Result<FirebaseApp, FirebaseError>,
    ) -> Result<&FirebaseApp, FirebaseError> {
        let mut initialised_here = false;

        let app = self.get_or_try_init(|| {
            initialised_here = true;
            init()
        })?;

        if initialised_here {
            Ok(app)
        } else {
            Err(FirebaseError::AlreadyInitialised)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    };

    use super::*;
    use crate::{config::ConfigError, test_helpers::test_service_account};

    fn test_app() -> Result<FirebaseApp, FirebaseError> {
        FirebaseApp::initialise(test_service_account(), FirebaseAppOptions::default())
    }

    #[test]
    fn returns_the_same_app_on_every_access() {
        let slot = AppSlot::new();

        let first = slot.get_or_try_init(test_app).unwrap();
        let second = slot
            .get_or_try_init(|| panic!("must not initialise twice"))
            .unwrap();

        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, slot.get().unwrap()));
    }

    #[test]
    fn concurrent_first_access_initialises_once() {
        const THREADS: usize = 16;

        let slot = Arc::new(AppSlot::new());
        let init_calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let init_calls = Arc::clone(&init_calls);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    let app = slot
                        .get_or_try_init(|| {
                            init_calls.fetch_add(1, Ordering::SeqCst);
                            test_app()
                        })
                        .unwrap();
                    app as *const FirebaseApp as usize
                })
            })
            .collect();

        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(init_calls.load(Ordering::SeqCst), 1);
        assert!(addresses.iter().all(|&a| a == addresses[0]));
    }

    #[test]
    fn failed_initialisation_leaves_the_slot_empty() {
        let slot = AppSlot::new();

        let err = slot
            .get_or_try_init(|| Err(ConfigError::Missing(vec!["GCP_PROJECT_ID".into()]).into()))
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(slot.get().is_none());

        assert!(slot.get_or_try_init(test_app).is_ok());
    }

    #[test]
    fn initialising_twice_is_an_error() {
        let slot = AppSlot::new();

        let first = slot.initialise(test_app).unwrap();
        let err = slot.initialise(test_app).unwrap_err();

        assert!(matches!(err, FirebaseError::AlreadyInitialised));
        assert!(std::ptr::eq(first, slot.get().unwrap()));
    }

    #[test]
    fn initialise_after_lazy_access_is_an_error() {
        let slot = AppSlot::new();

        slot.get_or_try_init(test_app).unwrap();

        assert!(matches!(
            slot.initialise(test_app),
            Err(FirebaseError::AlreadyInitialised)
        ));
    }
}
