//! Wizard session state.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).
//! The step controller is taken out for the duration of an async operation
//! and restored afterwards, so no borrow is ever held across an await.

use rp_storage::{PhotoCache, ProgressStore, StorageError, StorageResult};
use rp_verify_core::StepController;
use std::cell::RefCell;

pub type Controller = StepController<LocalProgressStore, Box<dyn PhotoCache>>;

/// Per-session values that live outside the wizard state proper.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub contact_email: Option<String>,
    pub auth_token: Option<String>,
    pub submitting: bool,
}

thread_local! {
    static CONTROLLER: RefCell<Option<Controller>> = RefCell::new(None);
    static SESSION: RefCell<Session> = RefCell::new(Session::default());
}

pub fn install_controller(controller: Controller) {
    CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
}

/// Run a synchronous closure against the controller. Returns `None` if
/// the controller is currently taken by an async operation.
pub fn with_controller<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Controller) -> R,
{
    CONTROLLER.with(|slot| slot.borrow_mut().as_mut().map(f))
}

/// Take the controller out for an async operation. Callers must pair
/// this with `restore_controller`.
pub fn take_controller() -> Option<Controller> {
    CONTROLLER.with(|slot| slot.borrow_mut().take())
}

pub fn restore_controller(controller: Controller) {
    CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
}

pub fn session() -> Session {
    SESSION.with(|s| s.borrow().clone())
}

pub fn set_contact_email(email: Option<String>) {
    SESSION.with(|s| s.borrow_mut().contact_email = email);
}

pub fn set_auth_token(token: Option<String>) {
    SESSION.with(|s| s.borrow_mut().auth_token = token);
}

pub fn set_submitting(value: bool) {
    SESSION.with(|s| s.borrow_mut().submitting = value);
}

// ── Browser progress store ──

/// `ProgressStore` over window.localStorage. Unavailable storage (e.g.
/// private browsing) surfaces as an error the callers degrade on.
#[derive(Clone, Copy, Default)]
pub struct LocalProgressStore;

fn storage() -> StorageResult<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| StorageError::Unavailable("localStorage".into()))
}

impl ProgressStore for LocalProgressStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}
