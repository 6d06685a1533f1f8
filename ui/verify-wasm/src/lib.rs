//! RentProof identity-verification wizard, WASM frontend.
//!
//! Pure Rust + WASM single-page flow: email gate → ID capture → selfie
//! → submission → result. Cross-step state lives in the
//! `rp-verify-core` controller; modules here only bind it to the DOM
//! and to the browser's storage and camera facilities.

pub mod api;
pub mod camera;
pub mod capture;
pub mod dom;
pub mod email_gate;
pub mod events;
pub mod photo_cache;
pub mod result_step;
pub mod state;
pub mod toast;
pub mod wizard;

use gloo_console::warn;
use rp_storage::{NoopPhotoCache, PhotoCache};
use rp_verify_core::StepController;
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init().await
}

/// Main initialisation sequence.
async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    // Photo cache: IndexedDB when available, otherwise a no-op store.
    // The wizard works either way; only resume-after-reload differs.
    let cache: Box<dyn PhotoCache> = match photo_cache::IdbPhotoCache::open().await {
        Ok(cache) => Box::new(cache),
        Err(err) => {
            warn!(format!("photo cache unavailable: {err}"));
            Box::new(NoopPhotoCache)
        }
    };

    // Restore wizard progress from the previous session, if any.
    let mut controller = StepController::new(state::LocalProgressStore, cache);
    controller.hydrate().await;
    state::install_controller(controller);

    // Originating authorization token, when the wizard was reached
    // through an invite link.
    state::set_auth_token(auth_token_from_url());

    events::bind_events(&els);

    // Email gate first; the wizard renders once it is satisfied.
    if email_gate::restore(&els) {
        wizard::render(&els);
    }

    Ok(())
}

fn auth_token_from_url() -> Option<String> {
    let search = dom::window().location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get("token").filter(|t| !t.is_empty())
}
