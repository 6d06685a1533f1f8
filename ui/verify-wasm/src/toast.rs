//! Transient, non-blocking notifications.

use crate::dom::{self, Elements};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;

const TOAST_MS: u32 = 5_000;

/// Show a toast for a few seconds. Never blocks the flow that raised it.
pub fn show(els: &Elements, message: &str) {
    dom::set_text(&els.toast, message);
    dom::add_class(&els.toast, "visible");

    let toast = els.toast.clone();
    let shown = message.to_owned();
    spawn_local(async move {
        TimeoutFuture::new(TOAST_MS).await;
        // Leave a newer toast alone.
        if toast.text_content().as_deref() == Some(shown.as_str()) {
            dom::remove_class(&toast, "visible");
        }
    });
}
