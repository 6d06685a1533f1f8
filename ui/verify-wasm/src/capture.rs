//! ID and selfie capture steps.
//!
//! A photo arrives either from a file pick (FileReader → data URL) or
//! from the camera overlay. Both paths land in `apply_photo`, which
//! routes the payload through the controller and refreshes the step UI.

use crate::camera;
use crate::dom::{self, Elements};
use crate::state;
use crate::wizard;
use gloo_console::warn;
use rp_verify_core::PhotoSlot;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;

fn file_input<'a>(els: &'a Elements, slot: PhotoSlot) -> &'a HtmlInputElement {
    match slot {
        PhotoSlot::Id => &els.id_file_input,
        PhotoSlot::Selfie => &els.selfie_file_input,
    }
}

/// File-pick handler for either capture step.
pub fn on_file_picked(els: &Elements, slot: PhotoSlot) {
    let input = file_input(els, slot);
    let Some(file) = input.files().and_then(|list| list.get(0)) else {
        return;
    };

    let Ok(reader) = web_sys::FileReader::new() else {
        warn!("FileReader unavailable");
        return;
    };

    let reader_for_load = reader.clone();
    let els2 = els.clone();
    let onload = Closure::once(move |_: web_sys::ProgressEvent| {
        let Ok(result) = reader_for_load.result() else {
            warn!("file read produced no result");
            return;
        };
        let Some(data_url) = result.as_string() else {
            return;
        };
        spawn_local(async move {
            apply_photo(&els2, slot, data_url).await;
        });
    });
    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    if let Err(err) = reader.read_as_data_url(&file) {
        warn!(format!("file read failed: {err:?}"));
    }
}

pub async fn on_open_camera(els: &Elements, slot: PhotoSlot) {
    camera::open(els, slot).await;
}

pub async fn on_snap(els: &Elements) {
    if let Some((slot, data_url)) = camera::snap(els) {
        apply_photo(els, slot, data_url).await;
    }
}

pub fn on_cancel_camera(els: &Elements) {
    camera::close(els);
}

/// Record a captured photo and refresh the previews. The controller
/// keeps the in-memory copy even when caching for resume fails.
pub async fn apply_photo(els: &Elements, slot: PhotoSlot, data_url: String) {
    let Some(mut controller) = state::take_controller() else {
        return;
    };
    controller.update_photo(slot, &data_url).await;
    state::restore_controller(controller);
    wizard::render(els);
}

/// Reflect captured photos into previews and continue-button state.
pub fn render_captures(els: &Elements) {
    let (id_photo, selfie_photo) = state::with_controller(|c| {
        (
            c.state().id_photo.clone(),
            c.state().selfie_photo.clone(),
        )
    })
    .unwrap_or((None, None));

    render_slot(&els.id_preview, &els.id_next_btn, &id_photo);
    render_slot(&els.selfie_preview, &els.selfie_next_btn, &selfie_photo);

    // Submit-step thumbnails mirror the same payloads.
    if let Some(ref data) = id_photo {
        els.submit_id_thumb.set_src(data);
    }
    if let Some(ref data) = selfie_photo {
        els.submit_selfie_thumb.set_src(data);
    }
}

fn render_slot(
    preview: &web_sys::HtmlImageElement,
    next_btn: &web_sys::HtmlButtonElement,
    photo: &Option<String>,
) {
    match photo {
        Some(data) => {
            preview.set_src(data);
            dom::show(preview);
            next_btn.set_disabled(false);
        }
        None => {
            dom::hide(preview);
            next_btn.set_disabled(true);
        }
    }
}
