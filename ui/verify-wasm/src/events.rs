//! Event binding.
//!
//! Wires all UI event listeners once after init. Async handlers are
//! spawned via `wasm_bindgen_futures::spawn_local`.

use crate::capture;
use crate::dom::Elements;
use crate::email_gate;
use crate::result_step;
use crate::wizard;
use rp_verify_core::PhotoSlot;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Helper: attach async click handler to an HtmlElement.
macro_rules! on_click_async {
    ($el:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Helper: attach sync click handler.
macro_rules! on_click {
    ($el:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            $handler(&els);
        }) as Box<dyn FnMut(web_sys::MouseEvent)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Helper: attach change handler (file inputs).
macro_rules! on_change {
    ($el:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            $handler(&els);
        }) as Box<dyn FnMut(web_sys::Event)>);
        $el.add_event_listener_with_callback("change", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

// Async `fn` wrappers so the click handlers reference function items
// (which carry proper higher-ranked lifetimes) rather than inline async
// closures, which cannot tie the borrowed argument to the returned future.
async fn open_id_camera(els: &Elements) {
    capture::on_open_camera(els, PhotoSlot::Id).await
}
async fn open_selfie_camera(els: &Elements) {
    capture::on_open_camera(els, PhotoSlot::Selfie).await
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) {
    // ── Email gate ──
    on_click!(els.gate_continue_btn, els, email_gate::on_submit);

    // ── Capture: file picks ──
    on_change!(els.id_file_input, els, |e: &Elements| {
        capture::on_file_picked(e, PhotoSlot::Id)
    });
    on_change!(els.selfie_file_input, els, |e: &Elements| {
        capture::on_file_picked(e, PhotoSlot::Selfie)
    });

    // ── Capture: camera ──
    on_click_async!(els.id_camera_btn, els, open_id_camera);
    on_click_async!(els.selfie_camera_btn, els, open_selfie_camera);
    on_click_async!(els.camera_snap_btn, els, capture::on_snap);
    on_click!(els.camera_cancel_btn, els, capture::on_cancel_camera);

    // ── Navigation ──
    on_click!(els.id_next_btn, els, wizard::on_next);
    on_click!(els.selfie_next_btn, els, wizard::on_next);
    on_click!(els.selfie_back_btn, els, wizard::on_back);
    on_click!(els.submit_back_btn, els, wizard::on_back);

    // ── Submission ──
    on_click_async!(els.submit_btn, els, wizard::on_submit);

    // ── Result ──
    on_click!(els.download_report_btn, els, result_step::on_download);
    on_click!(els.result_continue_btn, els, result_step::on_continue);
    on_click_async!(els.restart_btn, els, wizard::on_restart);
}
