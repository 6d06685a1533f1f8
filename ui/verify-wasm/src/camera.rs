//! Device camera access as a scoped resource.
//!
//! The stream is acquired when a capture step opens the camera overlay
//! and released through `close()` on every exit path: snap, cancel,
//! step navigation, and restart. Anything else leaks the camera.

use crate::dom::{self, Elements};
use gloo_console::warn;
use rp_verify_core::PhotoSlot;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlVideoElement, MediaStream, MediaStreamConstraints,
    MediaStreamTrack,
};

struct ActiveCapture {
    stream: MediaStream,
    slot: PhotoSlot,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveCapture>> = RefCell::new(None);
}

/// Open the camera overlay for the given slot and start the stream.
pub async fn open(els: &Elements, slot: PhotoSlot) {
    // A previous session must be released before acquiring a new one.
    close(els);

    dom::set_text(&els.camera_error, "");
    dom::show(&els.camera_overlay);

    match acquire(&els.camera_video).await {
        Ok(stream) => {
            ACTIVE.with(|a| *a.borrow_mut() = Some(ActiveCapture { stream, slot }));
        }
        Err(message) => {
            warn!(format!("camera unavailable: {message}"));
            dom::set_text(
                &els.camera_error,
                "Camera unavailable. You can upload a photo instead.",
            );
            ACTIVE.with(|a| *a.borrow_mut() = None);
        }
    }
}

async fn acquire(video: &HtmlVideoElement) -> Result<MediaStream, String> {
    let devices = dom::window()
        .navigator()
        .media_devices()
        .map_err(|e| format!("{e:?}"))?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::TRUE);
    constraints.set_audio(&JsValue::FALSE);

    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| format!("{e:?}"))?;
    let stream: MediaStream = JsFuture::from(promise)
        .await
        .map_err(|e| format!("{e:?}"))?
        .unchecked_into();

    video.set_src_object(Some(&stream));
    let _ = video.play();
    Ok(stream)
}

/// Grab the current frame as a JPEG data URL and release the camera.
/// Returns the slot the capture was opened for.
pub fn snap(els: &Elements) -> Option<(PhotoSlot, String)> {
    let slot = ACTIVE.with(|a| a.borrow().as_ref().map(|c| c.slot))?;

    let video = &els.camera_video;
    let canvas = &els.camera_canvas;
    canvas.set_width(video.video_width());
    canvas.set_height(video.video_height());

    let frame = (|| -> Result<String, String> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| format!("{e:?}"))?
            .ok_or_else(|| "no 2d context".to_string())?
            .unchecked_into();
        ctx.draw_image_with_html_video_element(video, 0.0, 0.0)
            .map_err(|e| format!("{e:?}"))?;
        canvas
            .to_data_url_with_type("image/jpeg")
            .map_err(|e| format!("{e:?}"))
    })();

    close(els);

    match frame {
        Ok(data_url) => Some((slot, data_url)),
        Err(message) => {
            warn!(format!("frame capture failed: {message}"));
            None
        }
    }
}

/// The single release path: stop every track, detach the stream, hide
/// the overlay. Idempotent.
pub fn close(els: &Elements) {
    if let Some(active) = ACTIVE.with(|a| a.borrow_mut().take()) {
        for track in active.stream.get_tracks().iter() {
            let track: MediaStreamTrack = track.unchecked_into();
            track.stop();
        }
    }
    els.camera_video.set_src_object(None);
    dom::hide(&els.camera_overlay);
}
