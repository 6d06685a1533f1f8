//! DOM element bindings.
//!
//! All references are resolved once at startup. To add new UI elements,
//! add a field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    HtmlInputElement, HtmlVideoElement,
};

// ── Helpers ──

fn doc() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query(selector: &str) -> Option<Element> {
    doc().query_selector(selector).ok()?
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn show(el: &Element) {
    remove_class(el, "hidden");
}

pub fn hide(el: &Element) {
    add_class(el, "hidden");
}

pub fn create_element(tag: &str) -> Element {
    doc().create_element(tag).unwrap()
}

pub fn window() -> web_sys::Window {
    web_sys::window().unwrap()
}

// ── Elements struct ──

/// All DOM references used by the verification wizard.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Email gate
    pub gate_panel: Element,
    pub email_input: HtmlInputElement,
    pub terms_checkbox: HtmlInputElement,
    pub email_error: Element,
    pub gate_continue_btn: HtmlElement,

    // Wizard shell
    pub wizard_panel: Element,
    pub step_indicator: Element,
    pub id_panel: Element,
    pub selfie_panel: Element,
    pub submit_panel: Element,
    pub result_panel: Element,

    // ID capture
    pub id_preview: HtmlImageElement,
    pub id_file_input: HtmlInputElement,
    pub id_camera_btn: HtmlElement,
    pub id_next_btn: HtmlButtonElement,

    // Selfie capture
    pub selfie_preview: HtmlImageElement,
    pub selfie_file_input: HtmlInputElement,
    pub selfie_camera_btn: HtmlElement,
    pub selfie_next_btn: HtmlButtonElement,
    pub selfie_back_btn: HtmlElement,

    // Camera overlay, shared by both capture steps
    pub camera_overlay: Element,
    pub camera_video: HtmlVideoElement,
    pub camera_canvas: HtmlCanvasElement,
    pub camera_snap_btn: HtmlElement,
    pub camera_cancel_btn: HtmlElement,
    pub camera_error: Element,

    // Submit
    pub submit_id_thumb: HtmlImageElement,
    pub submit_selfie_thumb: HtmlImageElement,
    pub submit_btn: HtmlButtonElement,
    pub submit_back_btn: HtmlElement,
    pub submit_status: Element,

    // Result
    pub result_heading: Element,
    pub result_records: Element,
    pub download_report_btn: HtmlElement,
    pub result_continue_btn: HtmlElement,
    pub restart_btn: HtmlElement,

    // Toast
    pub toast: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after DOMContentLoaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            gate_panel: get_el!("emailGate"),
            email_input: get_typed!(HtmlInputElement, "emailInput"),
            terms_checkbox: get_typed!(HtmlInputElement, "termsCheckbox"),
            email_error: get_el!("emailError"),
            gate_continue_btn: get_typed!(HtmlElement, "gateContinueBtn"),

            wizard_panel: get_el!("wizardPanel"),
            step_indicator: get_el!("stepIndicator"),
            id_panel: get_el!("idCaptureStep"),
            selfie_panel: get_el!("selfieStep"),
            submit_panel: get_el!("submitStep"),
            result_panel: get_el!("resultStep"),

            id_preview: get_typed!(HtmlImageElement, "idPreview"),
            id_file_input: get_typed!(HtmlInputElement, "idFileInput"),
            id_camera_btn: get_typed!(HtmlElement, "idCameraBtn"),
            id_next_btn: get_typed!(HtmlButtonElement, "idNextBtn"),

            selfie_preview: get_typed!(HtmlImageElement, "selfiePreview"),
            selfie_file_input: get_typed!(HtmlInputElement, "selfieFileInput"),
            selfie_camera_btn: get_typed!(HtmlElement, "selfieCameraBtn"),
            selfie_next_btn: get_typed!(HtmlButtonElement, "selfieNextBtn"),
            selfie_back_btn: get_typed!(HtmlElement, "selfieBackBtn"),

            camera_overlay: get_el!("cameraOverlay"),
            camera_video: get_typed!(HtmlVideoElement, "cameraVideo"),
            camera_canvas: get_typed!(HtmlCanvasElement, "cameraCanvas"),
            camera_snap_btn: get_typed!(HtmlElement, "cameraSnapBtn"),
            camera_cancel_btn: get_typed!(HtmlElement, "cameraCancelBtn"),
            camera_error: get_el!("cameraError"),

            submit_id_thumb: get_typed!(HtmlImageElement, "submitIdThumb"),
            submit_selfie_thumb: get_typed!(HtmlImageElement, "submitSelfieThumb"),
            submit_btn: get_typed!(HtmlButtonElement, "submitBtn"),
            submit_back_btn: get_typed!(HtmlElement, "submitBackBtn"),
            submit_status: get_el!("submitStatus"),

            result_heading: get_el!("resultHeading"),
            result_records: get_el!("resultRecords"),
            download_report_btn: get_typed!(HtmlElement, "downloadReportBtn"),
            result_continue_btn: get_typed!(HtmlElement, "resultContinueBtn"),
            restart_btn: get_typed!(HtmlElement, "restartBtn"),

            toast: get_el!("toast"),
        })
    }
}
