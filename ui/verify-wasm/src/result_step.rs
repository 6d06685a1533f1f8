//! Terminal step: verdict rendering, report download, and the detached
//! post-success side effects.

use crate::api;
use crate::dom::{self, Elements};
use crate::state;
use crate::toast;
use gloo_console::{error, log, warn};
use rp_api_types::VerificationRecord;
use rp_report::{render_report, ReportInput};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Operational mailbox copied on every report dispatch.
const OPS_MAILBOX: &str = "verifications@rentproof.io";
const REPORT_FILENAME: &str = "rentproof-verification-report.pdf";
const REGISTRATION_PATH: &str = "/register";

pub fn render(els: &Elements) {
    let Some((outcome, records)) =
        state::with_controller(|c| (c.state().outcome, c.state().records.clone()))
    else {
        return;
    };

    let verified = outcome == Some(true);
    dom::set_text(
        &els.result_heading,
        if verified {
            "Identity verified"
        } else {
            "Verification failed"
        },
    );
    dom::toggle_class(&els.result_panel, "result-success", verified);
    dom::toggle_class(&els.result_panel, "result-failure", !verified);

    render_records(els, &records);

    if verified {
        dom::show(&els.download_report_btn);
        dom::show(&els.result_continue_btn);
    } else {
        dom::hide(&els.download_report_btn);
        dom::hide(&els.result_continue_btn);
    }
}

fn render_records(els: &Elements, records: &[VerificationRecord]) {
    let container = &els.result_records;
    container.set_inner_html("");

    for record in records {
        let row = dom::create_element("li");
        let flag = if record.passed { "✓" } else { "✗" };
        let scores = record
            .probability
            .iter()
            .map(|p| format!("{} {:.0}%", p.kind, p.score * 100.0))
            .collect::<Vec<_>>()
            .join(", ");
        let text = if scores.is_empty() {
            format!("{} {}", flag, record.name)
        } else {
            format!("{} {} ({})", flag, record.name, scores)
        };
        row.set_text_content(Some(&text));
        let _ = container.append_child(&row);
    }
}

fn build_report() -> Option<Vec<u8>> {
    let (verified, records, id_photo) = state::with_controller(|c| {
        (
            c.state().outcome == Some(true),
            c.state().records.clone(),
            c.state().id_photo.clone(),
        )
    })?;
    let email = state::session().contact_email.unwrap_or_default();
    let (first, last) = name_parts(&email);

    match render_report(&ReportInput {
        verified,
        first_name: &first,
        last_name: &last,
        contact_email: &email,
        records: &records,
        id_photo: id_photo.as_deref(),
    }) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            error!(format!("report rendering failed: {err:#}"));
            None
        }
    }
}

/// Derive display name parts from the email local part; the wizard never
/// collects a separate name.
fn name_parts(email: &str) -> (String, String) {
    let local = email.split('@').next().unwrap_or_default();
    match local.split_once('.') {
        Some((first, last)) => (first.to_owned(), last.to_owned()),
        None => (local.to_owned(), String::new()),
    }
}

/// Download the report locally via an object URL on a transient anchor.
pub fn on_download(els: &Elements) {
    let Some(bytes) = build_report() else {
        toast::show(els, "Could not generate the report. Please try again.");
        return;
    };

    let array = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes.as_slice()).into());
    let options = BlobPropertyBag::new();
    options.set_type("application/pdf");
    let Ok(blob) = Blob::new_with_u8_array_sequence_and_options(&array, &options) else {
        return;
    };
    let Ok(url) = Url::create_object_url_with_blob(&blob) else {
        return;
    };

    let anchor: HtmlAnchorElement = dom::create_element("a").unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(REPORT_FILENAME);
    anchor.click();
    let _ = Url::revoke_object_url(&url);
}

/// Route onward to the purchase/registration flow.
pub fn on_continue(_els: &Elements) {
    let _ = dom::window().location().set_href(REGISTRATION_PATH);
}

/// Fire the post-success side effects: report email dispatch and token
/// consumption. Each runs detached, at most once per completion (the
/// caller gates on `begin_success_effects`). Failures are reported
/// through the side channel (console/toast) and never touch the
/// success UI.
pub fn fire_success_effects(els: &Elements, contact_email: String) {
    // Report email to the user and the operational mailbox.
    {
        let els2 = els.clone();
        let email = contact_email.clone();
        spawn_local(async move {
            let Some(bytes) = build_report() else {
                toast::show(
                    &els2,
                    "We could not email your report. Please download it manually.",
                );
                return;
            };
            let (first, last) = name_parts(&email);
            let recipients = vec![email.clone(), OPS_MAILBOX.to_owned()];
            if let Err(err) =
                api::dispatch_report(&first, &last, rp_report::encode_report(&bytes), recipients)
                    .await
            {
                error!(format!("report dispatch failed: {err}"));
                toast::show(
                    &els2,
                    "We could not email your report. Please download it manually.",
                );
            }
        });
    }

    // Consume the originating authorization token, if one was present.
    if let Some(token) = state::session().auth_token {
        spawn_local(async move {
            match api::consume_token(&token).await {
                Ok(updated) => log!(format!("authorization token consumed: {updated}")),
                Err(err) => warn!(format!("token consumption failed: {err}")),
            }
        });
    }
}
