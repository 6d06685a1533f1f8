//! Step orchestration: panel visibility, next/back/submit/restart.
//!
//! The controller in `rp-verify-core` owns all cross-step state; this
//! module only reflects it into the DOM and feeds user actions back in.

use crate::api::FetchScoreClient;
use crate::camera;
use crate::capture;
use crate::dom::{self, Elements};
use crate::email_gate;
use crate::result_step;
use crate::state;
use rp_verify_core::{settle_submission, ScoreClient, WizardStep};

/// Re-render the whole wizard from controller state. Any step change
/// exits camera mode first so the stream can never outlive its step.
pub fn render(els: &Elements) {
    camera::close(els);

    let Some(step) = state::with_controller(|c| c.step()) else {
        return;
    };

    dom::show(&els.wizard_panel);
    dom::set_text(
        &els.step_indicator,
        &format!("Step {} of 4", step.index()),
    );

    for (panel, active) in [
        (&els.id_panel, step == WizardStep::IdCapture),
        (&els.selfie_panel, step == WizardStep::Selfie),
        (&els.submit_panel, step == WizardStep::Submit),
        (&els.result_panel, step == WizardStep::Result),
    ] {
        if active {
            dom::show(panel);
        } else {
            dom::hide(panel);
        }
    }

    capture::render_captures(els);
    if step == WizardStep::Result {
        result_step::render(els);
    }
}

pub fn on_next(els: &Elements) {
    // The active step only offers Continue once its photo exists, but
    // guard anyway: an incomplete step never advances.
    let ready = state::with_controller(|c| match c.step() {
        WizardStep::IdCapture => c.state().id_photo.is_some(),
        WizardStep::Selfie => c.state().selfie_photo.is_some(),
        _ => false,
    })
    .unwrap_or(false);
    if !ready {
        return;
    }

    let _ = state::with_controller(|c| c.next());
    render(els);
}

pub fn on_back(els: &Elements) {
    let _ = state::with_controller(|c| c.back());
    render(els);
}

/// Submit both captures for scoring. One request per click; the button
/// is disabled while a request is outstanding. Every failure mode lands
/// in the same failed-verification terminal as a scorer rejection.
pub async fn on_submit(els: &Elements) {
    if state::session().submitting {
        return;
    }

    let Some((id_photo, selfie_photo)) = state::with_controller(|c| {
        (c.state().id_photo.clone(), c.state().selfie_photo.clone())
    }) else {
        return;
    };
    let (Some(id_photo), Some(selfie_photo)) = (id_photo, selfie_photo) else {
        dom::set_text(&els.submit_status, "Both photos are required.");
        return;
    };

    state::set_submitting(true);
    els.submit_btn.set_disabled(true);
    dom::set_text(&els.submit_status, "Verifying your identity…");

    let outcome = FetchScoreClient.score(&id_photo, &selfie_photo).await;
    let (verified, records) = settle_submission(outcome);

    // Success wipes persisted traces, so snapshot the email first for
    // the report side effects.
    let contact_email = state::session().contact_email.unwrap_or_default();

    let fire_effects = match state::take_controller() {
        Some(mut controller) => {
            controller.complete(verified, records).await;
            let fire = controller.begin_success_effects();
            state::restore_controller(controller);
            fire
        }
        None => false,
    };

    state::set_submitting(false);
    els.submit_btn.set_disabled(false);
    dom::set_text(&els.submit_status, "");
    render(els);

    if fire_effects {
        result_step::fire_success_effects(els, contact_email);
    }
}

/// Start over: reset the controller, wipe persisted traces, and show
/// the email gate again.
pub async fn on_restart(els: &Elements) {
    camera::close(els);

    if let Some(mut controller) = state::take_controller() {
        controller.restart().await;
        state::restore_controller(controller);
    }
    state::set_contact_email(None);

    dom::hide(&els.wizard_panel);
    els.email_input.set_value("");
    els.terms_checkbox.set_checked(false);
    if !email_gate::restore(els) {
        // Gate is showing again; nothing else to render until satisfied.
        return;
    }
    render(els);
}
