//! One-time contact email collection in front of the wizard.
//!
//! Bypassed entirely when a persisted address exists; otherwise the
//! wizard stays hidden until a valid address and accepted terms are
//! submitted. Validation is purely client-side.

use crate::dom::{self, Elements};
use crate::state::{self, LocalProgressStore};
use crate::wizard;
use rp_verify_core::email;

/// Decide on mount whether the gate renders. Returns `true` when the
/// gate is already satisfied by a persisted address.
pub fn restore(els: &Elements) -> bool {
    match email::remembered_email(&LocalProgressStore) {
        Some(address) => {
            state::set_contact_email(Some(address));
            dom::hide(&els.gate_panel);
            true
        }
        None => {
            dom::show(&els.gate_panel);
            dom::hide(&els.wizard_panel);
            false
        }
    }
}

pub fn on_submit(els: &Elements) {
    let address = dom::get_input_value(&els.email_input);

    if !els.terms_checkbox.checked() {
        dom::set_text(&els.email_error, "Please accept the terms to continue.");
        return;
    }
    if !email::remember_email(&LocalProgressStore, &address) {
        dom::set_text(&els.email_error, "Enter a valid email address.");
        return;
    }

    dom::set_text(&els.email_error, "");
    state::set_contact_email(Some(address.trim().to_owned()));
    dom::hide(&els.gate_panel);
    wizard::render(els);
}
