//! Identity-verification wizard core: step state machine, controller,
//! email gate rules, and submission settlement. Platform-neutral; the
//! browser frontend plugs in its own `ProgressStore` / `PhotoCache`.

pub mod controller;
pub mod email;
pub mod step;
pub mod submission;

pub use controller::{PhotoSlot, StepController, WizardState, EMAIL_KEY, STEP_KEY};
pub use step::WizardStep;
pub use submission::{settle_submission, ScoreClient};
