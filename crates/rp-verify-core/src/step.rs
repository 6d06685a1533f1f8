/// Wizard position. The only ways to obtain a different step are
/// `advance`, `retreat`, and the controller's `complete`/`restart`, so
/// illegal jumps (1 → 4) cannot be expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WizardStep {
    #[default]
    IdCapture,
    Selfie,
    Submit,
    Result,
}

impl WizardStep {
    pub fn index(self) -> u8 {
        match self {
            WizardStep::IdCapture => 1,
            WizardStep::Selfie => 2,
            WizardStep::Submit => 3,
            WizardStep::Result => 4,
        }
    }

    /// Parse a persisted step index. Anything absent or unparsable falls
    /// back to the first step, which doubles as the migration story for
    /// values written by older builds.
    pub fn from_persisted(raw: Option<&str>) -> WizardStep {
        match raw.map(str::trim).and_then(|s| s.parse::<u8>().ok()) {
            Some(2) => WizardStep::Selfie,
            Some(3) => WizardStep::Submit,
            Some(4) => WizardStep::Result,
            _ => WizardStep::IdCapture,
        }
    }

    /// Forward transition driven by the step's own "Continue" action.
    /// Submit does not advance this way (the submission outcome drives
    /// it) and Result is terminal.
    pub fn advance(self) -> WizardStep {
        match self {
            WizardStep::IdCapture => WizardStep::Selfie,
            WizardStep::Selfie => WizardStep::Submit,
            WizardStep::Submit => WizardStep::Submit,
            WizardStep::Result => WizardStep::Result,
        }
    }

    pub fn retreat(self) -> WizardStep {
        match self {
            WizardStep::IdCapture => WizardStep::IdCapture,
            WizardStep::Selfie => WizardStep::IdCapture,
            WizardStep::Submit => WizardStep::Selfie,
            WizardStep::Result => WizardStep::Result,
        }
    }
}
