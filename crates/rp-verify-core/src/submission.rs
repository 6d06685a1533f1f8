use anyhow::Result;
use async_trait::async_trait;
use rp_api_types::{ScoringResponse, VerificationRecord};
use tracing::warn;

/// Remote scoring endpoint. One call bundles both captures; the
/// transport implementation lives with the frontend (browser fetch).
#[async_trait(?Send)]
pub trait ScoreClient {
    async fn score(&self, id_image: &str, selfie_image: &str) -> Result<ScoringResponse>;
}

/// Collapse a submission outcome into the terminal verdict. A scorer
/// rejection and a failed call are deliberately indistinguishable here:
/// both land in the same failed-verification terminal.
// TODO: a distinct transient-error terminal would need its own UI copy
// and a retry affordance; revisit if product splits the messaging.
pub fn settle_submission(outcome: Result<ScoringResponse>) -> (bool, Vec<VerificationRecord>) {
    match outcome {
        Ok(response) => (
            response.is_verified,
            response.verification_data.aditional_data,
        ),
        Err(err) => {
            warn!("scoring call failed: {err:#}");
            (false, Vec::new())
        }
    }
}
