use crate::stage::{AccessContext, AccessStage, StageDecision};
use crate::verifier::VerifiedToken;

/// Shared-secret stage: the verified token must carry the configured secret
/// byte for byte.
pub struct SecretStage;

impl AccessStage for SecretStage {
    fn name(&self) -> &str {
        "secret"
    }

    fn evaluate(&self, token: &VerifiedToken, context: &AccessContext<'_>) -> StageDecision {
        if token.token != context.config.shared_secret {
            return StageDecision::fail("token secret mismatch");
        }
        StageDecision::Pass
    }
}
