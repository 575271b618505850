/// Errors that can occur while verifying an access token.
///
/// None of these reach a caller as-is: the gate turns every error into a
/// deny decision.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The verification service could not be reached or returned an error status.
    #[error("verification request failed: {0}")]
    Verification(String),

    /// The verification service answered with a body we cannot interpret.
    #[error("malformed verification response: {0}")]
    MalformedResponse(String),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GateError {
    fn from(err: reqwest::Error) -> Self {
        Self::Verification(err.to_string())
    }
}

impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

pub type GateResult<T> = Result<T, GateError>;
