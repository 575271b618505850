use std::collections::HashMap;

use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GateResult;

/// The record a verification service recovers from a valid token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedToken {
    /// When the token was minted, in milliseconds since the Unix epoch.
    ///
    /// Accepts integers, fractional numbers and numeric strings, since token
    /// issuers are not consistent about the encoding.
    #[serde(deserialize_with = "lenient_millis")]
    pub time: i64,
    /// Secret embedded in the token; must match the configured shared secret.
    pub token: String,
}

impl VerifiedToken {
    pub fn new(time: i64, token: impl Into<String>) -> Self {
        Self {
            time,
            token: token.into(),
        }
    }
}

/// Read a timestamp that may arrive as an integer, a float or a numeric
/// string. Fractions round up, so a record is never judged staler than it is.
fn lenient_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let millis = match &value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(ceil_millis)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(ceil_millis),
        _ => None,
    };
    millis.ok_or_else(|| de::Error::custom(format!("time is not a number: {value}")))
}

fn ceil_millis(ms: f64) -> Option<i64> {
    ms.is_finite().then(|| ms.ceil() as i64)
}

/// Turns an opaque access token into a [`VerifiedToken`].
///
/// `Ok(None)` means the token is malformed or cannot be verified. `Err` means
/// the verification call itself failed; the gate treats both as a deny.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> GateResult<Option<VerifiedToken>>;
}

/// Verifier backed by a fixed token table.
///
/// Useful for local development and tests where no verification service is
/// available.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, VerifiedToken>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as decrypting to `record`.
    pub fn with_token(mut self, token: impl Into<String>, record: VerifiedToken) -> Self {
        self.tokens.insert(token.into(), record);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> GateResult<Option<VerifiedToken>> {
        Ok(self.tokens.get(token).cloned())
    }
}
