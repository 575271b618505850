use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::debug;

use crate::error::{GateError, GateResult};
use crate::verifier::{TokenVerifier, VerifiedToken};

/// Endpoint of the public AES decryption tool the tokens are minted against.
pub const DEFAULT_VERIFY_URL: &str = "https://tool.lmeee.com/jiami/crypt128inter";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36 Edg/127.0.0.0";

/// Verifies tokens by asking a remote decryption service to decrypt them.
///
/// The request is a form-encoded POST with fixed AES-128/ECB/PKCS7 parameters
/// and the configured key as password. The service answers
/// `{"d":{"r": <string or falsy>}}`; a truthy `r` is itself a JSON document
/// holding the [`VerifiedToken`].
#[derive(Clone, Debug)]
pub struct RemoteTokenVerifier {
    client: Client,
    url: String,
    key: String,
}

impl RemoteTokenVerifier {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url, key)
    }

    pub fn with_client(client: Client, url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            key: key.into(),
        }
    }

    fn form<'a>(&'a self, token: &'a str) -> [(&'static str, &'a str); 9] {
        [
            ("mode", "ECB"),
            ("padding", "pkcs7"),
            ("block", "128"),
            ("password", self.key.as_str()),
            ("iv", ""),
            ("encode", "hex"),
            ("way", "2"),
            ("text", token),
            ("method", "aes"),
        ]
    }
}

#[async_trait]
impl TokenVerifier for RemoteTokenVerifier {
    async fn verify(&self, token: &str) -> GateResult<Option<VerifiedToken>> {
        let response = self
            .client
            .post(&self.url)
            .header(header::USER_AGENT, USER_AGENT)
            .form(&self.form(token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GateError::Verification(format!(
                "verification service returned {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        let decoded = decode_response(&body)?;
        debug!(verified = decoded.is_some(), "token verification response");
        Ok(decoded)
    }
}

/// Decode the service's `{"d":{"r": ...}}` envelope.
pub fn decode_response(body: &[u8]) -> GateResult<Option<VerifiedToken>> {
    let envelope: Value = serde_json::from_slice(body)?;
    let data = envelope
        .get("d")
        .filter(|d| d.is_object())
        .ok_or_else(|| GateError::MalformedResponse("missing `d` object".into()))?;

    match data.get("r") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::String(s)) => Ok(Some(serde_json::from_str(s)?)),
        Some(other) => Err(GateError::MalformedResponse(format!(
            "`r` is not a string: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{routing::post, Form, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    #[test]
    fn decode_valid_record() {
        let body = json!({"d": {"r": "{\"time\": 1234, \"token\": \"abc\"}"}}).to_string();
        let record = decode_response(body.as_bytes()).unwrap().unwrap();
        assert_eq!(record, VerifiedToken::new(1234, "abc"));
    }

    #[test]
    fn decode_falsy_r_is_none() {
        for r in [json!(null), json!(false), json!(""), json!(0)] {
            let body = json!({"d": {"r": r}}).to_string();
            assert!(decode_response(body.as_bytes()).unwrap().is_none(), "r = {r}");
        }
        let body = json!({"d": {}}).to_string();
        assert!(decode_response(body.as_bytes()).unwrap().is_none());
    }

    #[test]
    fn decode_malformed_envelopes() {
        assert!(decode_response(b"not json").is_err());
        assert!(decode_response(br#"{"e": 1}"#).is_err());
        assert!(decode_response(br#"{"d": {"r": {"time": 1}}}"#).is_err());
        // `r` decrypts to something that is not a token record.
        assert!(decode_response(br#"{"d": {"r": "garbage"}}"#).is_err());
    }

    async fn spawn_stub(handler: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, handler).await.unwrap();
        });
        format!("http://{addr}/verify")
    }

    #[tokio::test]
    async fn remote_round_trip_sends_fixed_form() {
        let app = Router::new().route(
            "/verify",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                let ok = form.get("mode").map(String::as_str) == Some("ECB")
                    && form.get("method").map(String::as_str) == Some("aes")
                    && form.get("way").map(String::as_str) == Some("2")
                    && form.get("password").map(String::as_str) == Some("k3y");
                let r = if ok && form.get("text").map(String::as_str) == Some("cipher") {
                    json!({"time": 42, "token": "secret"}).to_string()
                } else {
                    String::new()
                };
                Json(json!({"d": {"r": r}}))
            }),
        );
        let url = spawn_stub(app).await;
        let verifier = RemoteTokenVerifier::new(url, "k3y");

        let record = verifier.verify("cipher").await.unwrap().unwrap();
        assert_eq!(record, VerifiedToken::new(42, "secret"));
        assert!(verifier.verify("wrong").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remote_error_status_is_error() {
        let app = Router::new().route(
            "/verify",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "down") }),
        );
        let url = spawn_stub(app).await;
        let verifier = RemoteTokenVerifier::new(url, "k");
        assert!(matches!(
            verifier.verify("t").await,
            Err(GateError::Verification(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_error() {
        let verifier = RemoteTokenVerifier::new("http://127.0.0.1:1/verify", "k");
        assert!(verifier.verify("t").await.is_err());
    }
}
