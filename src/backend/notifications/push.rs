/**
 * Push Delivery
 *
 * `PushSender` abstracts the mobile push service. Two implementations:
 *
 * - `LogPushSender` - logs the message; used when no endpoint is configured
 * - `HttpPushSender` - POSTs an FCM-style legacy payload with `reqwest`
 */

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A push message addressed to one device token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push service returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError>;
}

/// Logs pushes instead of sending them
#[derive(Debug, Clone, Default)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        tracing::info!(
            title = %message.title,
            kind = message.data.get("type").map(String::as_str).unwrap_or(""),
            "Push notification (not sent, no push endpoint configured)"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct WireNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    to: &'a str,
    notification: WireNotification<'a>,
    data: &'a BTreeMap<String, String>,
}

/// Sends pushes to an FCM-compatible HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpPushSender {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl HttpPushSender {
    pub fn new(endpoint: impl Into<String>, server_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            server_key: server_key.into(),
        }
    }
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        let payload = WireMessage {
            to: &message.token,
            notification: WireNotification {
                title: &message.title,
                body: &message.body,
            },
            data: &message.data,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> PushMessage {
        let mut data = BTreeMap::new();
        data.insert("type".to_string(), "swap_proposed".to_string());
        PushMessage {
            token: "device-1".into(),
            title: "New Swap Offer".into(),
            body: "Someone wants your Bike".into(),
            data,
        }
    }

    #[tokio::test]
    async fn test_http_sender_posts_legacy_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fcm/send"))
            .and(header("authorization", "key=server-key"))
            .and(body_partial_json(serde_json::json!({
                "to": "device-1",
                "notification": { "title": "New Swap Offer" },
                "data": { "type": "swap_proposed" }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sender = HttpPushSender::new(format!("{}/fcm/send", server.uri()), "server-key");
        sender.send(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_sender_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let sender = HttpPushSender::new(server.uri(), "wrong");
        let err = sender.send(&message()).await.unwrap_err();
        match err {
            PushError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
