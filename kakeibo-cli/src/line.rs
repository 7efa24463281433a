//! LINE Messaging API: webhook payload types, signature check, content
//! download and Reply API.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::StreamExt;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, instrument};

use crate::collaborators::{CollaboratorError, Messenger};
use crate::config::LineSection;

/// Reply API accepts at most five messages per call
pub const MAX_REPLY_MESSAGES: usize = 5;
/// Per text message limit, in characters
pub const MAX_TEXT_CHARS: usize = 5000;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "replyToken")]
    pub reply_token: Option<String>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// What the pipeline needs from an inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Image {
        message_id: String,
        reply_token: String,
    },
    /// Text, stickers, follows, redeliveries without a token, ...
    Ignored,
}

impl WebhookEvent {
    pub fn inbound(&self) -> Inbound {
        match (self.event_type.as_str(), &self.message, &self.reply_token) {
            ("message", Some(msg), Some(token)) if msg.kind == "image" => Inbound::Image {
                message_id: msg.id.clone(),
                reply_token: token.clone(),
            },
            _ => Inbound::Ignored,
        }
    }
}

/// `x-line-signature` is base64(HMAC-SHA256(channel secret, raw body)).
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Truncate to the platform's per-message limit.
pub fn clip_text(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub struct LineClient {
    http: reqwest::Client,
    api_base: String,
    data_api_base: String,
    access_token: String,
}

impl LineClient {
    pub fn new(section: &LineSection, access_token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs))
            .build()
            .context("build LINE HTTP client")?;
        Ok(Self {
            http,
            api_base: section.api_base.trim_end_matches('/').to_string(),
            data_api_base: section.data_api_base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }
}

#[async_trait]
impl Messenger for LineClient {
    #[instrument(skip(self))]
    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, CollaboratorError> {
        let resp = self
            .http
            .get(format!("{}/v2/bot/message/{}/content", self.data_api_base, message_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| CollaboratorError::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::Fetch(format!("{status} {txt}")));
        }

        // Collect the whole body before anyone looks at it
        let mut buf = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CollaboratorError::Fetch(format!("stream chunk: {e}")))?;
            buf.extend_from_slice(&chunk);
        }

        if buf.is_empty() {
            return Err(CollaboratorError::Fetch("empty image body".to_string()));
        }
        debug!(bytes = buf.len(), "image downloaded");
        Ok(buf)
    }

    #[instrument(skip(self, bodies), fields(messages = bodies.len()))]
    async fn reply(&self, reply_token: &str, bodies: &[String]) -> Result<(), CollaboratorError> {
        let messages: Vec<_> = bodies
            .iter()
            .take(MAX_REPLY_MESSAGES)
            .map(|b| serde_json::json!({ "type": "text", "text": clip_text(b) }))
            .collect();

        let resp = self
            .http
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({
                "replyToken": reply_token,
                "messages": messages,
            }))
            .send()
            .await
            .map_err(|e| CollaboratorError::Reply(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::Reply(format!("{status} {txt}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_signature_roundtrip() {
        let body = br#"{"destination":"U1","events":[]}"#;
        let sig = sign("s3cret", body);
        assert!(verify_signature("s3cret", body, &sig));
    }

    #[test]
    fn test_signature_rejects_tampering() {
        let body = br#"{"events":[]}"#;
        let sig = sign("s3cret", body);
        assert!(!verify_signature("s3cret", br#"{"events":[{}]}"#, &sig));
        assert!(!verify_signature("other", body, &sig));
        assert!(!verify_signature("s3cret", body, "not base64!!"));
        assert!(!verify_signature("s3cret", body, ""));
    }

    #[test]
    fn test_image_event_is_inbound_image() {
        let payload: WebhookPayload = serde_json::from_str(
            r#"{"destination":"Uxxx","events":[
                {"type":"message","replyToken":"rt-1","mode":"active",
                 "message":{"type":"image","id":"4711","contentProvider":{"type":"line"}}},
                {"type":"message","replyToken":"rt-2","message":{"type":"text","id":"4712","text":"hi"}},
                {"type":"follow","replyToken":"rt-3"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            payload.events[0].inbound(),
            Inbound::Image {
                message_id: "4711".to_string(),
                reply_token: "rt-1".to_string()
            }
        );
        assert_eq!(payload.events[1].inbound(), Inbound::Ignored);
        assert_eq!(payload.events[2].inbound(), Inbound::Ignored);
    }

    #[test]
    fn test_image_without_reply_token_is_ignored() {
        let ev: WebhookEvent = serde_json::from_str(
            r#"{"type":"message","message":{"type":"image","id":"1"}}"#,
        )
        .unwrap();
        assert_eq!(ev.inbound(), Inbound::Ignored);
    }

    #[test]
    fn test_clip_text() {
        assert_eq!(clip_text("合計：380円"), "合計：380円");
        let long = "円".repeat(MAX_TEXT_CHARS + 10);
        assert_eq!(clip_text(&long).chars().count(), MAX_TEXT_CHARS);
    }
}
