//! Seams to the outside world: the OCR service and the chat platform.
//!
//! The receipt pipeline only talks to these traits, so tests can swap in
//! in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("image fetch failed: {0}")]
    Fetch(String),

    #[error("OCR request failed: {0}")]
    Ocr(String),

    #[error("OCR response malformed: {0}")]
    OcrResponse(String),

    #[error("reply failed: {0}")]
    Reply(String),
}

/// Extracts text from an image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// `Ok(None)` when the image contains no text. No retries.
    async fn recognize(&self, image: &[u8]) -> Result<Option<String>, CollaboratorError>;
}

/// Downloads inbound images and sends replies.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Complete image bytes for a message; never a partial buffer.
    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, CollaboratorError>;

    async fn reply(&self, reply_token: &str, bodies: &[String]) -> Result<(), CollaboratorError>;
}
