//! Receipt pipeline: image event -> bytes -> OCR text -> ledger -> reply.
//!
//! Every image event ends in exactly one reply call; collaborator failures
//! become the apology message and never reach the classifier.

use std::sync::Arc;

use anyhow::Result;
use kakeibo_core::CategoryDictionary;
use kakeibo_finance::{ReceiptAggregator, ReceiptOutcome, ReplyFormatter};
use kakeibo_ingest::LineClassifier;
use tracing::{error, info, instrument, warn};

use crate::collaborators::{CollaboratorError, Messenger, OcrEngine};
use crate::line::{Inbound, WebhookEvent};

pub struct ReceiptService {
    classifier: LineClassifier,
    dictionary: CategoryDictionary,
    formatter: ReplyFormatter,
    ocr: Arc<dyn OcrEngine>,
    messenger: Arc<dyn Messenger>,
}

impl ReceiptService {
    pub fn new(
        classifier: LineClassifier,
        dictionary: CategoryDictionary,
        formatter: ReplyFormatter,
        ocr: Arc<dyn OcrEngine>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            classifier,
            dictionary,
            formatter,
            ocr,
            messenger,
        }
    }

    /// Handle one webhook event; returns how many message bodies were sent.
    pub async fn handle_event(&self, event: &WebhookEvent) -> Result<usize> {
        match event.inbound() {
            Inbound::Image {
                message_id,
                reply_token,
            } => {
                let bodies = self.receipt_reply(&message_id).await;
                self.messenger.reply(&reply_token, &bodies).await?;
                Ok(bodies.len())
            }
            Inbound::Ignored => {
                info!(event_type = %event.event_type, "ignoring non-image event");
                Ok(0)
            }
        }
    }

    /// Reply bodies for an image message. Infallible: errors turn into the
    /// apology text.
    #[instrument(skip(self))]
    pub async fn receipt_reply(&self, message_id: &str) -> Vec<String> {
        let text = match self.read_receipt(message_id).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "receipt processing failed");
                return self.formatter.failure();
            }
        };

        let outcome = self.evaluate(text.as_deref());
        info!(outcome = outcome.label(), "receipt evaluated");
        self.formatter.render(&outcome)
    }

    /// Classifier half of the pipeline, shared with `kakeibo classify`
    pub fn evaluate(&self, ocr_text: Option<&str>) -> ReceiptOutcome {
        let aggregator = ReceiptAggregator::new(&self.classifier, &self.dictionary);
        ReceiptOutcome::evaluate(&aggregator, ocr_text)
    }

    async fn read_receipt(&self, message_id: &str) -> Result<Option<String>, CollaboratorError> {
        let image = self.messenger.fetch_content(message_id).await?;
        let text = self.ocr.recognize(&image).await?;
        if text.is_none() {
            warn!("no text detected in image");
        }
        Ok(text)
    }
}
