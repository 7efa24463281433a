//! What a processed receipt amounts to, before it is worded as a reply.
//!
//! "No text" and "no items" are ordinary outcomes, not errors.

use kakeibo_core::AggregationResult;

use crate::aggregator::ReceiptAggregator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// OCR returned nothing (or only whitespace)
    NoTextDetected,
    /// Text was present but no line looked like a purchase
    NoItemsFound { text: String },
    /// At least one item was booked
    Summary {
        text: String,
        result: AggregationResult,
    },
}

impl ReceiptOutcome {
    /// Evaluate OCR output. `None` means the OCR service found no text.
    pub fn evaluate(aggregator: &ReceiptAggregator<'_>, ocr_text: Option<&str>) -> Self {
        let text = match ocr_text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return ReceiptOutcome::NoTextDetected,
        };

        let result = aggregator.aggregate(text);
        if result.is_empty() {
            ReceiptOutcome::NoItemsFound {
                text: text.to_string(),
            }
        } else {
            ReceiptOutcome::Summary {
                text: text.to_string(),
                result,
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReceiptOutcome::NoTextDetected => "no-text",
            ReceiptOutcome::NoItemsFound { .. } => "no-items",
            ReceiptOutcome::Summary { .. } => "summary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kakeibo_core::CategoryDictionary;
    use kakeibo_ingest::LineClassifier;

    fn evaluate(text: Option<&str>) -> ReceiptOutcome {
        let classifier = LineClassifier::new().unwrap();
        let dictionary = CategoryDictionary::default();
        let agg = ReceiptAggregator::new(&classifier, &dictionary);
        ReceiptOutcome::evaluate(&agg, text)
    }

    #[test]
    fn test_no_text() {
        assert_eq!(evaluate(None), ReceiptOutcome::NoTextDetected);
        assert_eq!(evaluate(Some("  \n ")), ReceiptOutcome::NoTextDetected);
    }

    #[test]
    fn test_no_items() {
        let outcome = evaluate(Some("合計 380円"));
        assert_eq!(outcome.label(), "no-items");
    }

    #[test]
    fn test_summary() {
        match evaluate(Some("パン 130円")) {
            ReceiptOutcome::Summary { text, result } => {
                assert_eq!(text, "パン 130円");
                assert_eq!(result.total(), 130);
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }
}
