//! Receipt aggregator: runs every OCR line through the classifier and books
//! accepted items into per-category totals.

use kakeibo_core::{categorize, AggregationResult, CategoryDictionary, LineItem};
use kakeibo_ingest::{LineClassifier, LineVerdict};
use serde::Serialize;
use tracing::{debug, trace};

/// Verdict for one line, with the category when it was accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub line: String,
    pub verdict: LineVerdict,
    pub category: Option<String>,
    /// Dictionary keyword that picked `category`
    pub keyword: Option<String>,
}

/// Borrowing view over the shared rule set and dictionary
#[derive(Debug, Clone, Copy)]
pub struct ReceiptAggregator<'a> {
    classifier: &'a LineClassifier,
    dictionary: &'a CategoryDictionary,
}

impl<'a> ReceiptAggregator<'a> {
    pub fn new(classifier: &'a LineClassifier, dictionary: &'a CategoryDictionary) -> Self {
        Self {
            classifier,
            dictionary,
        }
    }

    /// Aggregate the OCR text of one receipt.
    ///
    /// Empty text, or text without item lines, yields an empty result.
    pub fn aggregate(&self, text: &str) -> AggregationResult {
        let mut result = AggregationResult::new();
        let mut noise = 0usize;
        let mut unmatched = 0usize;

        for line in text.lines() {
            match self.classifier.classify_line(line) {
                LineVerdict::ItemCandidate { name, raw_price } => {
                    let category = categorize(self.dictionary, &name).category;
                    trace!(item = %name, price = raw_price, category, "booked item");
                    result.record(LineItem::new(name, raw_price, category));
                }
                LineVerdict::Noise { rule } => {
                    trace!(line, rule = %rule, "noise line");
                    noise += 1;
                }
                LineVerdict::Unmatched => {
                    trace!(line, "unmatched line");
                    unmatched += 1;
                }
            }
        }

        debug!(
            items = result.items().len(),
            noise,
            unmatched,
            total = result.total(),
            "aggregated receipt"
        );
        result
    }

    /// Per-line verdicts, for diagnostics
    pub fn explain(&self, text: &str) -> Vec<LineReport> {
        text.lines()
            .map(|line| {
                let verdict = self.classifier.classify_line(line);
                let (category, keyword) = match &verdict {
                    LineVerdict::ItemCandidate { name, .. } => {
                        let hit = categorize(self.dictionary, name);
                        (Some(hit.category.to_string()), hit.keyword.map(str::to_string))
                    }
                    _ => (None, None),
                };
                LineReport {
                    line: line.to_string(),
                    verdict,
                    category,
                    keyword,
                }
            })
            .collect()
    }
}
