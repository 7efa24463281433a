//! Per-line classification: noise rules first, then the item shape.

use anyhow::Result;

use crate::item::ItemRule;
use crate::rules::NoiseRuleSet;
use crate::types::LineVerdict;

const FULL_WIDTH_SPACE: char = '\u{3000}';

/// Drop full-width spaces (OCR inserts them inside words, e.g. "合　計").
/// Other whitespace is left alone.
pub fn normalize_line(line: &str) -> String {
    line.chars().filter(|&c| c != FULL_WIDTH_SPACE).collect()
}

/// Immutable rule bundle; construct once at start-up.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    noise: NoiseRuleSet,
    item: ItemRule,
}

impl LineClassifier {
    /// Classifier with the built-in receipt rules
    pub fn new() -> Result<Self> {
        Ok(Self::with_rules(NoiseRuleSet::default_rules()?, ItemRule::new()?))
    }

    pub fn with_rules(noise: NoiseRuleSet, item: ItemRule) -> Self {
        Self { noise, item }
    }

    pub fn classify_line(&self, line: &str) -> LineVerdict {
        let line = normalize_line(line);

        if let Some(rule) = self.noise.first_match(&line) {
            return LineVerdict::Noise {
                rule: rule.name.clone(),
            };
        }

        match self.item.extract(&line) {
            Some((name, raw_price)) => LineVerdict::ItemCandidate { name, raw_price },
            None => LineVerdict::Unmatched,
        }
    }
}
