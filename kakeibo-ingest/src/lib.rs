//! kakeibo-ingest: line-level heuristics that turn noisy OCR receipt text into
//! item candidates (noise rules, item-shape rule, line classifier).

pub mod types;
pub mod rules;
pub mod item;
pub mod classifier;

pub use types::LineVerdict;
pub use rules::{Matcher, NoiseRule, NoiseRuleSet};
pub use item::{ItemRule, MAX_PRICE, MIN_PRICE};
pub use classifier::{LineClassifier, normalize_line};
