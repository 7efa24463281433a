use serde::{Deserialize, Serialize};

/// Outcome of classifying one OCR line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "kebab-case")]
pub enum LineVerdict {
    /// Rejected by the named noise rule (totals, addresses, dates, ...)
    Noise { rule: String },
    /// Looks like "<name> <price>円"
    ItemCandidate { name: String, raw_price: u32 },
    /// Did not fit the item-line shape, or the price was out of range
    Unmatched,
}

impl LineVerdict {
    pub fn is_item(&self) -> bool {
        matches!(self, LineVerdict::ItemCandidate { .. })
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, LineVerdict::Noise { .. })
    }
}
