//! Reply formatter: turns an aggregation into chat message bodies.
//!
//! Pure string building; the messaging transport is someone else's problem.

use kakeibo_core::AggregationResult;
use serde::{Deserialize, Serialize};

use crate::outcome::ReceiptOutcome;

pub const NO_ITEMS_MESSAGE: &str = "支出項目が見つかりませんでした。";
pub const NO_TEXT_MESSAGE: &str = "テキストが見つかりませんでした。";
pub const FAILURE_MESSAGE: &str = "画像の解析中にエラーが発生しました。";

const RAW_TEXT_HEADER: &str = "画像から読み取ったテキスト:";
const BREAKDOWN_HEADER: &str = "【支出の内訳】";
const ITEMS_HEADER: &str = "【明細】";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyFormatter {
    /// Send the OCR text back verbatim before the summary
    #[serde(default)]
    pub include_raw_text: bool,
    /// Append one line per booked item under the breakdown
    #[serde(default)]
    pub list_items: bool,
}

impl ReplyFormatter {
    pub fn new(include_raw_text: bool, list_items: bool) -> Self {
        Self {
            include_raw_text,
            list_items,
        }
    }

    /// Summary message, or the single "no items" message for an empty result.
    pub fn format(&self, result: &AggregationResult) -> Vec<String> {
        if result.is_empty() {
            return vec![NO_ITEMS_MESSAGE.to_string()];
        }

        let mut lines = vec![BREAKDOWN_HEADER.to_string()];
        for (category, amount) in result.categorized().iter() {
            lines.push(format!("{category}：{amount}円"));
        }
        lines.push(format!("合計：{}円", result.total()));

        if self.list_items {
            lines.push(String::new());
            lines.push(ITEMS_HEADER.to_string());
            for item in result.items() {
                lines.push(format!("・{} {}円 ({})", item.name, item.price, item.category));
            }
        }

        vec![lines.join("\n")]
    }

    /// Message bodies for a receipt outcome (one or two)
    pub fn render(&self, outcome: &ReceiptOutcome) -> Vec<String> {
        match outcome {
            ReceiptOutcome::NoTextDetected => vec![NO_TEXT_MESSAGE.to_string()],
            ReceiptOutcome::NoItemsFound { .. } => vec![NO_ITEMS_MESSAGE.to_string()],
            ReceiptOutcome::Summary { text, result } => {
                let mut out = Vec::with_capacity(2);
                if self.include_raw_text {
                    out.push(format!("{RAW_TEXT_HEADER}\n{text}"));
                }
                out.extend(self.format(result));
                out
            }
        }
    }

    /// Apology for any failure outside the classifier
    pub fn failure(&self) -> Vec<String> {
        vec![FAILURE_MESSAGE.to_string()]
    }
}
