//! Ledger types produced by receipt aggregation.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// One accepted item line, already categorized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    /// Trimmed item name as read from the receipt
    pub name: String,
    /// Price in whole yen
    pub price: u32,
    /// Category label assigned by the estimator
    pub category: String,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: u32, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            category: category.into(),
        }
    }
}

/// Per-category totals in first-encounter order.
///
/// Backed by a `Vec` because receipts touch a handful of categories and the
/// order in which they were first seen is part of the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedAmount {
    entries: Vec<(String, u64)>,
}

impl CategorizedAmount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `category`, appending the category if it is new.
    fn add(&mut self, category: &str, amount: u64) {
        match self.entries.iter_mut().find(|(label, _)| label == category) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((category.to_string(), amount)),
        }
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(label, total)| (label.as_str(), *total))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sum(&self) -> u64 {
        self.entries.iter().map(|(_, total)| total).sum()
    }
}

impl Serialize for CategorizedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, total) in &self.entries {
            map.serialize_entry(label, total)?;
        }
        map.end()
    }
}

/// Spending summary for a single receipt.
///
/// Fields are private: `record` is the only mutation, so `total` always
/// equals the sum of the categorized amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    categorized: CategorizedAmount,
    total: u64,
    items: Vec<LineItem>,
}

impl AggregationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book one item into its category and the grand total.
    pub fn record(&mut self, item: LineItem) {
        let amount = u64::from(item.price);
        self.categorized.add(&item.category, amount);
        self.total += amount;
        self.items.push(item);
    }

    pub fn categorized(&self) -> &CategorizedAmount {
        &self.categorized
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Accepted items in receipt order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// True when no item line was accepted
    pub fn is_empty(&self) -> bool {
        self.categorized.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_first_seen_order() {
        let mut result = AggregationResult::new();
        result.record(LineItem::new("洗剤", 298, "日用品"));
        result.record(LineItem::new("パン", 130, "食費"));
        result.record(LineItem::new("ティッシュ", 198, "日用品"));

        let labels: Vec<_> = result.categorized().iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["日用品", "食費"]);
        assert_eq!(result.categorized().get("日用品"), Some(496));
        assert_eq!(result.categorized().get("食費"), Some(130));
        assert_eq!(result.items().len(), 3);
    }

    #[test]
    fn test_total_matches_category_sum() {
        let mut result = AggregationResult::new();
        for (i, price) in [120u32, 980, 45, 100000].iter().enumerate() {
            let cat = if i % 2 == 0 { "食費" } else { "uncategorized" };
            result.record(LineItem::new(format!("item{i}"), *price, cat));
            assert_eq!(result.total(), result.categorized().sum());
        }
        assert_eq!(result.total(), 101145);
    }

    #[test]
    fn test_empty_result() {
        let result = AggregationResult::new();
        assert!(result.is_empty());
        assert_eq!(result.total(), 0);
        assert_eq!(result.categorized().len(), 0);
    }

    #[test]
    fn test_serializes_categories_in_order() {
        let mut result = AggregationResult::new();
        result.record(LineItem::new("目薬", 880, "医療費"));
        result.record(LineItem::new("コーヒー", 250, "食費"));

        let json = serde_json::to_string(&result).unwrap();
        let med = json.find("医療費").unwrap();
        let food = json.find("食費").unwrap();
        assert!(med < food, "category order lost in {json}");
        assert!(json.contains("\"total\":1130"));
    }
}
