//! kakeibo-core: ledger types and the keyword category dictionary

pub mod dictionary;
pub mod ledger;

pub use dictionary::{CategoryDictionary, CategoryEntry, UNCATEGORIZED};
pub use ledger::{AggregationResult, CategorizedAmount, LineItem};

/// Assigns spending categories to item names
pub mod categorizer {
    use super::{CategoryDictionary, UNCATEGORIZED};

    /// Categorization result
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CategoryResult<'a> {
        pub category: &'a str,
        /// Keyword that selected the category; `None` for uncategorized
        pub keyword: Option<&'a str>,
    }

    /// Walk the dictionary in declared order and return the first category
    /// with a keyword contained in `item_name`.
    pub fn categorize<'a>(dictionary: &'a CategoryDictionary, item_name: &str) -> CategoryResult<'a> {
        for entry in dictionary.entries() {
            if let Some(keyword) = entry.matching_keyword(item_name) {
                return CategoryResult {
                    category: &entry.label,
                    keyword: Some(keyword),
                };
            }
        }

        CategoryResult {
            category: UNCATEGORIZED,
            keyword: None,
        }
    }

    /// Category label only
    pub fn estimate_category<'a>(dictionary: &'a CategoryDictionary, item_name: &str) -> &'a str {
        categorize(dictionary, item_name).category
    }

}

pub use categorizer::{categorize, estimate_category, CategoryResult};
