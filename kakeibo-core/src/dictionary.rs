//! Category dictionary: the only place that knows which keywords belong to
//! which spending category.
//!
//! Entries are ordered. When an item name contains keywords from several
//! categories, the entry declared first wins.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Label returned when no keyword matches
pub const UNCATEGORIZED: &str = "uncategorized";

/// A category label and the substrings that select it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryEntry {
    pub fn new(label: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            label: label.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// First keyword contained in `item_name`, if any (case-sensitive)
    pub fn matching_keyword(&self, item_name: &str) -> Option<&str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .find(|kw| item_name.contains(kw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDictionary {
    entries: Vec<CategoryEntry>,
}

impl CategoryDictionary {
    /// Build a dictionary from ordered entries.
    ///
    /// Rejects blank labels, blank keywords and duplicate labels: an empty
    /// keyword would match every item name.
    pub fn new(entries: Vec<CategoryEntry>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entry.label.trim().is_empty() {
                bail!("category #{} has an empty label", i + 1);
            }
            if entry.keywords.iter().any(|k| k.is_empty()) {
                bail!("category {:?} has an empty keyword", entry.label);
            }
            if entries[..i].iter().any(|e| e.label == entry.label) {
                bail!("category {:?} is declared twice", entry.label);
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CategoryDictionary {
    fn default() -> Self {
        // Order is significant: 日用品 precedes 医療費 so that 薬用石鹸 is
        // booked as a household item.
        Self {
            entries: vec![
                CategoryEntry::new(
                    "食費",
                    &[
                        "コーヒー", "珈琲", "パン", "牛乳", "弁当", "おにぎり", "サンド",
                        "野菜", "果物", "バナナ", "りんご", "トマト", "キャベツ", "玉ねぎ",
                        "卵", "たまご", "豆腐", "納豆", "ヨーグルト", "チーズ", "米",
                        "肉", "鶏", "豚", "魚", "刺身", "惣菜", "サラダ", "ラーメン",
                        "うどん", "そば", "パスタ", "菓子", "チョコ", "アイス", "お茶",
                        "緑茶", "ジュース", "天然水", "ミネラルウォーター", "ビール", "酒",
                    ],
                ),
                CategoryEntry::new(
                    "日用品",
                    &[
                        "ティッシュ", "トイレット", "洗剤", "柔軟剤", "シャンプー",
                        "リンス", "石鹸", "せっけん", "歯ブラシ", "歯磨", "ゴミ袋",
                        "ラップ", "ホイル", "スポンジ", "電池", "タオル", "マスク",
                    ],
                ),
                CategoryEntry::new(
                    "医療費",
                    &[
                        "薬", "錠", "目薬", "湿布", "絆創膏", "診察", "処方", "胃腸",
                        "かぜ", "風邪", "ビタミン",
                    ],
                ),
                CategoryEntry::new(
                    "衣服",
                    &["シャツ", "靴下", "下着", "ズボン", "スカート", "靴", "帽子"],
                ),
                CategoryEntry::new(
                    "交通費",
                    &["乗車券", "切符", "定期", "ガソリン", "駐車", "タクシー", "バス"],
                ),
                CategoryEntry::new(
                    "娯楽",
                    &["書籍", "文庫", "雑誌", "映画", "ゲーム", "チケット"],
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dictionary_is_valid() {
        let dict = CategoryDictionary::default();
        let rebuilt = CategoryDictionary::new(dict.entries().to_vec()).unwrap();
        assert_eq!(rebuilt, dict);
        assert_eq!(dict.entries()[0].label, "食費");
    }

    #[test]
    fn test_rejects_empty_keyword() {
        let err = CategoryDictionary::new(vec![CategoryEntry::new("食費", &["パン", ""])])
            .unwrap_err();
        assert!(err.to_string().contains("empty keyword"));
    }

    #[test]
    fn test_rejects_duplicate_label() {
        let res = CategoryDictionary::new(vec![
            CategoryEntry::new("食費", &["パン"]),
            CategoryEntry::new("食費", &["米"]),
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_matching_keyword_is_case_sensitive() {
        let entry = CategoryEntry::new("娯楽", &["DVD"]);
        assert_eq!(entry.matching_keyword("映画DVD"), Some("DVD"));
        assert_eq!(entry.matching_keyword("映画dvd"), None);
    }
}
