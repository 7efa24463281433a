//! Noise rules: lines that carry digits but are not purchases.
//!
//! Each rule is a named matcher. The set is evaluated in order and the first
//! match wins, so the reported rule name is stable for a given line.

use anyhow::{Context, Result};
use regex::Regex;

/// Accounting markers and receipt boilerplate (exact substrings)
const ACCOUNTING_KEYWORDS: &[&str] = &[
    // totals
    "小計", "合計", "総計", "小 計", "合 計", "対象計", "TOTAL", "SUBTOTAL",
    // tendered / change
    "お預り", "お預かり", "預り金", "預かり", "お釣り", "お釣", "おつり", "釣銭",
    "CHANGE", "CASH",
    // payment method
    "現金", "クレジット", "カード", "電子マネー", "QR決済", "VISA",
    // tax
    "内税", "外税", "税込", "税抜", "消費税", "課税", "非課税", "TAX",
    // discounts, points, counts
    "値引", "割引", "ポイント", "買上点数", "点数",
    // boilerplate
    "領収", "レシート", "ありがとう", "またのご来店", "登録番号",
];

const ADDRESS_PATTERN: &str = concat!(
    r"(?:東京都|北海道|大阪府|京都府|\p{Han}{2,3}県)\p{Han}{1,6}[市区町村郡]",
    r"|\p{Han}{1,4}[市区町村]\p{Han}*[0-9０-９]",
    r"|丁目|番地|〒|住所",
);

const PHONE_PATTERN: &str = concat!(
    r"[0-9０-９]{2,4}[-−‐－][0-9０-９]{2,4}[-−‐－][0-9０-９]{3,4}",
    r"|(?:TEL|Tel|ＴＥＬ|電話)[:：.\s]*[0-9０-９(（]",
);

const DATE_PATTERN: &str = concat!(
    r"[0-9０-９]{4}\s*[/年.\-]\s*[0-9０-９]{1,2}\s*[/月.\-]\s*[0-9０-９]{1,2}",
    r"|(?:令和|平成)\s*[0-9０-９元]{1,2}\s*年",
);

const CLOCK_PATTERN: &str = r"[0-9０-９]{1,2}[:：][0-9０-９]{2}";

const BARE_NUMBER_PATTERN: &str = r"^\s*[0-9]{2,5}\s*$";

/// How a rule recognises a line
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Any keyword is a substring of the line
    Keywords(Vec<String>),
    /// Regex finds a match anywhere in the line
    Pattern(Regex),
}

impl Matcher {
    pub fn keywords(words: &[&str]) -> Self {
        Matcher::Keywords(words.iter().map(|w| w.to_string()).collect())
    }

    pub fn pattern(re: &str) -> Result<Self> {
        let compiled = Regex::new(re).with_context(|| format!("compile pattern {re:?}"))?;
        Ok(Matcher::Pattern(compiled))
    }

    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Matcher::Keywords(words) => words.iter().any(|w| line.contains(w.as_str())),
            Matcher::Pattern(re) => re.is_match(line),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoiseRule {
    pub name: String,
    pub matcher: Matcher,
}

impl NoiseRule {
    pub fn new(name: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            name: name.into(),
            matcher,
        }
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.matcher.is_match(line)
    }
}

/// Ordered noise rules; build once, share by reference.
#[derive(Debug, Clone)]
pub struct NoiseRuleSet {
    rules: Vec<NoiseRule>,
}

impl NoiseRuleSet {
    pub fn new(rules: Vec<NoiseRule>) -> Self {
        Self { rules }
    }

    /// Built-in receipt rules
    pub fn default_rules() -> Result<Self> {
        Ok(Self::new(vec![
            NoiseRule::new("accounting-marker", Matcher::keywords(ACCOUNTING_KEYWORDS)),
            NoiseRule::new("address-marker", Matcher::pattern(ADDRESS_PATTERN)?),
            NoiseRule::new("phone-number", Matcher::pattern(PHONE_PATTERN)?),
            NoiseRule::new("date", Matcher::pattern(DATE_PATTERN)?),
            NoiseRule::new("clock-time", Matcher::pattern(CLOCK_PATTERN)?),
            NoiseRule::new("bare-number", Matcher::pattern(BARE_NUMBER_PATTERN)?),
        ]))
    }

    /// First rule that matches `line`
    pub fn first_match(&self, line: &str) -> Option<&NoiseRule> {
        self.rules.iter().find(|r| r.is_match(line))
    }

    pub fn get(&self, name: &str) -> Option<&NoiseRule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> NoiseRule {
        NoiseRuleSet::default_rules().unwrap().get(name).unwrap().clone()
    }

    #[test]
    fn test_accounting_markers() {
        let r = rule("accounting-marker");
        for line in ["合計 1200円", "小計 380円", "お預り 1000", "お釣り 620", "(内消費税等 8% 28)", "ありがとうございました"] {
            assert!(r.is_match(line), "expected accounting marker: {line}");
        }
        assert!(!r.is_match("パン 130円"));
    }

    #[test]
    fn test_address_marker() {
        let r = rule("address-marker");
        assert!(r.is_match("東京都渋谷区１−２−３"));
        assert!(r.is_match("神奈川県横浜市西区みなとみらい2-3"));
        assert!(r.is_match("渋谷区道玄坂2-1"));
        assert!(r.is_match("〒150-0043"));
        assert!(!r.is_match("京都八ッ橋 540円"));
        assert!(!r.is_match("コーヒー 250円"));
    }

    #[test]
    fn test_phone_number() {
        let r = rule("phone-number");
        assert!(r.is_match("03-1234-5678"));
        assert!(r.is_match("TEL 0120-000-111"));
        assert!(r.is_match("０３−１２３４−５６７８"));
        assert!(!r.is_match("コーヒー 250円"));
        assert!(!r.is_match("東京都渋谷区１−２−３"));
    }

    #[test]
    fn test_date_and_time() {
        let date = rule("date");
        assert!(date.is_match("2024/1/5(金) 12:34"));
        assert!(date.is_match("2024年 1月 5日"));
        assert!(date.is_match("令和6年1月5日"));
        assert!(!date.is_match("パン 130円"));

        let clock = rule("clock-time");
        assert!(clock.is_match("12:34 レジ02"));
        assert!(!clock.is_match("牛乳 198円"));
    }

    #[test]
    fn test_bare_number() {
        let r = rule("bare-number");
        assert!(r.is_match("380"));
        assert!(r.is_match("  12345 "));
        assert!(!r.is_match("5"));
        assert!(!r.is_match("123456"));
        assert!(!r.is_match("３８０"));
        assert!(!r.is_match("パン 130"));
    }

    #[test]
    fn test_first_match_order() {
        let set = NoiseRuleSet::default_rules().unwrap();
        // Both a total marker and a date; the earlier rule is reported
        let hit = set.first_match("合計 2024/1/5").unwrap();
        assert_eq!(hit.name, "accounting-marker");
        assert!(set.first_match("コーヒー 250円").is_none());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(Matcher::pattern(r"(unclosed").is_err());
    }
}
