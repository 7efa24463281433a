//! Item-line shape: "<name> <price>[円]" at the end of the line.
//!
//! Examples the rule accepts:
//!   コーヒー 250円
//!   ﾎﾞｯｸｽﾃｨｯｼｭ    ¥298
//!   牛乳 1L  1,280 ※

use anyhow::Result;
use regex::Regex;

/// Prices below this are usually quantities or OCR'd box-drawing glyphs
pub const MIN_PRICE: u32 = 10;
/// Prices above this are usually receipt/terminal ids
pub const MAX_PRICE: u32 = 100_000;

#[derive(Debug, Clone)]
pub struct ItemRule {
    re: Regex,
}

impl ItemRule {
    pub fn new() -> Result<Self> {
        let re = Regex::new(concat!(
            r"^(?P<name>.+?)\s+",
            r"[¥￥\\]?(?P<price>[0-9]{1,3}(?:,[0-9]{3})+|[0-9]{2,5})",
            r"\s*円?\s*(?:[※*＊軽外内]\s*)?$"
        ))?;
        Ok(Self { re })
    }

    /// Extract `(name, price)` from an item-shaped line.
    ///
    /// Returns `None` when the shape does not match, the name is blank, or the
    /// price is outside `MIN_PRICE..=MAX_PRICE`.
    pub fn extract(&self, line: &str) -> Option<(String, u32)> {
        let caps = self.re.captures(line)?;

        let name = caps["name"].trim();
        if name.is_empty() {
            return None;
        }

        let price: u32 = caps["price"].replace(',', "").parse().ok()?;
        if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
            return None;
        }

        Some((name.to_string(), price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> ItemRule {
        ItemRule::new().unwrap()
    }

    #[test]
    fn test_basic_item() {
        assert_eq!(rule().extract("パン 130円"), Some(("パン".to_string(), 130)));
        assert_eq!(rule().extract("コーヒー 250"), Some(("コーヒー".to_string(), 250)));
    }

    #[test]
    fn test_yen_sign_and_tax_mark() {
        assert_eq!(
            rule().extract("ボックスティッシュ    ¥298"),
            Some(("ボックスティッシュ".to_string(), 298))
        );
        assert_eq!(
            rule().extract("牛乳 1L  198 ※"),
            Some(("牛乳 1L".to_string(), 198))
        );
        assert_eq!(rule().extract("食パン 158円軽"), Some(("食パン".to_string(), 158)));
    }

    #[test]
    fn test_grouped_thousands() {
        assert_eq!(rule().extract("ビール 6缶 1,280円"), Some(("ビール 6缶".to_string(), 1280)));
    }

    #[test]
    fn test_price_band() {
        assert_eq!(rule().extract("謎の商品 5円"), None);
        assert_eq!(rule().extract("謎の商品 999999円"), None);
        assert_eq!(rule().extract("謎の商品 999,999円"), None);
        assert_eq!(rule().extract("謎の商品 100,000円"), Some(("謎の商品".to_string(), 100_000)));
        assert_eq!(rule().extract("謎の商品 10円"), Some(("謎の商品".to_string(), 10)));
    }

    #[test]
    fn test_shape_mismatch() {
        assert_eq!(rule().extract("パン130円"), None);
        assert_eq!(rule().extract("130円"), None);
        assert_eq!(rule().extract("値引 -50"), None);
        assert_eq!(rule().extract("パン 130円 2個"), None);
    }

    #[test]
    fn test_full_width_digits_are_not_prices() {
        assert_eq!(rule().extract("パン １３０円"), None);
        assert_eq!(rule().extract("パン ￥１３０"), None);
    }
}
