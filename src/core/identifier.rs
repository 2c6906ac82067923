use crate::utils::error::{CollectorError, Result};
use regex::Regex;

pub const DEFAULT_MARKETPLACE_DOMAIN: &str = "rakuten.co.jp";

/// 商品頁 URL `https://item.<domain>/<shop>/<product>[/][?query]` 的解析器
#[derive(Debug, Clone)]
pub struct ItemUrlPattern {
    domain: String,
    pattern: Regex,
}

impl ItemUrlPattern {
    pub fn new(marketplace_domain: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"(?s)^https?://item\.{}/([^/?]+)/([^/?]+)/?(?:\?.*)?$",
            regex::escape(marketplace_domain)
        ))
        .map_err(|e| CollectorError::InvalidConfigValueError {
            field: "search.marketplace_domain".to_string(),
            value: marketplace_domain.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            domain: marketplace_domain.to_string(),
            pattern,
        })
    }

    /// 回傳 `(shop_code, product_code)`；無法辨識時兩者皆為空字串
    pub fn split(&self, url: &str) -> (String, String) {
        match self.pattern.captures(url) {
            Some(caps) => (caps[1].to_string(), caps[2].to_string()),
            None => (String::new(), String::new()),
        }
    }

    pub fn canonical_url(&self, shop_code: &str, product_code: &str) -> String {
        format!("https://item.{}/{}/{}/", self.domain, shop_code, product_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rakuten() -> ItemUrlPattern {
        ItemUrlPattern::new(DEFAULT_MARKETPLACE_DOMAIN).unwrap()
    }

    #[test]
    fn test_standard_url() {
        let (shop, product) = rakuten().split("https://item.rakuten.co.jp/ichiban-okinawa/noni-jyuce3/");
        assert_eq!(shop, "ichiban-okinawa");
        assert_eq!(product, "noni-jyuce3");
    }

    #[test]
    fn test_url_with_query() {
        let (shop, product) = rakuten().split("https://item.rakuten.co.jp/shop1/item123/?variantId=abc");
        assert_eq!((shop.as_str(), product.as_str()), ("shop1", "item123"));

        let (shop, product) = rakuten().split("https://item.rakuten.co.jp/shop1/item123?s-id=top");
        assert_eq!((shop.as_str(), product.as_str()), ("shop1", "item123"));
    }

    #[test]
    fn test_url_without_trailing_slash() {
        let (shop, product) = rakuten().split("https://item.rakuten.co.jp/shop1/item123");
        assert_eq!((shop.as_str(), product.as_str()), ("shop1", "item123"));
    }

    #[test]
    fn test_rejects_other_shapes() {
        let pattern = rakuten();
        for url in [
            "https://www.rakuten.co.jp/shop1/",
            "https://item.rakuten.co.jp/shop1/",
            "https://item.rakuten.co.jp/shop1/item123/extra",
            "https://item.rakuten.co.jp.evil.example/shop1/item123/",
            "https://item.example.com/shop1/item123/",
            "",
        ] {
            assert_eq!(pattern.split(url), (String::new(), String::new()), "{}", url);
        }
    }

    #[test]
    fn test_canonical_url_splits_back() {
        let pattern = rakuten();
        for (shop, product) in [("aikanhonpo", "1355740"), ("hands-web", "4901234#5"), ("a b", "c.d")] {
            let url = pattern.canonical_url(shop, product);
            assert_eq!(pattern.split(&url), (shop.to_string(), product.to_string()));
        }
    }

    #[test]
    fn test_custom_domain() {
        let pattern = ItemUrlPattern::new("example.jp").unwrap();
        assert_eq!(
            pattern.split("https://item.example.jp/s/p/"),
            ("s".to_string(), "p".to_string())
        );
        assert_eq!(pattern.canonical_url("s", "p"), "https://item.example.jp/s/p/");
    }
}
