use crate::core::identifier::ItemUrlPattern;
use crate::domain::model::Listing;
use crate::utils::error::{CollectorError, Result};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// 搜尋結果頁的解析策略，依序嘗試
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `window.__INITIAL_STATE__` 內嵌 JSON
    InitialState,
    /// schema.org `ItemList` 的 JSON-LD
    JsonLd,
}

impl Strategy {
    pub const CHAIN: [Strategy; 2] = [Strategy::InitialState, Strategy::JsonLd];
}

/// 將搜尋結果 HTML 轉成依序排列的 [`Listing`]
///
/// 所有解析錯誤都降級為較短或空的結果，不會回傳錯誤。
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    item_url: ItemUrlPattern,
    initial_state: Regex,
}

impl ListingExtractor {
    pub fn new(marketplace_domain: &str) -> Result<Self> {
        let initial_state =
            Regex::new(r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.+?\});\s*</script>").map_err(
                |e| CollectorError::ConfigError {
                    message: format!("invalid initial state pattern: {}", e),
                },
            )?;
        Ok(Self {
            item_url: ItemUrlPattern::new(marketplace_domain)?,
            initial_state,
        })
    }

    pub fn item_url(&self) -> &ItemUrlPattern {
        &self.item_url
    }

    pub fn extract(&self, markup: &str) -> Vec<Listing> {
        for strategy in Strategy::CHAIN {
            match self.run(strategy, markup) {
                Some(listings) if !listings.is_empty() => {
                    tracing::debug!("{:?} strategy produced {} listings", strategy, listings.len());
                    return listings;
                }
                _ => tracing::warn!("⚠️ {:?} strategy found no listings", strategy),
            }
        }

        tracing::error!("❌ Failed to extract any listing from the search page");
        Vec::new()
    }

    pub fn run(&self, strategy: Strategy, markup: &str) -> Option<Vec<Listing>> {
        match strategy {
            Strategy::InitialState => self.from_initial_state(markup),
            Strategy::JsonLd => self.from_json_ld(markup),
        }
    }

    fn from_initial_state(&self, markup: &str) -> Option<Vec<Listing>> {
        let caps = self.initial_state.captures(markup)?;
        let state: Value = match serde_json::from_str(&caps[1]) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("⚠️ __INITIAL_STATE__ JSON parse error: {}", e);
                return None;
            }
        };

        let items = state.pointer("/ichibaSearch/items")?.as_array()?;

        // 順位取自原始索引：被略過的項目仍占用一個順位
        let listings = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let url = non_empty_str(item.get("url"))
                    .or_else(|| non_empty_str(item.get("originalItemUrl")))
                    .unwrap_or_default();
                let (url_shop, product_code) = self.item_url.split(url);
                let shop_code = non_empty_str(item.pointer("/shop/urlCode"))
                    .map(str::to_string)
                    .unwrap_or(url_shop);

                if shop_code.is_empty() || product_code.is_empty() {
                    tracing::debug!("Skipping item #{} without identifiers", index + 1);
                    return None;
                }

                Some(Listing {
                    position: u32::try_from(index + 1).ok()?,
                    shop_code,
                    product_code,
                    display_name: text_of(item.get("name")),
                })
            })
            .collect();

        Some(listings)
    }

    fn from_json_ld(&self, markup: &str) -> Option<Vec<Listing>> {
        let document = Html::parse_document(markup);
        let selector = Selector::parse(LD_JSON_SELECTOR).ok()?;

        let mut listings = Vec::new();
        for script in document.select(&selector) {
            let raw = script.text().collect::<String>();
            let data: Value = match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(e) => {
                    tracing::debug!("Skipping unparsable JSON-LD block: {}", e);
                    continue;
                }
            };

            if !is_item_list(&data) {
                continue;
            }

            let Some(entries) = data.get("itemListElement").and_then(Value::as_array) else {
                continue;
            };

            for entry in entries {
                let Some(position) = entry
                    .get("position")
                    .and_then(Value::as_u64)
                    .filter(|p| *p > 0)
                    .and_then(|p| u32::try_from(p).ok())
                else {
                    continue;
                };

                let product = entry.get("item");
                let url = non_empty_str(product.and_then(|p| p.get("url")))
                    .or_else(|| non_empty_str(entry.get("url")))
                    .unwrap_or_default();
                let (shop_code, product_code) = self.item_url.split(url);
                if shop_code.is_empty() || product_code.is_empty() {
                    continue;
                }

                listings.push(Listing {
                    position,
                    shop_code,
                    product_code,
                    display_name: text_of(product.and_then(|p| p.get("name"))),
                });
            }
        }

        Some(listings)
    }
}

fn is_item_list(data: &Value) -> bool {
    match data.get("@type") {
        Some(Value::String(t)) => t == "ItemList",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("ItemList")),
        _ => false,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn text_of(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::DEFAULT_MARKETPLACE_DOMAIN;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(DEFAULT_MARKETPLACE_DOMAIN).unwrap()
    }

    fn state_page(items: serde_json::Value) -> String {
        let state = serde_json::json!({ "ichibaSearch": { "items": items } });
        format!(
            "<html><head><script>window.__INITIAL_STATE__ = {};</script></head><body></body></html>",
            state
        )
    }

    #[test]
    fn test_shop_code_preferred_over_url() {
        let html = state_page(serde_json::json!([
            {
                "name": "ノニジュース",
                "url": "https://item.rakuten.co.jp/url-shop/noni/",
                "shop": { "urlCode": "explicit-shop" }
            }
        ]));

        let listings = extractor().extract(&html);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].shop_code, "explicit-shop");
        assert_eq!(listings[0].product_code, "noni");
        assert_eq!(listings[0].display_name, "ノニジュース");
    }

    #[test]
    fn test_original_item_url_fallback() {
        let html = state_page(serde_json::json!([
            { "name": "A", "url": "", "originalItemUrl": "https://item.rakuten.co.jp/shop-a/item-a/" }
        ]));

        let listings = extractor().extract(&html);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].shop_code, "shop-a");
        assert_eq!(listings[0].product_code, "item-a");
    }

    #[test]
    fn test_dropped_items_keep_their_position() {
        let html = state_page(serde_json::json!([
            { "url": "https://item.rakuten.co.jp/shop-a/item-a/" },
            { "url": "https://www.rakuten.co.jp/not-an-item/" },
            { "shop": { "urlCode": "shop-c" } },
            { "url": "https://item.rakuten.co.jp/shop-d/item-d/" }
        ]));

        let listings = extractor().extract(&html);
        let positions: Vec<u32> = listings.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![1, 4]);
    }

    #[test]
    fn test_state_without_items_path_falls_through() {
        let html = "<script>window.__INITIAL_STATE__ = {\"other\": {}};</script>";
        assert_eq!(extractor().run(Strategy::InitialState, html), None);
        assert!(extractor().extract(html).is_empty());
    }

    #[test]
    fn test_json_ld_type_array_and_entry_url() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "BreadcrumbList", "itemListElement": []}</script>
            <script type="application/ld+json">not json</script>
            <script type="application/ld+json">
            {"@type": ["ItemList"], "itemListElement": [
                {"position": 2, "url": "https://item.rakuten.co.jp/shop-b/item-b/"},
                {"position": 0, "item": {"url": "https://item.rakuten.co.jp/shop-z/item-z/"}},
                {"item": {"url": "https://item.rakuten.co.jp/shop-y/item-y/"}},
                {"position": 5, "item": {"url": "https://item.rakuten.co.jp/shop-e/item-e/", "name": "E"}}
            ]}
            </script>
        </head><body></body></html>"#;

        let listings = extractor().run(Strategy::JsonLd, html).unwrap();
        let got: Vec<(u32, &str)> = listings
            .iter()
            .map(|l| (l.position, l.shop_code.as_str()))
            .collect();
        assert_eq!(got, vec![(2, "shop-b"), (5, "shop-e")]);
        assert_eq!(listings[1].display_name, "E");
    }

    #[test]
    fn test_markup_without_embedded_data_is_empty() {
        assert!(extractor().extract("").is_empty());
        assert!(extractor().extract("<html><body><p>no results</p></body></html>").is_empty());
    }
}
