use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// 搜尋結果頁中的一筆商品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// 頁面內的順位（1 起算）
    pub position: u32,
    pub shop_code: String,
    pub product_code: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedTarget {
    pub shop_code: String,
    pub product_code: String,
}

impl TrackedTarget {
    pub fn new(shop_code: impl Into<String>, product_code: impl Into<String>) -> Self {
        Self {
            shop_code: shop_code.into(),
            product_code: product_code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedShop {
    pub shop_code: String,
}

impl TrackedShop {
    pub fn new(shop_code: impl Into<String>) -> Self {
        Self {
            shop_code: shop_code.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Pc,
    Sp,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Pc, Device::Sp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Pc => "pc",
            Device::Sp => "sp",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pc" => Ok(Device::Pc),
            "sp" => Ok(Device::Sp),
            other => Err(format!("unknown device '{}', expected 'pc' or 'sp'", other)),
        }
    }
}

/// 目標來源中的一列：商品 × 關鍵字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedProduct {
    pub product_keyword_id: String,
    pub product_id: String,
    pub keyword_id: String,
    pub shop_code: String,
    pub product_code: String,
    pub keyword: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl TrackedProduct {
    pub fn target(&self) -> TrackedTarget {
        TrackedTarget::new(self.shop_code.clone(), self.product_code.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroup {
    pub keyword_id: String,
    pub keyword: String,
    pub products: Vec<TrackedProduct>,
}

impl KeywordGroup {
    /// 依 keyword_id 分組，保留首次出現的順序
    pub fn group(products: Vec<TrackedProduct>) -> Vec<KeywordGroup> {
        let mut groups: Vec<KeywordGroup> = Vec::new();
        for product in products {
            match groups.iter_mut().find(|g| g.keyword_id == product.keyword_id) {
                Some(group) => {
                    group.keyword = product.keyword.clone();
                    group.products.push(product);
                }
                None => groups.push(KeywordGroup {
                    keyword_id: product.keyword_id.clone(),
                    keyword: product.keyword.clone(),
                    products: vec![product],
                }),
            }
        }
        groups
    }

    pub fn targets(&self) -> Vec<TrackedTarget> {
        self.products.iter().map(TrackedProduct::target).collect()
    }

    pub fn tracked_shops(&self) -> Vec<TrackedShop> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .filter(|p| seen.insert(p.shop_code.as_str()))
            .map(|p| TrackedShop::new(p.shop_code.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRecord {
    pub product_id: String,
    pub keyword_id: String,
    pub device: Device,
    /// None = 未進榜
    pub rank: Option<u32>,
    pub page: u32,
    pub searched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopHitRecord {
    pub keyword_id: String,
    #[serde(rename = "shop_url")]
    pub shop_code: String,
    pub device: Device,
    pub hit_count: u32,
    pub searched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub searches: usize,
    pub errors: usize,
    pub rankings: usize,
    pub hit_counts: usize,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(keyword_id: &str, shop: &str, product: &str) -> TrackedProduct {
        TrackedProduct {
            product_keyword_id: format!("pk-{}-{}", keyword_id, product),
            product_id: format!("p-{}", product),
            keyword_id: keyword_id.to_string(),
            shop_code: shop.to_string(),
            product_code: product.to_string(),
            keyword: format!("kw-{}", keyword_id),
            display_name: None,
        }
    }

    #[test]
    fn test_group_preserves_first_seen_order() {
        let groups = KeywordGroup::group(vec![
            row("k2", "shop-a", "a1"),
            row("k1", "shop-b", "b1"),
            row("k2", "shop-c", "c1"),
        ]);

        let ids: Vec<&str> = groups.iter().map(|g| g.keyword_id.as_str()).collect();
        assert_eq!(ids, vec!["k2", "k1"]);
        assert_eq!(groups[0].products.len(), 2);
        assert_eq!(groups[0].keyword, "kw-k2");
    }

    #[test]
    fn test_tracked_shops_are_distinct() {
        let groups = KeywordGroup::group(vec![
            row("k1", "shop-a", "a1"),
            row("k1", "shop-b", "b1"),
            row("k1", "shop-a", "a2"),
        ]);

        let shops: Vec<String> = groups[0]
            .tracked_shops()
            .into_iter()
            .map(|s| s.shop_code)
            .collect();
        assert_eq!(shops, vec!["shop-a", "shop-b"]);
        assert_eq!(groups[0].targets().len(), 3);
    }

    #[test]
    fn test_device_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Device::Sp).unwrap(), "\"sp\"");
        assert_eq!("pc".parse::<Device>().unwrap(), Device::Pc);
        assert!("tablet".parse::<Device>().is_err());
    }

    #[test]
    fn test_hit_record_uses_shop_url_column() {
        let record = ShopHitRecord {
            keyword_id: "k1".to_string(),
            shop_code: "ichiban-okinawa".to_string(),
            device: Device::Pc,
            hit_count: 3,
            searched_at: "2026-02-27T00:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["shop_url"], "ichiban-okinawa");
        assert_eq!(json["hit_count"], 3);
    }
}
