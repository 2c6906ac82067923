use crate::domain::model::{Listing, TrackedShop, TrackedTarget};

/// 第一個 shop/product 完全相符的順位；找不到回傳 None
pub fn find_rank(listings: &[Listing], shop_code: &str, product_code: &str) -> Option<u32> {
    listings
        .iter()
        .find(|l| l.shop_code == shop_code && l.product_code == product_code)
        .map(|l| l.position)
}

pub fn count_hits(listings: &[Listing], shop_code: &str) -> u32 {
    listings.iter().filter(|l| l.shop_code == shop_code).count() as u32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMatch {
    pub ranks: Vec<(TrackedTarget, Option<u32>)>,
    pub hits: Vec<(TrackedShop, u32)>,
}

impl PageMatch {
    /// 抓取失敗時使用：全部未進榜、命中數為 0
    pub fn unranked(targets: &[TrackedTarget], shops: &[TrackedShop]) -> Self {
        Self {
            ranks: targets.iter().cloned().map(|t| (t, None)).collect(),
            hits: shops.iter().cloned().map(|s| (s, 0)).collect(),
        }
    }
}

pub fn match_page(listings: &[Listing], targets: &[TrackedTarget], shops: &[TrackedShop]) -> PageMatch {
    PageMatch {
        ranks: targets
            .iter()
            .map(|t| (t.clone(), find_rank(listings, &t.shop_code, &t.product_code)))
            .collect(),
        hits: shops
            .iter()
            .map(|s| (s.clone(), count_hits(listings, &s.shop_code)))
            .collect(),
    }
}
