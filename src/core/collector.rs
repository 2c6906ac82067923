use crate::core::extractor::ListingExtractor;
use crate::core::matcher::{self, PageMatch};
use crate::core::{PageFetcher, RecordSink, TargetSource};
use crate::domain::model::{Device, KeywordGroup, RankRecord, RunSummary, ShopHitRecord};
use crate::utils::error::Result;
use crate::utils::pacing::RequestInterval;
use chrono::{DateTime, Utc};
use std::time::Instant;

/// 僅追蹤搜尋結果第一頁
pub const SEARCH_PAGE: u32 = 1;

/// 一次執行：讀取目標 → 每個關鍵字 × 裝置搜尋 → 比對 → 批次寫入
pub struct RankCollector<F: PageFetcher, T: TargetSource, S: RecordSink> {
    fetcher: F,
    source: T,
    sink: S,
    extractor: ListingExtractor,
    devices: Vec<Device>,
    interval: RequestInterval,
}

#[derive(Debug, Default)]
struct Collected {
    rankings: Vec<RankRecord>,
    hit_counts: Vec<ShopHitRecord>,
    searches: usize,
    errors: usize,
}

impl<F: PageFetcher, T: TargetSource, S: RecordSink> RankCollector<F, T, S> {
    pub fn new(fetcher: F, source: T, sink: S, extractor: ListingExtractor) -> Self {
        Self {
            fetcher,
            source,
            sink,
            extractor,
            devices: Device::ALL.to_vec(),
            interval: RequestInterval::default(),
        }
    }

    pub fn with_devices(mut self, devices: Vec<Device>) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_interval(mut self, interval: RequestInterval) -> Self {
        self.interval = interval;
        self
    }

    /// 讀取目標並依關鍵字分組
    pub async fn plan(&self) -> Result<Vec<KeywordGroup>> {
        let products = self.source.load_targets().await?;
        tracing::info!("📋 Loaded {} product × keyword combinations", products.len());

        let groups = KeywordGroup::group(products);
        tracing::info!("🔑 Unique keywords: {}", groups.len());
        Ok(groups)
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Rank collection started");
        let started = Instant::now();

        let groups = self.plan().await?;
        if groups.is_empty() {
            tracing::warn!("⚠️ No registered products or keywords, nothing to do");
            return Ok(RunSummary {
                elapsed: started.elapsed(),
                ..RunSummary::default()
            });
        }

        // 同一次執行的所有紀錄共用一個時間戳
        let searched_at = Utc::now();
        let collected = self.collect(&groups, searched_at).await;

        tracing::info!(
            "💾 Writing rankings={} shop_hit_counts={}",
            collected.rankings.len(),
            collected.hit_counts.len()
        );
        self.sink.write_rankings(&collected.rankings).await?;
        self.sink.write_shop_hits(&collected.hit_counts).await?;

        let summary = RunSummary {
            searches: collected.searches,
            errors: collected.errors,
            rankings: collected.rankings.len(),
            hit_counts: collected.hit_counts.len(),
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "✅ Rank collection finished: searches={}, errors={}, elapsed={:.1}s",
            summary.searches,
            summary.errors,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }

    async fn collect(&self, groups: &[KeywordGroup], searched_at: DateTime<Utc>) -> Collected {
        let mut collected = Collected::default();
        let total = groups.len() * self.devices.len();

        for group in groups {
            let targets = group.targets();
            let shops = group.tracked_shops();

            for &device in &self.devices {
                tracing::info!("🔍 Searching keyword={} device={}", group.keyword, device);
                collected.searches += 1;

                let page = match self.fetcher.fetch(&group.keyword, device).await {
                    Ok(html) => {
                        let listings = self.extractor.extract(&html);
                        tracing::info!("📦 Extracted {} listings", listings.len());
                        matcher::match_page(&listings, &targets, &shops)
                    }
                    Err(e) => {
                        collected.errors += 1;
                        tracing::warn!(
                            "⏭️ Skipping keyword={} device={}: {}",
                            group.keyword,
                            device,
                            e
                        );
                        PageMatch::unranked(&targets, &shops)
                    }
                };

                let (rankings, hit_counts) = Self::records_for(group, device, &page, searched_at);
                collected.rankings.extend(rankings);
                collected.hit_counts.extend(hit_counts);

                if collected.searches < total {
                    self.interval.wait().await;
                }
            }
        }

        collected
    }

    /// PageMatch 的順序與 group.targets() / tracked_shops() 一致
    fn records_for(
        group: &KeywordGroup,
        device: Device,
        page: &PageMatch,
        searched_at: DateTime<Utc>,
    ) -> (Vec<RankRecord>, Vec<ShopHitRecord>) {
        let rankings = group
            .products
            .iter()
            .zip(&page.ranks)
            .map(|(product, (_, rank))| {
                match rank {
                    Some(rank) => tracing::info!(
                        "  {}/{} → rank {}",
                        product.shop_code,
                        product.product_code,
                        rank
                    ),
                    None => tracing::info!(
                        "  {}/{} → not ranked",
                        product.shop_code,
                        product.product_code
                    ),
                }
                RankRecord {
                    product_id: product.product_id.clone(),
                    keyword_id: group.keyword_id.clone(),
                    device,
                    rank: *rank,
                    page: SEARCH_PAGE,
                    searched_at,
                }
            })
            .collect();

        let hit_counts = page
            .hits
            .iter()
            .map(|(shop, count)| ShopHitRecord {
                keyword_id: group.keyword_id.clone(),
                shop_code: shop.shop_code.clone(),
                device,
                hit_count: *count,
                searched_at,
            })
            .collect();

        (rankings, hit_counts)
    }
}
