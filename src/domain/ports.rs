use crate::domain::model::{Device, RankRecord, ShopHitRecord, TrackedProduct};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 取得某關鍵字在某裝置下的搜尋結果頁 HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, keyword: &str, device: Device) -> Result<String>;
}

#[async_trait]
pub trait TargetSource: Send + Sync {
    async fn load_targets(&self) -> Result<Vec<TrackedProduct>>;
}

pub trait RecordSink: Send + Sync {
    fn write_rankings(
        &self,
        records: &[RankRecord],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn write_shop_hits(
        &self,
        records: &[ShopHitRecord],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
