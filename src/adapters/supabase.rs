use crate::config::toml_config::SupabaseConfig;
use crate::domain::model::{RankRecord, ShopHitRecord, TrackedProduct};
use crate::domain::ports::{RecordSink, TargetSource};
use crate::utils::error::{CollectorError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

const PRODUCT_KEYWORDS_SELECT: &str = "id,product_id,keyword_id,\
    products:product_id(shop_url,product_id,display_name),\
    keywords:keyword_id(keyword)";

/// Supabase (PostgREST) 上的 product_keywords / rankings / shop_hit_counts
#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    secret_key: String,
    schema: String,
}

#[derive(Debug, Deserialize)]
struct ProductKeywordRow {
    id: String,
    product_id: String,
    keyword_id: String,
    #[serde(default)]
    products: Option<ProductRow>,
    #[serde(default)]
    keywords: Option<KeywordRow>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductRow {
    #[serde(default)]
    shop_url: Option<String>,
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KeywordRow {
    #[serde(default)]
    keyword: Option<String>,
}

impl From<ProductKeywordRow> for TrackedProduct {
    fn from(row: ProductKeywordRow) -> Self {
        let product = row.products.unwrap_or_default();
        let keyword = row.keywords.unwrap_or_default();
        TrackedProduct {
            product_keyword_id: row.id,
            product_id: row.product_id,
            keyword_id: row.keyword_id,
            shop_code: product.shop_url.unwrap_or_default(),
            product_code: product.product_id.unwrap_or_default(),
            keyword: keyword.keyword.unwrap_or_default(),
            display_name: product.display_name,
        }
    }
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            schema: config.schema.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.secret_key)
            .bearer_auth(&self.secret_key)
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::error!("❌ Supabase request failed: {} {} {}", status, url, body);
        Err(CollectorError::UpstreamStatusError {
            status: status.as_u16(),
            url,
        })
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, records: &[T]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Content-Profile", &self.schema)
            .header("Prefer", "return=minimal")
            .json(records)
            .send()
            .await?;
        Self::ensure_success(response).await?;

        tracing::info!("💾 Inserted {} rows into {}", records.len(), table);
        Ok(())
    }
}

#[async_trait]
impl TargetSource for SupabaseStore {
    async fn load_targets(&self) -> Result<Vec<TrackedProduct>> {
        let response = self
            .authorized(self.client.get(self.table_url("product_keywords")))
            .header("Accept-Profile", &self.schema)
            .query(&[("select", PRODUCT_KEYWORDS_SELECT)])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let rows: Vec<ProductKeywordRow> = serde_json::from_str(&response.text().await?)?;
        Ok(rows.into_iter().map(TrackedProduct::from).collect())
    }
}

impl RecordSink for SupabaseStore {
    async fn write_rankings(&self, records: &[RankRecord]) -> Result<()> {
        self.insert("rankings", records).await
    }

    async fn write_shop_hits(&self, records: &[ShopHitRecord]) -> Result<()> {
        self.insert("shop_hit_counts", records).await
    }
}
