use crate::config::toml_config::{SearchConfig, UserAgentConfig};
use crate::domain::model::Device;
use crate::domain::ports::PageFetcher;
use crate::utils::error::{CollectorError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

/// 以 reqwest 抓取市集搜尋結果頁
pub struct HttpFetcher {
    client: Client,
    url_template: String,
    user_agents: UserAgentConfig,
    accept_language: String,
    accept: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(search: &SearchConfig, user_agents: &UserAgentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(search.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            url_template: search.url_template.clone(),
            user_agents: user_agents.clone(),
            accept_language: search.accept_language.clone(),
            accept: search.accept.clone(),
            retry_attempts: search.retry_attempts,
            retry_delay: Duration::from_secs(search.retry_delay_seconds),
        })
    }

    /// 關鍵字完整 percent-encode 後代入 `{keyword}`
    pub fn search_url(&self, keyword: &str) -> String {
        self.url_template
            .replace("{keyword}", &urlencoding::encode(keyword))
    }

    async fn fetch_once(&self, url: &str, device: Device) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, self.user_agents.for_device(device))
            .header(header::ACCEPT_LANGUAGE, &self.accept_language)
            .header(header::ACCEPT, &self.accept)
            .send()
            .await?;

        tracing::debug!("Search response status: {}", response.status());

        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::UpstreamStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, keyword: &str, device: Device) -> Result<String> {
        let url = self.search_url(keyword);
        let mut attempt = 0;

        loop {
            match self.fetch_once(&url, device).await {
                Ok(html) => return Ok(html),
                Err(e) if attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "🔄 Search fetch failed (keyword={}, device={}): {}. Retry {}/{}",
                        keyword,
                        device,
                        e,
                        attempt,
                        self.retry_attempts
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Failed to fetch search page: keyword={}, device={}, error={}",
                        keyword,
                        device,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}
