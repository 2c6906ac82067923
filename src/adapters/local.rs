use crate::domain::model::{RankRecord, ShopHitRecord, TrackedProduct};
use crate::domain::ports::{RecordSink, TargetSource};
use crate::utils::error::{CollectorError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

pub const RANKINGS_FILE: &str = "rankings.csv";
pub const SHOP_HITS_FILE: &str = "shop_hit_counts.csv";

/// 本機檔案版本：目標讀自 JSON，結果附加寫入 CSV
#[derive(Debug, Clone)]
pub struct LocalStore {
    targets_file: PathBuf,
    output_dir: PathBuf,
}

impl LocalStore {
    pub fn new(targets_file: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            targets_file: targets_file.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn append_csv<T: Serialize>(&self, file_name: &str, records: &[T]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        // 新檔或空檔才寫表頭
        let write_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!("💾 Appended {} rows to {}", records.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl TargetSource for LocalStore {
    async fn load_targets(&self) -> Result<Vec<TrackedProduct>> {
        let content = tokio::fs::read_to_string(&self.targets_file)
            .await
            .map_err(|e| CollectorError::StorageError {
                message: format!(
                    "cannot read targets file {}: {}",
                    self.targets_file.display(),
                    e
                ),
            })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl RecordSink for LocalStore {
    async fn write_rankings(&self, records: &[RankRecord]) -> Result<()> {
        self.append_csv(RANKINGS_FILE, records)
    }

    async fn write_shop_hits(&self, records: &[ShopHitRecord]) -> Result<()> {
        self.append_csv(SHOP_HITS_FILE, records)
    }
}
