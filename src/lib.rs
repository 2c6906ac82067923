pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::CollectorConfig;

pub use crate::adapters::{HttpFetcher, LocalStore, SupabaseStore};
pub use crate::core::{collector::RankCollector, extractor::ListingExtractor};
pub use crate::domain::model::{Device, Listing, RankRecord, RunSummary, ShopHitRecord, TrackedProduct};
pub use crate::utils::error::{CollectorError, Result};
