pub mod collector;
pub mod extractor;
pub mod identifier;
pub mod matcher;

pub use crate::domain::model::{Listing, TrackedShop, TrackedTarget};
pub use crate::domain::ports::{PageFetcher, RecordSink, TargetSource};
pub use crate::utils::error::Result;
