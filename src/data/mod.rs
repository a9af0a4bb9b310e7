//! Data module - dataset download, CSV loading, cleaning and aggregation

mod aggregator;
pub mod cleaner;
mod fetcher;
mod loader;

pub use aggregator::{Aggregator, CumulativeCount, DailyCount};
pub use cleaner::{Borough, CleanError, DataCleaner, Incident, Race, Sex};
pub use fetcher::{DatasetFetcher, FetchError, DEFAULT_DATASET_URL};
pub use loader::{DataLoader, LoaderError};
