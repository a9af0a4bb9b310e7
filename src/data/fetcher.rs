//! Dataset Fetcher Module
//! One-shot HTTP download of the source CSV. No retry, no cache: a failed
//! fetch is fatal to the whole run.

use reqwest::blocking::Client;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Public NYC Open Data export of the shooting-incident dataset (historic).
pub const DEFAULT_DATASET_URL: &str =
    "https://data.cityofnewyork.us/api/views/833y-fsy8/rows.csv?accessType=DOWNLOAD";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Dataset request returned status {0}")]
    BadStatus(reqwest::StatusCode),
    #[error("Failed to write downloaded dataset: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads the dataset CSV with a blocking client.
pub struct DatasetFetcher {
    client: Client,
}

impl DatasetFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and stream the body to `dest`. Returns bytes written.
    pub fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let mut response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(FetchError::BadStatus(response.status()));
        }

        let mut file = File::create(dest)?;
        let bytes = response.copy_to(&mut file)?;
        Ok(bytes)
    }
}
