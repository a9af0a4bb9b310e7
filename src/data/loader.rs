//! CSV Data Loader Module
//! Parses the downloaded dataset into a DataFrame using Polars.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Dataset path is not valid UTF-8")]
    BadPath,
}

/// Loads the raw incident CSV with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file using lazy evaluation, then collect.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let path = path.to_str().ok_or(LoaderError::BadPath)?;

        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_csv_with_headers() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "INCIDENT_KEY,OCCUR_DATE,BORO").unwrap();
        writeln!(file, "1,01/01/2020,BRONX").unwrap();
        writeln!(file, "2,01/02/2020,QUEENS").unwrap();
        file.flush().unwrap();

        let df = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.column("OCCUR_DATE").is_ok());
    }
}
