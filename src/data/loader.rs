//! Dataset Loader Module
//! Loads the Iris table from the bundled samples, falling back to the CSV cache.

use log::{info, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(
        "{} not found. Enable the bundled-dataset feature or provide a CSV file at that path.",
        path.display()
    )]
    DatasetNotFound { path: PathBuf },
    #[error("Failed to read dataset cache {}: {source}", path.display())]
    CacheUnreadable {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which source produced the table, or why none did.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Primary (bundled) source succeeded.
    Loaded(DataFrame),
    /// Primary source absent; table read from the CSV cache.
    FallbackLoaded(DataFrame),
    Unavailable(LoaderError),
}

impl LoadOutcome {
    pub fn source_label(&self) -> &'static str {
        match self {
            LoadOutcome::Loaded(_) => "bundled dataset",
            LoadOutcome::FallbackLoaded(_) => "CSV cache",
            LoadOutcome::Unavailable(_) => "none",
        }
    }

    pub fn into_result(self) -> Result<DataFrame, LoaderError> {
        match self {
            LoadOutcome::Loaded(df) | LoadOutcome::FallbackLoaded(df) => Ok(df),
            LoadOutcome::Unavailable(err) => Err(err),
        }
    }
}

type PrimarySource = fn() -> PolarsResult<DataFrame>;

/// Loads the dataset from a primary source with a CSV cache as fallback.
pub struct DatasetLoader {
    primary: Option<PrimarySource>,
    cache_path: PathBuf,
}

impl DatasetLoader {
    /// Loader using the bundled samples when compiled in.
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            primary: Self::bundled_source(),
            cache_path: cache_path.into(),
        }
    }

    /// Loader with no primary source; always reads the cache.
    pub fn cache_only(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            primary: None,
            cache_path: cache_path.into(),
        }
    }

    #[cfg(feature = "bundled-dataset")]
    fn bundled_source() -> Option<PrimarySource> {
        Some(super::iris::load)
    }

    #[cfg(not(feature = "bundled-dataset"))]
    fn bundled_source() -> Option<PrimarySource> {
        None
    }

    pub fn load(&self) -> LoadOutcome {
        let Some(primary) = self.primary else {
            warn!(
                "Bundled dataset not available. Using {} instead...",
                self.cache_path.display()
            );
            return self.load_fallback();
        };

        match primary() {
            Ok(df) => {
                match self.write_cache(&df) {
                    Ok(()) => info!(
                        "Loaded Iris dataset from bundled samples and saved as {}",
                        self.cache_path.display()
                    ),
                    Err(e) => warn!(
                        "Loaded Iris dataset from bundled samples but could not save {}: {}",
                        self.cache_path.display(),
                        e
                    ),
                }
                LoadOutcome::Loaded(df)
            }
            Err(e) => {
                warn!(
                    "Bundled dataset failed to build ({}). Using {} instead...",
                    e,
                    self.cache_path.display()
                );
                self.load_fallback()
            }
        }
    }

    fn load_fallback(&self) -> LoadOutcome {
        if !self.cache_path.exists() {
            return LoadOutcome::Unavailable(LoaderError::DatasetNotFound {
                path: self.cache_path.clone(),
            });
        }

        match Self::read_csv(&self.cache_path) {
            Ok(df) => {
                info!("Loaded {} successfully", self.cache_path.display());
                LoadOutcome::FallbackLoaded(df)
            }
            Err(source) => LoadOutcome::Unavailable(LoaderError::CacheUnreadable {
                path: self.cache_path.clone(),
                source,
            }),
        }
    }

    /// Read a headered CSV; unparsable cells become nulls.
    pub fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()
    }

    /// Persist a plain CSV copy (header row, no index column).
    pub fn write_cache(&self, df: &DataFrame) -> Result<(), LoaderError> {
        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(&self.cache_path)?;
        let mut out = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut out)?;
        Ok(())
    }
}
