//! Data module - dataset loading and validation

pub mod iris;
mod loader;
mod processor;

pub use loader::{DatasetLoader, LoaderError};
pub use processor::{DataProcessor, ProcessorError, ValidatedDataset};
