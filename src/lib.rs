//! Sales Forecast - месячный датасет продаж, признаки и выдача предсказаний

pub mod config;
pub mod data;
pub mod error;
pub mod preprocessing;
pub mod serving;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ExtractionConfig, ServerConfig};
pub use data::{Dataset, RawStore, RawTables};
pub use error::{Error, Result};
pub use preprocessing::{Encoders, FeatureExtraction, FeatureFrame, UnknownPolicy, WindowSpec};
pub use serving::PredictionStore;
pub use types::*;
