/// Исходные таблицы и месячный датасет

pub mod dataset;
pub mod store;

pub use dataset::{Dataset, DEFAULT_SAMPLE_RATE};
pub use store::{RawStore, RawTables};
