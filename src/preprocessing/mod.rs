/// Модуль предобработки данных

pub mod encoders;
pub mod feature_engineering;
pub mod frame;
pub mod window;

pub use encoders::{Encoders, OneHotEncoder, UnknownPolicy};
pub use feature_engineering::FeatureExtraction;
pub use frame::FeatureFrame;
pub use window::{SummaryStatistic, WindowSpec};
