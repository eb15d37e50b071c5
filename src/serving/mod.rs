/// Сервис предсказаний: артефакт и HTTP API

pub mod api;
pub mod predictions;

pub use api::router;
pub use predictions::PredictionStore;
