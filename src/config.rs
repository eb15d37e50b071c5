/// Настройки извлечения признаков и сервиса предсказаний

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use crate::data::DEFAULT_SAMPLE_RATE;
use crate::preprocessing::encoders::UnknownPolicy;
use crate::preprocessing::window::{SummaryStatistic, WindowSpec, DEFAULT_WINDOWS, MINIMAL_STATISTICS};

pub const DEFAULT_PREDICTIONS_PATH: &str = "../data/model/task2.parquet";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Доля no-sale строк от числа проданных пар месяца
    pub sample_rate: f64,
    pub unknown_policy: UnknownPolicy,
    pub windows: Vec<WindowSpec>,
    pub statistics: Vec<SummaryStatistic>,
    /// Без seed выборка берётся из энтропии ОС
    pub seed: Option<u64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            unknown_policy: UnknownPolicy::default(),
            windows: DEFAULT_WINDOWS.to_vec(),
            statistics: MINIMAL_STATISTICS.to_vec(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub predictions_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// PREDICTIONS_PATH и BIND_ADDR из окружения, иначе значения по умолчанию
    pub fn from_env() -> anyhow::Result<Self> {
        let predictions_path = std::env::var("PREDICTIONS_PATH")
            .unwrap_or_else(|_| DEFAULT_PREDICTIONS_PATH.to_string());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            predictions_path: PathBuf::from(predictions_path),
            bind_addr: bind_addr
                .parse()
                .with_context(|| format!("Invalid BIND_ADDR: {}", bind_addr))?,
        })
    }
}
