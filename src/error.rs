//! Ошибки пайплайна и сервиса предсказаний

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Входной файл отсутствует или не разбирается
    #[error("failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("invalid window neg_from={neg_from}, neg_to={neg_to}: {reason}")]
    InvalidWindow {
        neg_from: i32,
        neg_to: i32,
        reason: &'static str,
    },

    /// Дополнение меньше запрошенной выборки
    #[error("cannot sample {requested} no-sale ids, only {available} available")]
    Sampling { requested: usize, available: usize },

    #[error("value {value} is unknown to the {encoder} encoder")]
    UnknownValue { encoder: String, value: i32 },

    #[error("feature frame has no column {column}")]
    MissingColumn { column: String },

    #[error("no prediction for id {id}")]
    Lookup { id: String },

    #[error("failed to read predictions artifact {}: {reason}", path.display())]
    Artifact { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Artifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Lookup { .. })
    }
}
