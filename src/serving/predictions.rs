//! Предрассчитанные предсказания по id пары магазин-товар

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use arrow::array::{Array, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{Error, Result};
use crate::types::make_id;

pub const ID_COLUMN: &str = "id";
pub const PREDICTION_COLUMN: &str = "prediction";

/// Загружается один раз при старте, дальше только чтение
#[derive(Debug, Clone, Default)]
pub struct PredictionStore {
    predictions: HashMap<String, f64>,
}

impl PredictionStore {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            predictions: pairs.into_iter().collect(),
        }
    }

    /// Parquet с колонками `id` (строка) и `prediction` (число)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::artifact(path, e))?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .and_then(|builder| builder.build())
            .map_err(|e| Error::artifact(path, e))?;

        let mut predictions = HashMap::new();
        for batch in reader {
            let batch = batch.map_err(|e| Error::artifact(path, e))?;

            let ids = batch
                .column_by_name(ID_COLUMN)
                .ok_or_else(|| Error::artifact(path, "missing id column"))?;
            let ids = cast(ids, &DataType::Utf8).map_err(|e| Error::artifact(path, e))?;
            let ids = ids
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| Error::artifact(path, "id column is not a string column"))?;

            let values = batch
                .column_by_name(PREDICTION_COLUMN)
                .ok_or_else(|| Error::artifact(path, "missing prediction column"))?;
            let values = cast(values, &DataType::Float64).map_err(|e| Error::artifact(path, e))?;
            let values = values
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| Error::artifact(path, "prediction column is not numeric"))?;

            for i in 0..batch.num_rows() {
                if ids.is_null(i) || values.is_null(i) {
                    continue;
                }
                predictions.insert(ids.value(i).to_string(), values.value(i));
            }
        }

        tracing::info!("Loaded {} predictions from {}", predictions.len(), path.display());
        Ok(Self { predictions })
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn lookup(&self, shop_id: i32, item_id: i32) -> Result<f64> {
        let id = make_id(shop_id, item_id);
        self.predictions
            .get(&id)
            .copied()
            .ok_or(Error::Lookup { id })
    }
}
