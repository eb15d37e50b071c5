//! Загрузка исходных таблиц из CSV

use std::path::Path;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::types::{CategoryRecord, ItemRecord, ShopRecord, TestRecord, TrainRecord};

pub const TRAIN_FILE: &str = "train.csv";
pub const TEST_FILE: &str = "test.csv";
pub const CATEGORIES_FILE: &str = "item_categories.csv";
pub const SHOPS_FILE: &str = "shops.csv";
pub const ITEMS_FILE: &str = "items.csv";

/// Пять исходных таблиц; после загрузки только читаются
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub train: Vec<TrainRecord>,
    pub test: Vec<TestRecord>,
    pub cats: Vec<CategoryRecord>,
    pub items: Vec<ItemRecord>,
    pub shops: Vec<ShopRecord>,
}

pub struct RawStore;

impl RawStore {
    pub fn load(dir: impl AsRef<Path>) -> Result<RawTables> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::load(dir, "data directory not found"));
        }

        let tables = RawTables {
            train: read_table(&dir.join(TRAIN_FILE))?,
            test: read_table(&dir.join(TEST_FILE))?,
            cats: read_table(&dir.join(CATEGORIES_FILE))?,
            items: read_table(&dir.join(ITEMS_FILE))?,
            shops: read_table(&dir.join(SHOPS_FILE))?,
        };

        tracing::info!(
            "Loaded raw tables from {}: train={}, test={}, cats={}, items={}, shops={}",
            dir.display(),
            tables.train.len(),
            tables.test.len(),
            tables.cats.len(),
            tables.items.len(),
            tables.shops.len()
        );

        Ok(tables)
    }
}

/// Колонки сопоставляются по заголовку, лишние (индекс, date, item_price) игнорируются
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::load(path, e))?;

    let mut rows = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        // +2: строка заголовка и нумерация с единицы
        let row: T = result.map_err(|e| Error::load(path, format!("row {}: {}", line + 2, e)))?;
        rows.push(row);
    }

    tracing::debug!("{}: {} rows", path.display(), rows.len());
    Ok(rows)
}
