//! One-hot кодирование категорий, магазинов и месяцев

use std::collections::HashMap;

use ndarray::Array2;

use crate::data::RawTables;
use crate::error::{Error, Result};

pub const CATEGORY_PREFIX: &str = "category";
pub const SHOP_PREFIX: &str = "shop";
pub const MONTH_PREFIX: &str = "mnt";

/// Что делать со значением, которого не было в словаре при обучении
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPolicy {
    /// Строка отбрасывается (семантика inner join); число строк пишется в лог
    #[default]
    Drop,
    /// Строка остаётся с нулевым блоком индикаторов
    Zero,
    /// Ошибка `Error::UnknownValue`
    Reject,
}

/// Закрытый словарь: колонка `{prefix}_{value}` на каждое значение
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    prefix: String,
    vocabulary: Vec<i32>,
    index: HashMap<i32, usize>,
    columns: Vec<String>,
}

/// Результат кодирования столбца: матрица индикаторов и маска известных значений
#[derive(Debug, Clone)]
pub struct Encoded {
    pub values: Array2<f64>,
    pub known: Vec<bool>,
}

impl OneHotEncoder {
    pub fn fit(prefix: &str, values: impl IntoIterator<Item = i32>) -> Self {
        let mut vocabulary: Vec<i32> = values.into_iter().collect();
        vocabulary.sort_unstable();
        vocabulary.dedup();

        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();
        let columns = vocabulary
            .iter()
            .map(|v| format!("{}_{}", prefix, v))
            .collect();

        Self {
            prefix: prefix.to_string(),
            vocabulary,
            index,
            columns,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn vocabulary(&self) -> &[i32] {
        &self.vocabulary
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn contains(&self, value: i32) -> bool {
        self.index.contains_key(&value)
    }

    /// `None` для значения вне словаря
    pub fn encode(&self, value: i32) -> Option<Vec<f64>> {
        let pos = *self.index.get(&value)?;
        let mut row = vec![0.0; self.len()];
        row[pos] = 1.0;
        Some(row)
    }

    pub fn transform(&self, values: &[i32], policy: UnknownPolicy) -> Result<Encoded> {
        let mut matrix = Array2::zeros((values.len(), self.len()));
        let mut known = Vec::with_capacity(values.len());

        for (i, &value) in values.iter().enumerate() {
            match self.index.get(&value) {
                Some(&pos) => {
                    matrix[[i, pos]] = 1.0;
                    known.push(true);
                }
                None if policy == UnknownPolicy::Reject => {
                    return Err(Error::UnknownValue {
                        encoder: self.prefix.clone(),
                        value,
                    });
                }
                None => known.push(false),
            }
        }

        Ok(Encoded {
            values: matrix,
            known,
        })
    }
}

/// Кодировщики строятся один раз из каталогов и дальше только читаются
#[derive(Debug, Clone)]
pub struct Encoders {
    pub category: OneHotEncoder,
    pub shop: OneHotEncoder,
    pub month: OneHotEncoder,
}

impl Encoders {
    pub fn build(raw: &RawTables) -> Self {
        let encoders = Self {
            category: OneHotEncoder::fit(
                CATEGORY_PREFIX,
                raw.cats.iter().map(|c| c.item_category_id),
            ),
            shop: OneHotEncoder::fit(SHOP_PREFIX, raw.shops.iter().map(|s| s.shop_id)),
            month: OneHotEncoder::fit(MONTH_PREFIX, 0..12),
        };

        tracing::info!(
            "Encoders built: {} categories, {} shops, {} months",
            encoders.category.len(),
            encoders.shop.len(),
            encoders.month.len()
        );

        encoders
    }
}
