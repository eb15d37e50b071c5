//! Таблица признаков: ключ `id` и именованные числовые колонки

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use ndarray::{s, Array1, Array2, ArrayView1, Axis};

use crate::types::MonthlyRecord;

pub const DATE_BLOCK_NUM: &str = "date_block_num";
pub const SHOP_ID: &str = "shop_id";
pub const ITEM_ID: &str = "item_id";
pub const ITEM_CATEGORY_ID: &str = "item_category_id";
pub const ITEM_CNT_MONTH: &str = "item_cnt_month";

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    ids: Vec<String>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureFrame {
    pub fn new(ids: Vec<String>, columns: Vec<String>, values: Array2<f64>) -> Self {
        assert_eq!(ids.len(), values.nrows(), "row count mismatch");
        assert_eq!(columns.len(), values.ncols(), "column count mismatch");
        Self {
            ids,
            columns,
            values,
        }
    }

    pub fn from_records(records: &[MonthlyRecord]) -> Self {
        let columns = [DATE_BLOCK_NUM, SHOP_ID, ITEM_ID, ITEM_CATEGORY_ID, ITEM_CNT_MONTH]
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        let mut values = Array2::zeros((records.len(), columns.len()));
        for (i, r) in records.iter().enumerate() {
            values[[i, 0]] = r.date_block_num as f64;
            values[[i, 1]] = r.shop_id as f64;
            values[[i, 2]] = r.item_id as f64;
            values[[i, 3]] = r.item_category_id as f64;
            values[[i, 4]] = r.item_cnt_month as f64;
        }

        Self::new(records.iter().map(|r| r.id.clone()).collect(), columns, values)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|i| self.values.column(i))
    }

    /// Целочисленная колонка-ключ (shop_id, item_category_id, ...)
    pub fn column_i32(&self, name: &str) -> Option<Vec<i32>> {
        self.column(name)
            .map(|col| col.iter().map(|&v| v as i32).collect())
    }

    /// Значение ячейки по id строки; для тестов и отладки
    pub fn value(&self, id: &str, column: &str) -> Option<f64> {
        let row = self.ids.iter().position(|i| i == id)?;
        let col = self.column_index(column)?;
        Some(self.values[[row, col]])
    }

    /// Новые колонки справа; повторяющиеся имена заменяют старые
    pub fn append_columns(self, names: &[String], block: Array2<f64>) -> Self {
        assert_eq!(block.nrows(), self.len(), "appended block row count mismatch");
        assert_eq!(block.ncols(), names.len(), "appended block column count mismatch");

        let frame = self.drop_columns(names);
        let width = frame.columns.len();
        let mut values = Array2::zeros((frame.len(), width + names.len()));
        values.slice_mut(s![.., ..width]).assign(&frame.values);
        values.slice_mut(s![.., width..]).assign(&block);
        let mut columns = frame.columns;
        columns.extend(names.iter().cloned());

        Self {
            ids: frame.ids,
            columns,
            values,
        }
    }

    pub fn append_column(self, name: &str, values: Vec<f64>) -> Self {
        let block = Array1::from(values).insert_axis(Axis(1));
        self.append_columns(&[name.to_string()], block)
    }

    /// Отсутствующие имена пропускаются
    pub fn drop_columns<S: AsRef<str>>(self, names: &[S]) -> Self {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !names.iter().any(|n| n.as_ref() == c.as_str()))
            .map(|(i, _)| i)
            .collect();

        if keep.len() == self.columns.len() {
            return self;
        }

        Self {
            values: self.values.select(Axis(1), &keep),
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            ids: self.ids,
        }
    }

    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            ids: rows.iter().map(|&i| self.ids[i].clone()).collect(),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), rows),
        }
    }

    /// Левое соединение по id: строки без пары получают `fill`
    pub fn left_join(self, names: &[String], lookup: &HashMap<String, Vec<f64>>, fill: f64) -> Self {
        let mut block = Array2::from_elem((self.len(), names.len()), fill);
        for (i, id) in self.ids.iter().enumerate() {
            if let Some(row) = lookup.get(id) {
                for (j, v) in row.iter().enumerate() {
                    block[[i, j]] = *v;
                }
            }
        }
        self.append_columns(names, block)
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;

        let mut header = vec!["id".to_string()];
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header)?;

        for (id, row) in self.ids.iter().zip(self.values.rows()) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(id.clone());
            record.extend(row.iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}
