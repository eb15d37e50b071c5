//! Месячный датасет продаж: полное множество пар и месячные агрегаты

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::store::{RawStore, RawTables};
use crate::error::{Error, Result};
use crate::types::{make_id, EntityRecord, MonthlyRecord};

/// Доля no-sale строк относительно числа пар, продававшихся в месяце
pub const DEFAULT_SAMPLE_RATE: f64 = 0.05;

/// Неизменяем после `build`: все запросы возвращают новые таблицы
#[derive(Debug, Clone)]
pub struct Dataset {
    raw: RawTables,
    ids: Vec<EntityRecord>,
    // отсортировано по (date_block_num, id)
    data: Vec<MonthlyRecord>,
    test_block_num: i32,
}

impl Dataset {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let raw = RawStore::load(dir)?;
        Ok(Self::build(raw))
    }

    pub fn build(raw: RawTables) -> Self {
        let ids = generate_full_ids(&raw);
        let (data, test_block_num) = prepare_dataset(&raw);

        tracing::info!(
            "Dataset built: {} ids in universe, {} monthly rows, test date block num: {}",
            ids.len(),
            data.len(),
            test_block_num
        );

        Self {
            raw,
            ids,
            data,
            test_block_num,
        }
    }

    pub fn raw(&self) -> &RawTables {
        &self.raw
    }

    pub fn ids(&self) -> &[EntityRecord] {
        &self.ids
    }

    pub fn data(&self) -> &[MonthlyRecord] {
        &self.data
    }

    /// Индекс тестового месяца: max(date_block_num в train) + 1
    pub fn test_block_num(&self) -> i32 {
        self.test_block_num
    }

    /// Строки с block_from <= date_block_num <= block_to; без копирования
    pub fn range(&self, block_from: i32, block_to: i32) -> &[MonthlyRecord] {
        let lo = self.data.partition_point(|r| r.date_block_num < block_from);
        let hi = self.data.partition_point(|r| r.date_block_num <= block_to);
        if hi <= lo {
            return &[];
        }
        &self.data[lo..hi]
    }

    /// `block_to` по умолчанию равен `block_from`. Пустой результат не ошибка.
    pub fn get(&self, block_from: i32, block_to: Option<i32>) -> Vec<MonthlyRecord> {
        let block_to = block_to.unwrap_or(block_from);
        self.range(block_from, block_to).to_vec()
    }

    /// Негативная выборка: пары из universe без продаж в `block_num`.
    ///
    /// Размер выборки `floor(sample_rate * n_present)`, без возвращения, порядок
    /// не определён. Месяц без строк даёт пустой результат.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        block_num: i32,
        sample_rate: f64,
        rng: &mut R,
    ) -> Result<Vec<MonthlyRecord>> {
        let present: HashSet<&str> = self
            .range(block_num, block_num)
            .iter()
            .map(|r| r.id.as_str())
            .collect();

        if present.is_empty() {
            tracing::debug!("No rows at block_num={}, nothing to sample", block_num);
            return Ok(Vec::new());
        }

        let requested = (present.len() as f64 * sample_rate).floor() as usize;

        let complement: Vec<&EntityRecord> = self
            .ids
            .iter()
            .filter(|e| !present.contains(e.id.as_str()))
            .collect();

        if requested > complement.len() {
            return Err(Error::Sampling {
                requested,
                available: complement.len(),
            });
        }

        let rows: Vec<MonthlyRecord> = complement
            .choose_multiple(rng, requested)
            .map(|entity| MonthlyRecord::no_sale(entity, block_num))
            .collect();

        tracing::debug!(
            "Generated {} no-sale rows for block_num={} ({} present)",
            rows.len(),
            block_num,
            present.len()
        );

        Ok(rows)
    }
}

fn generate_full_ids(raw: &RawTables) -> Vec<EntityRecord> {
    let mut ids = Vec::with_capacity(raw.items.len() * raw.shops.len());
    for item in &raw.items {
        for shop in &raw.shops {
            ids.push(EntityRecord {
                id: make_id(shop.shop_id, item.item_id),
                shop_id: shop.shop_id,
                item_id: item.item_id,
                item_category_id: item.item_category_id,
            });
        }
    }
    ids
}

struct Accumulator {
    shop_id: i32,
    item_id: i32,
    item_category_id: i32,
    total: f64,
}

fn prepare_dataset(raw: &RawTables) -> (Vec<MonthlyRecord>, i32) {
    let test_block_num = raw
        .train
        .iter()
        .map(|r| r.date_block_num)
        .max()
        .map_or(0, |m| m + 1);

    let item_category: HashMap<i32, i32> = raw
        .items
        .iter()
        .map(|i| (i.item_id, i.item_category_id))
        .collect();
    let shops: HashSet<i32> = raw.shops.iter().map(|s| s.shop_id).collect();

    // train + test как отдельный месяц с нулевыми продажами;
    // категория из train игнорируется и берётся из каталога товаров
    let rows = raw
        .train
        .iter()
        .map(|r| (r.date_block_num, r.shop_id, r.item_id, r.item_cnt_day))
        .chain(
            raw.test
                .iter()
                .map(|r| (test_block_num, r.shop_id, r.item_id, 0.0)),
        );

    let mut groups: BTreeMap<(i32, String), Accumulator> = BTreeMap::new();
    let mut unknown_items = 0usize;
    let mut unknown_shops = 0usize;

    for (block, shop_id, item_id, cnt) in rows {
        let Some(&item_category_id) = item_category.get(&item_id) else {
            unknown_items += 1;
            continue;
        };
        if !shops.contains(&shop_id) {
            unknown_shops += 1;
            continue;
        }

        groups
            .entry((block, make_id(shop_id, item_id)))
            .or_insert(Accumulator {
                shop_id,
                item_id,
                item_category_id,
                total: 0.0,
            })
            .total += cnt;
    }

    if unknown_items > 0 {
        tracing::warn!("Dropped {} sales rows with items missing from catalog", unknown_items);
    }
    if unknown_shops > 0 {
        tracing::warn!("Dropped {} sales rows with shops missing from catalog", unknown_shops);
    }

    let data = groups
        .into_iter()
        .map(|((date_block_num, id), acc)| MonthlyRecord {
            date_block_num,
            shop_id: acc.shop_id,
            item_id: acc.item_id,
            id,
            item_category_id: acc.item_category_id,
            // усечение к нулю, без ограничения снизу (возвраты)
            item_cnt_month: acc.total.trunc() as i64,
        })
        .collect();

    (data, test_block_num)
}
