//! Feature engineering для месячного прогноза продаж

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ExtractionConfig;
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::preprocessing::encoders::{Encoders, UnknownPolicy};
use crate::preprocessing::frame::{FeatureFrame, ITEM_CATEGORY_ID, ITEM_CNT_MONTH, SHOP_ID};
use crate::preprocessing::window::{feature_names, summarize, WindowSpec};

pub const IS_NEW_ID: &str = "is_new_id";
pub const DAYS_IN_MONTH: &str = "days_in_month";

/// Дней в месяце по индексу 0..12; февраль всегда 28
const MONTH_LENGTHS: [f64; 12] = [
    31.0, 28.0, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0,
];

/// Датасет и кодировщики только заимствуются, поэтому несколько
/// экземпляров могут работать с ними одновременно
pub struct FeatureExtraction<'a> {
    dataset: &'a Dataset,
    encoders: &'a Encoders,
    config: ExtractionConfig,
}

impl<'a> FeatureExtraction<'a> {
    pub fn new(dataset: &'a Dataset, encoders: &'a Encoders) -> Self {
        Self::with_config(dataset, encoders, ExtractionConfig::default())
    }

    pub fn with_config(dataset: &'a Dataset, encoders: &'a Encoders, config: ExtractionConfig) -> Self {
        Self {
            dataset,
            encoders,
            config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// One-hot категории и магазина.
    ///
    /// При `UnknownPolicy::Drop` строки с категорией или магазином вне
    /// каталога отбрасываются (как inner join), их число пишется в лог.
    pub fn add_category(&self, frame: FeatureFrame, drop_origin: bool) -> Result<FeatureFrame> {
        let categories = key_column(&frame, ITEM_CATEGORY_ID)?;
        let shops = key_column(&frame, SHOP_ID)?;

        let policy = self.config.unknown_policy;
        let category = self.encoders.category.transform(&categories, policy)?;
        let shop = self.encoders.shop.transform(&shops, policy)?;

        let mut frame = frame
            .append_columns(self.encoders.category.columns(), category.values)
            .append_columns(self.encoders.shop.columns(), shop.values);

        if policy == UnknownPolicy::Drop {
            let keep: Vec<usize> = (0..frame.len())
                .filter(|&i| category.known[i] && shop.known[i])
                .collect();
            if keep.len() < frame.len() {
                tracing::warn!(
                    "Dropped {} rows with category or shop unknown to encoders",
                    frame.len() - keep.len()
                );
                frame = frame.select_rows(&keep);
            }
        }

        if drop_origin {
            frame = frame.drop_columns(&[ITEM_CATEGORY_ID, SHOP_ID]);
        }

        Ok(frame)
    }

    /// `is_new_id` = 1, если у id нет ни одной строки до `block_num`
    pub fn add_status(&self, frame: FeatureFrame, block_num: i32) -> FeatureFrame {
        let past: HashSet<&str> = if block_num <= 0 {
            HashSet::new()
        } else {
            self.dataset
                .range(0, block_num - 1)
                .iter()
                .map(|r| r.id.as_str())
                .collect()
        };

        let flags = frame
            .ids()
            .iter()
            .map(|id| if past.contains(id.as_str()) { 0.0 } else { 1.0 })
            .collect();

        frame.append_column(IS_NEW_ID, flags)
    }

    /// Календарь: месяц = block_num mod 12, число дней и one-hot месяца
    pub fn add_time_based(&self, frame: FeatureFrame, block_num: i32) -> FeatureFrame {
        let month = block_num.rem_euclid(12);
        let n_rows = frame.len();

        let month_encoder = &self.encoders.month;
        let encoded = month_encoder
            .encode(month)
            .unwrap_or_else(|| vec![0.0; month_encoder.len()]);
        let block = Array2::from_shape_fn((n_rows, month_encoder.len()), |(_, j)| encoded[j]);

        frame
            .append_column(DAYS_IN_MONTH, vec![MONTH_LENGTHS[month as usize]; n_rows])
            .append_columns(month_encoder.columns(), block)
    }

    /// Статистики по истории продаж в окне
    /// [block_num - neg_from, block_num - neg_to]; нет истории -> 0
    pub fn add_tsfresh(
        &self,
        frame: FeatureFrame,
        block_num: i32,
        neg_from: i32,
        neg_to: i32,
    ) -> Result<FeatureFrame> {
        let window = WindowSpec::new(neg_from, neg_to)?;
        Ok(self.add_window(frame, block_num, &window))
    }

    fn add_window(&self, frame: FeatureFrame, block_num: i32, window: &WindowSpec) -> FeatureFrame {
        let (block_from, block_to) = window.bounds(block_num);
        let wanted: HashSet<&str> = frame.ids().iter().map(|id| id.as_str()).collect();

        // range отсортирован по (date_block_num, id): ряды id идут по времени
        let mut series: HashMap<&str, Vec<f64>> = HashMap::new();
        for r in self.dataset.range(block_from, block_to) {
            if wanted.contains(r.id.as_str()) {
                series
                    .entry(r.id.as_str())
                    .or_default()
                    .push(r.item_cnt_month as f64);
            }
        }

        let statistics = &self.config.statistics;
        let names = feature_names(ITEM_CNT_MONTH, statistics, window);
        let lookup: HashMap<String, Vec<f64>> = series
            .into_iter()
            .map(|(id, values)| (id.to_string(), summarize(&values, statistics)))
            .collect();

        tracing::debug!(
            "Window {}..={} (suffix {}): history for {} of {} ids",
            block_from,
            block_to,
            window.suffix(),
            lookup.len(),
            wanted.len()
        );

        frame.left_join(&names, &lookup, 0.0)
    }

    pub fn add_features(&self, frame: FeatureFrame, block_num: i32) -> Result<FeatureFrame> {
        let mut frame = self.add_category(frame, true)?;
        frame = self.add_time_based(frame, block_num);
        for window in &self.config.windows {
            frame = self.add_window(frame, block_num, window);
        }
        Ok(frame)
    }

    pub fn extract_features(&self, block_num: i32, include_no_sales: bool) -> Result<FeatureFrame> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.extract_features_with_rng(block_num, include_no_sales, &mut rng)
    }

    pub fn extract_features_with_rng<R: Rng + ?Sized>(
        &self,
        block_num: i32,
        include_no_sales: bool,
        rng: &mut R,
    ) -> Result<FeatureFrame> {
        let start_time = Instant::now();
        tracing::info!("Extract features for block_num={}", block_num);

        let mut rows = self.dataset.get(block_num, None);
        if include_no_sales {
            let no_sales = self.dataset.generate(block_num, self.config.sample_rate, rng)?;
            tracing::info!("Added {} no-sale rows to {} sales rows", no_sales.len(), rows.len());
            rows.extend(no_sales);
        }

        let frame = self.add_features(FeatureFrame::from_records(&rows), block_num)?;

        tracing::info!(
            "Extracted {} rows x {} columns for block_num={} in {:.2?}",
            frame.len(),
            frame.columns().len(),
            block_num,
            start_time.elapsed()
        );
        Ok(frame)
    }
}

fn key_column(frame: &FeatureFrame, name: &str) -> Result<Vec<i32>> {
    frame.column_i32(name).ok_or_else(|| Error::MissingColumn {
        column: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawTables;
    use crate::test_support::{synthetic_tables, write_fixture};
    use crate::types::{make_id, MonthlyRecord};

    fn fixture() -> (Dataset, Encoders) {
        let dir = write_fixture();
        let dataset = Dataset::load(dir.path()).unwrap();
        let encoders = Encoders::build(dataset.raw());
        (dataset, encoders)
    }

    fn frame_for(dataset: &Dataset, block_num: i32) -> FeatureFrame {
        FeatureFrame::from_records(&dataset.get(block_num, None))
    }

    fn foreign_row(block: i32) -> MonthlyRecord {
        MonthlyRecord {
            date_block_num: block,
            shop_id: 1,
            item_id: 1,
            id: make_id(1, 1),
            item_category_id: 77,
            item_cnt_month: 1,
        }
    }

    #[test]
    fn test_add_category() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);

        let frame = fe.add_category(frame_for(&dataset, 2), true).unwrap();
        assert_eq!(frame.len(), 2);
        assert!(frame.column(SHOP_ID).is_none());
        assert!(frame.column(ITEM_CATEGORY_ID).is_none());
        assert_eq!(frame.value("2-2", "category_20"), Some(1.0));
        assert_eq!(frame.value("2-2", "category_10"), Some(0.0));
        assert_eq!(frame.value("2-2", "shop_2"), Some(1.0));
        assert_eq!(frame.value("1-1", "shop_1"), Some(1.0));

        let kept = fe.add_category(frame_for(&dataset, 2), false).unwrap();
        assert!(kept.column(SHOP_ID).is_some());
    }

    #[test]
    fn test_add_category_unknown_policies() {
        let (dataset, encoders) = fixture();
        let rows = vec![foreign_row(2), dataset.get(2, None)[1].clone()];

        let drop = FeatureExtraction::new(&dataset, &encoders);
        let frame = drop.add_category(FeatureFrame::from_records(&rows), true).unwrap();
        assert_eq!(frame.ids(), &["2-2".to_string()]);

        let zero_config = ExtractionConfig {
            unknown_policy: UnknownPolicy::Zero,
            ..ExtractionConfig::default()
        };
        let zero = FeatureExtraction::with_config(&dataset, &encoders, zero_config);
        let frame = zero.add_category(FeatureFrame::from_records(&rows), true).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.value("1-1", "category_10"), Some(0.0));
        assert_eq!(frame.value("1-1", "category_20"), Some(0.0));

        let reject_config = ExtractionConfig {
            unknown_policy: UnknownPolicy::Reject,
            ..ExtractionConfig::default()
        };
        let reject = FeatureExtraction::with_config(&dataset, &encoders, reject_config);
        let err = reject
            .add_category(FeatureFrame::from_records(&rows), true)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownValue { value: 77, .. }));
    }

    #[test]
    fn test_add_category_requires_key_columns() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);
        let frame = fe.add_category(frame_for(&dataset, 2), true).unwrap();

        let err = fe.add_category(frame, true).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }

    #[test]
    fn test_add_status() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);

        let frame = fe.add_status(frame_for(&dataset, 2), 2);
        assert_eq!(frame.value("1-1", IS_NEW_ID), Some(0.0));
        assert_eq!(frame.value("2-2", IS_NEW_ID), Some(1.0));

        let frame = fe.add_status(frame_for(&dataset, 0), 0);
        assert_eq!(frame.value("1-1", IS_NEW_ID), Some(1.0));

        let frame = fe.add_status(frame_for(&dataset, 3), 3);
        assert_eq!(frame.value("1-1", IS_NEW_ID), Some(0.0));
        assert_eq!(frame.value("2-1", IS_NEW_ID), Some(1.0));
    }

    #[test]
    fn test_add_time_based() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);

        // 13 mod 12 = 1 -> февраль
        let frame = fe.add_time_based(frame_for(&dataset, 2), 13);
        assert!(frame.column("month").is_none());
        assert_eq!(frame.value("1-1", DAYS_IN_MONTH), Some(28.0));
        assert_eq!(frame.value("1-1", "mnt_1"), Some(1.0));
        assert_eq!(frame.value("1-1", "mnt_0"), Some(0.0));
        let active: f64 = (0..12)
            .map(|m| frame.value("2-2", &format!("mnt_{}", m)).unwrap())
            .sum();
        assert_eq!(active, 1.0);

        let frame = fe.add_time_based(frame_for(&dataset, 2), 11);
        assert_eq!(frame.value("1-1", DAYS_IN_MONTH), Some(31.0));
        assert_eq!(frame.value("1-1", "mnt_11"), Some(1.0));
    }

    #[test]
    fn test_add_tsfresh_uses_window_history() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);

        // месяцы 0..=2 для прогноза месяца 3; у "1-1" ряд [1, 0, 2]
        let frame = fe.add_tsfresh(frame_for(&dataset, 3), 3, 3, 1).unwrap();
        assert_eq!(frame.value("1-1", "item_cnt_month__sum_values_3_1"), Some(3.0));
        assert_eq!(frame.value("1-1", "item_cnt_month__length_3_1"), Some(3.0));
        assert_eq!(frame.value("1-1", "item_cnt_month__mean_3_1"), Some(1.0));
        assert_eq!(frame.value("1-1", "item_cnt_month__maximum_3_1"), Some(2.0));
        assert_eq!(frame.value("1-1", "item_cnt_month__minimum_3_1"), Some(0.0));
    }

    #[test]
    fn test_add_tsfresh_fills_missing_history_with_zero() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);

        let frame = fe.add_tsfresh(frame_for(&dataset, 3), 3, 3, 1).unwrap();
        let suffixed: Vec<&String> = frame
            .columns()
            .iter()
            .filter(|c| c.ends_with("_3_1"))
            .collect();
        assert_eq!(suffixed.len(), 10);
        for column in suffixed {
            assert_eq!(frame.value("2-1", column), Some(0.0));
        }
    }

    #[test]
    fn test_add_tsfresh_invalid_window() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);

        let err = fe.add_tsfresh(frame_for(&dataset, 3), 3, 3, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { .. }));
        let err = fe.add_tsfresh(frame_for(&dataset, 3), 3, 1, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { .. }));
        assert!(fe.add_tsfresh(frame_for(&dataset, 3), 3, 2, 2).is_ok());
    }

    #[test]
    fn test_add_features_pipeline() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);

        let frame = fe.add_features(frame_for(&dataset, 3), 3).unwrap();
        assert_eq!(frame.len(), 2);
        for suffix in ["_9_6", "_6_3", "_3_2", "_1_1"] {
            let count = frame.columns().iter().filter(|c| c.ends_with(suffix)).count();
            assert_eq!(count, 10, "suffix {}", suffix);
        }
        // 9..6 месяцев назад данных нет
        assert_eq!(frame.value("1-1", "item_cnt_month__sum_values_9_6"), Some(0.0));
        assert_eq!(frame.value("1-1", "item_cnt_month__sum_values_6_3"), Some(1.0));
        assert_eq!(frame.value("1-1", "item_cnt_month__length_3_2"), Some(2.0));
        assert_eq!(frame.value("1-1", "item_cnt_month__sum_values_1_1"), Some(2.0));
        assert_eq!(frame.value("1-1", "mnt_3"), Some(1.0));
        assert_eq!(frame.value("1-1", DAYS_IN_MONTH), Some(30.0));
    }

    #[test]
    fn test_extract_features_is_idempotent() {
        let (dataset, encoders) = fixture();
        let fe = FeatureExtraction::new(&dataset, &encoders);

        let first = fe.extract_features(2, false).unwrap();
        let second = fe.extract_features(2, false).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_extract_features_with_no_sales() {
        let dataset = Dataset::build(synthetic_tables(10, 30));
        let encoders = Encoders::build(dataset.raw());
        let config = ExtractionConfig {
            sample_rate: 0.5,
            seed: Some(11),
            ..ExtractionConfig::default()
        };
        let fe = FeatureExtraction::with_config(&dataset, &encoders, config);

        let frame = fe.extract_features(0, true).unwrap();
        assert_eq!(frame.len(), 30 + 15);

        let zeros = frame
            .column(ITEM_CNT_MONTH)
            .unwrap()
            .iter()
            .filter(|&&v| v == 0.0)
            .count();
        assert_eq!(zeros, 15);

        // одинаковый seed -> одинаковая выборка
        assert_eq!(frame, fe.extract_features(0, true).unwrap());
    }

    #[test]
    fn test_extract_features_propagates_sampling_error() {
        let mut raw: RawTables = synthetic_tables(1, 3);
        raw.test.clear();
        let dataset = Dataset::build(raw);
        let encoders = Encoders::build(dataset.raw());
        let config = ExtractionConfig {
            sample_rate: 1.0,
            ..ExtractionConfig::default()
        };
        let fe = FeatureExtraction::with_config(&dataset, &encoders, config);

        let err = fe.extract_features(0, true).unwrap_err();
        assert!(matches!(err, Error::Sampling { .. }));
    }

    #[test]
    fn test_concurrent_extractions_share_dataset() {
        let (dataset, encoders) = fixture();

        let frames: Vec<FeatureFrame> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..3)
                .map(|_| {
                    scope.spawn(|| {
                        FeatureExtraction::new(&dataset, &encoders)
                            .extract_features(3, false)
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(frames.windows(2).all(|w| w[0] == w[1]));
    }
}
