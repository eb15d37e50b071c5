//! Окна истории и минимальный набор статистик по ним

use crate::error::{Error, Result};

/// Окно [block_num - neg_from, block_num - neg_to], обе границы включительно
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    neg_from: i32,
    neg_to: i32,
}

/// Окна по умолчанию: 9-6, 6-3, 3-2 и 1-1 месяцев назад
pub const DEFAULT_WINDOWS: [WindowSpec; 4] = [
    WindowSpec { neg_from: 9, neg_to: 6 },
    WindowSpec { neg_from: 6, neg_to: 3 },
    WindowSpec { neg_from: 3, neg_to: 2 },
    WindowSpec { neg_from: 1, neg_to: 1 },
];

impl WindowSpec {
    pub fn new(neg_from: i32, neg_to: i32) -> Result<Self> {
        if neg_to < 1 {
            return Err(Error::InvalidWindow {
                neg_from,
                neg_to,
                reason: "neg_to must be greater than or equal to 1",
            });
        }
        if neg_from < neg_to {
            return Err(Error::InvalidWindow {
                neg_from,
                neg_to,
                reason: "neg_from must be greater than or equal to neg_to",
            });
        }
        Ok(Self { neg_from, neg_to })
    }

    pub fn neg_from(&self) -> i32 {
        self.neg_from
    }

    pub fn neg_to(&self) -> i32 {
        self.neg_to
    }

    /// Абсолютные границы месяцев для прогнозного `block_num`
    pub fn bounds(&self, block_num: i32) -> (i32, i32) {
        (block_num - self.neg_from, block_num - self.neg_to)
    }

    pub fn suffix(&self) -> String {
        format!("_{}_{}", self.neg_from, self.neg_to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStatistic {
    SumValues,
    Median,
    Mean,
    Length,
    StandardDeviation,
    Variance,
    RootMeanSquare,
    Maximum,
    AbsoluteMaximum,
    Minimum,
}

/// Минимальный набор: без автокорреляций, энтропий и т.п.
pub const MINIMAL_STATISTICS: [SummaryStatistic; 10] = [
    SummaryStatistic::SumValues,
    SummaryStatistic::Median,
    SummaryStatistic::Mean,
    SummaryStatistic::Length,
    SummaryStatistic::StandardDeviation,
    SummaryStatistic::Variance,
    SummaryStatistic::RootMeanSquare,
    SummaryStatistic::Maximum,
    SummaryStatistic::AbsoluteMaximum,
    SummaryStatistic::Minimum,
];

impl SummaryStatistic {
    pub fn name(&self) -> &'static str {
        match self {
            SummaryStatistic::SumValues => "sum_values",
            SummaryStatistic::Median => "median",
            SummaryStatistic::Mean => "mean",
            SummaryStatistic::Length => "length",
            SummaryStatistic::StandardDeviation => "standard_deviation",
            SummaryStatistic::Variance => "variance",
            SummaryStatistic::RootMeanSquare => "root_mean_square",
            SummaryStatistic::Maximum => "maximum",
            SummaryStatistic::AbsoluteMaximum => "absolute_maximum",
            SummaryStatistic::Minimum => "minimum",
        }
    }

    /// Ряд непустой; дисперсия и отклонение по генеральной совокупности
    pub fn compute(&self, series: &[f64]) -> f64 {
        let n = series.len() as f64;
        let mean = series.iter().sum::<f64>() / n;
        let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        match self {
            SummaryStatistic::SumValues => series.iter().sum(),
            SummaryStatistic::Median => median(series),
            SummaryStatistic::Mean => mean,
            SummaryStatistic::Length => n,
            SummaryStatistic::StandardDeviation => variance.sqrt(),
            SummaryStatistic::Variance => variance,
            SummaryStatistic::RootMeanSquare => {
                (series.iter().map(|v| v * v).sum::<f64>() / n).sqrt()
            }
            SummaryStatistic::Maximum => series.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            SummaryStatistic::AbsoluteMaximum => {
                series.iter().map(|v| v.abs()).fold(0.0, f64::max)
            }
            SummaryStatistic::Minimum => series.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

fn median(series: &[f64]) -> f64 {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Имена колонок: `{value_column}__{statistic}{suffix}`
pub fn feature_names(value_column: &str, statistics: &[SummaryStatistic], window: &WindowSpec) -> Vec<String> {
    let suffix = window.suffix();
    statistics
        .iter()
        .map(|s| format!("{}__{}{}", value_column, s.name(), suffix))
        .collect()
}

pub fn summarize(series: &[f64], statistics: &[SummaryStatistic]) -> Vec<f64> {
    if series.is_empty() {
        return vec![0.0; statistics.len()];
    }
    statistics.iter().map(|s| s.compute(series)).collect()
}
