/// Извлечение признаков за месяц и запись таблицы в CSV

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use sales_forecast::{Dataset, Encoders, ExtractionConfig, FeatureExtraction};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Каталог с train.csv, test.csv, items.csv, shops.csv, item_categories.csv
    #[arg(long, default_value = "../data/raw")]
    data_dir: PathBuf,

    /// Прогнозный месяц; по умолчанию тестовый
    #[arg(long)]
    block_num: Option<i32>,

    /// Не добавлять синтетические строки без продаж
    #[arg(long, default_value_t = false)]
    skip_no_sales: bool,

    #[arg(long, default_value_t = sales_forecast::data::DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "features.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let dataset = Dataset::load(&args.data_dir)
        .with_context(|| format!("Failed to build dataset from {}", args.data_dir.display()))?;
    let encoders = Encoders::build(dataset.raw());

    let config = ExtractionConfig {
        sample_rate: args.sample_rate,
        seed: args.seed,
        ..ExtractionConfig::default()
    };
    let extraction = FeatureExtraction::with_config(&dataset, &encoders, config);

    let block_num = args.block_num.unwrap_or_else(|| dataset.test_block_num());
    let features = extraction.extract_features(block_num, !args.skip_no_sales)?;

    features.write_csv(&args.output)?;
    tracing::info!(
        "Wrote {} rows to {}",
        features.len(),
        args.output.display()
    );

    Ok(())
}
