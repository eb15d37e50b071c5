//! Общие фикстуры для тестов

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use crate::data::RawTables;
use crate::types::{CategoryRecord, ItemRecord, ShopRecord, TestRecord, TrainRecord};

/// 2 магазина x 2 товара, месяцы 0..=2, тестовый месяц 3.
///
/// Месячные итоги: "1-1" = [1, 0, 2], "2-2" = 5 в месяце 2 (3.0 + 2.5 усекается).
/// Категория в train.csv у одной строки намеренно неверная.
pub fn write_fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(
        root.join("train.csv"),
        ",date,date_block_num,shop_id,item_id,item_price,item_cnt_day,item_category_id\n\
         0,02.01.2013,0,1,1,99.0,1.0,10\n\
         1,05.02.2013,1,1,1,99.0,1.0,10\n\
         2,06.02.2013,1,1,1,99.0,-1.0,10\n\
         3,03.03.2013,2,1,1,99.0,1.0,10\n\
         4,04.03.2013,2,1,1,99.0,1.0,10\n\
         5,10.03.2013,2,2,2,10.0,3.0,99\n\
         6,11.03.2013,2,2,2,10.0,2.5,20\n",
    )
    .unwrap();
    fs::write(root.join("test.csv"), "ID,shop_id,item_id\n0,1,1\n1,2,1\n").unwrap();
    fs::write(
        root.join("item_categories.csv"),
        "item_category_name,item_category_id\nGames,10\nMusic,20\n",
    )
    .unwrap();
    fs::write(root.join("shops.csv"), "shop_name,shop_id\nNorth,1\nSouth,2\n").unwrap();
    fs::write(
        root.join("items.csv"),
        "item_name,item_id,item_category_id\nChess,1,10\nVinyl,2,20\n",
    )
    .unwrap();

    dir
}

/// Синтетический каталог: `n_shops` x `n_items`, категория = item_id % 3.
/// В месяце 0 продаются все товары магазина 0, в месяце 1 только товар 0 магазина 0.
pub fn synthetic_tables(n_shops: i32, n_items: i32) -> RawTables {
    let shops = (0..n_shops)
        .map(|shop_id| ShopRecord {
            shop_id,
            shop_name: None,
        })
        .collect();
    let items = (0..n_items)
        .map(|item_id| ItemRecord {
            item_id,
            item_category_id: item_id % 3,
            item_name: None,
        })
        .collect();
    let cats = (0..3)
        .map(|item_category_id| CategoryRecord {
            item_category_id,
            item_category_name: None,
        })
        .collect();

    let mut train: Vec<TrainRecord> = (0..n_items)
        .map(|item_id| TrainRecord {
            date_block_num: 0,
            shop_id: 0,
            item_id,
            item_cnt_day: 1.0,
            item_category_id: None,
        })
        .collect();
    train.push(TrainRecord {
        date_block_num: 1,
        shop_id: 0,
        item_id: 0,
        item_cnt_day: 4.0,
        item_category_id: None,
    });

    RawTables {
        train,
        test: vec![TestRecord {
            shop_id: 0,
            item_id: 0,
        }],
        cats,
        items,
        shops,
    }
}

/// Артефакт предсказаний в том виде, в каком его пишет обучение
pub fn write_predictions(path: &Path, ids: &[&str], values: &[f64]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("prediction", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(ids.to_vec())) as ArrayRef,
            Arc::new(Float64Array::from(values.to_vec())) as ArrayRef,
        ],
    )
    .unwrap();

    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}
