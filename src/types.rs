/// Типы данных для пайплайна продаж

use serde::{Deserialize, Serialize};

/// Составной идентификатор пары магазин-товар: "{shop_id}-{item_id}"
pub fn make_id(shop_id: i32, item_id: i32) -> String {
    format!("{}-{}", shop_id, item_id)
}

/// Строка train.csv (дневные продажи)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRecord {
    pub date_block_num: i32,
    pub shop_id: i32,
    pub item_id: i32,
    pub item_cnt_day: f64,
    #[serde(default)]
    pub item_category_id: Option<i32>,
}

/// Строка test.csv (пары, для которых нужен прогноз)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub shop_id: i32,
    pub item_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub item_category_id: i32,
    #[serde(default)]
    pub item_category_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopRecord {
    pub shop_id: i32,
    #[serde(default)]
    pub shop_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_id: i32,
    pub item_category_id: i32,
    #[serde(default)]
    pub item_name: Option<String>,
}

/// Элемент полного множества пар магазин x товар
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub shop_id: i32,
    pub item_id: i32,
    pub item_category_id: i32,
}

/// Месячный агрегат продаж
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub date_block_num: i32,
    pub shop_id: i32,
    pub item_id: i32,
    pub id: String,
    pub item_category_id: i32,
    pub item_cnt_month: i64,
}

impl MonthlyRecord {
    /// Синтетическая строка "нет продаж" для пары из universe
    pub fn no_sale(entity: &EntityRecord, date_block_num: i32) -> Self {
        Self {
            date_block_num,
            shop_id: entity.shop_id,
            item_id: entity.item_id,
            id: entity.id.clone(),
            item_category_id: entity.item_category_id,
            item_cnt_month: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesPredictionRequest {
    pub shop_id: i32,
    pub item_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPredictionResponse {
    pub shop_id: i32,
    pub item_id: i32,
    pub predicted_sales: f64,
}
