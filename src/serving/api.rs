/// HTTP API для получения предсказаний

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::Error;
use crate::serving::PredictionStore;
use crate::types::{SalesPredictionRequest, SalesPredictionResponse};

#[derive(Clone)]
pub struct AppState {
    predictions: Arc<PredictionStore>,
}

#[derive(Debug)]
pub enum ApiError {
    /// 404 - id нет в артефакте
    NotFound(String),
    /// 500
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

pub fn router(predictions: Arc<PredictionStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict_sales/", post(predict_sales))
        .layer(cors)
        .with_state(AppState { predictions })
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Sales Forecast API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "predictions": state.predictions.len()
    }))
}

async fn predict_sales(
    State(state): State<AppState>,
    Json(request): Json<SalesPredictionRequest>,
) -> Result<Json<SalesPredictionResponse>, ApiError> {
    tracing::info!(
        "Predict sales request: shop_id={}, item_id={}",
        request.shop_id,
        request.item_id
    );

    let predicted_sales = state.predictions.lookup(request.shop_id, request.item_id)?;

    Ok(Json(SalesPredictionResponse {
        shop_id: request.shop_id,
        item_id: request.item_id,
        predicted_sales,
    }))
}
