/// API сервер оценки стоимости квартир

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber;

use apartment_ml::{
    models::{cached_model, ModelSource, PricingModel},
    preprocessing::{standard_ranges, FeatureAssembler, FeatureRanges},
    types::{PredictResponse, PreparedFeatures, RawListing, SCHEMA_VERSION},
};

#[derive(Clone)]
struct AppState {
    model: Option<&'static PricingModel>,
    ranges: &'static FeatureRanges,
}

#[tokio::main]
async fn main() {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Модель загружается на старте; при неудаче сервис поднимается
    // без неё и отвечает 503 на запросы предсказания
    let model = match ModelSource::from_env() {
        Ok(source) => match cached_model(&source).await {
            Ok(model) => Some(model),
            Err(e) => {
                tracing::error!("Error downloading model: {e:#}");
                None
            }
        },
        Err(e) => {
            tracing::error!("Model source is not configured: {e:#}");
            None
        }
    };

    let state = AppState {
        model,
        ranges: standard_ranges(),
    };

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/predict", post(predict))
        .route("/api/prepare", post(prepare))
        .layer(cors)
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], 8000));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    tracing::info!("Server listening on http://0.0.0.0:8000");
    axum::serve(listener, app).await.unwrap();
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Apartment Price API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": state.model.is_some()
    }))
}

async fn predict(
    State(state): State<AppState>,
    Json(listing): Json<RawListing>,
) -> Result<Json<PredictResponse>, (StatusCode, String)> {
    tracing::info!("Predict request: {} fields", listing.0.len());

    let Some(model) = state.model else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Model is not loaded. Cannot make a prediction.".to_string(),
        ));
    };

    let features = FeatureAssembler::new(state.ranges).prepare(&listing);
    let price = model.predict(&features);
    if !price.is_finite() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Model produced a non-finite prediction".to_string(),
        ));
    }

    // Цена за метр считается от сырой площади, не от нормализованной
    let price_per_m2 = listing
        .numeric("squareMeters")
        .filter(|m2| *m2 > 0.0)
        .map(|m2| price / m2);

    Ok(Json(PredictResponse {
        price,
        price_per_m2,
        schema_version: SCHEMA_VERSION,
        generated_at: chrono::Utc::now(),
    }))
}

/// Отладочный просмотр собранного входа модели
async fn prepare(
    State(state): State<AppState>,
    Json(listing): Json<RawListing>,
) -> Json<PreparedFeatures> {
    Json(FeatureAssembler::new(state.ranges).prepare(&listing))
}
