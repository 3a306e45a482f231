//! Загрузка артефакта модели из удалённого blob-хранилища

use anyhow::{Context, Result};
use tokio::sync::OnceCell;

use super::pricing::PricingModel;

pub const DEFAULT_ARTIFACT_PATH: &str = "pricing/model.json";

/// Откуда брать артефакт модели
#[derive(Debug, Clone)]
pub struct ModelSource {
    pub base_url: String,
    pub artifact_path: String,
}

impl ModelSource {
    /// Конфигурация из окружения: MODEL_STORE_URL обязателен,
    /// MODEL_ARTIFACT опционален
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("MODEL_STORE_URL").context("MODEL_STORE_URL is not set")?;
        let artifact_path = std::env::var("MODEL_ARTIFACT")
            .unwrap_or_else(|_| DEFAULT_ARTIFACT_PATH.to_string());
        Ok(Self {
            base_url,
            artifact_path,
        })
    }

    pub fn artifact_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.artifact_path.trim_start_matches('/')
        )
    }
}

async fn download_model(source: &ModelSource) -> Result<PricingModel> {
    let url = source.artifact_url();
    tracing::info!("Downloading model artifact from {url}");

    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("failed to fetch model artifact from {url}"))?
        .error_for_status()
        .context("model store returned an error status")?;
    let bytes = response
        .bytes()
        .await
        .context("failed to read model artifact body")?;

    let model = PricingModel::from_json(&bytes).context("failed to decode model artifact")?;
    tracing::info!("Model successfully loaded from remote storage");
    Ok(model)
}

/// Модель скачивается не больше одного раза на процесс и дальше
/// переиспользуется всеми запросами. Неудачная загрузка не кэшируется.
pub async fn cached_model(source: &ModelSource) -> Result<&'static PricingModel> {
    static MODEL: OnceCell<PricingModel> = OnceCell::const_new();
    MODEL.get_or_try_init(|| download_model(source)).await
}
