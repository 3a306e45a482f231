/// Модель цены и её загрузка

pub mod loader;
pub mod pricing;

pub use loader::{cached_model, ModelSource};
pub use pricing::{ModelArtifact, ModelError, PricingModel};
