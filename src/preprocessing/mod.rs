/// Модуль подготовки входных данных модели

pub mod feature_engineering;
pub mod normalization;

pub use feature_engineering::FeatureAssembler;
pub use normalization::{standard_ranges, FeatureRanges};
