//! Модель оценки стоимости квартиры

use std::collections::HashMap;

use ndarray::Array1;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{FieldValue, PreparedFeatures, MODEL_COLUMNS, SCHEMA_VERSION};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to decode model artifact: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("artifact schema version {actual} does not match expected {expected}")]
    SchemaVersion { expected: u32, actual: u32 },
    #[error("artifact columns do not match the feature schema")]
    ColumnMismatch,
    #[error("artifact has {weights} weights for {columns} columns")]
    WeightCount { weights: usize, columns: usize },
}

/// Сериализованный артефакт: линейный скорер поверх закодированного
/// вектора признаков
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub columns: Vec<String>,
    pub intercept: f64,
    pub weights: Vec<f64>,
    /// Категориальная колонка -> категория -> числовой код
    #[serde(default)]
    pub encodings: HashMap<String, HashMap<String, f64>>,
}

/// Обученная модель. После загрузки только читается,
/// предсказание синхронное.
pub struct PricingModel {
    intercept: f64,
    weights: Array1<f64>,
    encodings: HashMap<String, HashMap<String, f64>>,
}

impl PricingModel {
    /// Валидирует артефакт против схемы признаков и собирает модель.
    /// Несовпадение схемы ловится здесь, а не в момент предсказания.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.schema_version != SCHEMA_VERSION {
            return Err(ModelError::SchemaVersion {
                expected: SCHEMA_VERSION,
                actual: artifact.schema_version,
            });
        }
        if artifact.columns.len() != MODEL_COLUMNS.len()
            || artifact.columns.iter().zip(MODEL_COLUMNS.iter()).any(|(a, b)| a != b)
        {
            return Err(ModelError::ColumnMismatch);
        }
        if artifact.weights.len() != artifact.columns.len() {
            return Err(ModelError::WeightCount {
                weights: artifact.weights.len(),
                columns: artifact.columns.len(),
            });
        }
        Ok(Self {
            intercept: artifact.intercept,
            weights: Array1::from(artifact.weights),
            encodings: artifact.encodings,
        })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        Self::from_artifact(artifact)
    }

    /// Предсказанная цена для собранного вектора признаков
    pub fn predict(&self, features: &PreparedFeatures) -> f64 {
        let x: Array1<f64> = features
            .iter()
            .map(|(column, value)| self.encode(column, value))
            .collect();
        self.weights.dot(&x) + self.intercept
    }

    // NaN после мягкой коэрции и неизвестные категории кодируются нулём
    fn encode(&self, column: &str, value: &FieldValue) -> f64 {
        match value {
            FieldValue::Number(n) if n.is_finite() => *n,
            FieldValue::Number(_) => 0.0,
            FieldValue::Text(s) => self
                .encodings
                .get(column)
                .and_then(|codes| codes.get(s))
                .copied()
                .unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(schema_version: u32, columns: Vec<String>, weights: Vec<f64>) -> ModelArtifact {
        ModelArtifact {
            schema_version,
            columns,
            intercept: 100_000.0,
            weights,
            encodings: HashMap::new(),
        }
    }

    fn schema_columns() -> Vec<String> {
        MODEL_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn accepts_matching_artifact() {
        let artifact = artifact(SCHEMA_VERSION, schema_columns(), vec![0.0; MODEL_COLUMNS.len()]);
        assert!(PricingModel::from_artifact(artifact).is_ok());
    }

    #[test]
    fn rejects_wrong_schema_version() {
        let artifact = artifact(99, schema_columns(), vec![0.0; MODEL_COLUMNS.len()]);
        assert!(matches!(
            PricingModel::from_artifact(artifact),
            Err(ModelError::SchemaVersion { expected: SCHEMA_VERSION, actual: 99 })
        ));
    }

    #[test]
    fn rejects_reordered_columns() {
        let mut columns = schema_columns();
        columns.swap(0, 1);
        let artifact = artifact(SCHEMA_VERSION, columns, vec![0.0; MODEL_COLUMNS.len()]);
        assert!(matches!(
            PricingModel::from_artifact(artifact),
            Err(ModelError::ColumnMismatch)
        ));
    }

    #[test]
    fn rejects_weight_count_mismatch() {
        let artifact = artifact(SCHEMA_VERSION, schema_columns(), vec![0.0; 3]);
        assert!(matches!(
            PricingModel::from_artifact(artifact),
            Err(ModelError::WeightCount { weights: 3, .. })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            PricingModel::from_json(b"not json"),
            Err(ModelError::Decode(_))
        ));
    }

    #[test]
    fn predict_scores_linear_combination() {
        let mut weights = vec![0.0; MODEL_COLUMNS.len()];
        // Вес только на squareMeters
        let sqm = MODEL_COLUMNS.iter().position(|&c| c == "squareMeters").unwrap();
        weights[sqm] = 1_000_000.0;
        let mut artifact = artifact(SCHEMA_VERSION, schema_columns(), weights);
        artifact
            .encodings
            .insert("city".to_string(), HashMap::from([("krakow".to_string(), 1.0)]));
        let model = PricingModel::from_artifact(artifact).unwrap();

        let values = MODEL_COLUMNS
            .iter()
            .map(|&c| match c {
                "squareMeters" => FieldValue::Number(0.5),
                "city" => FieldValue::from("krakow"),
                _ => FieldValue::Number(0.0),
            })
            .collect();
        let features = crate::types::PreparedFeatures::from_values(values);
        assert_eq!(model.predict(&features), 0.5 * 1_000_000.0 + 100_000.0);
    }

    #[test]
    fn unknown_category_and_nan_encode_to_zero() {
        let mut weights = vec![0.0; MODEL_COLUMNS.len()];
        for w in weights.iter_mut() {
            *w = 1.0;
        }
        let model =
            PricingModel::from_artifact(artifact(SCHEMA_VERSION, schema_columns(), weights))
                .unwrap();
        let values = MODEL_COLUMNS
            .iter()
            .map(|&c| match c {
                "city" => FieldValue::from("atlantis"),
                "year" => FieldValue::Number(f64::NAN),
                _ => FieldValue::Number(0.0),
            })
            .collect();
        let features = crate::types::PreparedFeatures::from_values(values);
        // Оба значения дают нулевой вклад
        assert_eq!(model.predict(&features), 100_000.0);
    }
}
