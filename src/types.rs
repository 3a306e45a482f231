/// Типы данных для сервиса оценки квартир

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Версия схемы признаков. Меняется вместе с MODEL_COLUMNS.
pub const SCHEMA_VERSION: u32 = 1;

/// Порядок колонок, ожидаемый моделью. Это контракт с артефактом модели:
/// перестановка или переименование ломает совместимость.
pub const MODEL_COLUMNS: [&str; 30] = [
    "city",
    "type",
    "squareMeters",
    "rooms",
    "floor",
    "floorCount",
    "buildYear",
    "latitude",
    "longitude",
    "centreDistance",
    "poiCount",
    "schoolDistance",
    "clinicDistance",
    "postOfficeDistance",
    "kindergartenDistance",
    "restaurantDistance",
    "collegeDistance",
    "pharmacyDistance",
    "ownership",
    "buildingMaterial",
    "condition",
    "hasParkingSpace",
    "hasBalcony",
    "hasElevator",
    "hasSecurity",
    "hasStorageRoom",
    "month",
    "year",
    "age",
    "floor_ratio",
];

/// Сырое значение поля объявления: число или категориальная строка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Числовая интерпретация значения. Числовые строки парсятся,
    /// всё нечисловое (и нечисловые f64) даёт None.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Сырые данные объявления: имя признака -> значение.
/// Состав полей не проверяется, отсутствующие колонки заполняет сборщик.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawListing(pub HashMap<String, FieldValue>);

impl RawListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Число для поля, если оно есть и приводится (см. FieldValue::as_number)
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_number)
    }
}

impl FromIterator<(String, FieldValue)> for RawListing {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Собранный вектор признаков в порядке MODEL_COLUMNS.
/// Строится заново на каждый запрос и после сборки не меняется.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFeatures {
    values: Vec<FieldValue>,
}

impl PreparedFeatures {
    pub(crate) fn from_values(values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(values.len(), MODEL_COLUMNS.len());
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Значение колонки по имени (имена вне схемы дают None)
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        MODEL_COLUMNS
            .iter()
            .position(|&c| c == name)
            .map(|i| &self.values[i])
    }

    /// Пары (колонка, значение) в порядке схемы
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        MODEL_COLUMNS.iter().copied().zip(self.values.iter())
    }
}

// Сериализуется как упорядоченный объект {колонка: значение}
impl Serialize for PreparedFeatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ответ эндпоинта предсказания цены
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    /// Предсказанная цена, PLN
    pub price: f64,
    /// Цена за квадратный метр (нет, если squareMeters отсутствует или <= 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_m2: Option<f64>,
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
}
