//! Сборка вектора признаков из сырого объявления

use crate::preprocessing::FeatureRanges;
use crate::types::{FieldValue, PreparedFeatures, RawListing, MODEL_COLUMNS};

/// Возраст здания по умолчанию, когда вычисленный невалиден
const DEFAULT_AGE: f64 = 30.0;
/// Максимальный правдоподобный возраст здания, лет
const MAX_AGE: f64 = 200.0;

/// Колонки, которые модель ждёт в исходных единицах: не нормализуются
const EXCLUDED_FROM_NORMALIZATION: [&str; 8] = [
    "buildYear",
    "year",
    "month",
    "latitude",
    "longitude",
    "floor",
    "floorCount",
    "floor_ratio",
];

/// Результат вычисления производного признака
#[derive(Debug, Clone, Copy, PartialEq)]
enum Derived {
    Computed(f64),
    /// Операнды отсутствовали или результат вне допустимого - подставлен дефолт
    Defaulted(f64),
}

impl Derived {
    fn value(self) -> f64 {
        match self {
            Derived::Computed(v) | Derived::Defaulted(v) => v,
        }
    }
}

/// age = year - buildYear, валидный диапазон [0, 200]
fn derive_age(year: Option<f64>, build_year: Option<f64>) -> Derived {
    match (year, build_year) {
        (Some(y), Some(b)) => {
            let age = y - b;
            if (0.0..=MAX_AGE).contains(&age) {
                Derived::Computed(age)
            } else {
                Derived::Defaulted(DEFAULT_AGE)
            }
        }
        _ => Derived::Defaulted(DEFAULT_AGE),
    }
}

/// floor_ratio = floor / floorCount при floorCount > 0, иначе 0
fn derive_floor_ratio(floor: Option<f64>, floor_count: Option<f64>) -> Derived {
    match (floor, floor_count) {
        (Some(f), Some(c)) if c > 0.0 => {
            let ratio = f / c;
            if ratio.is_finite() {
                Derived::Computed(ratio)
            } else {
                Derived::Defaulted(0.0)
            }
        }
        _ => Derived::Defaulted(0.0),
    }
}

// Явно приводимые поля: присутствующее, но непарсибельное значение
// уходит дальше как NaN, отсутствующее - как ноль
fn coerced(raw: Option<&FieldValue>, parsed: Option<f64>) -> FieldValue {
    match raw {
        None => FieldValue::Number(0.0),
        Some(_) => FieldValue::Number(parsed.unwrap_or(f64::NAN)),
    }
}

/// Сборщик вектора признаков.
///
/// Политика намеренно мягкая: сборка никогда не падает. Битые числа
/// заменяются дефолтами (age -> 30, floor_ratio -> 0), отсутствующие
/// колонки заполняются нулём, а результат всегда содержит все колонки
/// MODEL_COLUMNS в порядке схемы.
pub struct FeatureAssembler<'a> {
    ranges: &'a FeatureRanges,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(ranges: &'a FeatureRanges) -> Self {
        Self { ranges }
    }

    pub fn prepare(&self, raw: &RawListing) -> PreparedFeatures {
        let year = raw.numeric("year");
        let build_year = raw.numeric("buildYear");
        let floor = raw.numeric("floor");
        let floor_count = raw.numeric("floorCount");

        let age = derive_age(year, build_year).value();
        let floor_ratio = derive_floor_ratio(floor, floor_count).value();

        let mut values = Vec::with_capacity(MODEL_COLUMNS.len());
        for &column in MODEL_COLUMNS.iter() {
            let value = match column {
                // Возраст нормализуется вместе с остальными числовыми,
                // floor_ratio уже безразмерный
                "age" => FieldValue::Number(self.ranges.normalize(age, "age")),
                "floor_ratio" => FieldValue::Number(floor_ratio),
                "year" => coerced(raw.get(column), year),
                "buildYear" => coerced(raw.get(column), build_year),
                "floor" => coerced(raw.get(column), floor),
                "floorCount" => coerced(raw.get(column), floor_count),
                _ => match raw.get(column) {
                    None => FieldValue::Number(0.0),
                    Some(FieldValue::Number(n))
                        if !EXCLUDED_FROM_NORMALIZATION.contains(&column) =>
                    {
                        FieldValue::Number(self.ranges.normalize(*n, column))
                    }
                    // Категории и исключённые числовые поля идут как есть
                    Some(value) => value.clone(),
                },
            };
            values.push(value);
        }

        PreparedFeatures::from_values(values)
    }
}
