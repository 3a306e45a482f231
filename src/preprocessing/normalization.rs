//! Min-max нормализация признаков

use std::collections::HashMap;
use std::sync::OnceLock;

/// Таблица диапазонов (min, max) для min-max нормализации.
/// Заполняется один раз и дальше только читается.
pub struct FeatureRanges {
    ranges: HashMap<&'static str, (f64, f64)>,
}

impl FeatureRanges {
    /// Диапазоны, с которыми обучалась модель (границы формы ввода)
    pub fn standard() -> Self {
        Self::from_pairs([
            ("squareMeters", (10.0, 500.0)),
            ("rooms", (1.0, 10.0)),
            ("centreDistance", (0.0, 30.0)),
            ("poiCount", (0.0, 100.0)),
            ("schoolDistance", (0.0, 10.0)),
            ("clinicDistance", (0.0, 10.0)),
            ("postOfficeDistance", (0.0, 10.0)),
            ("kindergartenDistance", (0.0, 10.0)),
            ("restaurantDistance", (0.0, 10.0)),
            ("collegeDistance", (0.0, 10.0)),
            ("pharmacyDistance", (0.0, 10.0)),
            ("age", (0.0, 200.0)),
        ])
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (&'static str, (f64, f64))>) -> Self {
        Self {
            ranges: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, feature: &str) -> Option<(f64, f64)> {
        self.ranges.get(feature).copied()
    }

    /// Масштабирует значение в (value - min) / (max - min).
    ///
    /// Результат не обрезается к [0, 1]: значение вне диапазона легально
    /// даёт результат вне [0, 1]. Признак без записи в таблице и
    /// вырожденный диапазон (max <= min) возвращают значение как есть,
    /// деления на ноль не бывает.
    pub fn normalize(&self, value: f64, feature: &str) -> f64 {
        match self.ranges.get(feature) {
            Some(&(min, max)) if max > min => (value - min) / (max - min),
            _ => value,
        }
    }
}

impl Default for FeatureRanges {
    fn default() -> Self {
        Self::standard()
    }
}

/// Общая на процесс таблица диапазонов
pub fn standard_ranges() -> &'static FeatureRanges {
    static RANGES: OnceLock<FeatureRanges> = OnceLock::new();
    RANGES.get_or_init(FeatureRanges::standard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_maps_to_zero_and_max_to_one() {
        let ranges = FeatureRanges::standard();
        for (feature, (min, max)) in [
            ("squareMeters", (10.0, 500.0)),
            ("rooms", (1.0, 10.0)),
            ("age", (0.0, 200.0)),
        ] {
            assert_eq!(ranges.normalize(min, feature), 0.0);
            assert_eq!(ranges.normalize(max, feature), 1.0);
        }
    }

    #[test]
    fn unknown_feature_passes_through() {
        let ranges = FeatureRanges::standard();
        assert_eq!(ranges.normalize(123.45, "unknownFeature"), 123.45);
    }

    #[test]
    fn degenerate_range_passes_through() {
        let ranges = FeatureRanges::from_pairs([("x", (5.0, 5.0)), ("y", (9.0, 3.0))]);
        assert_eq!(ranges.normalize(7.0, "x"), 7.0);
        assert_eq!(ranges.normalize(7.0, "y"), 7.0);
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        let ranges = FeatureRanges::standard();
        // Ниже минимума -> отрицательное, выше максимума -> больше единицы
        assert!(ranges.normalize(0.0, "squareMeters") < 0.0);
        assert!(ranges.normalize(1000.0, "squareMeters") > 1.0);
    }

    #[test]
    fn standard_table_has_valid_bounds() {
        let ranges = FeatureRanges::standard();
        for feature in [
            "squareMeters",
            "rooms",
            "centreDistance",
            "poiCount",
            "schoolDistance",
            "clinicDistance",
            "postOfficeDistance",
            "kindergartenDistance",
            "restaurantDistance",
            "collegeDistance",
            "pharmacyDistance",
            "age",
        ] {
            let (min, max) = ranges.get(feature).expect(feature);
            assert!(max > min, "{feature}");
        }
    }
}
