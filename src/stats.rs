// 📊 History Statistics - summary numbers and the trend series

use crate::calculator::Category;
use crate::record::BmiRecord;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub first: f64,
    pub latest: f64,
    /// latest - first; negative means BMI went down
    pub change: f64,
    pub by_category: BTreeMap<Category, usize>,
}

impl HistoryStats {
    /// Summarize records in insertion order. Empty history has no stats.
    pub fn from_records(records: &[BmiRecord]) -> Option<Self> {
        let first = records.first()?.bmi();
        let latest = records.last()?.bmi();

        let mut total = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut by_category = BTreeMap::new();

        for record in records {
            let bmi = record.bmi();
            total += bmi;
            min = min.min(bmi);
            max = max.max(bmi);
            *by_category.entry(record.category()).or_insert(0) += 1;
        }

        Some(HistoryStats {
            count: records.len(),
            average: total / records.len() as f64,
            min,
            max,
            first,
            latest,
            change: latest - first,
            by_category,
        })
    }

    /// Most frequent category; ties go to the lower category
    pub fn dominant_category(&self) -> Option<Category> {
        self.by_category
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(category, _)| *category)
    }
}

/// (unix seconds, bmi) points in history order, for plotting
pub fn trend_series(records: &[BmiRecord]) -> Vec<(f64, f64)> {
    records
        .iter()
        .map(|r| (r.timestamp().timestamp() as f64, r.bmi()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Measurement;
    use crate::units::{HeightUnit, WeightUnit};
    use chrono::{Duration, Local, TimeZone};

    fn records(weights: &[f64]) -> Vec<BmiRecord> {
        let base = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                // 200 cm keeps the arithmetic easy: bmi = weight / 4
                let m = Measurement::new(*w, WeightUnit::Kg, 200.0, HeightUnit::Cm).unwrap();
                BmiRecord::new(&m, base + Duration::days(i as i64))
            })
            .collect()
    }

    #[test]
    fn test_empty_history_has_no_stats() {
        assert!(HistoryStats::from_records(&[]).is_none());
        assert!(trend_series(&[]).is_empty());
    }

    #[test]
    fn test_summary_values() {
        let history = records(&[80.0, 100.0, 60.0, 120.0]);
        let stats = HistoryStats::from_records(&history).unwrap();

        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 15.0);
        assert_eq!(stats.max, 30.0);
        assert!((stats.average - 22.5).abs() < 1e-9);
        assert_eq!(stats.first, 20.0);
        assert_eq!(stats.latest, 30.0);
        assert_eq!(stats.change, 10.0);

        assert_eq!(stats.by_category.get(&Category::SevereUnderweight), Some(&1));
        assert_eq!(stats.by_category.get(&Category::Normal), Some(&1));
        assert_eq!(stats.by_category.get(&Category::Overweight), Some(&1));
        assert_eq!(stats.by_category.get(&Category::ObeseClassI), Some(&1));
    }

    #[test]
    fn test_dominant_category() {
        let history = records(&[80.0, 84.0, 110.0]);
        let stats = HistoryStats::from_records(&history).unwrap();
        assert_eq!(stats.dominant_category(), Some(Category::Normal));

        let tie = records(&[80.0, 110.0]);
        let stats = HistoryStats::from_records(&tie).unwrap();
        assert_eq!(stats.dominant_category(), Some(Category::Normal));
    }

    #[test]
    fn test_trend_series_is_ordered() {
        let history = records(&[80.0, 90.0, 70.0]);
        let series = trend_series(&history);

        assert_eq!(series.len(), 3);
        assert_eq!(series[1].0 - series[0].0, 86_400.0);
        assert_eq!(series.iter().map(|p| p.1).collect::<Vec<_>>(), vec![20.0, 22.5, 17.5]);
    }
}
