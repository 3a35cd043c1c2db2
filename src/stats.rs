use crate::models::{Dataset, RegionFeature, StatsSummary};

const HIGH_RISK_PERCENT: f64 = 50.0;
const MEDIUM_RISK_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBucket {
    High,
    Medium,
    Low,
}

pub fn risk_bucket(feature: &RegionFeature) -> RiskBucket {
    let percent = if feature.predicted_percentage.is_finite() {
        feature.predicted_percentage
    } else {
        0.0
    };

    if percent >= HIGH_RISK_PERCENT {
        RiskBucket::High
    } else if percent >= MEDIUM_RISK_PERCENT {
        RiskBucket::Medium
    } else {
        RiskBucket::Low
    }
}

pub fn compute_stats(dataset: &Dataset) -> StatsSummary {
    let mut summary = StatsSummary {
        total: dataset.features.len(),
        ..StatsSummary::default()
    };
    let mut probability_sum = 0.0;

    for feature in &dataset.features {
        if feature.actual_case {
            summary.actual_positive += 1;
        }
        if feature.predicted_binary {
            summary.predicted_positive += 1;
        }
        match risk_bucket(feature) {
            RiskBucket::High => summary.high_risk += 1,
            RiskBucket::Medium => summary.medium_risk += 1,
            RiskBucket::Low => summary.low_risk += 1,
        }

        let probability = if feature.predicted_probability.is_finite() {
            feature.predicted_probability
        } else {
            0.0
        };
        probability_sum += probability;
        summary.max_probability = summary.max_probability.max(probability);
    }

    if summary.total > 0 {
        summary.mean_probability = probability_sum / summary.total as f64;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Geometry;
    use crate::testing::fixture_dataset;

    fn with_percent(id: &str, percent: f64) -> RegionFeature {
        let mut feature = RegionFeature::new(id, "2021-01-01", Geometry::point(22.9, 120.2));
        feature.predicted_percentage = percent;
        feature
    }

    #[test]
    fn stats_count_categories() {
        let stats = compute_stats(&fixture_dataset("2021-01-01"));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.actual_positive, 2);
        assert_eq!(stats.predicted_positive, 1);
        assert_eq!(stats.high_risk, 1);
        assert_eq!(stats.medium_risk, 1);
        assert_eq!(stats.low_risk, 1);
        assert!((stats.mean_probability - 0.3).abs() < 1e-9);
        assert_eq!(stats.max_probability, 0.55);
    }

    #[test]
    fn risk_bucket_boundaries() {
        assert_eq!(risk_bucket(&with_percent("a", 50.0)), RiskBucket::High);
        assert_eq!(risk_bucket(&with_percent("b", 49.99)), RiskBucket::Medium);
        assert_eq!(risk_bucket(&with_percent("c", 20.0)), RiskBucket::Medium);
        assert_eq!(risk_bucket(&with_percent("d", 19.99)), RiskBucket::Low);
        assert_eq!(risk_bucket(&with_percent("e", f64::NAN)), RiskBucket::Low);
    }

    #[test]
    fn stats_is_pure() {
        let dataset = fixture_dataset("2021-01-01");
        let before = dataset.clone();
        let first = compute_stats(&dataset);
        let second = compute_stats(&dataset);
        assert_eq!(first, second);
        assert_eq!(dataset, before);
    }

    #[test]
    fn empty_dataset_yields_zeroes() {
        let stats = compute_stats(&Dataset::default());
        assert_eq!(stats, StatsSummary::default());
    }
}
