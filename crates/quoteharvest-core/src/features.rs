//! Derived indicators and categorical tiers.

use std::sync::Arc;

use crate::{MarketCapCategory, PerformanceCategory, ProcessedRecord};

/// Day-over-day move in percent. Null when either price is missing or the
/// previous close is zero.
pub fn price_momentum(current_price: Option<f64>, previous_close: Option<f64>) -> Option<f64> {
    let (current, previous) = (current_price?, previous_close?);
    if previous == 0.0 {
        return None;
    }
    finite((current - previous) / previous * 100.0)
}

/// Intraday range as a percentage of the current price.
pub fn daily_volatility(
    day_high: Option<f64>,
    day_low: Option<f64>,
    current_price: Option<f64>,
) -> Option<f64> {
    let (high, low, current) = (day_high?, day_low?, current_price?);
    if current == 0.0 {
        return None;
    }
    finite((high - low) / current * 100.0)
}

pub fn categorize_performance(change_percent: Option<f64>) -> PerformanceCategory {
    match change_percent {
        None => PerformanceCategory::Unknown,
        Some(value) if value > 5.0 => PerformanceCategory::StrongPositive,
        Some(value) if value > 2.0 => PerformanceCategory::Positive,
        Some(value) if value > -2.0 => PerformanceCategory::Neutral,
        Some(value) if value > -5.0 => PerformanceCategory::Negative,
        Some(_) => PerformanceCategory::StrongNegative,
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Maps a displayed market cap (`"2.9T"`) to a tier.
pub trait MarketCapClassifier: Send + Sync {
    fn classify(&self, market_cap: Option<&str>) -> MarketCapCategory;
}

/// Checks whether `T`, `B` or `M` appears anywhere in the text, in that order.
///
/// Any text containing one of those letters is matched, so a value like
/// `"Mega"` lands in Mid Cap. Use [`SuffixMarketCapClassifier`] when only
/// the trailing unit should count.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMarketCapClassifier;

impl MarketCapClassifier for SubstringMarketCapClassifier {
    fn classify(&self, market_cap: Option<&str>) -> MarketCapCategory {
        let Some(text) = market_cap else {
            return MarketCapCategory::Unknown;
        };
        if text.contains('T') {
            MarketCapCategory::MegaCap
        } else if text.contains('B') {
            MarketCapCategory::LargeCap
        } else if text.contains('M') {
            MarketCapCategory::MidCap
        } else {
            MarketCapCategory::SmallCap
        }
    }
}

/// Looks only at the final character's unit letter (case-insensitive).
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixMarketCapClassifier;

impl MarketCapClassifier for SuffixMarketCapClassifier {
    fn classify(&self, market_cap: Option<&str>) -> MarketCapCategory {
        let Some(last) = market_cap.and_then(|text| text.trim().chars().last()) else {
            return MarketCapCategory::Unknown;
        };
        match last.to_ascii_uppercase() {
            'T' => MarketCapCategory::MegaCap,
            'B' => MarketCapCategory::LargeCap,
            'M' => MarketCapCategory::MidCap,
            _ => MarketCapCategory::SmallCap,
        }
    }
}

/// Fills the derived columns of processed records.
#[derive(Clone)]
pub struct FeatureDeriver {
    classifier: Arc<dyn MarketCapClassifier>,
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new(Arc::new(SubstringMarketCapClassifier))
    }
}

impl FeatureDeriver {
    pub fn new(classifier: Arc<dyn MarketCapClassifier>) -> Self {
        Self { classifier }
    }

    pub fn derive(&self, records: &mut [ProcessedRecord]) {
        for record in records.iter_mut() {
            let quote = &record.quote;
            record.price_momentum = price_momentum(quote.current_price, quote.previous_close);
            record.daily_volatility =
                daily_volatility(quote.day_high, quote.day_low, quote.current_price);
            record.market_cap_category = self.classifier.classify(record.market_cap.as_deref());
            record.performance_category = categorize_performance(quote.change_percent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_guards_zero_and_missing() {
        assert_eq!(price_momentum(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(price_momentum(Some(100.0), Some(0.0)), None);
        assert_eq!(price_momentum(None, Some(100.0)), None);
        assert_eq!(price_momentum(Some(100.0), None), None);
    }

    #[test]
    fn volatility_is_range_over_price() {
        assert_eq!(daily_volatility(Some(105.0), Some(95.0), Some(100.0)), Some(10.0));
        assert_eq!(daily_volatility(Some(105.0), Some(95.0), Some(0.0)), None);
        assert_eq!(daily_volatility(None, Some(95.0), Some(100.0)), None);
    }

    #[test]
    fn performance_thresholds() {
        assert_eq!(categorize_performance(Some(6.0)), PerformanceCategory::StrongPositive);
        assert_eq!(categorize_performance(Some(3.0)), PerformanceCategory::Positive);
        assert_eq!(categorize_performance(Some(0.0)), PerformanceCategory::Neutral);
        assert_eq!(categorize_performance(Some(2.0)), PerformanceCategory::Neutral);
        assert_eq!(categorize_performance(Some(-2.0)), PerformanceCategory::Negative);
        assert_eq!(categorize_performance(Some(-5.0)), PerformanceCategory::StrongNegative);
        assert_eq!(categorize_performance(Some(-10.0)), PerformanceCategory::StrongNegative);
        assert_eq!(categorize_performance(None), PerformanceCategory::Unknown);
    }

    #[test]
    fn substring_classifier_checks_letters_in_priority_order() {
        let classifier = SubstringMarketCapClassifier;
        assert_eq!(classifier.classify(Some("2.9T")), MarketCapCategory::MegaCap);
        assert_eq!(classifier.classify(Some("850.2B")), MarketCapCategory::LargeCap);
        assert_eq!(classifier.classify(Some("312M")), MarketCapCategory::MidCap);
        assert_eq!(classifier.classify(Some("95,000")), MarketCapCategory::SmallCap);
        assert_eq!(classifier.classify(None), MarketCapCategory::Unknown);
        assert_eq!(classifier.classify(Some("Mega")), MarketCapCategory::MidCap);
    }

    #[test]
    fn suffix_classifier_only_reads_unit() {
        let classifier = SuffixMarketCapClassifier;
        assert_eq!(classifier.classify(Some("2.9t ")), MarketCapCategory::MegaCap);
        assert_eq!(classifier.classify(Some("Mega")), MarketCapCategory::SmallCap);
        assert_eq!(classifier.classify(Some("")), MarketCapCategory::Unknown);
    }
}
