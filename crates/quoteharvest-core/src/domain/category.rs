use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Market-capitalization tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCapCategory {
    #[serde(rename = "Mega Cap")]
    MegaCap,
    #[serde(rename = "Large Cap")]
    LargeCap,
    #[serde(rename = "Mid Cap")]
    MidCap,
    #[serde(rename = "Small Cap")]
    SmallCap,
    Unknown,
}

impl MarketCapCategory {
    pub const ALL: [Self; 5] = [
        Self::MegaCap,
        Self::LargeCap,
        Self::MidCap,
        Self::SmallCap,
        Self::Unknown,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MegaCap => "Mega Cap",
            Self::LargeCap => "Large Cap",
            Self::MidCap => "Mid Cap",
            Self::SmallCap => "Small Cap",
            Self::Unknown => "Unknown",
        }
    }

    /// Inverse of [`as_str`](Self::as_str). Anything else maps to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == label.trim())
            .unwrap_or(Self::Unknown)
    }
}

impl Display for MarketCapCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily performance bucket derived from `change_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceCategory {
    #[serde(rename = "Strong Positive")]
    StrongPositive,
    Positive,
    Neutral,
    Negative,
    #[serde(rename = "Strong Negative")]
    StrongNegative,
    Unknown,
}

impl PerformanceCategory {
    pub const ALL: [Self; 6] = [
        Self::StrongPositive,
        Self::Positive,
        Self::Neutral,
        Self::Negative,
        Self::StrongNegative,
        Self::Unknown,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrongPositive => "Strong Positive",
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
            Self::StrongNegative => "Strong Negative",
            Self::Unknown => "Unknown",
        }
    }

    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == label.trim())
            .unwrap_or(Self::Unknown)
    }
}

impl Display for PerformanceCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for category in MarketCapCategory::ALL {
            assert_eq!(MarketCapCategory::from_label(category.as_str()), category);
        }
        for category in PerformanceCategory::ALL {
            assert_eq!(PerformanceCategory::from_label(category.as_str()), category);
        }
    }

    #[test]
    fn free_text_never_escapes_the_enum() {
        assert_eq!(MarketCapCategory::from_label("Giant"), MarketCapCategory::Unknown);
        assert_eq!(PerformanceCategory::from_label(""), PerformanceCategory::Unknown);
    }

    #[test]
    fn serializes_with_display_labels() {
        let json = serde_json::to_string(&MarketCapCategory::MegaCap).expect("serialize");
        assert_eq!(json, "\"Mega Cap\"");
        let json = serde_json::to_string(&PerformanceCategory::Neutral).expect("serialize");
        assert_eq!(json, "\"Neutral\"");
    }
}
