//! Sentiment classification buckets of the Fear & Greed Index.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl Category {
    /// Fixed axis order. Group iteration always follows this.
    pub const ORDER: [Category; 5] = [
        Category::ExtremeFear,
        Category::Fear,
        Category::Neutral,
        Category::Greed,
        Category::ExtremeGreed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::ExtremeFear => "Extreme Fear",
            Category::Fear => "Fear",
            Category::Neutral => "Neutral",
            Category::Greed => "Greed",
            Category::ExtremeGreed => "Extreme Greed",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Category::ExtremeFear => "#8B0000",
            Category::Fear => "#FF6B6B",
            Category::Neutral => "#FFD93D",
            Category::Greed => "#6BCF7F",
            Category::ExtremeGreed => "#00A86B",
        }
    }

    /// Resolve a dataset label. Case, spaces and underscores are ignored, so
    /// "Extreme Fear", "extreme_fear" and "ExtremeFear" all match.
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(|c| c.to_lowercase())
            .collect();
        match key.as_str() {
            "extremefear" => Some(Category::ExtremeFear),
            "fear" => Some(Category::Fear),
            "neutral" => Some(Category::Neutral),
            "greed" => Some(Category::Greed),
            "extremegreed" => Some(Category::ExtremeGreed),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
