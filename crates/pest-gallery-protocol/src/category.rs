//! Closed category set and the gallery filter built on top of it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classification of a pest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Negative,
    Positive,
    Neutral,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 3] = [Category::Negative, Category::Positive, Category::Neutral];

    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Negative => "negative",
            Category::Positive => "positive",
            Category::Neutral => "neutral",
        }
    }

    /// Capitalized label used in forms.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Negative => "Negative",
            Category::Positive => "Positive",
            Category::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known category or filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(Category::Negative),
            "positive" => Ok(Category::Positive),
            "neutral" => Ok(Category::Neutral),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// Client-side gallery filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Filters in the order they are presented.
    pub const ALL: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Negative),
        CategoryFilter::Only(Category::Positive),
        CategoryFilter::Only(Category::Neutral),
    ];

    /// Whether a record with `category` passes this filter.
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "Show all",
            CategoryFilter::Only(category) => category.as_str(),
        }
    }

    /// Next filter in presentation order, wrapping around.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous filter in presentation order, wrapping around.
    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => f.write_str(category.as_str()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        value.parse().map(CategoryFilter::Only)
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_filters() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "Neutral".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::Neutral))
        );
        assert!("".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn filter_cycle_wraps() {
        let mut filter = CategoryFilter::All;
        for _ in 0..CategoryFilter::ALL.len() {
            filter = filter.next();
        }
        assert_eq!(filter, CategoryFilter::All);
        assert_eq!(
            CategoryFilter::All.prev(),
            CategoryFilter::Only(Category::Neutral)
        );
    }

    #[test]
    fn only_matches_exact_category() {
        let filter = CategoryFilter::Only(Category::Positive);
        assert!(filter.matches(Category::Positive));
        assert!(!filter.matches(Category::Negative));
        assert!(CategoryFilter::All.matches(Category::Neutral));
    }
}
