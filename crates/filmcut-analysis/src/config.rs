//! Immutable configuration for the analysis components
//!
//! The domain constants (quota table, genre priority, rare-category threshold,
//! regression limits) live here as plain values with `Default` impls, so the
//! components can be exercised with alternate constants. Every field is
//! optional when deserializing:
//!
//! ```json
//! {
//!   "allocator": {
//!     "quota": [{ "category": "english", "weight": 4 }, { "category": "other", "weight": 1 }]
//!   },
//!   "scoring": { "min_category_count": 10, "max_iterations": 100 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::quota::QuotaTable;

/// Genres checked, in order, when picking a film's primary genre.
pub const GENRE_PRIORITY: [&str; 11] = [
    "Horror",
    "Thriller",
    "Sci-Fi",
    "Action",
    "Crime",
    "Mystery",
    "War",
    "Western",
    "Adventure",
    "Fantasy",
    "Comedy",
];

/// Configuration for both components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub allocator: AllocatorConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    pub quota: QuotaTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Genre and language values seen fewer times than this are grouped into `Other`.
    pub min_category_count: usize,
    /// Genres that win over a film's first listed genre, highest priority first.
    pub genre_priority: Vec<String>,
    /// Iteration cap for each regression fit.
    pub max_iterations: usize,
    /// Relative convergence tolerance for each regression fit.
    pub tolerance: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_category_count: 15,
            genre_priority: GENRE_PRIORITY.iter().map(|g| (*g).to_owned()).collect(),
            max_iterations: 200,
            tolerance: 1e-8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageCategory;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.scoring.min_category_count, 15);
        assert_eq!(config.scoring.genre_priority.len(), 11);
        assert_eq!(config.allocator.quota.window_size(), 17);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "allocator": { "quota": [{ "category": "hindi", "weight": 1 }] },
            "scoring": { "min_category_count": 3 }
        }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.allocator.quota.window_size(), 1);
        assert_eq!(config.allocator.quota.weight(LanguageCategory::Hindi), 1);
        assert_eq!(config.scoring.min_category_count, 3);
        assert_eq!(config.scoring.max_iterations, 200);
    }
}
