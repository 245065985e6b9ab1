//! Peer cohorts for the median fallback
//!
//! When a regression cannot be fitted, a film is instead compared against the
//! films that share its [`CohortKey`]: same primary genre, rating code and
//! grouped language. A missing genre is a cohort level of its own.
//!
//! # Examples
//!
//! ```
//! use filmcut_analysis::{
//!     cohort::{CohortKey, CohortStatsMap},
//!     event::{CategoryCounts, ModificationCategory},
//!     summary::{ModelRow, RatingCode},
//! };
//!
//! let row = |id: &str, violence: u32| {
//!     let mut counts = CategoryCounts::default();
//!     for _ in 0..violence {
//!         counts.increment(ModificationCategory::Violence);
//!     }
//!     ModelRow {
//!         id: id.to_owned(),
//!         language: "Hindi".to_owned(),
//!         primary_genre: None,
//!         rating: RatingCode::UA,
//!         language_grouped: "Hindi".to_owned(),
//!         counts,
//!     }
//! };
//! let rows = [row("a", 1), row("b", 4), row("c", 2)];
//!
//! let stats = CohortStatsMap::collect(&rows, ModificationCategory::Violence);
//! assert_eq!(stats.map.len(), 1);
//! assert_eq!(stats.median(&CohortKey::of(&rows[0])), Some(2.0));
//! ```

use std::collections::BTreeMap;

use filmcut_stats::descriptive::DescriptiveStats;

use crate::{
    event::ModificationCategory,
    summary::{ModelRow, RatingCode},
};

/// Identifies the peers a film is compared with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CohortKey {
    pub primary_genre: Option<String>,
    pub rating: RatingCode,
    pub language_grouped: String,
}

impl CohortKey {
    #[must_use]
    pub fn of(row: &ModelRow) -> Self {
        Self {
            primary_genre: row.primary_genre.clone(),
            rating: row.rating,
            language_grouped: row.language_grouped.clone(),
        }
    }
}

/// Count statistics of one category, grouped by cohort.
#[derive(Debug, Clone)]
pub struct CohortStatsMap {
    pub map: BTreeMap<CohortKey, DescriptiveStats>,
}

impl CohortStatsMap {
    /// Groups the raw counts of `category` by cohort.
    #[must_use]
    pub fn collect(rows: &[ModelRow], category: ModificationCategory) -> Self {
        let mut data_map: BTreeMap<CohortKey, Vec<f64>> = BTreeMap::new();
        for row in rows {
            data_map
                .entry(CohortKey::of(row))
                .or_default()
                .push(f64::from(row.counts[category]));
        }

        let map = data_map
            .into_iter()
            .filter_map(|(key, values)| Some((key, DescriptiveStats::new(values)?)))
            .collect();
        Self { map }
    }

    /// Median raw count of a cohort.
    #[must_use]
    pub fn median(&self, key: &CohortKey) -> Option<f64> {
        self.map.get(key).map(|stats| stats.median)
    }
}
