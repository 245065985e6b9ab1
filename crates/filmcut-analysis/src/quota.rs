//! Per-language quota table
//!
//! A [`QuotaTable`] assigns each [`LanguageCategory`] an integer weight. The
//! weights sum to the reference window size: in every window of that many
//! ranked films, each category should appear `weight` times.
//!
//! The default table uses a window of 17:
//!
//! ```text
//! english 4 | hindi 4 | tamil 2 | telugu 2 | kannada 2 | malayalam 2 | other 1
//! ```

use serde::{Deserialize, Serialize};

use crate::language::LanguageCategory;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum QuotaTableError {
    #[display("quota table has no entries")]
    Empty,
    #[display("quota weights sum to zero")]
    ZeroWindow,
    #[display("quota weights are too large")]
    WindowOverflow,
    #[display("category '{category}' appears more than once in the quota table")]
    DuplicateCategory { category: LanguageCategory },
}

/// A single category weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaEntry {
    pub category: LanguageCategory,
    pub weight: usize,
}

/// Validated category weights, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<QuotaEntry>", into = "Vec<QuotaEntry>")]
pub struct QuotaTable {
    entries: Vec<QuotaEntry>,
    window_size: usize,
}

impl Default for QuotaTable {
    fn default() -> Self {
        use LanguageCategory::{English, Hindi, Kannada, Malayalam, Other, Tamil, Telugu};
        let entries = [
            (English, 4),
            (Hindi, 4),
            (Tamil, 2),
            (Telugu, 2),
            (Kannada, 2),
            (Malayalam, 2),
            (Other, 1),
        ]
        .map(|(category, weight)| QuotaEntry { category, weight });
        Self {
            entries: entries.to_vec(),
            window_size: 17,
        }
    }
}

impl TryFrom<Vec<QuotaEntry>> for QuotaTable {
    type Error = QuotaTableError;

    fn try_from(entries: Vec<QuotaEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<QuotaTable> for Vec<QuotaEntry> {
    fn from(table: QuotaTable) -> Self {
        table.entries
    }
}

impl QuotaTable {
    /// Builds a table from entries in declaration order.
    ///
    /// The window size is the sum of the weights.
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_analysis::{
    ///     language::LanguageCategory,
    ///     quota::{QuotaEntry, QuotaTable},
    /// };
    ///
    /// let table = QuotaTable::new(vec![
    ///     QuotaEntry { category: LanguageCategory::Hindi, weight: 2 },
    ///     QuotaEntry { category: LanguageCategory::Other, weight: 1 },
    /// ])
    /// .unwrap();
    /// assert_eq!(table.window_size(), 3);
    /// assert_eq!(table.weight(LanguageCategory::English), 0);
    /// ```
    pub fn new(entries: Vec<QuotaEntry>) -> Result<Self, QuotaTableError> {
        if entries.is_empty() {
            return Err(QuotaTableError::Empty);
        }
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.category == entry.category) {
                return Err(QuotaTableError::DuplicateCategory {
                    category: entry.category,
                });
            }
        }
        let window_size = entries
            .iter()
            .try_fold(0_usize, |sum, e| sum.checked_add(e.weight))
            .ok_or(QuotaTableError::WindowOverflow)?;
        if window_size == 0 {
            return Err(QuotaTableError::ZeroWindow);
        }
        // `scaled_weight` multiplies a weight by a group of at most one window
        if window_size.checked_mul(window_size).is_none() {
            return Err(QuotaTableError::WindowOverflow);
        }
        Ok(Self {
            entries,
            window_size,
        })
    }

    /// Number of films the weights are defined over.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    #[must_use]
    pub fn entries(&self) -> &[QuotaEntry] {
        &self.entries
    }

    /// Weight of a category, zero if the table does not list it.
    #[must_use]
    pub fn weight(&self, category: LanguageCategory) -> usize {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map_or(0, |e| e.weight)
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = LanguageCategory> + '_ {
        self.entries.iter().map(|e| e.category)
    }

    /// Scaled allocation for a window of `group_size` films.
    ///
    /// `floor(weight * group_size / window_size)`, with `group_size` capped
    /// at the window size.
    #[must_use]
    pub fn scaled_weight(&self, category: LanguageCategory, group_size: usize) -> usize {
        self.weight(category) * group_size.min(self.window_size) / self.window_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sums_to_window() {
        let table = QuotaTable::default();
        assert_eq!(table.window_size(), 17);
        assert_eq!(table.entries().iter().map(|e| e.weight).sum::<usize>(), 17);
        assert_eq!(
            table.categories().collect::<Vec<_>>(),
            LanguageCategory::ALL.to_vec()
        );
    }

    #[test]
    fn test_scaled_weight_floors() {
        let table = QuotaTable::default();
        assert_eq!(table.scaled_weight(LanguageCategory::English, 17), 4);
        // 4 * 8 / 17 = 1.88
        assert_eq!(table.scaled_weight(LanguageCategory::Hindi, 8), 1);
        // 1 * 16 / 17 = 0.94
        assert_eq!(table.scaled_weight(LanguageCategory::Other, 16), 0);
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert_eq!(QuotaTable::new(vec![]), Err(QuotaTableError::Empty));
        let zero = vec![QuotaEntry {
            category: LanguageCategory::Tamil,
            weight: 0,
        }];
        assert_eq!(QuotaTable::new(zero), Err(QuotaTableError::ZeroWindow));
        let dup = vec![
            QuotaEntry {
                category: LanguageCategory::Tamil,
                weight: 1,
            },
            QuotaEntry {
                category: LanguageCategory::Tamil,
                weight: 2,
            },
        ];
        assert_eq!(
            QuotaTable::new(dup),
            Err(QuotaTableError::DuplicateCategory {
                category: LanguageCategory::Tamil
            })
        );
    }

    #[test]
    fn test_rejects_overflowing_weights() {
        let entry = |category, weight| QuotaEntry { category, weight };
        assert_eq!(
            QuotaTable::new(vec![
                entry(LanguageCategory::Hindi, usize::MAX),
                entry(LanguageCategory::Other, 1),
            ]),
            Err(QuotaTableError::WindowOverflow)
        );
        assert_eq!(
            QuotaTable::new(vec![entry(LanguageCategory::Hindi, usize::MAX / 2)]),
            Err(QuotaTableError::WindowOverflow)
        );

        let table = QuotaTable::new(vec![entry(LanguageCategory::Hindi, 1000)]).unwrap();
        assert_eq!(table.scaled_weight(LanguageCategory::Hindi, usize::MAX), 1000);
    }

    #[test]
    fn test_deserialize_keeps_order() {
        let json = r#"[{"category": "other", "weight": 1}, {"category": "hindi", "weight": 3}]"#;
        let table: QuotaTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.window_size(), 4);
        assert_eq!(
            table.categories().collect::<Vec<_>>(),
            [LanguageCategory::Other, LanguageCategory::Hindi]
        );
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let json = r#"[{"category": "other", "weight": 1}, {"category": "other", "weight": 3}]"#;
        assert!(serde_json::from_str::<QuotaTable>(json).is_err());
    }
}
