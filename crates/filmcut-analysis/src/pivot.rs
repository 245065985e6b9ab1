//! Wide score table
//!
//! [`pivot_scores`] turns the long list of [`ScoreRecord`]s into one
//! [`ScoreRow`] per `(id, language, model_kind)` with a raw count and an
//! expected value column per category. A category scored by the other model
//! kind is `null` in that row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    event::ModificationCategory,
    scoring::{ModelKind, ScoreRecord},
};

/// One film version's scores from one model kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub id: String,
    pub language: String,
    pub model_kind: Option<ModelKind>,
    pub violence_raw_count: Option<u32>,
    pub violence_expected: Option<f64>,
    pub sensitive_content_raw_count: Option<u32>,
    pub sensitive_content_expected: Option<f64>,
    pub political_religious_raw_count: Option<u32>,
    pub political_religious_expected: Option<f64>,
    pub disclaimers_raw_count: Option<u32>,
    pub disclaimers_expected: Option<f64>,
}

/// Where a film sits relative to its expected count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerComparison {
    Above,
    InLine,
    Below,
}

impl ScoreRow {
    fn columns_mut(&mut self, category: ModificationCategory) -> (&mut Option<u32>, &mut Option<f64>) {
        match category {
            ModificationCategory::Violence => {
                (&mut self.violence_raw_count, &mut self.violence_expected)
            }
            ModificationCategory::SensitiveContent => (
                &mut self.sensitive_content_raw_count,
                &mut self.sensitive_content_expected,
            ),
            ModificationCategory::PoliticalReligious => (
                &mut self.political_religious_raw_count,
                &mut self.political_religious_expected,
            ),
            ModificationCategory::Disclaimers => {
                (&mut self.disclaimers_raw_count, &mut self.disclaimers_expected)
            }
        }
    }

    #[must_use]
    pub fn raw_count(&self, category: ModificationCategory) -> Option<u32> {
        match category {
            ModificationCategory::Violence => self.violence_raw_count,
            ModificationCategory::SensitiveContent => self.sensitive_content_raw_count,
            ModificationCategory::PoliticalReligious => self.political_religious_raw_count,
            ModificationCategory::Disclaimers => self.disclaimers_raw_count,
        }
    }

    #[must_use]
    pub fn expected(&self, category: ModificationCategory) -> Option<f64> {
        match category {
            ModificationCategory::Violence => self.violence_expected,
            ModificationCategory::SensitiveContent => self.sensitive_content_expected,
            ModificationCategory::PoliticalReligious => self.political_religious_expected,
            ModificationCategory::Disclaimers => self.disclaimers_expected,
        }
    }

    /// `raw_count - expected`, if this row scored `category`.
    #[must_use]
    pub fn delta(&self, category: ModificationCategory) -> Option<f64> {
        Some(f64::from(self.raw_count(category)?) - self.expected(category)?)
    }

    /// Compares the raw count with the expected count.
    ///
    /// Deltas within `tolerance` of zero are [`PeerComparison::InLine`].
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_analysis::{
    ///     event::ModificationCategory,
    ///     pivot::{PeerComparison, ScoreRow},
    /// };
    ///
    /// let row = ScoreRow {
    ///     violence_raw_count: Some(5),
    ///     violence_expected: Some(2.5),
    ///     ..ScoreRow::default()
    /// };
    /// assert_eq!(row.delta(ModificationCategory::Violence), Some(2.5));
    /// assert_eq!(
    ///     row.compare(ModificationCategory::Violence, 0.5),
    ///     Some(PeerComparison::Above)
    /// );
    /// assert_eq!(row.compare(ModificationCategory::Violence, 3.0), Some(PeerComparison::InLine));
    /// assert_eq!(row.compare(ModificationCategory::Disclaimers, 0.5), None);
    /// ```
    #[must_use]
    pub fn compare(&self, category: ModificationCategory, tolerance: f64) -> Option<PeerComparison> {
        let delta = self.delta(category)?;
        Some(if delta > tolerance {
            PeerComparison::Above
        } else if delta < -tolerance {
            PeerComparison::Below
        } else {
            PeerComparison::InLine
        })
    }
}

/// Pivots records into rows sorted by `(id, language, model_kind)`.
#[must_use]
pub fn pivot_scores(records: &[ScoreRecord]) -> Vec<ScoreRow> {
    let mut rows = BTreeMap::<(&str, &str, ModelKind), ScoreRow>::new();
    for record in records {
        let key = (record.id.as_str(), record.language.as_str(), record.model_kind);
        let row = rows.entry(key).or_insert_with(|| ScoreRow {
            id: record.id.clone(),
            language: record.language.clone(),
            model_kind: Some(record.model_kind),
            ..ScoreRow::default()
        });
        let (raw_count, expected) = row.columns_mut(record.category);
        *raw_count = Some(record.raw_count);
        *expected = Some(record.expected);
    }
    rows.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: &str,
        category: ModificationCategory,
        model_kind: ModelKind,
        raw_count: u32,
        expected: f64,
    ) -> ScoreRecord {
        ScoreRecord {
            id: id.to_owned(),
            language: "Hindi".to_owned(),
            category,
            raw_count,
            expected,
            model_kind,
        }
    }

    #[test]
    fn test_pivot_splits_by_model_kind() {
        let records = [
            record("b", ModificationCategory::Violence, ModelKind::Regression, 2, 1.5),
            record("a", ModificationCategory::Violence, ModelKind::Regression, 0, 0.8),
            record("a", ModificationCategory::Disclaimers, ModelKind::MedianFallback, 1, 1.0),
            record("a", ModificationCategory::SensitiveContent, ModelKind::Regression, 3, 2.0),
        ];
        let rows = pivot_scores(&records);
        let keys = rows
            .iter()
            .map(|r| (r.id.as_str(), r.model_kind))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            [
                ("a", Some(ModelKind::Regression)),
                ("a", Some(ModelKind::MedianFallback)),
                ("b", Some(ModelKind::Regression)),
            ]
        );
        assert_eq!(rows[0].violence_expected, Some(0.8));
        assert_eq!(rows[0].sensitive_content_raw_count, Some(3));
        assert_eq!(rows[0].disclaimers_raw_count, None);
        assert_eq!(rows[1].disclaimers_expected, Some(1.0));
        assert_eq!(rows[1].violence_raw_count, None);
    }

    #[test]
    fn test_missing_columns_serialize_as_null() {
        let rows = pivot_scores(&[record(
            "a",
            ModificationCategory::Violence,
            ModelKind::MedianFallback,
            4,
            2.0,
        )]);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["model_kind"], "MedianFallback");
        assert_eq!(json["violence_raw_count"], 4);
        assert!(json["disclaimers_expected"].is_null());
    }

    #[test]
    fn test_below_peers() {
        let row = ScoreRow {
            political_religious_raw_count: Some(0),
            political_religious_expected: Some(1.2),
            ..ScoreRow::default()
        };
        assert_eq!(
            row.compare(ModificationCategory::PoliticalReligious, 0.5),
            Some(PeerComparison::Below)
        );
    }
}
