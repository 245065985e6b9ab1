//! Comparative modification scoring
//!
//! For every [`ModificationCategory`] the engine estimates how many
//! modifications a film would be expected to receive given its peers, so the
//! raw count can be read as above or below expectation.
//!
//! # Model
//!
//! Each category is fitted independently with a negative binomial (NB2)
//! regression:
//!
//! ```text
//! count ~ C(rating) + C(language_grouped) [+ C(primary_genre)]
//! ```
//!
//! The genre term is included only when at least one row has a genre; rows
//! without one share the [`MISSING_GENRE_LABEL`] level.
//!
//! # Fallback
//!
//! When the regression is unusable (degenerate predictors, an all-zero
//! response, too few rows, a singular information matrix, non-convergence)
//! the expected value of each film is the median raw count of its peer
//! cohort instead, see [`CohortStatsMap`]. One category falling back never
//! affects the others.

use std::fmt;

use filmcut_stats::{
    design::{DesignError, DesignMatrix, Factor},
    negative_binomial::{FitError, FitOptions, NegativeBinomialFit},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    cohort::{CohortKey, CohortStatsMap},
    config::ScoringConfig,
    event::{ModificationCategory, ModificationEvent},
    summary::{ModelRow, prepare_rows, summarize},
};

/// Factor level for rows without a primary genre.
pub const MISSING_GENRE_LABEL: &str = "(missing)";

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScoringError {
    #[display("no rows left to score after preprocessing")]
    NoResults,
}

/// Why a category fell back to cohort medians.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum FallbackReason {
    #[display("{_0}")]
    Design(DesignError),
    #[display("{_0}")]
    Fit(FitError),
}

/// How an expected value was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Regression,
    MedianFallback,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Regression => "Regression",
            Self::MedianFallback => "MedianFallback",
        })
    }
}

/// Score of one film in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: String,
    pub language: String,
    pub category: ModificationCategory,
    pub raw_count: u32,
    pub expected: f64,
    pub model_kind: ModelKind,
}

/// How a category run went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOutcome {
    pub category: ModificationCategory,
    pub model_kind: ModelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_likelihood: Option<f64>,
    /// Number of films scored.
    pub rows: usize,
}

/// Result of a scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringReport {
    /// One outcome per category, in category order.
    pub outcomes: Vec<CategoryOutcome>,
    /// Records grouped by category, in category order, rows in input order.
    pub records: Vec<ScoreRecord>,
}

/// Scores films against their peers, category by category.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Summarizes and preprocesses raw events, then scores every category.
    pub fn run(&self, events: &[ModificationEvent]) -> Result<ScoringReport, ScoringError> {
        let summaries = summarize(events);
        info!(
            "Summarized {} events into {} films",
            events.len(),
            summaries.len()
        );
        let rows = prepare_rows(summaries, &self.config);
        self.score_rows(&rows)
    }

    /// Scores already prepared rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_analysis::{
    ///     event::{CategoryCounts, ModificationCategory},
    ///     scoring::{ModelKind, ScoringEngine},
    ///     summary::{ModelRow, RatingCode},
    /// };
    ///
    /// let row = |id: &str, violence: u32| {
    ///     let mut counts = CategoryCounts::default();
    ///     for _ in 0..violence {
    ///         counts.increment(ModificationCategory::Violence);
    ///     }
    ///     ModelRow {
    ///         id: id.to_owned(),
    ///         language: "Hindi".to_owned(),
    ///         primary_genre: None,
    ///         rating: RatingCode::UA,
    ///         language_grouped: "Hindi".to_owned(),
    ///         counts,
    ///     }
    /// };
    /// let rows = [row("a", 1), row("b", 5), row("c", 2)];
    ///
    /// // A single rating and language leaves nothing to regress on.
    /// let report = ScoringEngine::default().score_rows(&rows).unwrap();
    /// let violence = report
    ///     .records
    ///     .iter()
    ///     .filter(|r| r.category == ModificationCategory::Violence)
    ///     .collect::<Vec<_>>();
    /// assert!(violence.iter().all(|r| r.model_kind == ModelKind::MedianFallback));
    /// assert!(violence.iter().all(|r| r.expected == 2.0));
    /// ```
    pub fn score_rows(&self, rows: &[ModelRow]) -> Result<ScoringReport, ScoringError> {
        if rows.is_empty() {
            return Err(ScoringError::NoResults);
        }

        let options = FitOptions {
            max_iterations: self.config.max_iterations,
            tolerance: self.config.tolerance,
        };
        let results = ModificationCategory::ALL
            .as_slice()
            .par_iter()
            .map(|&category| score_category(rows, category, &options))
            .collect::<Vec<_>>();

        let mut outcomes = Vec::with_capacity(results.len());
        let mut records = Vec::with_capacity(results.len() * rows.len());
        for (outcome, category_records) in results {
            outcomes.push(outcome);
            records.extend(category_records);
        }
        Ok(ScoringReport { outcomes, records })
    }
}

fn score_category(
    rows: &[ModelRow],
    category: ModificationCategory,
    options: &FitOptions,
) -> (CategoryOutcome, Vec<ScoreRecord>) {
    match fit_category(rows, category, options) {
        Ok(fit) => {
            info!(
                "{category}: regression converged in {} iterations (alpha = {:.4})",
                fit.iterations, fit.alpha
            );
            let outcome = CategoryOutcome {
                category,
                model_kind: ModelKind::Regression,
                fallback_reason: None,
                iterations: Some(fit.iterations),
                alpha: Some(fit.alpha),
                log_likelihood: Some(fit.log_likelihood),
                rows: rows.len(),
            };
            let records = rows
                .iter()
                .zip(fit.fitted_values())
                .map(|(row, &expected)| record(row, category, expected, ModelKind::Regression))
                .collect();
            (outcome, records)
        }
        Err(reason) => {
            warn!("{category}: regression unavailable ({reason}), using cohort medians");
            let cohorts = CohortStatsMap::collect(rows, category);
            let records = rows
                .iter()
                .map(|row| {
                    // Every row belongs to the cohort map it was collected into
                    let expected = cohorts.median(&CohortKey::of(row)).unwrap_or(0.0);
                    record(row, category, expected, ModelKind::MedianFallback)
                })
                .collect();
            let outcome = CategoryOutcome {
                category,
                model_kind: ModelKind::MedianFallback,
                fallback_reason: Some(reason.to_string()),
                iterations: None,
                alpha: None,
                log_likelihood: None,
                rows: rows.len(),
            };
            (outcome, records)
        }
    }
}

fn fit_category(
    rows: &[ModelRow],
    category: ModificationCategory,
    options: &FitOptions,
) -> Result<NegativeBinomialFit, FallbackReason> {
    let mut factors = vec![
        Factor::new("rating", rows.iter().map(|row| row.rating.as_str())),
        Factor::new(
            "language_grouped",
            rows.iter().map(|row| row.language_grouped.as_str()),
        ),
    ];
    if rows.iter().any(|row| row.primary_genre.is_some()) {
        factors.push(Factor::new(
            "primary_genre",
            rows.iter()
                .map(|row| row.primary_genre.as_deref().unwrap_or(MISSING_GENRE_LABEL)),
        ));
    }
    let design = DesignMatrix::with_intercept(rows.len(), &factors)?;
    let counts = rows.iter().map(|row| row.counts[category]).collect::<Vec<_>>();
    Ok(NegativeBinomialFit::fit(&design, &counts, options)?)
}

fn record(
    row: &ModelRow,
    category: ModificationCategory,
    expected: f64,
    model_kind: ModelKind,
) -> ScoreRecord {
    ScoreRecord {
        id: row.id.clone(),
        language: row.language.clone(),
        category,
        raw_count: row.counts[category],
        expected,
        model_kind,
    }
}
