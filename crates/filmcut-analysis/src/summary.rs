//! Per-film modification summaries and model preprocessing
//!
//! Raw [`ModificationEvent`]s are first summarized into one [`FilmSummary`]
//! per `(id, language)` pair, keeping the first [`RatingCode`] found in any of
//! the pair's certificate texts. Summaries are then preprocessed into
//! [`ModelRow`]s:
//!
//! 1. pick a primary genre from the delimited genre list
//! 2. collapse rare genres and languages into [`OTHER_LABEL`](crate::grouping::OTHER_LABEL)
//! 3. drop rows without a rating code or a language

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::ScoringConfig,
    event::{CategoryCounts, ModificationEvent},
    grouping::{collapse_rare_categories, split_delimited},
};

/// Certification board rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatingCode {
    U,
    UA,
    A,
    S,
}

impl fmt::Display for RatingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl RatingCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::U => "U",
            Self::UA => "UA",
            Self::A => "A",
            Self::S => "S",
        }
    }

    /// Extracts the leftmost rating code from certificate text.
    ///
    /// Matching is case-sensitive. At each position `UA` is tried before `U`,
    /// so `"UA 16+"` is `UA` rather than `U`.
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_analysis::summary::RatingCode;
    ///
    /// assert_eq!(RatingCode::extract("UA 13+"), Some(RatingCode::UA));
    /// assert_eq!(RatingCode::extract("Certified U"), Some(RatingCode::U));
    /// assert_eq!(RatingCode::extract("A"), Some(RatingCode::A));
    /// assert_eq!(RatingCode::extract("a"), None);
    /// assert_eq!(RatingCode::extract("18+"), None);
    /// ```
    #[must_use]
    pub fn extract(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        bytes.iter().enumerate().find_map(|(i, byte)| match byte {
            b'U' if bytes.get(i + 1) == Some(&b'A') => Some(Self::UA),
            b'U' => Some(Self::U),
            b'A' => Some(Self::A),
            b'S' => Some(Self::S),
            _ => None,
        })
    }
}

/// Picks the genre a film is compared on.
///
/// The first entry of `priority` present in the delimited list wins;
/// otherwise the first listed genre. Returns `None` when the list is empty.
///
/// # Examples
///
/// ```
/// use filmcut_analysis::{config::ScoringConfig, summary::primary_genre};
///
/// let priority = ScoringConfig::default().genre_priority;
/// assert_eq!(primary_genre("Drama|Comedy|Crime", &priority).as_deref(), Some("Crime"));
/// assert_eq!(primary_genre("Romance; Drama", &priority).as_deref(), Some("Romance"));
/// assert_eq!(primary_genre(" | ", &priority), None);
/// ```
#[must_use]
pub fn primary_genre<S>(genres: &str, priority: &[S]) -> Option<String>
where
    S: AsRef<str>,
{
    let tokens = split_delimited(genres);
    priority
        .iter()
        .map(AsRef::as_ref)
        .find(|genre| tokens.contains(genre))
        .or_else(|| tokens.first().copied())
        .map(str::to_owned)
}

/// Modification counts of one version of a film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmSummary {
    pub id: String,
    pub language: Option<String>,
    /// First rating code found among this film's events.
    pub rating: Option<RatingCode>,
    /// First genre list seen for this film.
    pub genres: Option<String>,
    pub counts: CategoryCounts,
}

/// Aggregates events into one summary per `(id, language)`, ordered by key.
///
/// # Examples
///
/// ```
/// use filmcut_analysis::{
///     event::{ModificationCategory, ModificationEvent},
///     summary::summarize,
/// };
///
/// let event = |id: &str, action: &str| ModificationEvent {
///     id: id.to_owned(),
///     language: Some("Hindi".to_owned()),
///     rating: None,
///     action_kind: Some(action.to_owned()),
///     content_types: vec!["violence".to_owned()],
///     genres: None,
/// };
/// let summaries = summarize(&[event("b", "deletion"), event("a", "insertion"), event("b", "replacement")]);
/// assert_eq!(summaries.len(), 2);
/// assert_eq!(summaries[0].id, "a");
/// assert_eq!(summaries[1].counts[ModificationCategory::Violence], 2);
/// ```
#[must_use]
pub fn summarize(events: &[ModificationEvent]) -> Vec<FilmSummary> {
    let mut groups = BTreeMap::<(&str, Option<&str>), FilmSummary>::new();
    for event in events {
        let key = (event.id.as_str(), event.language.as_deref());
        let summary = groups.entry(key).or_insert_with(|| FilmSummary {
            id: event.id.clone(),
            language: event.language.clone(),
            rating: None,
            genres: None,
            counts: CategoryCounts::default(),
        });
        if summary.rating.is_none() {
            summary.rating = event.rating.as_deref().and_then(RatingCode::extract);
        }
        if summary.genres.is_none() {
            summary.genres.clone_from(&event.genres);
        }
        summary.counts.add(&event.counts());
    }
    groups.into_values().collect()
}

/// A summary ready for modeling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRow {
    pub id: String,
    pub language: String,
    pub primary_genre: Option<String>,
    pub rating: RatingCode,
    pub language_grouped: String,
    pub counts: CategoryCounts,
}

/// Turns summaries into model rows.
///
/// Rare genres and languages are counted over every summary, including those
/// later dropped for lacking a rating code.
#[must_use]
pub fn prepare_rows(summaries: Vec<FilmSummary>, config: &ScoringConfig) -> Vec<ModelRow> {
    let mut genres = summaries
        .iter()
        .map(|s| {
            s.genres
                .as_deref()
                .and_then(|g| primary_genre(g, &config.genre_priority))
        })
        .collect::<Vec<_>>();
    let mut languages = summaries
        .iter()
        .map(|s| s.language.clone())
        .collect::<Vec<_>>();
    collapse_rare_categories(&mut genres, config.min_category_count, "primary_genre");
    collapse_rare_categories(&mut languages, config.min_category_count, "language");

    let total = summaries.len();
    let rows = summaries
        .into_iter()
        .zip(genres)
        .zip(languages)
        .filter_map(|((summary, primary_genre), language_grouped)| {
            let rating = summary.rating?;
            Some(ModelRow {
                id: summary.id,
                language: summary.language?,
                primary_genre,
                rating,
                language_grouped: language_grouped?,
                counts: summary.counts,
            })
        })
        .collect::<Vec<_>>();
    info!(
        "Prepared {} model rows ({} dropped without rating or language)",
        rows.len(),
        total - rows.len()
    );
    rows
}
