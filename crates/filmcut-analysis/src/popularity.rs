//! Proportional popularity ranking
//!
//! Films are ranked by a seed popularity, but a plain sort would let the
//! largest language dominate the top of every listing. The
//! [`PopularityAllocator`] instead walks the ranking in windows the size of
//! the [`QuotaTable`] reference window and fills each window according to the
//! category weights:
//!
//! 1. Bucket films by [`LanguageCategory`], each bucket sorted by seed
//!    (descending, stable)
//! 2. For a window of `group_size` films, give each category
//!    `floor(weight * group_size / window_size)` slots, clamped by the films
//!    left in its bucket and the slots left in the window
//! 3. Hand out slots left over to the categories with the most films still
//!    unallocated (ties in declaration order)
//! 4. Consume each category's slots from the front of its bucket, assigning
//!    popularity values from `N` down to `1`
//!
//! The result is a permutation of `1..=N`: no duplicates, no gaps, and within a
//! category a higher seed always keeps a higher popularity.
//!
//! # Seeds
//!
//! A film's seed is its explicit `seed_popularity`, or, failing that, a score
//! derived from IMDb votes and rating (see [`popularity_seed`]).

use std::{cmp::Reverse, collections::HashSet, collections::VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{config::AllocatorConfig, language::LanguageCategory, quota::QuotaTable};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum AllocationError {
    #[display("film '{id}' appears more than once")]
    DuplicateId { id: String },
}

/// A film as supplied by the record-grouping step.
///
/// Fields other than the ones named here are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    pub id: String,
    /// Language labels, primary language first.
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_popularity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_votes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FilmRecord {
    /// Creates a record with an explicit seed and no extra fields.
    #[must_use]
    pub fn new<S>(id: impl Into<String>, languages: &[S], seed_popularity: f64) -> Self
    where
        S: AsRef<str>,
    {
        Self {
            id: id.into(),
            languages: languages.iter().map(|l| l.as_ref().to_owned()).collect(),
            seed_popularity: Some(seed_popularity),
            imdb_votes: None,
            imdb_rating: None,
            extra: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn language_category(&self) -> LanguageCategory {
        LanguageCategory::classify(&self.languages)
    }

    /// Seed popularity used for ordering within a language bucket.
    #[must_use]
    pub fn seed(&self) -> f64 {
        match (self.seed_popularity, self.imdb_votes, self.imdb_rating) {
            (Some(seed), _, _) => seed,
            (None, None, None) => 0.0,
            (None, votes, rating) => popularity_seed(votes, rating),
        }
    }
}

/// A film with its allocated popularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFilm {
    #[serde(flatten)]
    pub film: FilmRecord,
    pub language_category: LanguageCategory,
    pub popularity: usize,
}

/// Derives a seed from IMDb engagement.
///
/// `log10(max(votes, 1)) * 10 + rating * 2`, rounded to two decimals.
///
/// # Examples
///
/// ```
/// use filmcut_analysis::popularity::popularity_seed;
///
/// assert_eq!(popularity_seed(Some(1000), Some(7.5)), 45.0);
/// assert_eq!(popularity_seed(None, Some(6.0)), 12.0);
/// assert_eq!(popularity_seed(Some(0), None), 0.0);
/// ```
#[must_use]
pub fn popularity_seed(votes: Option<u64>, rating: Option<f64>) -> f64 {
    #[expect(clippy::cast_precision_loss)]
    let vote_score = (votes.unwrap_or(0).max(1) as f64).log10() * 10.0;
    let rating_score = rating.filter(|r| r.is_finite()).unwrap_or(0.0) * 2.0;
    ((vote_score + rating_score) * 100.0).round() / 100.0
}

/// Reassigns popularity so language categories keep their quota.
#[derive(Debug, Clone, Default)]
pub struct PopularityAllocator {
    config: AllocatorConfig,
}

impl PopularityAllocator {
    #[must_use]
    pub fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    /// Ranks films and returns them sorted by descending popularity.
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_analysis::popularity::{FilmRecord, PopularityAllocator};
    ///
    /// let films = vec![
    ///     FilmRecord::new("a", &["Hindi"], 10.0),
    ///     FilmRecord::new("b", &["Hindi"], 30.0),
    ///     FilmRecord::new("c", &["Tamil"], 20.0),
    /// ];
    /// let ranked = PopularityAllocator::default().allocate(films).unwrap();
    /// let order = ranked.iter().map(|r| (r.film.id.as_str(), r.popularity)).collect::<Vec<_>>();
    /// assert_eq!(order, [("b", 3), ("a", 2), ("c", 1)]);
    /// ```
    pub fn allocate(&self, films: Vec<FilmRecord>) -> Result<Vec<RankedFilm>, AllocationError> {
        let mut seen = HashSet::with_capacity(films.len());
        for film in &films {
            if !seen.insert(film.id.as_str()) {
                return Err(AllocationError::DuplicateId {
                    id: film.id.clone(),
                });
            }
        }

        let entries = films
            .iter()
            .map(|film| (film.language_category(), film.seed()))
            .collect::<Vec<_>>();
        let popularity = assign_popularity(&entries, &self.config.quota);

        let mut ranked = films
            .into_iter()
            .zip(entries)
            .zip(popularity)
            .map(|((mut film, (language_category, _)), popularity)| {
                film.extra.remove("popularity");
                film.extra.remove("language_category");
                RankedFilm {
                    film,
                    language_category,
                    popularity,
                }
            })
            .collect::<Vec<_>>();
        ranked.sort_by_key(|r| Reverse(r.popularity));

        info!("Allocated popularity for {} films", ranked.len());
        Ok(ranked)
    }
}

/// Computes the popularity of each `(category, seed)` entry.
///
/// The returned vector is parallel to `entries` and is a permutation of
/// `1..=entries.len()`.
///
/// # Examples
///
/// ```
/// use filmcut_analysis::{
///     language::LanguageCategory::{English, Hindi},
///     popularity::assign_popularity,
///     quota::QuotaTable,
/// };
///
/// let entries = [(Hindi, 5.0), (English, 1.0), (Hindi, 9.0)];
/// let popularity = assign_popularity(&entries, &QuotaTable::default());
/// // Hindi wins the spare slots, but English is consumed first
/// assert_eq!(popularity, [1, 3, 2]);
/// ```
#[must_use]
pub fn assign_popularity(entries: &[(LanguageCategory, f64)], quota: &QuotaTable) -> Vec<usize> {
    // Quota categories first, then any category the table leaves out
    let order = quota
        .categories()
        .chain(
            LanguageCategory::ALL
                .into_iter()
                .filter(|c| !quota.categories().any(|q| q == *c)),
        )
        .collect::<Vec<_>>();

    let mut buckets = vec![VecDeque::new(); order.len()];
    for (index, (category, _)) in entries.iter().enumerate() {
        let slot = order
            .iter()
            .position(|c| c == category)
            .unwrap_or_else(|| unreachable!("order covers every category"));
        buckets[slot].push_back(index);
    }
    for bucket in &mut buckets {
        bucket
            .make_contiguous()
            .sort_by(|a, b| seed_key(entries[*b].1).total_cmp(&seed_key(entries[*a].1)));
    }

    let mut popularity = vec![0; entries.len()];
    let mut next = entries.len();
    let mut window_index = 0;
    while next > 0 {
        let group_size = quota.window_size().min(next);
        let allocations = allocate_window(&order, &buckets, quota, group_size);
        debug!(window = window_index, group_size, ?allocations, "allocated window");

        for (bucket, count) in buckets.iter_mut().zip(&allocations) {
            for index in bucket.drain(..*count) {
                popularity[index] = next;
                next -= 1;
            }
        }
        window_index += 1;
    }
    popularity
}

/// Number of films each category contributes to one window.
fn allocate_window(
    order: &[LanguageCategory],
    buckets: &[VecDeque<usize>],
    quota: &QuotaTable,
    group_size: usize,
) -> Vec<usize> {
    let mut allocations = vec![0; order.len()];
    let mut allocated = 0;
    for (slot, category) in order.iter().enumerate() {
        let available = buckets[slot].len();
        if available == 0 {
            continue;
        }
        let count = quota
            .scaled_weight(*category, group_size)
            .min(available)
            .min(group_size - allocated);
        allocations[slot] = count;
        allocated += count;
    }

    let mut remaining_slots = group_size - allocated;
    if remaining_slots > 0 {
        let mut candidates = (0..order.len())
            .filter(|&slot| buckets[slot].len() > allocations[slot])
            .collect::<Vec<_>>();
        candidates.sort_by_key(|&slot| Reverse(buckets[slot].len() - allocations[slot]));
        for slot in candidates {
            if remaining_slots == 0 {
                break;
            }
            let extra = remaining_slots.min(buckets[slot].len() - allocations[slot]);
            allocations[slot] += extra;
            remaining_slots -= extra;
        }
    }
    allocations
}

/// NaN seeds rank below every number.
fn seed_key(seed: f64) -> f64 {
    if seed.is_nan() { f64::NEG_INFINITY } else { seed }
}
