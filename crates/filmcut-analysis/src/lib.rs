//! Popularity ranking and comparative censorship analysis for film catalogs
//!
//! This crate holds the two analysis components that run over grouped film
//! records:
//!
//! ## Proportional Popularity Ranking
//!
//! Assigns each film an integer popularity so every window of ranked films
//! keeps the language mix of the quota table:
//!
//! 1. **Classify** ([`language::LanguageCategory`]): map each film's primary language
//! 2. **Weigh** ([`quota::QuotaTable`]): per-category weights over a reference window
//! 3. **Allocate** ([`popularity::PopularityAllocator`]): fill windows and assign `N..1`
//!
//! ## Comparative Modification Scoring
//!
//! Compares each film's censorship modifications with its peers:
//!
//! 1. **Tally** ([`event::ModificationEvent`]): flag raw events per [`event::ModificationCategory`]
//! 2. **Summarize** ([`summary::summarize`]): one row per film version
//! 3. **Preprocess** ([`summary::prepare_rows`]): primary genre, rare-category
//!    collapse, rating code
//! 4. **Score** ([`scoring::ScoringEngine`]): NB2 regression per category,
//!    falling back to [`cohort`] medians
//! 5. **Pivot** ([`pivot::pivot_scores`]): wide table per `(id, language, model_kind)`
//!
//! # Examples
//!
//! ```
//! use filmcut_analysis::{
//!     config::AnalysisConfig,
//!     popularity::{FilmRecord, PopularityAllocator},
//! };
//!
//! let config = AnalysisConfig::default();
//! let allocator = PopularityAllocator::new(config.allocator);
//!
//! let films = vec![
//!     FilmRecord::new("tt01", &["English"], 88.0),
//!     FilmRecord::new("tt02", &["Hindi"], 91.0),
//!     FilmRecord::new("tt03", &["Kannada"], 40.0),
//! ];
//! let ranked = allocator.allocate(films)?;
//! assert_eq!(ranked.len(), 3);
//! assert_eq!(ranked[0].popularity, 3);
//! # Ok::<(), filmcut_analysis::popularity::AllocationError>(())
//! ```

pub mod cohort;
pub mod config;
pub mod event;
pub mod grouping;
pub mod language;
pub mod pivot;
pub mod popularity;
pub mod quota;
pub mod scoring;
pub mod summary;
