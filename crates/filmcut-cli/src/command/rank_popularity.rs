use std::{collections::BTreeMap, path::PathBuf};

use clap::Args;
use filmcut_analysis::{
    language::LanguageCategory,
    popularity::{FilmRecord, PopularityAllocator, RankedFilm},
};
use filmcut_stats::descriptive::DescriptiveStats;
use tracing::info;

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct RankPopularityArg {
    /// Path to the films JSON file
    pub input: PathBuf,
    /// Output file path (defaults to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Path to an analysis config JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub(crate) fn run(arg: &RankPopularityArg) -> anyhow::Result<()> {
    let config = util::load_config(arg.config.as_deref())?;
    let films: Vec<FilmRecord> = util::read_json_file("films", &arg.input)?;
    info!("Loaded {} films from {}", films.len(), arg.input.display());

    let window_size = config.allocator.quota.window_size();
    let allocator = PopularityAllocator::new(config.allocator);
    let ranked = allocator.allocate(films)?;

    print_category_table(&ranked, window_size);
    Output::save_json(&ranked, arg.output.clone())?;
    Ok(())
}

/// Prints per-category totals and the category mix of the first window.
fn print_category_table(ranked: &[RankedFilm], window_size: usize) {
    let mut by_category = BTreeMap::<LanguageCategory, Vec<&RankedFilm>>::new();
    for film in ranked {
        by_category.entry(film.language_category).or_default().push(film);
    }

    eprintln!(
        "  {:<12} {:>8} {:>12} {:>12} {:>12}",
        "Category", "Films", "Top Window", "Mean Seed", "Max Pop"
    );
    eprintln!("  {}", "-".repeat(60));
    for (category, films) in &by_category {
        let in_top_window = films
            .iter()
            .filter(|film| film.popularity + window_size > ranked.len())
            .count();
        let seeds = DescriptiveStats::new(
            films
                .iter()
                .map(|film| film.film.seed())
                .filter(|seed| !seed.is_nan()),
        );
        let best = films.iter().map(|film| film.popularity).max().unwrap_or(0);
        eprintln!(
            "  {:<12} {:>8} {:>12} {:>12} {:>12}",
            category,
            films.len(),
            in_top_window,
            seeds.map_or("N/A".to_string(), |s| format!("{:.2}", s.mean)),
            best,
        );
    }
}
