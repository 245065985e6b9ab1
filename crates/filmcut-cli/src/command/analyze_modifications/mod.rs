//! Comparative modification scoring command
//!
//! Scores every film's censorship modifications against its peers and writes
//! the pivoted score table as JSON. A summary of each category run is printed
//! to stderr.

mod table;

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use filmcut_analysis::{
    event::ModificationEvent, pivot::pivot_scores, scoring::ScoringEngine,
};
use tracing::info;

use crate::{
    schema::report::ScoreReport,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeModificationsArg {
    /// Path to the modification events JSON file
    pub input: PathBuf,
    /// Output file path (defaults to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Path to an analysis config JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Minimum occurrences for a genre or language to keep its own level
    #[arg(long)]
    pub min_category_count: Option<usize>,
    /// Iteration cap for each regression fit
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Deltas within this distance of zero count as in line with peers
    #[arg(long, default_value_t = 0.5)]
    pub peer_tolerance: f64,
}

pub(crate) fn run(arg: &AnalyzeModificationsArg) -> anyhow::Result<()> {
    let mut config = util::load_config(arg.config.as_deref())?.scoring;
    if let Some(min_category_count) = arg.min_category_count {
        config.min_category_count = min_category_count;
    }
    if let Some(max_iterations) = arg.max_iterations {
        config.max_iterations = max_iterations;
    }

    let events: Vec<ModificationEvent> = util::read_json_file("modification events", &arg.input)?;
    info!("Loaded {} events from {}", events.len(), arg.input.display());

    let engine = ScoringEngine::new(config);
    let report = engine.run(&events)?;
    let scores = pivot_scores(&report.records);

    table::print_outcome_table(&report.outcomes);
    eprintln!();
    table::print_score_table(&scores, arg.peer_tolerance);

    let output = ScoreReport {
        generated_at: Utc::now(),
        categories: report.outcomes,
        scores,
    };
    Output::save_json(&output, arg.output.clone())?;
    Ok(())
}
