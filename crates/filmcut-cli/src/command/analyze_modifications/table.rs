//! Scoring summary tables
//!
//! Printed to stderr so stdout stays valid JSON.

use filmcut_analysis::{
    event::ModificationCategory,
    pivot::{PeerComparison, ScoreRow},
    scoring::CategoryOutcome,
};
use filmcut_stats::descriptive::DescriptiveStats;

fn opt_str<T, F>(value: Option<T>, format: F) -> String
where
    F: FnOnce(T) -> String,
{
    value.map_or("N/A".to_string(), format)
}

/// Print how each category was modeled
pub(super) fn print_outcome_table(outcomes: &[CategoryOutcome]) {
    eprintln!(
        "  {:<20} {:>15} {:>6} {:>6} {:>10} {:>12}",
        "Category", "Model", "Rows", "Iter", "Alpha", "LogLik"
    );
    // category(20) + model(15) + rows(6) + iter(6) + alpha(10) + loglik(12) + spaces(5)
    eprintln!("  {}", "-".repeat(74));
    for outcome in outcomes {
        eprintln!(
            "  {:<20} {:>15} {:>6} {:>6} {:>10} {:>12}",
            outcome.category,
            outcome.model_kind,
            outcome.rows,
            opt_str(outcome.iterations, |i| i.to_string()),
            opt_str(outcome.alpha, |a| format!("{a:.4}")),
            opt_str(outcome.log_likelihood, |ll| format!("{ll:.2}")),
        );
        if let Some(reason) = &outcome.fallback_reason {
            eprintln!("  {:<20} fallback: {reason}", "");
        }
    }
}

/// Print raw count statistics and peer comparisons per category
pub(super) fn print_score_table(scores: &[ScoreRow], tolerance: f64) {
    eprintln!(
        "  {:<20} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Category", "Films", "Mean", "Median", "Max", "Above", "InLine", "Below"
    );
    // category(20) + 7 * 8 + spaces(7)
    eprintln!("  {}", "-".repeat(83));
    for category in ModificationCategory::ALL {
        let stats = DescriptiveStats::new(
            scores
                .iter()
                .filter_map(|row| row.raw_count(category))
                .map(f64::from),
        );
        let mut comparisons = [0_usize; 3];
        for comparison in scores.iter().filter_map(|row| row.compare(category, tolerance)) {
            let index = match comparison {
                PeerComparison::Above => 0,
                PeerComparison::InLine => 1,
                PeerComparison::Below => 2,
            };
            comparisons[index] += 1;
        }
        eprintln!(
            "  {:<20} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            category,
            stats.as_ref().map_or(0, |s| s.count),
            opt_str(stats.as_ref(), |s| format!("{:.2}", s.mean)),
            opt_str(stats.as_ref(), |s| format!("{:.1}", s.median)),
            opt_str(stats.as_ref(), |s| format!("{:.0}", s.max)),
            comparisons[0],
            comparisons[1],
            comparisons[2],
        );
    }
}
