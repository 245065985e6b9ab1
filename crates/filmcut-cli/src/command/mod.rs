use clap::{Parser, Subcommand};

use self::{
    analyze_modifications::AnalyzeModificationsArg, rank_popularity::RankPopularityArg,
};

mod analyze_modifications;
mod rank_popularity;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Assign quota-balanced popularity ranks to films
    RankPopularity(#[clap(flatten)] RankPopularityArg),
    /// Score censorship modifications against peer cohorts
    AnalyzeModifications(#[clap(flatten)] AnalyzeModificationsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::RankPopularity(arg) => rank_popularity::run(&arg)?,
        Mode::AnalyzeModifications(arg) => analyze_modifications::run(&arg)?,
    }
    Ok(())
}
