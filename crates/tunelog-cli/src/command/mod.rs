use clap::{Parser, Subcommand};

use self::{best::BestArg, dump::DumpArg, summary::SummaryArg};

mod best;
mod dump;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print the fastest successful record of a tuning log
    Best(#[clap(flatten)] BestArg),
    /// Print one summary line per record
    Dump(#[clap(flatten)] DumpArg),
    /// Print per-workload statistics of a tuning log
    Summary(#[clap(flatten)] SummaryArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Best(arg) => best::run(&arg)?,
        Mode::Dump(arg) => dump::run(&arg)?,
        Mode::Summary(arg) => summary::run(&arg)?,
    }
    Ok(())
}
