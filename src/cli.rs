use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::comparison::DEFAULT_PAGE_SIZE;
use crate::metrics::DEFAULT_AP_THRESHOLD;

#[derive(Parser, Debug)]
#[command(
    name = "bm25-eval-viewer",
    version,
    about = "Compare BM25 ranking configurations on a retrieval benchmark"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// One row per mode with mean, minimum and maximum measures.
    Overview(OverviewArgs),
    /// Per-query measures for one or more modes.
    Details(DetailsArgs),
    /// Ranking of one query across all modes.
    Results(ResultsArgs),
    /// Write every measure to a JSON report.
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(long, default_value = "input/movies.tsv")]
    pub documents_path: PathBuf,

    #[arg(long, default_value = "output/movies-benchmark_evaluation.tsv")]
    pub evaluation_path: PathBuf,

    /// `query<TAB>ids` file replacing the ground truth row of the evaluation.
    #[arg(long)]
    pub benchmark_path: Option<PathBuf>,

    /// Average precision a query must exceed to count as a success.
    #[arg(long, default_value_t = DEFAULT_AP_THRESHOLD)]
    pub threshold: f64,
}

#[derive(Args, Debug, Clone)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DetailsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// 1-based mode number; repeat to compare several modes.
    #[arg(long = "mode", required = true)]
    pub modes: Vec<usize>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ResultsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long)]
    pub mode: usize,

    #[arg(long)]
    pub query: String,

    #[arg(long, default_value_t = false)]
    pub show_irrelevant: bool,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, default_value = "output/evaluation_report.json")]
    pub output: PathBuf,
}
