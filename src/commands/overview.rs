use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::OverviewArgs;
use crate::commands::load_inputs;
use crate::commands::output::{write_json_stdout, write_overview};
use crate::evaluation::{ConfigurationSummary, evaluate_all};

#[derive(Debug, Serialize)]
struct OverviewRow<'a> {
    mode: usize,
    k: &'a str,
    b: &'a str,
    #[serde(flatten)]
    summary: &'a ConfigurationSummary,
}

pub fn run(args: OverviewArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let reports = evaluate_all(&inputs.evaluation, args.input.threshold)?;

    if args.json {
        let rows = reports
            .iter()
            .map(|report| OverviewRow {
                mode: report.mode,
                k: &report.k,
                b: &report.b,
                summary: &report.summary,
            })
            .collect::<Vec<OverviewRow<'_>>>();
        return write_json_stdout(&rows);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_overview(&mut output, &reports, args.input.threshold)?;
    output.flush()?;

    info!(modes = reports.len(), "overview complete");
    Ok(())
}
