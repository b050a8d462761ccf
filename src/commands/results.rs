use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ResultsArgs;
use crate::commands::load_inputs;
use crate::commands::output::{write_comparison, write_json_stdout};
use crate::comparison::{ComparisonOptions, compare_results, find_query};

pub fn run(args: ResultsArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let query = find_query(&inputs.evaluation, &args.query)?
        .with_context(|| format!("query `{}` is not part of the benchmark", args.query))?;

    let options = ComparisonOptions {
        show_irrelevant: args.show_irrelevant,
        offset: args.offset,
        limit: args.limit,
    };
    let comparison = compare_results(
        &inputs.evaluation,
        &inputs.documents,
        args.mode,
        query,
        options,
    )?;

    if args.json {
        return write_json_stdout(&comparison);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_comparison(&mut output, &comparison)?;
    output.flush()?;

    info!(
        query = %comparison.query,
        mode = comparison.mode,
        rows = comparison.rows.len(),
        missing_relevant = comparison.missing_relevant.len(),
        "result comparison complete"
    );
    Ok(())
}
