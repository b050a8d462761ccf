use std::io::{self, Write};

use anyhow::{Result, bail};
use tracing::info;

use crate::cli::DetailsArgs;
use crate::commands::load_inputs;
use crate::commands::output::{write_details, write_json_stdout};
use crate::evaluation::{ConfigurationReport, evaluate_configuration};

pub fn run(args: DetailsArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let evaluation = &inputs.evaluation;

    let mut reports = Vec::<ConfigurationReport>::with_capacity(args.modes.len());
    for mode in &args.modes {
        let Some(configuration) = evaluation.mode(*mode) else {
            bail!(
                "mode #{mode} does not exist (evaluation has {} modes)",
                evaluation.configurations.len()
            );
        };
        reports.push(evaluate_configuration(
            *mode,
            configuration,
            &evaluation.ground_truth,
            args.input.threshold,
        )?);
    }

    if args.json {
        return write_json_stdout(&reports);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_details(&mut output, &reports)?;
    output.flush()?;

    info!(modes = ?args.modes, "details complete");
    Ok(())
}
