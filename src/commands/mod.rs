pub mod details;
pub mod output;
pub mod overview;
pub mod report;
pub mod results;

use anyhow::{Result, bail};

use crate::cli::InputArgs;
use crate::loader::{
    check_document_ids, override_ground_truth, read_benchmark, read_documents, read_evaluation,
};
use crate::model::{DocumentCollection, Evaluation};

pub struct LoadedInputs {
    pub documents: DocumentCollection,
    pub evaluation: Evaluation,
}

/// Loads both input files, applies the optional benchmark override and checks
/// that every referenced document exists.
pub fn load_inputs(args: &InputArgs) -> Result<LoadedInputs> {
    if !args.threshold.is_finite() {
        bail!("threshold must be a finite number, got {}", args.threshold);
    }

    let documents = read_documents(&args.documents_path)?;
    let mut evaluation = read_evaluation(&args.evaluation_path)?;
    if let Some(benchmark_path) = &args.benchmark_path {
        let ground_truth = read_benchmark(benchmark_path)?;
        override_ground_truth(&mut evaluation, ground_truth);
    }
    check_document_ids(&evaluation, &documents)?;

    Ok(LoadedInputs {
        documents,
        evaluation,
    })
}
