use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::ReportArgs;
use crate::commands::load_inputs;
use crate::evaluation::{ConfigurationReport, evaluate_all};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

const REPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub role: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub sources: Vec<SourceFile>,
    pub ap_threshold: f64,
    pub document_count: usize,
    pub query_count: usize,
    pub configuration_count: usize,
    pub configurations: Vec<ConfigurationReport>,
}

pub fn run(args: ReportArgs) -> Result<()> {
    let inputs = load_inputs(&args.input)?;
    let configurations = evaluate_all(&inputs.evaluation, args.input.threshold)?;

    let mut sources = vec![
        source_file("documents", &args.input.documents_path)?,
        source_file("evaluation", &args.input.evaluation_path)?,
    ];
    if let Some(benchmark_path) = &args.input.benchmark_path {
        sources.push(source_file("benchmark", benchmark_path)?);
    }

    let report = EvaluationReport {
        manifest_version: REPORT_VERSION,
        generated_at: now_utc_string(),
        sources,
        ap_threshold: args.input.threshold,
        document_count: inputs.documents.len(),
        query_count: inputs.evaluation.ground_truth.len(),
        configuration_count: configurations.len(),
        configurations,
    };

    write_json_pretty(&args.output, &report)?;
    info!(
        path = %args.output.display(),
        configurations = report.configuration_count,
        queries = report.query_count,
        "wrote evaluation report"
    );
    Ok(())
}

fn source_file(role: &str, path: &Path) -> Result<SourceFile> {
    Ok(SourceFile {
        role: role.to_string(),
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
    })
}
