use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::metrics::{AggregateMeasures, QueryMeasures, aggregate, mean, measure_query};
use crate::model::{Configuration, Evaluation, GroundTruth};

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub query: String,
    pub relevant_count: usize,
    pub result_count: usize,
    #[serde(flatten)]
    pub measures: QueryMeasures,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationSummary {
    pub mean_p_at_3: f64,
    pub mean_p_at_r: f64,
    pub mean_ap: f64,
    pub min_ap: f64,
    pub max_ap: f64,
    pub ap_threshold: f64,
    pub percent_ap_above_threshold: f64,
}

impl ConfigurationSummary {
    fn from_parts(p_at_3: &[f64], p_at_r: &[f64], ap: &AggregateMeasures) -> Self {
        Self {
            mean_p_at_3: mean(p_at_3),
            mean_p_at_r: mean(p_at_r),
            mean_ap: ap.mean,
            min_ap: ap.min,
            max_ap: ap.max,
            ap_threshold: ap.threshold,
            percent_ap_above_threshold: ap.percent_above,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationReport {
    pub mode: usize,
    pub k: String,
    pub b: String,
    pub queries: Vec<QueryReport>,
    pub summary: ConfigurationSummary,
}

/// Scores every benchmark query of one configuration.
///
/// `mode` is the 1-based position of the configuration in the evaluation
/// file and is carried through for display only.
pub fn evaluate_configuration(
    mode: usize,
    configuration: &Configuration,
    ground_truth: &GroundTruth,
    threshold: f64,
) -> Result<ConfigurationReport> {
    let queries = ground_truth
        .iter()
        .map(|(query, relevant)| {
            let results = configuration.ranking(query);
            QueryReport {
                query: query.to_string(),
                relevant_count: relevant.len(),
                result_count: results.len(),
                measures: measure_query(results, relevant),
            }
        })
        .collect::<Vec<QueryReport>>();

    let p_at_3 = queries
        .iter()
        .map(|row| row.measures.p_at_3)
        .collect::<Vec<f64>>();
    let p_at_r = queries
        .iter()
        .map(|row| row.measures.p_at_r)
        .collect::<Vec<f64>>();
    let ap = queries
        .iter()
        .map(|row| row.measures.ap)
        .collect::<Vec<f64>>();

    let ap_summary = aggregate(&ap, threshold)
        .with_context(|| format!("failed to summarize mode #{mode} ({})", configuration.label()))?;
    let summary = ConfigurationSummary::from_parts(&p_at_3, &p_at_r, &ap_summary);

    debug!(
        mode,
        k = %configuration.k,
        b = %configuration.b,
        mean_ap = summary.mean_ap,
        "scored configuration"
    );

    Ok(ConfigurationReport {
        mode,
        k: configuration.k.clone(),
        b: configuration.b.clone(),
        queries,
        summary,
    })
}

pub fn evaluate_all(evaluation: &Evaluation, threshold: f64) -> Result<Vec<ConfigurationReport>> {
    let reports = evaluation
        .configurations
        .iter()
        .enumerate()
        .map(|(index, configuration)| {
            evaluate_configuration(index + 1, configuration, &evaluation.ground_truth, threshold)
        })
        .collect::<Result<Vec<ConfigurationReport>>>()?;

    info!(
        configurations = reports.len(),
        queries = evaluation.ground_truth.len(),
        "computed retrieval measures"
    );
    Ok(reports)
}
