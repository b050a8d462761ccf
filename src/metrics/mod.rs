//! Retrieval-quality measures over one ranked result list, and their
//! aggregation across the queries of a configuration.

use serde::Serialize;
use thiserror::Error;

use crate::model::{DocId, RelevantSet};

pub const PRECISION_CUTOFF: usize = 3;
pub const DEFAULT_AP_THRESHOLD: f64 = 0.5;

#[derive(Debug, Error, PartialEq)]
pub enum MetricsError {
    #[error("cannot aggregate an empty set of per-query values")]
    EmptyAggregate,
    #[error("per-query value at index {index} is not finite: {value}")]
    NonFinite { index: usize, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryMeasures {
    pub p_at_3: f64,
    pub p_at_r: f64,
    pub ap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateMeasures {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub threshold: f64,
    pub percent_above: f64,
}

/// Fraction of the first `k` results that are relevant.
///
/// Only `min(k, results.len())` entries are inspected but the count is always
/// divided by `k`, so short result lists are penalized. `k == 0` yields 0.
pub fn precision_at_k(results: &[DocId], relevant: &RelevantSet, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }

    let hits = results
        .iter()
        .take(k)
        .filter(|id| relevant.contains(**id))
        .count();
    hits as f64 / k as f64
}

/// Precision at R, where R is the number of relevant documents.
pub fn precision_at_r(results: &[DocId], relevant: &RelevantSet) -> f64 {
    precision_at_k(results, relevant, relevant.len())
}

/// Average precision over the full result list.
///
/// Every occurrence of a relevant id counts as a hit, duplicates included.
/// An empty relevance set yields 0 instead of dividing by zero.
pub fn average_precision(results: &[DocId], relevant: &RelevantSet) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }

    let mut hits = 0usize;
    let mut sum = 0.0_f64;
    for (index, id) in results.iter().enumerate() {
        if relevant.contains(*id) {
            hits += 1;
            sum += hits as f64 / (index + 1) as f64;
        }
    }
    sum / relevant.len() as f64
}

pub fn measure_query(results: &[DocId], relevant: &RelevantSet) -> QueryMeasures {
    QueryMeasures {
        p_at_3: precision_at_k(results, relevant, PRECISION_CUTOFF),
        p_at_r: precision_at_r(results, relevant),
        ap: average_precision(results, relevant),
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage of values strictly greater than `threshold`; 0 for an empty slice.
pub fn percent_above(values: &[f64], threshold: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let accepted = values.iter().filter(|value| **value > threshold).count();
    accepted as f64 / values.len() as f64 * 100.0
}

pub fn aggregate(values: &[f64], threshold: f64) -> Result<AggregateMeasures, MetricsError> {
    if values.is_empty() {
        return Err(MetricsError::EmptyAggregate);
    }
    if let Some((index, value)) = values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(MetricsError::NonFinite { index, value });
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(AggregateMeasures {
        mean: mean(values),
        min,
        max,
        threshold,
        percent_above: percent_above(values, threshold),
    })
}
