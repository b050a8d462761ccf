use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::model::{
    Configuration, DocId, Document, DocumentCollection, Evaluation, GroundTruth, RelevantSet,
};

const GROUND_TRUTH_MARKER: &str = "ground_truth";
const PARAMETER_COLUMNS: usize = 2;

pub fn read_documents(path: &Path) -> Result<DocumentCollection> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read documents file: {}", path.display()))?;
    let documents = parse_documents(&raw)
        .with_context(|| format!("failed to parse documents file: {}", path.display()))?;

    info!(path = %path.display(), documents = documents.len(), "loaded documents");
    Ok(documents)
}

/// Parses `title<TAB>description` lines; the document id is the line number.
pub fn parse_documents(raw: &str) -> Result<DocumentCollection> {
    let mut documents = Vec::new();
    for (line_number, line) in physical_lines(raw) {
        if line.trim().is_empty() {
            bail!("line {line_number}: blank line inside the documents file");
        }
        let (title, description) = line.split_once('\t').unwrap_or((line, ""));
        let title = title.trim();
        if title.is_empty() {
            bail!("document on line {line_number} has an empty title");
        }
        documents.push(Document {
            title: title.to_string(),
            description: description.trim().to_string(),
        });
    }
    Ok(DocumentCollection::new(documents))
}

pub fn read_evaluation(path: &Path) -> Result<Evaluation> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read evaluation file: {}", path.display()))?;
    let evaluation = parse_evaluation(&raw)
        .with_context(|| format!("failed to parse evaluation file: {}", path.display()))?;

    info!(
        path = %path.display(),
        queries = evaluation.ground_truth.len(),
        configurations = evaluation.configurations.len(),
        "loaded evaluation"
    );
    Ok(evaluation)
}

/// Parses the evaluation layout: a `k, b, queries...` header, one row per
/// configuration, and a trailing `ground_truth` row.
pub fn parse_evaluation(raw: &str) -> Result<Evaluation> {
    let lines = content_lines(raw).collect::<Vec<(usize, &str)>>();
    let Some(((_, header_line), rest)) = lines.split_first() else {
        bail!("evaluation file is empty");
    };
    let Some(((ground_truth_line_number, ground_truth_line), body)) = rest.split_last() else {
        bail!("evaluation file has no ground-truth row");
    };

    let header = header_line.split('\t').collect::<Vec<&str>>();
    if header.len() < PARAMETER_COLUMNS || header[0].trim() != "k" || header[1].trim() != "b" {
        bail!("evaluation header must start with the columns k and b");
    }
    let queries = header[PARAMETER_COLUMNS..]
        .iter()
        .map(|query| query.trim().to_string())
        .collect::<Vec<String>>();

    let ground_truth_line_number = *ground_truth_line_number;
    let ground_truth_cells = split_row(ground_truth_line, header.len(), ground_truth_line_number)?;
    if ground_truth_cells[0].trim() != GROUND_TRUTH_MARKER {
        bail!(
            "line {}: last row must start with `{}`",
            ground_truth_line_number,
            GROUND_TRUTH_MARKER
        );
    }

    let mut ground_truth = GroundTruth::default();
    for (query, cell) in queries
        .iter()
        .zip(&ground_truth_cells[PARAMETER_COLUMNS..])
    {
        let ids = parse_id_list(cell)
            .with_context(|| format!("line {ground_truth_line_number}: query `{query}`"))?;
        if !ground_truth.insert(query.clone(), RelevantSet::from_ids(ids)) {
            bail!("query `{query}` appears more than once in the header");
        }
    }

    let mut configurations = Vec::with_capacity(body.len());
    for &(line_number, line) in body {
        let cells = split_row(line, header.len(), line_number)?;

        let mut rankings = HashMap::with_capacity(queries.len());
        for (query, cell) in queries.iter().zip(&cells[PARAMETER_COLUMNS..]) {
            let ids = parse_id_list(cell)
                .with_context(|| format!("line {line_number}: query `{query}`"))?;
            rankings.insert(query.clone(), ids);
        }

        configurations.push(Configuration::new(
            cells[0].trim().to_string(),
            cells[1].trim().to_string(),
            rankings,
        ));
    }

    Ok(Evaluation {
        ground_truth,
        configurations,
    })
}

pub fn read_benchmark(path: &Path) -> Result<GroundTruth> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read benchmark file: {}", path.display()))?;
    let ground_truth = parse_benchmark(&raw)
        .with_context(|| format!("failed to parse benchmark file: {}", path.display()))?;

    info!(path = %path.display(), queries = ground_truth.len(), "loaded benchmark");
    Ok(ground_truth)
}

/// Parses `query<TAB>id1 id2 id3 ...` lines.
pub fn parse_benchmark(raw: &str) -> Result<GroundTruth> {
    let mut ground_truth = GroundTruth::default();
    for (line_number, line) in content_lines(raw) {
        let Some((query, ids)) = line.split_once('\t') else {
            bail!("line {line_number}: expected `query<TAB>ids`");
        };
        let ids = ids
            .split_whitespace()
            .map(parse_doc_id)
            .collect::<Result<Vec<DocId>>>()
            .with_context(|| format!("line {line_number}: query `{}`", query.trim()))?;

        if !ground_truth.insert(query.trim().to_string(), RelevantSet::from_ids(ids)) {
            bail!("line {line_number}: duplicate query `{}`", query.trim());
        }
    }
    Ok(ground_truth)
}

/// Replaces the ground truth of `evaluation` with a separately loaded one.
pub fn override_ground_truth(evaluation: &mut Evaluation, ground_truth: GroundTruth) {
    let known = evaluation.ground_truth.queries();
    for query in ground_truth.queries() {
        if !known.contains(query) {
            warn!(query = %query, "benchmark query has no rankings in the evaluation file");
        }
    }
    evaluation.ground_truth = ground_truth;
}

/// Fails if any ranking or judgment refers to a document that does not exist.
pub fn check_document_ids(evaluation: &Evaluation, documents: &DocumentCollection) -> Result<()> {
    let in_range = |id: DocId| documents.get(id).is_some();

    for (query, relevant) in evaluation.ground_truth.iter() {
        if let Some(id) = relevant.ids().iter().copied().find(|id| !in_range(*id)) {
            bail!(
                "ground truth for `{query}` references unknown document {id} (collection has {})",
                documents.len()
            );
        }
    }

    for (index, configuration) in evaluation.configurations.iter().enumerate() {
        for query in evaluation.ground_truth.queries() {
            let ranking = configuration.ranking(query);
            if let Some(id) = ranking.iter().copied().find(|id| !in_range(*id)) {
                bail!(
                    "mode #{} ranking for `{query}` references unknown document {id} \
                     (collection has {})",
                    index + 1,
                    documents.len()
                );
            }
        }
    }

    Ok(())
}

/// Lines paired with their 1-based line number in the file, without the
/// blank lines that end the file.
fn physical_lines(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    let lines = raw
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect::<Vec<&str>>();
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |index| index + 1);
    lines
        .into_iter()
        .take(end)
        .enumerate()
        .map(|(index, line)| (index + 1, line))
}

/// Non-blank lines with their physical line numbers.
fn content_lines(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    physical_lines(raw).filter(|(_, line)| !line.trim().is_empty())
}

fn split_row<'a>(line: &'a str, expected: usize, line_number: usize) -> Result<Vec<&'a str>> {
    let cells = line.split('\t').collect::<Vec<&str>>();
    if cells.len() != expected {
        bail!(
            "line {line_number}: expected {expected} tab-separated columns, found {}",
            cells.len()
        );
    }
    Ok(cells)
}

fn parse_id_list(cell: &str) -> Result<Vec<DocId>> {
    let values: Vec<i64> = serde_json::from_str(cell.trim())
        .with_context(|| format!("expected a list of document ids, found `{}`", cell.trim()))?;
    values
        .into_iter()
        .map(|value| {
            if value < 1 {
                bail!("document id must be positive, found {value}");
            }
            DocId::try_from(value).with_context(|| format!("document id out of range: {value}"))
        })
        .collect()
}

fn parse_doc_id(raw: &str) -> Result<DocId> {
    let id = raw
        .parse::<DocId>()
        .with_context(|| format!("invalid document id: `{raw}`"))?;
    if id == 0 {
        bail!("document id must be positive, found 0");
    }
    Ok(id)
}
