use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Serialize;

use crate::model::{DocId, DocumentCollection, Evaluation};

pub const DEFAULT_PAGE_SIZE: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct ComparisonOptions {
    /// Include results that are not in the ground truth.
    pub show_irrelevant: bool,
    /// Position in the chosen mode's result list to resume scanning from.
    pub offset: usize,
    pub limit: usize,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            show_irrelevant: false,
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparedResult {
    pub doc_id: DocId,
    pub title: String,
    pub description: String,
    pub relevant: bool,
    /// 1-based rank of the document in each mode, in mode order.
    pub positions: Vec<Option<usize>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingDocument {
    pub doc_id: DocId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultComparison {
    pub query: String,
    pub mode: usize,
    pub modes: Vec<String>,
    pub relevant_count: usize,
    pub result_count: usize,
    pub rows: Vec<ComparedResult>,
    pub next_offset: Option<usize>,
    pub missing_relevant: Vec<MissingDocument>,
}

/// Resolves user input to a benchmark query, ignoring case and spacing.
pub fn find_query<'a>(evaluation: &'a Evaluation, raw: &str) -> Result<Option<&'a str>> {
    let whitespace = Regex::new(r"\s+").context("failed to compile whitespace regex")?;
    let normalize = |value: &str| whitespace.replace_all(value.trim(), " ").to_lowercase();
    let wanted = normalize(raw);

    Ok(evaluation
        .ground_truth
        .queries()
        .iter()
        .map(String::as_str)
        .find(|query| normalize(*query) == wanted))
}

/// Compares the ranking of one query across all modes, paging through the
/// result list of the chosen (1-based) mode.
pub fn compare_results(
    evaluation: &Evaluation,
    documents: &DocumentCollection,
    mode: usize,
    query: &str,
    options: ComparisonOptions,
) -> Result<ResultComparison> {
    let Some(chosen) = evaluation.mode(mode) else {
        bail!(
            "mode #{mode} does not exist (evaluation has {} modes)",
            evaluation.configurations.len()
        );
    };
    let Some(relevant) = evaluation.ground_truth.relevant(query) else {
        bail!("query `{query}` is not part of the benchmark");
    };
    if options.limit == 0 {
        bail!("page size must be at least 1");
    }

    let results = chosen.ranking(query);
    let mut rows = Vec::new();
    let mut cursor = options.offset.min(results.len());
    while cursor < results.len() && rows.len() < options.limit {
        let doc_id = results[cursor];
        cursor += 1;

        let is_relevant = relevant.contains(doc_id);
        if !is_relevant && !options.show_irrelevant {
            continue;
        }

        let positions = evaluation
            .configurations
            .iter()
            .map(|configuration| {
                configuration
                    .ranking(query)
                    .iter()
                    .position(|id| *id == doc_id)
                    .map(|index| index + 1)
            })
            .collect();
        let document = documents.get(doc_id);
        rows.push(ComparedResult {
            doc_id,
            title: documents.title(doc_id).to_string(),
            description: document.map(|doc| doc.description.clone()).unwrap_or_default(),
            relevant: is_relevant,
            positions,
        });
    }

    let has_more = results[cursor..]
        .iter()
        .any(|id| options.show_irrelevant || relevant.contains(*id));

    Ok(ResultComparison {
        query: query.to_string(),
        mode,
        modes: evaluation
            .configurations
            .iter()
            .map(|configuration| configuration.label())
            .collect(),
        relevant_count: relevant.len(),
        result_count: results.len(),
        rows,
        next_offset: has_more.then_some(cursor),
        missing_relevant: missing_relevant(results, relevant.ids(), documents),
    })
}

/// Relevant documents absent from `results`, sorted by title.
pub fn missing_relevant(
    results: &[DocId],
    relevant: &[DocId],
    documents: &DocumentCollection,
) -> Vec<MissingDocument> {
    let retrieved = results.iter().copied().collect::<HashSet<DocId>>();
    let mut missing = relevant
        .iter()
        .copied()
        .filter(|id| !retrieved.contains(id))
        .map(|doc_id| MissingDocument {
            doc_id,
            title: documents.title(doc_id).to_string(),
            description: documents
                .get(doc_id)
                .map(|doc| doc.description.clone())
                .unwrap_or_default(),
        })
        .collect::<Vec<MissingDocument>>();
    missing.sort_by(|left, right| {
        left.title
            .cmp(&right.title)
            .then(left.doc_id.cmp(&right.doc_id))
    });
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{parse_documents, parse_evaluation};

    const EVALUATION: &str = "k\tb\tanimated film\tshort  film\n\
1.75\t0.75\t[2, 4, 1, 5]\t[3]\n\
0.0\t0.0\t[1, 2]\t[4, 3]\n\
ground_truth\t\t[1, 3, 4]\t[3, 4]\n";

    fn fixture() -> (Evaluation, DocumentCollection) {
        let evaluation = parse_evaluation(EVALUATION).expect("evaluation should parse");
        let documents = parse_documents(
            "Zorro\tmasked hero\nBambi\tdeer\nAkira\tneo tokyo\nCasper\tghost\nDumbo\telephant\n",
        )
        .expect("documents should parse");
        (evaluation, documents)
    }

    #[test]
    fn find_query_ignores_case_and_spacing() {
        let (evaluation, _) = fixture();
        assert_eq!(
            find_query(&evaluation, "  Animated   FILM ").expect("regex compiles"),
            Some("animated film")
        );
        assert_eq!(
            find_query(&evaluation, "short film").expect("regex compiles"),
            Some("short  film")
        );
        assert_eq!(find_query(&evaluation, "horror").expect("regex compiles"), None);
    }

    #[test]
    fn compare_results_shows_only_relevant_by_default() {
        let (evaluation, documents) = fixture();
        let comparison = compare_results(
            &evaluation,
            &documents,
            1,
            "animated film",
            ComparisonOptions::default(),
        )
        .expect("comparison should build");

        let ids: Vec<DocId> = comparison.rows.iter().map(|row| row.doc_id).collect();
        assert_eq!(ids, vec![4, 1]);
        assert!(comparison.rows.iter().all(|row| row.relevant));
        assert_eq!(comparison.rows[0].title, "Casper");
        assert_eq!(comparison.rows[0].positions, vec![Some(2), None]);
        assert_eq!(comparison.rows[1].positions, vec![Some(3), Some(1)]);
        assert_eq!(comparison.next_offset, None);
        assert_eq!(comparison.relevant_count, 3);
        assert_eq!(comparison.result_count, 4);
    }

    #[test]
    fn compare_results_flags_irrelevant_when_requested() {
        let (evaluation, documents) = fixture();
        let options = ComparisonOptions {
            show_irrelevant: true,
            ..ComparisonOptions::default()
        };
        let comparison = compare_results(&evaluation, &documents, 1, "animated film", options)
            .expect("comparison should build");

        let flags: Vec<(DocId, bool)> = comparison
            .rows
            .iter()
            .map(|row| (row.doc_id, row.relevant))
            .collect();
        assert_eq!(flags, vec![(2, false), (4, true), (1, true), (5, false)]);
    }

    #[test]
    fn compare_results_pages_through_results() {
        let (evaluation, documents) = fixture();
        let first = compare_results(
            &evaluation,
            &documents,
            1,
            "animated film",
            ComparisonOptions {
                show_irrelevant: true,
                offset: 0,
                limit: 3,
            },
        )
        .expect("first page should build");
        assert_eq!(first.rows.len(), 3);
        assert_eq!(first.next_offset, Some(3));

        let second = compare_results(
            &evaluation,
            &documents,
            1,
            "animated film",
            ComparisonOptions {
                show_irrelevant: true,
                offset: 3,
                limit: 3,
            },
        )
        .expect("second page should build");
        let ids: Vec<DocId> = second.rows.iter().map(|row| row.doc_id).collect();
        assert_eq!(ids, vec![5]);
        assert_eq!(second.next_offset, None);
    }

    #[test]
    fn relevant_only_paging_resumes_after_last_scanned_result() {
        let (evaluation, documents) = fixture();
        let page = compare_results(
            &evaluation,
            &documents,
            1,
            "animated film",
            ComparisonOptions {
                show_irrelevant: false,
                offset: 0,
                limit: 1,
            },
        )
        .expect("page should build");
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].doc_id, 4);
        assert_eq!(page.next_offset, Some(2));
    }

    #[test]
    fn missing_relevant_is_sorted_by_title() {
        let (evaluation, documents) = fixture();
        let comparison = compare_results(
            &evaluation,
            &documents,
            2,
            "animated film",
            ComparisonOptions::default(),
        )
        .expect("comparison should build");

        let titles: Vec<&str> = comparison
            .missing_relevant
            .iter()
            .map(|doc| doc.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Akira", "Casper"]);
    }

    #[test]
    fn compare_results_rejects_unknown_mode_and_query() {
        let (evaluation, documents) = fixture();
        let error = compare_results(
            &evaluation,
            &documents,
            3,
            "animated film",
            ComparisonOptions::default(),
        )
        .expect_err("mode 3 does not exist");
        assert!(error.to_string().contains("mode #3"), "unexpected: {error}");

        let error = compare_results(
            &evaluation,
            &documents,
            0,
            "animated film",
            ComparisonOptions::default(),
        )
        .expect_err("mode 0 does not exist");
        assert!(error.to_string().contains("mode #0"), "unexpected: {error}");

        let error = compare_results(
            &evaluation,
            &documents,
            1,
            "horror",
            ComparisonOptions::default(),
        )
        .expect_err("unknown query");
        assert!(error.to_string().contains("horror"), "unexpected: {error}");
    }
}
