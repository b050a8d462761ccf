use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::comparison::ResultComparison;
use crate::evaluation::ConfigurationReport;

pub fn format_measure(value: f64) -> String {
    format!("{value:.3}")
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2} %")
}

pub fn write_json_stdout<T: Serialize>(value: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, value).context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub fn write_overview<W: Write>(
    output: &mut W,
    reports: &[ConfigurationReport],
    threshold: f64,
) -> Result<()> {
    writeln!(
        output,
        "#\tk\tb\tMP@3\tMP@R\tMAP\tMinAP\tMaxAP\tAP > {threshold}"
    )?;
    for report in reports {
        let summary = &report.summary;
        writeln!(
            output,
            "{}\tk = {}\tb = {}\t{}\t{}\t{}\t{}\t{}\t{}",
            report.mode,
            report.k,
            report.b,
            format_measure(summary.mean_p_at_3),
            format_measure(summary.mean_p_at_r),
            format_measure(summary.mean_ap),
            format_measure(summary.min_ap),
            format_measure(summary.max_ap),
            format_percent(summary.percent_ap_above_threshold),
        )?;
    }
    Ok(())
}

pub fn write_details<W: Write>(output: &mut W, reports: &[ConfigurationReport]) -> Result<()> {
    for (index, report) in reports.iter().enumerate() {
        if index > 0 {
            writeln!(output)?;
        }
        writeln!(
            output,
            "Mode #{}: Used k = {} and b = {} for the BM25 scores.",
            report.mode, report.k, report.b
        )?;
        writeln!(output, "Keyword Query\tP@3\tP@R\tAP")?;
        for row in &report.queries {
            writeln!(
                output,
                "{}\t{}\t{}\t{}",
                row.query,
                format_measure(row.measures.p_at_3),
                format_measure(row.measures.p_at_r),
                format_measure(row.measures.ap),
            )?;
        }
        writeln!(
            output,
            "Mean\t{}\t{}\t{}",
            format_measure(report.summary.mean_p_at_3),
            format_measure(report.summary.mean_p_at_r),
            format_measure(report.summary.mean_ap),
        )?;
    }
    Ok(())
}

pub fn write_comparison<W: Write>(output: &mut W, comparison: &ResultComparison) -> Result<()> {
    writeln!(output, "Query: {}", comparison.query)?;
    writeln!(
        output,
        "Relevant documents: {}; results in mode #{}: {}",
        comparison.relevant_count, comparison.mode, comparison.result_count
    )?;
    for (index, label) in comparison.modes.iter().enumerate() {
        let marker = if index + 1 == comparison.mode { " *" } else { "" };
        writeln!(output, "Mode #{}: {label}{marker}", index + 1)?;
    }

    let mut header = (1..=comparison.modes.len())
        .map(|mode| format!("#{mode}"))
        .collect::<Vec<String>>();
    header.push("Title".to_string());
    writeln!(output, "{}", header.join("\t"))?;

    for row in &comparison.rows {
        let mut cells = row
            .positions
            .iter()
            .map(|position| position.map(|rank| rank.to_string()).unwrap_or_default())
            .collect::<Vec<String>>();
        let title = if row.relevant {
            row.title.clone()
        } else {
            format!("{} [not relevant]", row.title)
        };
        cells.push(title);
        writeln!(output, "{}", cells.join("\t"))?;
    }
    if let Some(next_offset) = comparison.next_offset {
        writeln!(output, "More results: rerun with --offset {next_offset}")?;
    }

    if comparison.missing_relevant.is_empty() {
        writeln!(
            output,
            "There are no relevant documents that are not in the results for mode #{}.",
            comparison.mode
        )?;
    } else {
        writeln!(
            output,
            "{} relevant documents that did not occur in the results for mode #{}:",
            comparison.missing_relevant.len(),
            comparison.mode
        )?;
        for doc in &comparison.missing_relevant {
            writeln!(output, "\t{}", doc.title)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::{ComparedResult, MissingDocument};
    use crate::evaluation::{ConfigurationSummary, QueryReport};
    use crate::metrics::QueryMeasures;

    fn report() -> ConfigurationReport {
        ConfigurationReport {
            mode: 1,
            k: "1.75".to_string(),
            b: "0.75".to_string(),
            queries: vec![QueryReport {
                query: "animated film".to_string(),
                relevant_count: 2,
                result_count: 3,
                measures: QueryMeasures {
                    p_at_3: 2.0 / 3.0,
                    p_at_r: 0.5,
                    ap: 0.583_333,
                },
            }],
            summary: ConfigurationSummary {
                mean_p_at_3: 2.0 / 3.0,
                mean_p_at_r: 0.5,
                mean_ap: 0.583_333,
                min_ap: 0.583_333,
                max_ap: 0.583_333,
                ap_threshold: 0.5,
                percent_ap_above_threshold: 100.0,
            },
        }
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer).expect("rendering should succeed");
        String::from_utf8(buffer).expect("output is utf-8")
    }

    #[test]
    fn format_helpers_use_fixed_precision() {
        assert_eq!(format_measure(1.0 / 3.0), "0.333");
        assert_eq!(format_percent(200.0 / 3.0), "66.67 %");
    }

    #[test]
    fn overview_prints_one_row_per_mode() {
        let text = render(|out| write_overview(out, &[report()], 0.5));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("AP > 0.5"));
        assert_eq!(
            lines[1],
            "1\tk = 1.75\tb = 0.75\t0.667\t0.500\t0.583\t0.583\t0.583\t100.00 %"
        );
    }

    #[test]
    fn details_ends_each_table_with_mean_row() {
        let text = render(|out| write_details(out, &[report()]));
        assert!(text.starts_with("Mode #1: Used k = 1.75 and b = 0.75"));
        assert!(text.contains("animated film\t0.667\t0.500\t0.583\n"));
        assert!(text.ends_with("Mean\t0.667\t0.500\t0.583\n"));
    }

    #[test]
    fn comparison_marks_irrelevant_rows_and_lists_missing_documents() {
        let comparison = ResultComparison {
            query: "animated film".to_string(),
            mode: 2,
            modes: vec!["k = 1.75, b = 0.75".to_string(), "k = 0, b = 0".to_string()],
            relevant_count: 2,
            result_count: 2,
            rows: vec![
                ComparedResult {
                    doc_id: 2,
                    title: "Bambi".to_string(),
                    description: String::new(),
                    relevant: false,
                    positions: vec![None, Some(1)],
                },
                ComparedResult {
                    doc_id: 1,
                    title: "Akira".to_string(),
                    description: String::new(),
                    relevant: true,
                    positions: vec![Some(1), Some(2)],
                },
            ],
            next_offset: Some(2),
            missing_relevant: vec![MissingDocument {
                doc_id: 3,
                title: "Casper".to_string(),
                description: String::new(),
            }],
        };

        let text = render(|out| write_comparison(out, &comparison));
        assert!(text.contains("Mode #2: k = 0, b = 0 *\n"));
        assert!(text.contains("#1\t#2\tTitle\n"));
        assert!(text.contains("\t1\tBambi [not relevant]\n"));
        assert!(text.contains("1\t2\tAkira\n"));
        assert!(text.contains("--offset 2"));
        assert!(
            text.contains("1 relevant documents that did not occur in the results for mode #2:")
        );
        assert!(text.ends_with("\tCasper\n"));
    }
}
