//! Report rendering: comfy-table for terminals, JSON for pipelines.

use std::collections::BTreeMap;

use chunkeval_core::{CorpusReport, MetricSummary, QueryMetrics};
use clap::ValueEnum;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

/// Output format for `evaluate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    #[default]
    Table,
    /// One JSON document keyed by experiment.
    Json,
}

#[derive(Serialize)]
struct ExperimentView<'a> {
    summary: &'a MetricSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_query: Option<&'a [QueryMetrics]>,
}

/// Renders experiment reports in the requested format.
pub fn render(
    reports: &BTreeMap<String, CorpusReport>,
    format: OutputFormat,
    per_query: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let view: BTreeMap<&str, ExperimentView<'_>> = reports
                .iter()
                .map(|(name, report)| {
                    let rows = per_query.then_some(report.per_query.as_slice());
                    (
                        name.as_str(),
                        ExperimentView {
                            summary: &report.summary,
                            per_query: rows,
                        },
                    )
                })
                .collect();
            Ok(serde_json::to_string_pretty(&view)?)
        }
        OutputFormat::Table => {
            let mut out = summary_table(reports).to_string();
            if per_query {
                for (name, report) in reports {
                    out.push_str(&format!("\n\n{name}\n"));
                    out.push_str(&query_table(&report.per_query).to_string());
                }
            }
            Ok(out)
        }
    }
}

fn metric_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.4}")).set_alignment(CellAlignment::Right)
}

fn optional_cell(value: Option<f64>) -> Cell {
    value.map_or_else(|| Cell::new("-").set_alignment(CellAlignment::Right), metric_cell)
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn summary_table(reports: &BTreeMap<String, CorpusReport>) -> Table {
    let mut table = new_table(&[
        "Experiment",
        "Queries",
        "Precision",
        "Recall",
        "MAP",
        "nDCG",
        "Noise",
    ]);
    for (name, report) in reports {
        let s = &report.summary;
        table.add_row(vec![
            Cell::new(name),
            Cell::new(s.queries).set_alignment(CellAlignment::Right),
            metric_cell(s.precision),
            metric_cell(s.recall),
            metric_cell(s.map),
            metric_cell(s.ndcg),
            optional_cell(s.noise),
        ]);
    }
    table
}

fn query_table(rows: &[QueryMetrics]) -> Table {
    let mut table = new_table(&["Query", "Precision", "Recall", "AP", "nDCG", "Noise"]);
    for row in rows {
        let m = &row.metrics;
        table.add_row(vec![
            Cell::new(&row.query_id),
            metric_cell(m.precision),
            metric_cell(m.recall),
            metric_cell(m.ap),
            metric_cell(m.ndcg),
            optional_cell(m.noise),
        ]);
    }
    table
}
