//! JSON Lines case loading.
//!
//! One case per line:
//!
//! ```json
//! {"query_id": "q1", "experiment": "chunk_512", "retrieved": ["c3", "c1"], "ground_truth": {"c1": [3.0, 0.5]}}
//! ```
//!
//! `ground_truth` is an id list (binary), an id → relevance map (graded) or
//! an id → `[relevance, noise]` map (graded and noisy). Unknown fields such
//! as `question` are ignored.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use chunkeval_core::{GroundTruth, Judgement, QueryCase};
use indexmap::IndexMap;
use serde::Deserialize;

/// Experiment name for cases that do not set one.
pub const DEFAULT_EXPERIMENT: &str = "default";

#[derive(Debug, Deserialize)]
struct CaseRecord {
    #[serde(default)]
    query_id: Option<String>,
    #[serde(default)]
    experiment: Option<String>,
    retrieved: Vec<String>,
    ground_truth: GroundTruthRecord,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroundTruthRecord {
    Ids(Vec<String>),
    Graded(IndexMap<String, GradeRecord>),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum GradeRecord {
    Relevance(f64),
    RelevanceNoise(f64, f64),
}

impl GroundTruthRecord {
    fn into_ground_truth(self) -> Result<GroundTruth> {
        let grades = match self {
            Self::Ids(ids) => return Ok(GroundTruth::from_ids(ids)),
            Self::Graded(grades) => grades,
        };

        let noisy = grades
            .values()
            .any(|g| matches!(g, GradeRecord::RelevanceNoise(..)));
        let mut builder = GroundTruth::builder().graded();
        if noisy {
            builder = builder.noisy();
        }

        for (id, grade) in grades {
            let judgement = match (grade, noisy) {
                (GradeRecord::RelevanceNoise(relevance, noise), _) => Judgement { relevance, noise },
                (GradeRecord::Relevance(relevance), false) => Judgement {
                    relevance,
                    noise: 0.0,
                },
                (GradeRecord::Relevance(_), true) => {
                    bail!("ground truth mixes `relevance` and `[relevance, noise]` grades at `{id}`")
                }
            };
            builder = builder.judge(id, judgement)?;
        }
        Ok(builder.build())
    }
}

/// Reads cases from `path` (`-` for stdin), grouped by experiment.
pub fn load_cases(path: &Path) -> Result<BTreeMap<String, Vec<QueryCase>>> {
    if path == Path::new("-") {
        return read_cases(io::stdin().lock(), "<stdin>");
    }
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_cases(BufReader::new(file), &path.display().to_string())
}

/// Parses JSON Lines cases from any reader; `source` names it in errors.
pub fn read_cases<R: BufRead>(reader: R, source: &str) -> Result<BTreeMap<String, Vec<QueryCase>>> {
    let mut experiments: BTreeMap<String, Vec<QueryCase>> = BTreeMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("{source}:{line_no}: read failed"))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: CaseRecord = serde_json::from_str(&line)
            .with_context(|| format!("{source}:{line_no}: invalid case record"))?;
        let ground_truth = record
            .ground_truth
            .into_ground_truth()
            .with_context(|| format!("{source}:{line_no}: invalid ground truth"))?;
        let query_id = record
            .query_id
            .unwrap_or_else(|| format!("line-{line_no}"));
        let experiment = record
            .experiment
            .unwrap_or_else(|| DEFAULT_EXPERIMENT.to_string());

        experiments
            .entry(experiment)
            .or_default()
            .push(QueryCase::new(query_id, record.retrieved, ground_truth));
    }

    let total: usize = experiments.values().map(Vec::len).sum();
    tracing::info!(
        source,
        cases = total,
        experiments = experiments.len(),
        "Loaded evaluation cases"
    );
    Ok(experiments)
}
