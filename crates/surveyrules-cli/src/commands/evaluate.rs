//! The `surveyrules evaluate` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use surveyrules_core::model::{QuestionId, ResponseSet};
use surveyrules_core::parser;
use surveyrules_core::{AssessmentEngine, AssessmentOutcome};

use crate::config::{load_config_from, OutputFormat};

/// JSON output of one evaluation.
#[derive(Debug, Serialize)]
struct EvaluationReport {
    assessment_id: String,
    assessment_name: String,
    evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    outcome: AssessmentOutcome,
}

pub fn execute(
    assessment_path: PathBuf,
    responses_path: PathBuf,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let format = config.output_format(format.as_deref())?;

    let def = parser::parse_assessment(&assessment_path)?;
    let data = parser::parse_respondent_data(&responses_path)?;
    let engine = AssessmentEngine::new(&def)?;

    let outcome = engine.evaluate(&data);

    match format {
        OutputFormat::Json => {
            let report = EvaluationReport {
                assessment_id: def.id.clone(),
                assessment_name: def.name.clone(),
                evaluated_at: Utc::now(),
                outcome,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("Assessment: {}", def.name);
            print_table(&engine, &outcome, &data.responses, config.precision);
            let hidden = outcome.hidden().count();
            println!("{hidden} hidden, {} computed", outcome.computed.len());
        }
    }

    Ok(())
}

fn print_table(
    engine: &AssessmentEngine,
    outcome: &AssessmentOutcome,
    responses: &ResponseSet,
    precision: usize,
) {
    use comfy_table::{Cell, Table};

    let questions: BTreeSet<&QuestionId> = outcome
        .visibility
        .keys()
        .chain(outcome.computed.keys())
        .collect();

    let mut table = Table::new();
    table.set_header(vec!["Question", "Visible", "Value"]);

    for question in questions {
        let visible = outcome
            .visibility
            .get(question)
            .copied()
            .unwrap_or_else(|| engine.is_visible(question.as_str(), responses));
        let value = outcome
            .computed
            .get(question)
            .map(|v| format!("{v:.precision$}"))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(question),
            Cell::new(if visible { "yes" } else { "no" }),
            Cell::new(value),
        ]);
    }

    println!("{table}");
}
