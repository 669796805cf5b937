//! The `surveyrules expand` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use surveyrules_core::contingency::Declarations;
use surveyrules_core::formula::Formulas;
use surveyrules_core::parser;
use surveyrules_core::AssessmentEngine;

use crate::config::{load_config_from, OutputFormat};

#[derive(Serialize)]
struct ExpandedAssessment<'a> {
    assessment: &'a str,
    contingencies: &'a Declarations,
    formulas: &'a Formulas,
}

pub fn execute(
    assessment_path: PathBuf,
    format: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let format = config.output_format(format.as_deref())?;

    let def = parser::parse_assessment(&assessment_path)?;
    let engine = AssessmentEngine::new(&def)?;

    match format {
        OutputFormat::Json => {
            let expanded = ExpandedAssessment {
                assessment: &def.id,
                contingencies: engine.contingencies(),
                formulas: engine.formulas(),
            };
            println!("{}", serde_json::to_string_pretty(&expanded)?);
        }
        OutputFormat::Text => {
            println!("Assessment: {}", def.name);

            if !engine.contingencies().is_empty() {
                println!("\nContingencies:");
                for (question, deps) in engine.contingencies() {
                    println!("  {question}");
                    for (q, a) in &deps.disabling_answer_values {
                        println!("    hidden when {q} = {a}");
                    }
                    for (q, a) in &deps.enabling_answer_values {
                        println!("    shown when {q} = {a}");
                    }
                    for q in &deps.enabling_questions {
                        println!("    shown when {q} is complete");
                    }
                }
            }

            if !engine.formulas().is_empty() {
                println!("\nFormulas:");
                for (question, expr) in engine.formulas() {
                    println!("  {question} = {expr}");
                }
            }
        }
    }

    Ok(())
}
