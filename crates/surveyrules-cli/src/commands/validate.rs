//! The `surveyrules validate` command.

use std::path::PathBuf;

use anyhow::Result;

use surveyrules_core::parser;
use surveyrules_core::AssessmentEngine;

use crate::config::load_config_from;

pub fn execute(assessment_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let definitions = if assessment_path.is_dir() {
        parser::load_assessment_directory(&assessment_path)?
    } else {
        vec![parser::parse_assessment(&assessment_path)?]
    };

    let mut total_warnings = 0;
    let mut rejected = 0;

    for def in &definitions {
        println!(
            "Assessment: {} ({} contingencies, {} goals, {} formulas)",
            def.name,
            def.contingencies.len(),
            def.goals.len(),
            def.formulas.len()
        );

        let warnings = parser::validate_assessment(def);
        for w in &warnings {
            let prefix = w
                .question
                .as_ref()
                .map(|q| format!("  [{q}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();

        // Cycles make the whole declaration set unusable
        if let Err(e) = AssessmentEngine::new(def) {
            println!("  [{}] ERROR: {e}", e.question());
            rejected += 1;
        }
    }

    if rejected > 0 {
        anyhow::bail!("{rejected} assessment(s) rejected: rule declarations contain a cycle");
    }

    if total_warnings == 0 {
        println!("All assessments valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
        anyhow::ensure!(
            !config.fail_on_warnings,
            "validation warnings found and fail_on_warnings is set"
        );
    }

    Ok(())
}
