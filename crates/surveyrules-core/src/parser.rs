//! TOML assessment parser.
//!
//! Loads assessment definitions and respondent data from files and
//! directories, and validates definitions for authoring mistakes that are
//! not cycles.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    AssessmentDefinition, Goal, GoalMode, Op, OpDef, QuestionDependencies, QuestionId,
    RespondentData,
};

/// Intermediate TOML structure for parsing assessment files.
#[derive(Debug, Deserialize)]
struct TomlAssessmentFile {
    assessment: TomlAssessmentHeader,
    #[serde(default)]
    contingencies: BTreeMap<String, TomlContingency>,
    #[serde(default)]
    goals: Vec<TomlGoal>,
    #[serde(default)]
    formulas: BTreeMap<String, TomlFormula>,
}

#[derive(Debug, Deserialize)]
struct TomlAssessmentHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlContingency {
    #[serde(default)]
    disabling_answer_values: BTreeMap<String, String>,
    #[serde(default)]
    enabling_answer_values: BTreeMap<String, String>,
    #[serde(default)]
    enabling_questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlGoal {
    #[serde(default)]
    master_question: Option<String>,
    #[serde(default)]
    answer_value: Option<String>,
    #[serde(default = "default_mode_str")]
    mode: String,
    #[serde(default)]
    questions: Vec<String>,
}

fn default_mode_str() -> String {
    "enables".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlFormula {
    op: String,
    left: String,
    right: String,
}

/// Parse a single TOML file into an `AssessmentDefinition`.
pub fn parse_assessment(path: &Path) -> Result<AssessmentDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assessment file: {}", path.display()))?;

    parse_assessment_str(&content, path)
}

/// Parse a TOML string into an `AssessmentDefinition` (useful for testing).
pub fn parse_assessment_str(content: &str, source_path: &Path) -> Result<AssessmentDefinition> {
    let parsed: TomlAssessmentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let contingencies = parsed
        .contingencies
        .into_iter()
        .map(|(question, c)| {
            let deps = QuestionDependencies {
                disabling_answer_values: c
                    .disabling_answer_values
                    .into_iter()
                    .map(|(q, a)| (q.into(), a.into()))
                    .collect(),
                enabling_answer_values: c
                    .enabling_answer_values
                    .into_iter()
                    .map(|(q, a)| (q.into(), a.into()))
                    .collect(),
                enabling_questions: c.enabling_questions.into_iter().map(Into::into).collect(),
            };
            (QuestionId::from(question), deps)
        })
        .collect();

    let goals = parsed
        .goals
        .into_iter()
        .map(|g| {
            let mode: GoalMode = g
                .mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!("{}", e))?;
            Ok(Goal {
                master_question: g.master_question.map(Into::into),
                answer_value: g.answer_value.map(Into::into),
                mode,
                questions: g.questions.into_iter().map(Into::into).collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let formulas = parsed
        .formulas
        .into_iter()
        .map(|(question, f)| {
            (
                QuestionId::from(question),
                OpDef::new(Op::from(f.op), f.left, f.right),
            )
        })
        .collect();

    Ok(AssessmentDefinition {
        id: parsed.assessment.id,
        name: parsed.assessment.name,
        description: parsed.assessment.description,
        contingencies,
        goals,
        formulas,
    })
}

/// Recursively load all `.toml` assessment files from a directory.
pub fn load_assessment_directory(dir: &Path) -> Result<Vec<AssessmentDefinition>> {
    let mut definitions = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            definitions.extend(load_assessment_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_assessment(&path) {
                Ok(def) => definitions.push(def),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(definitions)
}

/// Serialization format of a respondent data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Toml,
    Json,
}

impl DataFormat {
    /// Pick the format from a file extension; anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "json") {
            DataFormat::Json
        } else {
            DataFormat::Toml
        }
    }
}

/// Parse a respondent data file (TOML or JSON by extension).
pub fn parse_respondent_data(path: &Path) -> Result<RespondentData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses file: {}", path.display()))?;

    parse_respondent_data_str(&content, DataFormat::from_path(path))
        .with_context(|| format!("failed to parse responses: {}", path.display()))
}

/// Parse respondent data from a string in the given format.
pub fn parse_respondent_data_str(content: &str, format: DataFormat) -> Result<RespondentData> {
    let data = match format {
        DataFormat::Toml => toml::from_str(content)?,
        DataFormat::Json => serde_json::from_str(content)?,
    };
    Ok(data)
}

/// A warning from assessment validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question: Option<QuestionId>,
    /// Warning message.
    pub message: String,
}

/// Validate an assessment definition for common authoring issues.
///
/// Cycles are not reported here; they fail expansion instead.
pub fn validate_assessment(def: &AssessmentDefinition) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Unknown operators evaluate to zero
    for (question, formula) in &def.formulas {
        if !formula.op.is_known() {
            warnings.push(ValidationWarning {
                question: Some(question.clone()),
                message: format!(
                    "unknown operator '{}' will always evaluate to 0",
                    formula.op
                ),
            });
        }
    }

    // Goals that cannot produce a rule
    for (index, goal) in def.goals.iter().enumerate() {
        match (&goal.master_question, &goal.answer_value) {
            (Some(master), None) => warnings.push(ValidationWarning {
                question: Some(master.clone()),
                message: format!("goal #{} has a master question but no answer value", index + 1),
            }),
            (None, Some(_)) => warnings.push(ValidationWarning {
                question: None,
                message: format!("goal #{} has an answer value but no master question", index + 1),
            }),
            _ => {}
        }

        if goal.questions.is_empty() {
            warnings.push(ValidationWarning {
                question: None,
                message: format!("goal #{} governs no questions", index + 1),
            });
        }
    }

    // Questions governed by more than one goal
    let mut seen = BTreeSet::new();
    for goal in &def.goals {
        if goal.master_question.is_none() || goal.answer_value.is_none() {
            continue;
        }
        for question in &goal.questions {
            if !seen.insert(question) {
                warnings.push(ValidationWarning {
                    question: Some(question.clone()),
                    message: "question is governed by more than one goal".into(),
                });
            }
        }
    }

    warnings
}
