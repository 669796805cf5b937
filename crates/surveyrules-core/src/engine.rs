//! Assessment-level engine.
//!
//! Expands an assessment's contingency and formula declarations once, then
//! answers visibility and computed-value queries for any number of
//! respondents. Expansion is the only fallible step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contingency::{self, Declarations};
use crate::error::CycleError;
use crate::formula::{self, FormulaDeclarations, Formulas, Values};
use crate::model::{AssessmentDefinition, QuestionId, RespondentData, ResponseSet};

/// Result of evaluating one respondent against an assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentOutcome {
    /// Visibility of every question that carries contingencies.
    pub visibility: BTreeMap<QuestionId, bool>,
    /// Value of every calculated question.
    pub computed: BTreeMap<QuestionId, f64>,
}

impl AssessmentOutcome {
    /// Questions hidden for this respondent.
    pub fn hidden(&self) -> impl Iterator<Item = &QuestionId> {
        self.visibility
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(question, _)| question)
    }
}

/// Expanded rules of one assessment, ready for evaluation.
#[derive(Debug, Clone)]
pub struct AssessmentEngine {
    contingencies: Declarations,
    formulas: Formulas,
}

impl AssessmentEngine {
    /// Expand the declarations of an assessment definition.
    pub fn new(definition: &AssessmentDefinition) -> Result<Self, CycleError> {
        let engine = Self::from_declarations(
            &definition.contingency_declarations(),
            &definition.formulas,
        )?;
        tracing::info!(
            assessment = %definition.id,
            contingencies = engine.contingencies.len(),
            formulas = engine.formulas.len(),
            "assessment rules expanded"
        );
        Ok(engine)
    }

    /// Expand raw flat declarations.
    pub fn from_declarations(
        contingencies: &Declarations,
        formulas: &FormulaDeclarations,
    ) -> Result<Self, CycleError> {
        Ok(Self {
            contingencies: contingency::expand_dependencies(contingencies)?,
            formulas: formula::expand_formulas(formulas)?,
        })
    }

    /// Expanded contingency closures.
    pub fn contingencies(&self) -> &Declarations {
        &self.contingencies
    }

    /// Expanded formula trees.
    pub fn formulas(&self) -> &Formulas {
        &self.formulas
    }

    /// Whether `question` is visible. Questions without rules are visible.
    pub fn is_visible(&self, question: &str, responses: &ResponseSet) -> bool {
        self.contingencies
            .get(question)
            .map_or(true, |deps| contingency::enable_with(responses, deps))
    }

    /// Value of a calculated question, `None` if it has no formula.
    pub fn computed_value(&self, question: &str, values: &Values) -> Option<f64> {
        self.formulas
            .get(question)
            .map(|expr| formula::evaluate(expr, values))
    }

    /// Evaluate every rule-bearing question for one respondent.
    pub fn evaluate(&self, data: &RespondentData) -> AssessmentOutcome {
        let visibility = self
            .contingencies
            .iter()
            .map(|(question, deps)| {
                (
                    question.clone(),
                    contingency::enable_with(&data.responses, deps),
                )
            })
            .collect();

        let computed = self
            .formulas
            .iter()
            .map(|(question, expr)| (question.clone(), formula::evaluate(expr, &data.values)))
            .collect();

        AssessmentOutcome {
            visibility,
            computed,
        }
    }
}
