//! Formula engine: calculated question values.
//!
//! A calculated question is declared as one binary operator over two other
//! questions. When an operand is itself calculated, expansion inlines its
//! expression, producing a tree whose leaves are plain answered questions.

use std::collections::{BTreeMap, HashSet};

use crate::error::CycleError;
use crate::model::{Expr, Op, OpDef, QuestionId};

/// Flat formula declarations keyed by calculated question.
pub type FormulaDeclarations = BTreeMap<QuestionId, OpDef>;

/// Expanded formula trees keyed by calculated question.
pub type Formulas = BTreeMap<QuestionId, Expr>;

/// Resolved numeric answers used as formula leaves.
pub type Values = BTreeMap<QuestionId, f64>;

/// Expand every declared formula into a full expression tree.
///
/// Each top-level question is expanded with its own visiting set, so one
/// formula's walk never affects another's.
pub fn expand_formulas(declarations: &FormulaDeclarations) -> Result<Formulas, CycleError> {
    let mut formulas = Formulas::new();

    for (question, def) in declarations {
        let mut visiting = HashSet::new();
        let expr = expand_def(question, def, declarations, &mut visiting)?;
        tracing::debug!(question = %question, depth = expr.depth(), "expanded formula");
        formulas.insert(question.clone(), expr);
    }

    Ok(formulas)
}

fn expand_def<'a>(
    question: &'a QuestionId,
    def: &'a OpDef,
    declarations: &'a FormulaDeclarations,
    visiting: &mut HashSet<&'a QuestionId>,
) -> Result<Expr, CycleError> {
    if !visiting.insert(question) {
        return Err(CycleError::Formula {
            question: question.clone(),
        });
    }

    let left = expand_operand(&def.left, declarations, visiting)?;
    let right = expand_operand(&def.right, declarations, visiting)?;

    visiting.remove(question);
    Ok(Expr::binary(def.op.clone(), left, right))
}

fn expand_operand<'a>(
    operand: &'a QuestionId,
    declarations: &'a FormulaDeclarations,
    visiting: &mut HashSet<&'a QuestionId>,
) -> Result<Expr, CycleError> {
    match declarations.get(operand) {
        Some(def) => expand_def(operand, def, declarations, visiting),
        None => Ok(Expr::QuestionRef(operand.clone())),
    }
}

/// Evaluate an expression tree. Never fails.
///
/// Missing leaf values read as 0.0, division by zero yields 0.0 and unknown
/// operators yield 0.0.
pub fn evaluate(expr: &Expr, values: &Values) -> f64 {
    match expr {
        Expr::QuestionRef(question) => values.get(question).copied().unwrap_or(0.0),
        Expr::Binary { op, left, right } => {
            let l = evaluate(left, values);
            let r = evaluate(right, values);
            apply(op, l, r)
        }
    }
}

fn apply(op: &Op, l: f64, r: f64) -> f64 {
    match op {
        Op::Add => l + r,
        Op::Subtract => l - r,
        Op::Multiply => l * r,
        Op::Divide => {
            if r == 0.0 {
                0.0
            } else {
                l / r
            }
        }
        Op::Unknown(_) => 0.0,
    }
}
