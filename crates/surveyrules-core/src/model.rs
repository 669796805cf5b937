//! Core data model types for surveyrules.
//!
//! These are the values the contingency and formula engines consume:
//! identifiers, respondent input, and the flat declarations authored per
//! assessment. Everything here is caller-constructed and immutable from the
//! engine's point of view.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque question identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

/// Opaque answer-option identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerValueId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(QuestionId);
string_id!(AnswerValueId);

// ---------------------------------------------------------------------------
// Contingency model
// ---------------------------------------------------------------------------

/// One respondent's input to one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Completion/progress indicator, 100 or more means complete.
    #[serde(default)]
    pub value_percentage: i64,
    /// Selected answer options.
    #[serde(default)]
    pub answers: BTreeSet<AnswerValueId>,
}

impl Response {
    pub fn has_answer(&self, answer: &AnswerValueId) -> bool {
        self.answers.contains(answer)
    }

    pub fn is_complete(&self) -> bool {
        self.value_percentage >= 100
    }
}

/// Responses keyed by question. Unanswered questions are absent.
pub type ResponseSet = BTreeMap<QuestionId, Response>;

/// Governing question to the single answer value its rule names.
pub type AnswerDependencies = BTreeMap<QuestionId, AnswerValueId>;

/// Visibility rules for one target question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDependencies {
    /// Answers that hide the question.
    #[serde(default)]
    pub disabling_answer_values: AnswerDependencies,
    /// Answers that show the question (any one is enough).
    #[serde(default)]
    pub enabling_answer_values: AnswerDependencies,
    /// Questions whose completion shows the question (any one is enough).
    #[serde(default)]
    pub enabling_questions: BTreeSet<QuestionId>,
}

impl QuestionDependencies {
    pub fn is_empty(&self) -> bool {
        self.disabling_answer_values.is_empty()
            && self.enabling_answer_values.is_empty()
            && self.enabling_questions.is_empty()
    }

    /// Total number of rules across all three kinds.
    pub fn rule_count(&self) -> usize {
        self.disabling_answer_values.len()
            + self.enabling_answer_values.len()
            + self.enabling_questions.len()
    }
}

/// The three kinds of contingency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    DisablingAnswerValue,
    EnablingAnswerValue,
    EnablingQuestion,
}

impl RuleKind {
    pub const ALL: [RuleKind; 3] = [
        RuleKind::DisablingAnswerValue,
        RuleKind::EnablingAnswerValue,
        RuleKind::EnablingQuestion,
    ];
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::DisablingAnswerValue => write!(f, "disabling answer value"),
            RuleKind::EnablingAnswerValue => write!(f, "enabling answer value"),
            RuleKind::EnablingQuestion => write!(f, "enabling question"),
        }
    }
}

/// Where a goal places its synthesized rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalMode {
    Enables,
    Disables,
}

impl fmt::Display for GoalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalMode::Enables => write!(f, "enables"),
            GoalMode::Disables => write!(f, "disables"),
        }
    }
}

impl FromStr for GoalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enables" | "enable" => Ok(GoalMode::Enables),
            "disables" | "disable" => Ok(GoalMode::Disables),
            other => Err(format!("unknown goal mode: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Formula model
// ---------------------------------------------------------------------------

/// Binary operator of a calculated question.
///
/// Anything that is not one of the four arithmetic operators is kept as
/// `Unknown` and evaluates to zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    Unknown(String),
}

impl Op {
    pub fn symbol(&self) -> &str {
        match self {
            Op::Add => "+",
            Op::Subtract => "-",
            Op::Multiply => "*",
            Op::Divide => "/",
            Op::Unknown(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Op::Unknown(_))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl From<&str> for Op {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "+" | "add" => Op::Add,
            "-" | "subtract" => Op::Subtract,
            "*" | "multiply" => Op::Multiply,
            "/" | "divide" => Op::Divide,
            _ => Op::Unknown(s.to_string()),
        }
    }
}

impl From<String> for Op {
    fn from(s: String) -> Self {
        Op::from(s.as_str())
    }
}

impl From<Op> for String {
    fn from(op: Op) -> Self {
        op.symbol().to_string()
    }
}

/// Flat formula declaration: both operands are question references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpDef {
    pub op: Op,
    pub left: QuestionId,
    pub right: QuestionId,
}

impl OpDef {
    pub fn new(op: Op, left: impl Into<QuestionId>, right: impl Into<QuestionId>) -> Self {
        Self {
            op,
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Expanded formula tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Leaf: the question's numeric answer.
    QuestionRef(QuestionId),
    /// Operator applied to two subexpressions.
    Binary {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn question(id: impl Into<QuestionId>) -> Self {
        Expr::QuestionRef(id.into())
    }

    pub fn binary(op: Op, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Leaf questions in left-to-right order, duplicates kept.
    pub fn leaves(&self) -> Vec<&QuestionId> {
        match self {
            Expr::QuestionRef(q) => vec![q],
            Expr::Binary { left, right, .. } => {
                let mut out = left.leaves();
                out.extend(right.leaves());
                out
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Expr::QuestionRef(_) => 1,
            Expr::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::QuestionRef(q) => write!(f, "{q}"),
            Expr::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
        }
    }
}

/// Everything one respondent supplied: raw responses for visibility and
/// resolved numeric values for formulas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondentData {
    #[serde(default)]
    pub responses: ResponseSet,
    #[serde(default)]
    pub values: BTreeMap<QuestionId, f64>,
}

// ---------------------------------------------------------------------------
// Assessment definition
// ---------------------------------------------------------------------------

/// A goal that governs a group of questions with one master answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default)]
    pub master_question: Option<QuestionId>,
    #[serde(default)]
    pub answer_value: Option<AnswerValueId>,
    pub mode: GoalMode,
    #[serde(default)]
    pub questions: Vec<QuestionId>,
}

/// All rule declarations of one assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentDefinition {
    /// Unique identifier for this assessment.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Explicit per-question contingencies.
    #[serde(default)]
    pub contingencies: BTreeMap<QuestionId, QuestionDependencies>,
    /// Goal-level contingencies, expanded through `from_goal`.
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Calculated questions.
    #[serde(default)]
    pub formulas: BTreeMap<QuestionId, OpDef>,
}

impl AssessmentDefinition {
    /// Flat contingency declarations: every goal synthesized with
    /// [`from_goal`](crate::contingency::from_goal), then explicit
    /// contingencies merged on top. Explicit rules win on conflict.
    pub fn contingency_declarations(&self) -> BTreeMap<QuestionId, QuestionDependencies> {
        let mut merged: BTreeMap<QuestionId, QuestionDependencies> = BTreeMap::new();

        for goal in &self.goals {
            let synthesized = crate::contingency::from_goal(
                goal.master_question.as_ref(),
                goal.answer_value.as_ref(),
                &goal.questions,
                goal.mode,
            );
            for (question, deps) in synthesized {
                let entry = merged.entry(question).or_default();
                for (q, a) in deps.disabling_answer_values {
                    entry.disabling_answer_values.entry(q).or_insert(a);
                }
                for (q, a) in deps.enabling_answer_values {
                    entry.enabling_answer_values.entry(q).or_insert(a);
                }
                entry.enabling_questions.extend(deps.enabling_questions);
            }
        }

        for (question, deps) in &self.contingencies {
            let entry = merged.entry(question.clone()).or_default();
            entry
                .disabling_answer_values
                .extend(deps.disabling_answer_values.clone());
            entry
                .enabling_answer_values
                .extend(deps.enabling_answer_values.clone());
            entry
                .enabling_questions
                .extend(deps.enabling_questions.iter().cloned());
        }

        merged
    }
}
