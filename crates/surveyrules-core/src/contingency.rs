//! Contingency engine: question visibility.
//!
//! Authors declare, per question, which answers hide it, which answers show
//! it, and which questions must be completed before it shows. Rule-bearing
//! questions may themselves be governed by other questions, so declarations
//! are expanded into their transitive closure before evaluation.
//!
//! Each rule kind is closed independently: a disabling edge only ever
//! contributes disabling rules, and cycles are detected per kind.

use std::collections::{BTreeMap, HashSet};

use crate::error::CycleError;
use crate::model::{
    AnswerDependencies, AnswerValueId, GoalMode, QuestionDependencies, QuestionId, ResponseSet,
    RuleKind,
};

/// Flat or expanded contingency declarations keyed by target question.
pub type Declarations = BTreeMap<QuestionId, QuestionDependencies>;

/// Expand every declared question into the union of its own rules and the
/// rules of every question that transitively governs it.
///
/// Fails fast on the first cycle found; no partial closure is returned.
pub fn expand_dependencies(declarations: &Declarations) -> Result<Declarations, CycleError> {
    let mut expanded = Declarations::new();

    for question in declarations.keys() {
        let mut closure = QuestionDependencies::default();
        for kind in RuleKind::ALL {
            let mut walk = ClosureWalk::new(declarations, kind);
            walk.visit(question)?;
            walk.merge_into(&mut closure);
        }

        tracing::debug!(
            question = %question,
            rules = closure.rule_count(),
            "expanded contingency closure"
        );
        expanded.insert(question.clone(), closure);
    }

    Ok(expanded)
}

/// Accumulator for one starting question and one rule kind.
///
/// `path` holds the questions currently being resolved; reaching one of them
/// again is a cycle. `finished` holds questions whose closure has already
/// been folded in, so shared ancestors are walked once.
struct ClosureWalk<'a> {
    declarations: &'a Declarations,
    kind: RuleKind,
    path: HashSet<&'a QuestionId>,
    finished: HashSet<&'a QuestionId>,
    answer_values: AnswerDependencies,
    questions: Vec<&'a QuestionId>,
}

impl<'a> ClosureWalk<'a> {
    fn new(declarations: &'a Declarations, kind: RuleKind) -> Self {
        Self {
            declarations,
            kind,
            path: HashSet::new(),
            finished: HashSet::new(),
            answer_values: AnswerDependencies::new(),
            questions: Vec::new(),
        }
    }

    fn visit(&mut self, question: &'a QuestionId) -> Result<(), CycleError> {
        let declarations = self.declarations;
        let Some(deps) = declarations.get(question) else {
            // Leaf: nothing further to resolve.
            return Ok(());
        };
        self.path.insert(question);

        let edges = edges_of(deps, self.kind);
        for &(governing, answer) in &edges {
            if self.path.contains(governing) {
                return Err(CycleError::Contingency {
                    question: governing.clone(),
                    kind: self.kind,
                });
            }
            self.record(question, governing, answer);
        }

        for &(governing, _) in &edges {
            if !self.finished.contains(governing) {
                self.visit(governing)?;
            }
        }

        self.path.remove(question);
        self.finished.insert(question);
        Ok(())
    }

    fn record(
        &mut self,
        target: &QuestionId,
        governing: &'a QuestionId,
        answer: Option<&'a AnswerValueId>,
    ) {
        let Some(answer) = answer else {
            self.questions.push(governing);
            return;
        };

        if let Some(kept) = self.answer_values.get(governing) {
            if kept != answer {
                tracing::warn!(
                    target_question = %target,
                    governing = %governing,
                    kept = %kept,
                    dropped = %answer,
                    kind = %self.kind,
                    "conflicting transitive answer value dropped"
                );
            }
        } else {
            self.answer_values.insert(governing.clone(), answer.clone());
        }
    }

    fn merge_into(self, closure: &mut QuestionDependencies) {
        match self.kind {
            RuleKind::DisablingAnswerValue => closure.disabling_answer_values = self.answer_values,
            RuleKind::EnablingAnswerValue => closure.enabling_answer_values = self.answer_values,
            RuleKind::EnablingQuestion => {
                closure.enabling_questions = self.questions.into_iter().cloned().collect()
            }
        }
    }
}

/// Outgoing edges of one kind, with the answer value for answer-value kinds.
fn edges_of(
    deps: &QuestionDependencies,
    kind: RuleKind,
) -> Vec<(&QuestionId, Option<&AnswerValueId>)> {
    match kind {
        RuleKind::DisablingAnswerValue => deps
            .disabling_answer_values
            .iter()
            .map(|(q, a)| (q, Some(a)))
            .collect(),
        RuleKind::EnablingAnswerValue => deps
            .enabling_answer_values
            .iter()
            .map(|(q, a)| (q, Some(a)))
            .collect(),
        RuleKind::EnablingQuestion => deps.enabling_questions.iter().map(|q| (q, None)).collect(),
    }
}

/// Build a flat declaration set where every goal question is governed by the
/// same master question and answer value.
///
/// Without both a master question and an answer value, every goal question
/// gets an empty declaration.
pub fn from_goal(
    master_question: Option<&QuestionId>,
    answer_value: Option<&AnswerValueId>,
    goal_questions: &[QuestionId],
    mode: GoalMode,
) -> Declarations {
    let rule: Option<AnswerDependencies> = match (master_question, answer_value) {
        (Some(q), Some(a)) => Some(AnswerDependencies::from([(q.clone(), a.clone())])),
        _ => None,
    };

    goal_questions
        .iter()
        .map(|goal| {
            let mut deps = QuestionDependencies::default();
            if let Some(rule) = &rule {
                match mode {
                    GoalMode::Enables => deps.enabling_answer_values = rule.clone(),
                    GoalMode::Disables => deps.disabling_answer_values = rule.clone(),
                }
            }
            (goal.clone(), deps)
        })
        .collect()
}

/// Decide whether a question is visible. Disabling always wins.
pub fn enable<'a>(
    responses: &ResponseSet,
    disabling_answer_values: &AnswerDependencies,
    enabling_answer_values: &AnswerDependencies,
    enabling_questions: impl IntoIterator<Item = &'a QuestionId>,
) -> bool {
    enabled_by_answer_value(responses, enabling_answer_values)
        && enabled_by_question_completion(responses, enabling_questions)
        && !disabled_by_answer_value(responses, disabling_answer_values)
}

/// [`enable`] over one question's (usually expanded) dependencies.
pub fn enable_with(responses: &ResponseSet, deps: &QuestionDependencies) -> bool {
    enable(
        responses,
        &deps.disabling_answer_values,
        &deps.enabling_answer_values,
        &deps.enabling_questions,
    )
}

fn answered_with(responses: &ResponseSet, question: &QuestionId, answer: &AnswerValueId) -> bool {
    responses
        .get(question)
        .is_some_and(|response| response.has_answer(answer))
}

fn enabled_by_answer_value(responses: &ResponseSet, enabling: &AnswerDependencies) -> bool {
    enabling.is_empty()
        || enabling
            .iter()
            .any(|(question, answer)| answered_with(responses, question, answer))
}

fn enabled_by_question_completion<'a>(
    responses: &ResponseSet,
    enabling_questions: impl IntoIterator<Item = &'a QuestionId>,
) -> bool {
    let mut any_rule = false;
    for question in enabling_questions {
        any_rule = true;
        if responses.get(question).is_some_and(|r| r.is_complete()) {
            return true;
        }
    }
    !any_rule
}

fn disabled_by_answer_value(responses: &ResponseSet, disabling: &AnswerDependencies) -> bool {
    disabling
        .iter()
        .any(|(question, answer)| answered_with(responses, question, answer))
}
