//! Expansion error types.
//!
//! Expansion is the only fallible phase of the engine. Evaluation of an
//! expanded closure always yields a value, so the single error kind here is
//! a cycle in the author-declared rules.

use thiserror::Error;

use crate::model::{QuestionId, RuleKind};

/// A declaration graph revisits a question that is still being resolved.
///
/// Surfaced as an assessment configuration error: the whole declaration set
/// must be rejected, no partial closure is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// Contingency rules of one kind loop back on themselves.
    #[error("contingency cycle detected at question {question} ({kind})")]
    Contingency { question: QuestionId, kind: RuleKind },

    /// A calculated question depends on itself through its operands.
    #[error("formula cycle detected at question {question}")]
    Formula { question: QuestionId },
}

impl CycleError {
    /// The question at which the cycle was detected.
    pub fn question(&self) -> &QuestionId {
        match self {
            CycleError::Contingency { question, .. } | CycleError::Formula { question } => question,
        }
    }

    /// The rule kind for contingency cycles.
    pub fn kind(&self) -> Option<RuleKind> {
        match self {
            CycleError::Contingency { kind, .. } => Some(*kind),
            CycleError::Formula { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_question() {
        let err = CycleError::Formula {
            question: "Q1".into(),
        };
        assert_eq!(err.to_string(), "formula cycle detected at question Q1");
        assert_eq!(err.question().as_str(), "Q1");
        assert_eq!(err.kind(), None);

        let err = CycleError::Contingency {
            question: "q2".into(),
            kind: RuleKind::EnablingQuestion,
        };
        assert_eq!(
            err.to_string(),
            "contingency cycle detected at question q2 (enabling question)"
        );
        assert_eq!(err.kind(), Some(RuleKind::EnablingQuestion));
    }
}
