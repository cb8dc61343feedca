// SPDX-License-Identifier: MIT

//! Binding a pattern to a live sequence of occurred steps.
//!
//! The step history is owned elsewhere — typically by the persistence layer
//! of the surrounding workflow system — and may grow between calls. The
//! adapter therefore re-reads it through a [`StepSource`] on every query and
//! caches nothing: the history is the single source of truth.
//!
//! Concurrent appends are the owner's problem. If two callers race to add
//! the same suggested next step, the doubled history is not lost — the next
//! query simply reports it as invalid.

use crate::pattern::{MatchResult, Pattern, PatternError};
use crate::repr::TokenRepr;

/// Read-on-demand access to the chronologically ordered steps that have
/// already occurred for one workflow instance.
///
/// Implementations must return steps in the exact order they occurred; the
/// engine cannot detect misordering.
pub trait StepSource<T> {
    /// A snapshot of the occurred steps, oldest first.
    fn steps(&self) -> Vec<T>;
}

impl<T, F> StepSource<T> for F
where
    F: Fn() -> Vec<T>,
{
    fn steps(&self) -> Vec<T> {
        self()
    }
}

impl<T: Clone> StepSource<T> for Vec<T> {
    fn steps(&self) -> Vec<T> {
        self.clone()
    }
}

/// Checks a pattern's configuration: at least one term, and every term
/// usable in one shared identifier alphabet.
///
/// Intended to run once, at configuration time, before the pattern is handed
/// to any adapter.
///
/// # Errors
///
/// Returns the [`PatternError`] the pattern's compilation raises, if any.
pub fn validate_pattern<R: TokenRepr>(pattern: &Pattern<R>) -> Result<(), PatternError> {
    pattern.terms().map(|_| ())
}

/// One pattern bound to one live step history.
///
/// The two operations workflow logic actually needs — what can happen next,
/// and are we done — are both thin reads over a fresh match of the current
/// history. The pattern is validated once at construction; per-call paths do
/// not re-validate.
#[derive(Debug)]
pub struct SigningOrder<R: TokenRepr, S: StepSource<R::Token>> {
    pattern: Pattern<R>,
    source: S,
}

impl<R: TokenRepr, S: StepSource<R::Token>> SigningOrder<R, S> {
    /// Binds `pattern` to `source`, validating the pattern eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the pattern fails configuration checks —
    /// the failure surfaces here, at startup, not inside a request path.
    pub fn new(pattern: Pattern<R>, source: S) -> Result<Self, PatternError> {
        validate_pattern(&pattern)?;
        Ok(Self { pattern, source })
    }

    /// Token identities that could legally occur next, given the current
    /// history. Empty when the history is invalid or nothing may follow.
    pub fn next_steps(&self) -> Vec<R::Token> {
        self.evaluate().next
    }

    /// True iff the current history fully satisfies the pattern.
    pub fn is_complete(&self) -> bool {
        self.evaluate().is_complete
    }

    /// The full match detail for callers that need validity or the matched
    /// groups rather than just "what's next".
    pub fn match_result(&self) -> MatchResult<R::Token> {
        self.evaluate()
    }

    /// The bound pattern.
    pub fn pattern(&self) -> &Pattern<R> {
        &self.pattern
    }

    fn evaluate(&self) -> MatchResult<R::Token> {
        let steps = self.source.steps();
        // Validated at construction; the memoized recognizer cannot fail
        // afterwards.
        self.pattern
            .match_sequence(&steps)
            .expect("pattern validated at construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternNode;
    use crate::repr::IdentRepr;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn s(token: &str) -> String {
        token.to_string()
    }

    fn workflow() -> Pattern<IdentRepr> {
        Pattern::in_series(
            vec![
                PatternNode::one_or_more(s("apply")),
                PatternNode::exactly_one(s("approve")),
                PatternNode::at_least_n(s("inspect"), 1),
            ],
            IdentRepr,
        )
    }

    #[test]
    fn test_next_steps_follow_the_live_history() {
        let history = Rc::new(RefCell::new(Vec::<String>::new()));
        let reader = Rc::clone(&history);
        let order = SigningOrder::new(workflow(), move || reader.borrow().clone()).unwrap();

        assert_eq!(order.next_steps(), vec![s("apply")]);
        assert!(!order.is_complete());

        history.borrow_mut().push(s("apply"));
        assert_eq!(order.next_steps(), vec![s("apply"), s("approve")]);

        history.borrow_mut().push(s("approve"));
        assert_eq!(order.next_steps(), vec![s("inspect")]);
        assert!(!order.is_complete());

        history.borrow_mut().push(s("inspect"));
        assert!(order.is_complete());
        // An open-ended tail keeps offering more inspections.
        assert_eq!(order.next_steps(), vec![s("inspect")]);
    }

    #[test]
    fn test_vec_source_snapshot() {
        let order = SigningOrder::new(workflow(), vec![s("apply"), s("approve")]).unwrap();
        assert_eq!(order.next_steps(), vec![s("inspect")]);
        assert!(!order.is_complete());
    }

    #[test]
    fn test_invalid_pattern_fails_at_construction() {
        let empty = Pattern::new(PatternNode::InSeries(vec![]), IdentRepr);
        let result = SigningOrder::new(empty, Vec::<String>::new());
        assert!(matches!(result, Err(PatternError::EmptyPattern)));
    }

    #[test]
    fn test_doubled_step_is_detected_not_lost() {
        // Two racing writers both appended "approve"; the next read reports
        // the corrupted history instead of failing.
        let order = SigningOrder::new(
            workflow(),
            vec![s("apply"), s("approve"), s("approve")],
        )
        .unwrap();
        let result = order.match_result();
        assert!(!result.is_valid);
        assert!(order.next_steps().is_empty());
        assert!(!order.is_complete());
    }

    #[test]
    fn test_typed_step_tokens() {
        /// A production-shaped token type: a closed set of step kinds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Step {
            Apply,
            Approve,
        }

        #[derive(Debug)]
        struct StepRepr;
        impl TokenRepr for StepRepr {
            type Token = Step;
            fn to_identifier(&self, token: &Step) -> String {
                match token {
                    Step::Apply => "apply".to_string(),
                    Step::Approve => "approve".to_string(),
                }
            }
            fn from_identifier(&self, identifier: &str) -> Option<Step> {
                match identifier {
                    "apply" => Some(Step::Apply),
                    "approve" => Some(Step::Approve),
                    _ => None,
                }
            }
        }

        let pattern = Pattern::in_series(
            vec![
                PatternNode::exactly_one(Step::Apply),
                PatternNode::exactly_one(Step::Approve),
            ],
            StepRepr,
        );
        let order = SigningOrder::new(pattern, vec![Step::Apply]).unwrap();
        assert_eq!(order.next_steps(), vec![Step::Approve]);
        assert!(!order.is_complete());
    }

    #[test]
    fn test_match_result_exposes_groups() {
        let order = SigningOrder::new(workflow(), vec![s("apply"), s("apply")]).unwrap();
        let result = order.match_result();
        assert!(result.is_valid);
        assert_eq!(result.matched[0].occurrences.len(), 2);
    }
}
