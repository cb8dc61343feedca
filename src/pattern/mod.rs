// SPDX-License-Identifier: MIT

//! Declarative step-ordering patterns and their compiler.
//!
//! A pattern is an immutable tree of quantified tokens and structural
//! combinators, compiled once into a prefix-aware recognizer and matched
//! many times against concrete step histories.
//!
//! # Combinator Vocabulary
//!
//! ```text
//! ExactlyOne(t)       — exactly one occurrence of t
//! Optional(t)         — zero or one occurrence of t
//! ZeroOrMore(t)       — any number of occurrences of t, including none
//! OneOrMore(t)        — at least one occurrence of t
//! ExactlyN(t, n)      — exactly n occurrences of t, back to back
//! AtLeastN(t, n)      — n or more occurrences of t (greedy, stays open)
//! InSeries(a, b, …)   — children in the listed order, back to back
//! InParallel(a, b, …) — children in any order (by permutation, see below)
//! AnyOneOf(a, b, …)   — exactly one child pattern, in its entirety
//! ```
//!
//! `InParallel` is compiled by enumerating every permutation of its branches
//! and joining them with alternation — factorial in the branch count, which
//! is why the number of branches is capped at [`MAX_PARALLEL_BRANCHES`].

pub mod fragment;
pub mod recognizer;

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::pattern::fragment::Fragment;
use crate::pattern::recognizer::Recognizer;
use crate::repr::TokenRepr;

/// Maximum number of direct branches in one `InParallel` node.
///
/// Each additional branch multiplies the compiled program size by the branch
/// count (permutation expansion), so parallel signing is practical only for
/// a handful of branches. Exceeding the cap is a configuration error raised
/// at compile time, not a runtime hang.
pub const MAX_PARALLEL_BRANCHES: usize = 6;

/// Configuration errors, raised eagerly at pattern compilation or adapter
/// construction — never mid-match. An inconsistent step history is *not* an
/// error; it is reported as [`MatchResult::is_valid`] `== false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// The pattern tree references no tokens at all.
    #[error("pattern references no terms")]
    EmptyPattern,
    /// A token rendered to an identifier that cannot live in a
    /// single-delimiter alphabet (empty, or contains whitespace).
    #[error("token identifier {identifier:?} is empty or contains whitespace")]
    InvalidIdentifier {
        /// The offending rendered identifier.
        identifier: String,
    },
    /// Two distinct tokens rendered to the same identifier, which would make
    /// their occurrences indistinguishable to the recognizer.
    #[error("distinct tokens share the identifier {identifier:?}")]
    DuplicateIdentifier {
        /// The shared rendered identifier.
        identifier: String,
    },
    /// The representation strategy could not recover a token from its own
    /// rendered identifier.
    #[error("identifier {identifier:?} does not round-trip through the token representation")]
    RoundTripFailed {
        /// The identifier that failed to round-trip.
        identifier: String,
    },
    /// An `InParallel` node has more branches than the permutation expansion
    /// supports.
    #[error("in-parallel pattern has {count} branches, more than the supported {max}")]
    TooManyParallelBranches {
        /// Number of branches in the offending node.
        count: usize,
        /// The [`MAX_PARALLEL_BRANCHES`] cap.
        max: usize,
    },
}

/// How many occurrences of a single token a pattern position demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Exactly one occurrence.
    ExactlyOne,
    /// Zero or one occurrence.
    Optional,
    /// Any number of occurrences, including none.
    ZeroOrMore,
    /// At least one occurrence.
    OneOrMore,
    /// Exactly `n` occurrences.
    ExactlyN(u32),
    /// `n` or more occurrences.
    AtLeastN(u32),
}

/// One node of an immutable pattern tree: a quantified token or a structural
/// combination of child patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternNode<T> {
    /// A single token with a repetition quantifier.
    Token {
        /// The token identity this position matches.
        token: T,
        /// How many occurrences are demanded.
        quantifier: Quantifier,
    },
    /// Children must occur in the listed order, back to back.
    InSeries(Vec<PatternNode<T>>),
    /// Children may occur in any order relative to each other.
    ///
    /// Compiled by permutation, so each branch still matches its own tokens
    /// consecutively; interleaving *within* a branch is not supported and
    /// branch count is capped at [`MAX_PARALLEL_BRANCHES`].
    InParallel(Vec<PatternNode<T>>),
    /// Exactly one child pattern, in its entirety, must match; once a branch
    /// has been entered the others are dead.
    AnyOneOf(Vec<PatternNode<T>>),
}

impl<T> PatternNode<T> {
    /// Exactly one occurrence of `token`.
    pub fn exactly_one(token: T) -> Self {
        Self::Token {
            token,
            quantifier: Quantifier::ExactlyOne,
        }
    }

    /// Zero or one occurrence of `token`.
    pub fn optional(token: T) -> Self {
        Self::Token {
            token,
            quantifier: Quantifier::Optional,
        }
    }

    /// Any number of occurrences of `token`, including none.
    pub fn zero_or_more(token: T) -> Self {
        Self::Token {
            token,
            quantifier: Quantifier::ZeroOrMore,
        }
    }

    /// At least one occurrence of `token`.
    pub fn one_or_more(token: T) -> Self {
        Self::Token {
            token,
            quantifier: Quantifier::OneOrMore,
        }
    }

    /// Exactly `n` occurrences of `token`.
    pub fn exactly_n(token: T, n: u32) -> Self {
        Self::Token {
            token,
            quantifier: Quantifier::ExactlyN(n),
        }
    }

    /// `n` or more occurrences of `token`.
    pub fn at_least_n(token: T, n: u32) -> Self {
        Self::Token {
            token,
            quantifier: Quantifier::AtLeastN(n),
        }
    }

    /// Children in the listed order, back to back.
    pub fn in_series(children: Vec<Self>) -> Self {
        Self::InSeries(children)
    }

    /// Children in any order relative to each other.
    pub fn in_parallel(children: Vec<Self>) -> Self {
        Self::InParallel(children)
    }

    /// Exactly one of the children, in its entirety.
    pub fn any_one_of(children: Vec<Self>) -> Self {
        Self::AnyOneOf(children)
    }
}

impl<T> From<T> for PatternNode<T> {
    /// A bare token is shorthand for exactly one occurrence of it.
    fn from(token: T) -> Self {
        Self::exactly_one(token)
    }
}

impl<T: Eq> PatternNode<T> {
    /// Flattened distinct token identities referenced anywhere in this tree,
    /// in first-appearance order.
    pub fn terms(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    fn collect_terms<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            Self::Token { token, .. } => {
                if !out.iter().any(|t| *t == token) {
                    out.push(token);
                }
            }
            Self::InSeries(children) | Self::InParallel(children) | Self::AnyOneOf(children) => {
                for child in children {
                    child.collect_terms(out);
                }
            }
        }
    }
}

/// Result of matching a concrete step history against a [`Pattern`].
///
/// A transient value, recomputed for every match call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<T> {
    /// The history so far violates no constraint. When false, no extension
    /// can repair the sequence and every other field is empty.
    pub is_valid: bool,
    /// At least one step has occurred and the pattern is fully satisfied.
    /// An empty history is never complete, even for patterns satisfiable by
    /// zero occurrences.
    pub is_complete: bool,
    /// For every distinct term of the pattern, the concrete occurrences
    /// bound to it, in input order.
    pub matched: Vec<MatchedTerm<T>>,
    /// Token identities that could legally occur next. May be nonempty even
    /// when the match is complete (open-ended quantifiers).
    pub next: Vec<T>,
}

/// One term of a pattern together with its bound occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedTerm<T> {
    /// The token identity as declared in the pattern.
    pub term: T,
    /// Concrete occurrences from the input bound to this term, in order.
    pub occurrences: Vec<T>,
}

impl<T> MatchResult<T> {
    /// The hard-stop result for an inconsistent history.
    const fn invalid() -> Self {
        Self {
            is_valid: false,
            is_complete: false,
            matched: Vec::new(),
            next: Vec::new(),
        }
    }
}

/// A pattern tree bound to a token-representation strategy, with its
/// compiled recognizer memoized per instance.
///
/// Construction is cheap; the recognizer is built on first use ([`terms`] or
/// [`match_sequence`]) and reused for every subsequent match. All
/// configuration errors surface at that first use.
///
/// [`terms`]: Pattern::terms
/// [`match_sequence`]: Pattern::match_sequence
#[derive(Debug)]
pub struct Pattern<R: TokenRepr> {
    root: PatternNode<R::Token>,
    repr: R,
    compiled: OnceCell<Compiled<R::Token>>,
}

#[derive(Debug)]
struct Compiled<T> {
    recognizer: Recognizer,
    terms: Vec<T>,
}

impl<R: TokenRepr> Pattern<R> {
    /// Wraps a pattern tree with the strategy that renders its tokens.
    pub fn new(root: PatternNode<R::Token>, repr: R) -> Self {
        Self {
            root,
            repr,
            compiled: OnceCell::new(),
        }
    }

    /// Convenience for the overwhelmingly common top-level shape: the given
    /// nodes must be satisfied one after another.
    pub fn in_series(children: Vec<PatternNode<R::Token>>, repr: R) -> Self {
        Self::new(PatternNode::InSeries(children), repr)
    }

    /// The pattern tree this instance was built from.
    pub fn node(&self) -> &PatternNode<R::Token> {
        &self.root
    }

    /// Distinct token identities referenced by the pattern, in
    /// first-appearance order.
    ///
    /// Forces compilation, so every configuration error a pattern can carry
    /// is observable here, before any matcher is constructed.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the pattern is empty or its rendered
    /// alphabet is unusable.
    pub fn terms(&self) -> Result<&[R::Token], PatternError> {
        Ok(&self.compiled()?.terms)
    }

    /// Matches a chronologically ordered step history against this pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if compilation fails; an inconsistent
    /// history is a normal result, not an error.
    pub fn match_sequence(
        &self,
        sequence: &[R::Token],
    ) -> Result<MatchResult<R::Token>, PatternError> {
        let compiled = self.compiled()?;
        let words: Vec<String> = sequence
            .iter()
            .map(|token| self.repr.to_identifier(token))
            .collect();
        let outcome = compiled.recognizer.match_words(&words);
        if !outcome.is_valid {
            return Ok(MatchResult::invalid());
        }
        let idents = compiled.recognizer.idents();
        let matched = compiled
            .terms
            .iter()
            .enumerate()
            .map(|(term_id, term)| MatchedTerm {
                term: term.clone(),
                occurrences: sequence
                    .iter()
                    .zip(&words)
                    .filter(|(_, word)| **word == idents[term_id])
                    .map(|(token, _)| token.clone())
                    .collect(),
            })
            .collect();
        let next = outcome
            .next
            .into_iter()
            .map(|term_id| compiled.terms[term_id].clone())
            .collect();
        Ok(MatchResult {
            is_valid: true,
            is_complete: outcome.is_complete,
            matched,
            next,
        })
    }

    fn compiled(&self) -> Result<&Compiled<R::Token>, PatternError> {
        self.compiled.get_or_try_init(|| self.build())
    }

    /// Collects and validates the term alphabet, then compiles the tree.
    fn build(&self) -> Result<Compiled<R::Token>, PatternError> {
        let terms = self.root.terms();
        if terms.is_empty() {
            return Err(PatternError::EmptyPattern);
        }
        let mut idents: Vec<String> = Vec::with_capacity(terms.len());
        for &token in &terms {
            let identifier = self.repr.to_identifier(token);
            if identifier.is_empty() || identifier.chars().any(char::is_whitespace) {
                return Err(PatternError::InvalidIdentifier { identifier });
            }
            if idents.contains(&identifier) {
                return Err(PatternError::DuplicateIdentifier { identifier });
            }
            match self.repr.from_identifier(&identifier) {
                Some(recovered) if &recovered == token => {}
                _ => return Err(PatternError::RoundTripFailed { identifier }),
            }
            idents.push(identifier);
        }
        let fragment = compile_node(&self.root, &terms)?;
        Ok(Compiled {
            recognizer: Recognizer::new(fragment, idents),
            terms: terms.into_iter().cloned().collect(),
        })
    }
}

/// Compiles one tree node into a recognizer fragment over the term alphabet.
fn compile_node<T: Eq>(node: &PatternNode<T>, terms: &[&T]) -> Result<Fragment, PatternError> {
    match node {
        PatternNode::Token { token, quantifier } => {
            // The term table was collected from this same tree, so the
            // lookup cannot miss.
            let term = terms
                .iter()
                .position(|t| *t == token)
                .expect("term collected from its own tree");
            let word = Fragment::word(term);
            Ok(match *quantifier {
                Quantifier::ExactlyOne => word.exactly_one(),
                Quantifier::Optional => word.optional(),
                Quantifier::ZeroOrMore => word.zero_or_more(),
                Quantifier::OneOrMore => word.one_or_more(),
                Quantifier::ExactlyN(n) => word.exactly_n(n),
                Quantifier::AtLeastN(n) => word.at_least_n(n),
            })
        }
        PatternNode::InSeries(children) => {
            Ok(Fragment::in_series(compile_children(children, terms)?))
        }
        PatternNode::InParallel(children) => {
            if children.len() > MAX_PARALLEL_BRANCHES {
                return Err(PatternError::TooManyParallelBranches {
                    count: children.len(),
                    max: MAX_PARALLEL_BRANCHES,
                });
            }
            Ok(Fragment::all_of(compile_children(children, terms)?))
        }
        PatternNode::AnyOneOf(children) => {
            Ok(Fragment::one_of(compile_children(children, terms)?))
        }
    }
}

fn compile_children<T: Eq>(
    children: &[PatternNode<T>],
    terms: &[&T],
) -> Result<Vec<Fragment>, PatternError> {
    children
        .iter()
        .map(|child| compile_node(child, terms))
        .collect()
}
