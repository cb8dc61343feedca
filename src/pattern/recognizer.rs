//! Prefix-aware recognizer for delimiter-free word sequences.
//!
//! Executes a compiled instruction program against an already-rendered
//! sequence of token identifiers using non-deterministic subset simulation:
//! the live state is the set of instruction positions reachable after the
//! input consumed so far, with epsilon closure over [`Inst::Split`] and
//! [`Inst::Jump`]. The partial-match question — is the input a prefix of
//! some accepted sequence — is then just "is the live set nonempty", and
//! completeness is "does the live set contain the accept position". No
//! backtracking, no state explosion beyond the program length.

use std::collections::HashSet;

use crate::pattern::fragment::{Fragment, Inst, TermId};

/// Outcome of matching a rendered word sequence against a [`Recognizer`].
///
/// `next` carries term ids; the pattern layer translates them back into
/// domain tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch {
    /// The sequence so far violates no constraint (it is a prefix of some
    /// accepted sequence, possibly the whole of one).
    pub is_valid: bool,
    /// At least one word was supplied and the sequence is accepted as-is.
    pub is_complete: bool,
    /// Terms that could legally extend the sequence.
    pub next: Vec<TermId>,
}

impl PrefixMatch {
    /// The hard-stop result: the history contradicts the pattern and no
    /// extension can repair it.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            is_valid: false,
            is_complete: false,
            next: Vec::new(),
        }
    }
}

/// A compiled, immutable recognizer: one instruction program plus the
/// ordered identifier alphabet it was compiled against.
#[derive(Debug, Clone)]
pub struct Recognizer {
    insts: Vec<Inst>,
    /// Identifier for each [`TermId`], in first-appearance order.
    idents: Vec<String>,
}

impl Recognizer {
    /// Builds a recognizer from a compiled fragment and its identifier table.
    #[must_use]
    pub fn new(fragment: Fragment, idents: Vec<String>) -> Self {
        Self {
            insts: fragment.into_insts(),
            idents,
        }
    }

    /// The identifier alphabet, indexed by [`TermId`].
    #[must_use]
    pub fn idents(&self) -> &[String] {
        &self.idents
    }

    /// Resolves an identifier to its term id, if the recognizer knows it.
    #[must_use]
    pub fn term_id(&self, ident: &str) -> Option<TermId> {
        self.idents.iter().position(|i| i == ident)
    }

    /// Matches a chronologically ordered sequence of rendered identifiers.
    ///
    /// Words outside the recognizer's alphabet have no transition anywhere in
    /// the program, so they empty the live set exactly like an out-of-order
    /// known word: the result is invalid, not an error.
    #[must_use]
    pub fn match_words(&self, words: &[String]) -> PrefixMatch {
        let has_tokens = !words.is_empty();
        let mut states = self.start_states();
        for word in words {
            let Some(term) = self.term_id(word) else {
                return PrefixMatch::invalid();
            };
            states = self.advance(&states, term);
            if states.is_empty() {
                return PrefixMatch::invalid();
            }
        }
        let next = (0..self.idents.len())
            .filter(|&term| !self.advance(&states, term).is_empty())
            .collect();
        PrefixMatch {
            is_valid: true,
            is_complete: has_tokens && self.is_accepting(&states),
            next,
        }
    }

    /// Initial live set: position 0 plus everything epsilon-reachable.
    fn start_states(&self) -> HashSet<usize> {
        let mut states = HashSet::new();
        states.insert(0);
        self.close(&mut states);
        states
    }

    /// Consumes one occurrence of `term` from every live position.
    fn advance(&self, states: &HashSet<usize>, term: TermId) -> HashSet<usize> {
        let mut next = HashSet::new();
        for &pc in states {
            if let Some(Inst::Word(t)) = self.insts.get(pc) {
                if *t == term {
                    next.insert(pc + 1);
                }
            }
        }
        self.close(&mut next);
        next
    }

    /// Expands a state set in place with its epsilon closure.
    fn close(&self, states: &mut HashSet<usize>) {
        let mut stack: Vec<usize> = states.iter().copied().collect();
        while let Some(pc) = stack.pop() {
            match self.insts.get(pc) {
                Some(Inst::Split(a, b)) => {
                    if states.insert(*a) {
                        stack.push(*a);
                    }
                    if states.insert(*b) {
                        stack.push(*b);
                    }
                }
                Some(Inst::Jump(a)) => {
                    if states.insert(*a) {
                        stack.push(*a);
                    }
                }
                // Word positions block until consumed; the accept position
                // (one past the end) has no outgoing edges.
                Some(Inst::Word(_)) | None => {}
            }
        }
    }

    /// True if the accept position is live.
    fn is_accepting(&self, states: &HashSet<usize>) -> bool {
        states.contains(&self.insts.len())
    }
}
