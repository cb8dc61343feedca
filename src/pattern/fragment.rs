// SPDX-License-Identifier: MIT

//! Primitive recognizer fragments and their combinators.
//!
//! A [`Fragment`] is a self-contained block of recognizer instructions over a
//! small term alphabet, plus the ordered set of distinct terms it references.
//! Fragments compose by splicing: instruction targets are block-relative, and
//! a target one past the end of the block means "fell through", so
//! concatenation is append-with-offset and quantifiers are a handful of
//! [`Inst::Split`]/[`Inst::Jump`] wrappers around the inner block.
//!
//! There is no failure mode at this layer. Composition is pure; alphabet
//! validation happens in the pattern compiler before fragments are built.

/// Index of a distinct term within a compiled pattern's alphabet.
pub type TermId = usize;

/// A single recognizer instruction.
///
/// Targets are indices into the enclosing instruction block; an index equal
/// to the block length is the accept position (control fell off the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    /// Consume exactly one occurrence of the given term.
    Word(TermId),
    /// Continue at either target without consuming input.
    Split(usize, usize),
    /// Continue at the target without consuming input.
    Jump(usize),
}

/// A composable block of recognizer instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    insts: Vec<Inst>,
    /// Distinct terms referenced by this fragment, in first-appearance order.
    terms: Vec<TermId>,
}

impl Fragment {
    /// Creates a fragment matching exactly one occurrence of `term`.
    ///
    /// This is the primitive every quantifier and structural combinator
    /// builds on; one instruction, one referenced term.
    #[must_use]
    pub fn word(term: TermId) -> Self {
        Self {
            insts: vec![Inst::Word(term)],
            terms: vec![term],
        }
    }

    /// A fragment matching the empty sequence. Referenced terms may still be
    /// carried (a zero-count quantifier references its term without ever
    /// consuming it).
    fn empty(terms: Vec<TermId>) -> Self {
        Self {
            insts: Vec::new(),
            terms,
        }
    }

    /// Exactly one occurrence — the fragment unchanged.
    #[must_use]
    pub fn exactly_one(self) -> Self {
        self
    }

    /// Zero or one occurrence.
    #[must_use]
    pub fn optional(self) -> Self {
        let n = self.insts.len();
        let mut insts = Vec::with_capacity(n + 1);
        insts.push(Inst::Split(1, n + 1));
        append_shifted(&mut insts, &self.insts, 1);
        Self {
            insts,
            terms: self.terms,
        }
    }

    /// Zero or more occurrences.
    #[must_use]
    pub fn zero_or_more(self) -> Self {
        let n = self.insts.len();
        let mut insts = Vec::with_capacity(n + 2);
        insts.push(Inst::Split(1, n + 2));
        append_shifted(&mut insts, &self.insts, 1);
        insts.push(Inst::Jump(0));
        Self {
            insts,
            terms: self.terms,
        }
    }

    /// One or more occurrences.
    #[must_use]
    pub fn one_or_more(self) -> Self {
        let n = self.insts.len();
        let mut insts = self.insts;
        insts.push(Inst::Split(0, n + 1));
        Self {
            insts,
            terms: self.terms,
        }
    }

    /// Exactly `n` occurrences, back to back.
    #[must_use]
    pub fn exactly_n(self, n: u32) -> Self {
        if n == 0 {
            return Self::empty(self.terms);
        }
        let mut result = self.clone();
        for _ in 1..n {
            result = concat(result, self.clone());
        }
        result
    }

    /// `n` or more occurrences: `n` required copies followed by an open tail.
    #[must_use]
    pub fn at_least_n(self, n: u32) -> Self {
        concat(self.clone().exactly_n(n), self.zero_or_more())
    }

    /// Concatenates fragments in order — matches require exact order and
    /// adjacency, with nothing interleaved.
    #[must_use]
    pub fn in_series(parts: Vec<Self>) -> Self {
        let terms = union_terms(&parts);
        let mut result = Self::empty(Vec::new());
        for part in parts {
            result = concat(result, part);
        }
        result.terms = terms;
        result
    }

    /// Alternation — exactly one of the fragments must match.
    #[must_use]
    pub fn one_of(parts: Vec<Self>) -> Self {
        let terms = union_terms(&parts);
        let mut parts = parts;
        let Some(mut result) = parts.pop() else {
            return Self::empty(terms);
        };
        while let Some(part) = parts.pop() {
            result = alt(part, result);
        }
        result.terms = terms;
        result
    }

    /// All fragments must occur, in no particular order.
    ///
    /// A linear recognizer has no native "and", so this enumerates every
    /// permutation of the inputs, concatenates each permutation in series,
    /// and joins the permutations with alternation. Cost is factorial in the
    /// number of fragments; the pattern compiler caps the branch count before
    /// calling this.
    #[must_use]
    pub fn all_of(parts: Vec<Self>) -> Self {
        if parts.len() < 2 {
            return Self::one_of(parts);
        }
        let terms = union_terms(&parts);
        let branches = permutations(parts.len())
            .into_iter()
            .map(|order| {
                Self::in_series(order.into_iter().map(|i| parts[i].clone()).collect())
            })
            .collect();
        let mut result = Self::one_of(branches);
        result.terms = terms;
        result
    }

    /// The instruction block.
    #[must_use]
    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    /// Distinct terms referenced, in first-appearance order.
    #[must_use]
    pub fn terms(&self) -> &[TermId] {
        &self.terms
    }

    pub(crate) fn into_insts(self) -> Vec<Inst> {
        self.insts
    }
}

/// Appends `block` to `insts`, shifting every target by `offset`.
fn append_shifted(insts: &mut Vec<Inst>, block: &[Inst], offset: usize) {
    insts.extend(block.iter().map(|inst| match *inst {
        Inst::Word(t) => Inst::Word(t),
        Inst::Split(a, b) => Inst::Split(a + offset, b + offset),
        Inst::Jump(a) => Inst::Jump(a + offset),
    }));
}

/// `a` then `b`, back to back.
fn concat(a: Fragment, mut b: Fragment) -> Fragment {
    let offset = a.insts.len();
    let mut insts = a.insts;
    append_shifted(&mut insts, &b.insts, offset);
    let mut terms = a.terms;
    for t in b.terms.drain(..) {
        if !terms.contains(&t) {
            terms.push(t);
        }
    }
    Fragment { insts, terms }
}

/// `a` or `b`.
fn alt(a: Fragment, b: Fragment) -> Fragment {
    let an = a.insts.len();
    let bn = b.insts.len();
    let mut insts = Vec::with_capacity(an + bn + 2);
    insts.push(Inst::Split(1, an + 2));
    append_shifted(&mut insts, &a.insts, 1);
    insts.push(Inst::Jump(an + bn + 2));
    append_shifted(&mut insts, &b.insts, an + 2);
    let mut terms = a.terms;
    for t in b.terms {
        if !terms.contains(&t) {
            terms.push(t);
        }
    }
    Fragment { insts, terms }
}

/// Distinct terms across `parts`, in first-appearance order.
fn union_terms(parts: &[Fragment]) -> Vec<TermId> {
    let mut out = Vec::new();
    for part in parts {
        for &t in &part.terms {
            if !out.contains(&t) {
                out.push(t);
            }
        }
    }
    out
}

/// Every ordering of `0..k`, generated by recursive swaps.
fn permutations(k: usize) -> Vec<Vec<usize>> {
    fn permute(items: &mut Vec<usize>, start: usize, out: &mut Vec<Vec<usize>>) {
        if start + 1 >= items.len() {
            out.push(items.clone());
            return;
        }
        for i in start..items.len() {
            items.swap(start, i);
            permute(items, start + 1, out);
            items.swap(start, i);
        }
    }
    let mut items: Vec<usize> = (0..k).collect();
    let mut out = Vec::new();
    if items.is_empty() {
        out.push(Vec::new());
        return out;
    }
    permute(&mut items, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_shape() {
        let f = Fragment::word(0);
        assert_eq!(f.insts(), &[Inst::Word(0)]);
        assert_eq!(f.terms(), &[0]);
    }

    #[test]
    fn test_optional_wraps_with_split() {
        let f = Fragment::word(0).optional();
        assert_eq!(f.insts(), &[Inst::Split(1, 2), Inst::Word(0)]);
    }

    #[test]
    fn test_zero_or_more_loops_back() {
        let f = Fragment::word(0).zero_or_more();
        assert_eq!(
            f.insts(),
            &[Inst::Split(1, 3), Inst::Word(0), Inst::Jump(0)]
        );
    }

    #[test]
    fn test_one_or_more_splits_back_to_start() {
        let f = Fragment::word(0).one_or_more();
        assert_eq!(f.insts(), &[Inst::Word(0), Inst::Split(0, 2)]);
    }

    #[test]
    fn test_exactly_n_concatenates_copies() {
        let f = Fragment::word(0).exactly_n(3);
        assert_eq!(
            f.insts(),
            &[Inst::Word(0), Inst::Word(0), Inst::Word(0)]
        );
        assert_eq!(f.terms(), &[0]);
    }

    #[test]
    fn test_exactly_zero_is_empty_but_keeps_term() {
        let f = Fragment::word(0).exactly_n(0);
        assert!(f.insts().is_empty());
        assert_eq!(f.terms(), &[0]);
    }

    #[test]
    fn test_at_least_n_is_copies_plus_open_tail() {
        let f = Fragment::word(0).at_least_n(2);
        assert_eq!(
            f.insts(),
            &[
                Inst::Word(0),
                Inst::Word(0),
                Inst::Split(3, 5),
                Inst::Word(0),
                Inst::Jump(2),
            ]
        );
    }

    #[test]
    fn test_in_series_merges_terms_in_order() {
        let f = Fragment::in_series(vec![
            Fragment::word(1),
            Fragment::word(0),
            Fragment::word(1),
        ]);
        assert_eq!(f.insts(), &[Inst::Word(1), Inst::Word(0), Inst::Word(1)]);
        assert_eq!(f.terms(), &[1, 0]);
    }

    #[test]
    fn test_one_of_single_is_identity() {
        let f = Fragment::one_of(vec![Fragment::word(2)]);
        assert_eq!(f.insts(), &[Inst::Word(2)]);
    }

    #[test]
    fn test_one_of_two_builds_alternation() {
        let f = Fragment::one_of(vec![Fragment::word(0), Fragment::word(1)]);
        assert_eq!(
            f.insts(),
            &[
                Inst::Split(1, 3),
                Inst::Word(0),
                Inst::Jump(4),
                Inst::Word(1),
            ]
        );
        assert_eq!(f.terms(), &[0, 1]);
    }

    #[test]
    fn test_all_of_two_has_both_orders() {
        let f = Fragment::all_of(vec![Fragment::word(0), Fragment::word(1)]);
        // Two permutations of two one-instruction fragments joined by one
        // alternation: 2 * 2 + 2 scaffold instructions.
        assert_eq!(f.insts().len(), 6);
        assert_eq!(f.terms(), &[0, 1]);
    }

    #[test]
    fn test_all_of_terms_keep_input_order() {
        let f = Fragment::all_of(vec![
            Fragment::word(2),
            Fragment::word(0),
            Fragment::word(1),
        ]);
        assert_eq!(f.terms(), &[2, 0, 1]);
    }

    #[test]
    fn test_all_of_single_is_identity() {
        let f = Fragment::all_of(vec![Fragment::word(0)]);
        assert_eq!(f.insts(), &[Inst::Word(0)]);
    }

    #[test]
    fn test_permutation_counts() {
        assert_eq!(permutations(0).len(), 1);
        assert_eq!(permutations(1).len(), 1);
        assert_eq!(permutations(2).len(), 2);
        assert_eq!(permutations(3).len(), 6);
        assert_eq!(permutations(4).len(), 24);
    }

    #[test]
    fn test_permutations_are_distinct() {
        let perms = permutations(3);
        for (i, a) in perms.iter().enumerate() {
            for b in perms.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_nested_quantifier_targets_stay_in_block() {
        // optional(one_or_more(a)) — every target must stay within the block
        // or point exactly one past the end.
        let f = Fragment::word(0).one_or_more().optional();
        let len = f.insts().len();
        for inst in f.insts() {
            match *inst {
                Inst::Word(_) => {}
                Inst::Split(a, b) => {
                    assert!(a <= len && b <= len);
                }
                Inst::Jump(a) => assert!(a <= len),
            }
        }
    }
}
