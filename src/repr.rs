// SPDX-License-Identifier: MIT

//! Pluggable token representation.
//!
//! The pattern engine never inspects domain tokens directly; it renders them
//! to short string identifiers through a [`TokenRepr`] strategy and matches
//! over that alphabet. The same combinator vocabulary therefore serves unit
//! tests (plain strings via [`IdentRepr`]) and production step identities
//! (any type the caller can render and recover).

use std::fmt::Debug;

/// Maps domain tokens to and from the recognizer's identifier alphabet.
///
/// Identifiers must be non-empty, contain no whitespace, and round-trip:
/// `from_identifier(&to_identifier(t))` must recover a token equal to `t`.
/// All three properties are verified at pattern compilation; violations are
/// configuration errors, reported before any matching happens.
pub trait TokenRepr {
    /// The domain token type — an opaque, comparable step identity.
    type Token: Clone + Eq + Debug;

    /// Renders a token as its short string identifier.
    fn to_identifier(&self, token: &Self::Token) -> String;

    /// Recovers the token named by an identifier, if it names one.
    fn from_identifier(&self, identifier: &str) -> Option<Self::Token>;
}

/// The identity strategy: string tokens are their own identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentRepr;

impl TokenRepr for IdentRepr {
    type Token = String;

    fn to_identifier(&self, token: &String) -> String {
        token.clone()
    }

    fn from_identifier(&self, identifier: &str) -> Option<String> {
        Some(identifier.to_string())
    }
}
