// SPDX-License-Identifier: MIT

//! # `signing_order` — Sequence-Ordering Constraint Engine
//!
//! Declares how a set of named workflow steps (sign-offs, approvals) must
//! occur — in series, in parallel, optionally, or repeated some number of
//! times — and answers, for a concrete partial history of steps that have
//! already happened:
//!
//! | Question | API |
//! |----------|-----|
//! | Is the history consistent with the declared order? | [`pattern::MatchResult::is_valid`] |
//! | Is the declared order now fully satisfied? | [`order::SigningOrder::is_complete`] |
//! | Which step(s) could legally occur next? | [`order::SigningOrder::next_steps`] |
//!
//! Patterns are declared once, at configuration time, from a small
//! combinator vocabulary and compiled into a prefix-aware recognizer; step
//! histories are matched incrementally on every read. The engine knows
//! nothing about actors, timestamps, or persistence — a step is an opaque,
//! comparable token identity rendered through a pluggable
//! [`repr::TokenRepr`] strategy.
//!
//! ## Example
//!
//! ```
//! use signing_order::order::SigningOrder;
//! use signing_order::pattern::{Pattern, PatternNode};
//! use signing_order::repr::IdentRepr;
//!
//! let pattern = Pattern::in_series(
//!     vec![
//!         PatternNode::one_or_more("apply".to_string()),
//!         PatternNode::exactly_one("approve".to_string()),
//!     ],
//!     IdentRepr,
//! );
//! let order = SigningOrder::new(pattern, vec!["apply".to_string()])?;
//! assert_eq!(
//!     order.next_steps(),
//!     vec!["apply".to_string(), "approve".to_string()]
//! );
//! assert!(!order.is_complete());
//! # Ok::<(), signing_order::pattern::PatternError>(())
//! ```

pub mod order;
pub mod pattern;
pub mod repr;
