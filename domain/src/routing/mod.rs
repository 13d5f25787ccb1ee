//! Recipient routing.
//!
//! Replies signal routing intent with a `TO[<name>]:` prefix. The
//! [`directive`] module holds the grammar, [`router`] resolves the parsed
//! name against the owning unit's children.

pub mod directive;
pub mod router;
