//! Addressing directive grammar.
//!
//! | Reply | Meaning |
//! |-------|---------|
//! | `TO[EvenHandler]: 4` | deliver `4` to the child `EvenHandler` |
//! | `DONE: 10` | finish the run with `10` |
//! | `DONE` | finish the run with the current transcript tail |
//! | anything else | unaddressed |
//!
//! Pure text matching, no I/O.

/// Opening token of a recipient directive.
pub const DIRECTIVE_OPEN: &str = "TO[";

/// Reply token that ends a unit's run.
pub const DONE_TOKEN: &str = "DONE";

/// A reply split into its optional recipient and the remaining body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    pub recipient: Option<&'a str>,
    pub body: &'a str,
}

/// Split an optional `TO[<name>]:` prefix off a reply.
///
/// Leading whitespace is ignored, whitespace inside the brackets and after
/// the colon is trimmed. A `TO[` with no closing bracket is not a directive.
///
/// ```
/// use taskweave_domain::routing::directive::parse_directive;
///
/// let d = parse_directive("TO[OddHandler]: 3");
/// assert_eq!(d.recipient, Some("OddHandler"));
/// assert_eq!(d.body, "3");
///
/// let d = parse_directive("just text");
/// assert_eq!(d.recipient, None);
/// ```
pub fn parse_directive(raw: &str) -> Directive<'_> {
    let unaddressed = Directive {
        recipient: None,
        body: raw.trim(),
    };

    let Some(rest) = raw.trim_start().strip_prefix(DIRECTIVE_OPEN) else {
        return unaddressed;
    };
    let Some(close) = rest.find(']') else {
        return unaddressed;
    };

    let name = rest[..close].trim();
    let after = rest[close + 1..].trim_start();
    let body = after.strip_prefix(':').unwrap_or(after).trim();

    Directive {
        recipient: Some(name),
        body,
    }
}

/// Detect the DONE signal.
///
/// Returns `None` when the reply is not a DONE signal, `Some(None)` for a bare
/// `DONE` (or `DONE:` with nothing after it) and `Some(Some(text))` otherwise.
pub fn parse_done(raw: &str) -> Option<Option<&str>> {
    let trimmed = raw.trim();
    if trimmed == DONE_TOKEN {
        return Some(None);
    }
    let rest = trimmed.strip_prefix(DONE_TOKEN)?.strip_prefix(':')?.trim();
    if rest.is_empty() {
        Some(None)
    } else {
        Some(Some(rest))
    }
}

/// Render a directive for `recipient` in front of `body`.
pub fn format_directive(recipient: &str, body: &str) -> String {
    format!("{}{}]: {}", DIRECTIVE_OPEN, recipient, body)
}
