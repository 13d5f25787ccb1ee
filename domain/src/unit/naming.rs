//! Unit naming rules.
//!
//! A name is the key a `TO[<name>]:` directive resolves against, so it has
//! to survive a trip through that grammar and be unique among siblings.

use crate::core::error::DomainError;
use std::collections::HashSet;

/// Check a single unit name.
pub fn validate_unit_name(name: &str) -> Result<(), DomainError> {
    let invalid = |reason| {
        Err(DomainError::InvalidUnitName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.trim() != name {
        return invalid("name has surrounding whitespace");
    }
    if name.contains(['[', ']', ':']) {
        return invalid("name contains '[', ']' or ':'");
    }
    Ok(())
}

/// Check that `incoming` names can join `existing` siblings.
///
/// Fails on the first name that collides with an existing sibling or with an
/// earlier name in the same batch.
pub fn check_sibling_names<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    incoming: impl IntoIterator<Item = &'a str>,
) -> Result<(), DomainError> {
    let mut seen: HashSet<&str> = existing.into_iter().collect();
    for name in incoming {
        validate_unit_name(name)?;
        if !seen.insert(name) {
            return Err(DomainError::DuplicateChildName(name.to_string()));
        }
    }
    Ok(())
}
