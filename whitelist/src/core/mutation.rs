//! Add/remove rules for the whitelist.
//!
//! Pure functions: given a document they return the next document and a
//! disposition. Callers persist only when [`Mutation::changed`] is true.

use crate::core::command::Action;
use crate::core::document::Whitelist;
use crate::core::types::Disposition;

/// Result of applying an action to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Document after the action. Equal to the input when nothing changed.
    pub document: Whitelist,
    pub disposition: Disposition,
}

impl Mutation {
    /// True when the document differs from the input and must be stored.
    pub fn changed(&self) -> bool {
        matches!(
            self.disposition,
            Disposition::Added | Disposition::Removed
        )
    }
}

/// Apply `action` for `id`. Matching is exact string equality.
pub fn apply(doc: &Whitelist, action: Action, id: &str) -> Mutation {
    match action {
        Action::Add => add(doc, id),
        Action::Remove => remove(doc, id),
    }
}

/// Append `id` unless it is already listed.
pub fn add(doc: &Whitelist, id: &str) -> Mutation {
    if doc.contains(id) {
        return unchanged(doc, Disposition::AlreadyPresent);
    }
    let mut next = doc.clone();
    next.exclusive_join.push(id.to_string());
    Mutation {
        document: next,
        disposition: Disposition::Added,
    }
}

/// Drop the first entry equal to `id`, keeping the order of the rest.
pub fn remove(doc: &Whitelist, id: &str) -> Mutation {
    let Some(index) = doc.exclusive_join.iter().position(|entry| entry == id) else {
        return unchanged(doc, Disposition::NotPresent);
    };
    let mut next = doc.clone();
    next.exclusive_join.remove(index);
    Mutation {
        document: next,
        disposition: Disposition::Removed,
    }
}

fn unchanged(doc: &Whitelist, disposition: Disposition) -> Mutation {
    Mutation {
        document: doc.clone(),
        disposition,
    }
}
