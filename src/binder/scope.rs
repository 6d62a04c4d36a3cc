use std::collections::HashMap;

use crate::ast::{Literal, Location};

/// Variables assigned so far, in source order.
///
/// Binding walks statements top to bottom, so a name is visible only after
/// the assignment that introduces it. Reassignment replaces the entry.
#[derive(Debug, Clone, Default)]
pub struct BindScope {
    variables: HashMap<String, ScopeEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeEntry {
    pub value: Literal,
    pub location: Location,
}

impl BindScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, name: &str, value: Literal, location: Location) {
        self.variables
            .insert(name.to_string(), ScopeEntry { value, location });
    }

    pub fn get(&self, name: &str) -> Option<&ScopeEntry> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut scope = BindScope::new();
        assert!(!scope.contains("limit"));

        scope.assign("limit", Literal::Integer(1), Location::default());
        scope.assign("limit", Literal::Integer(2), Location::default());

        assert_eq!(scope.len(), 1);
        assert_eq!(scope.get("limit").unwrap().value, Literal::Integer(2));
    }
}
