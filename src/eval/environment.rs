use std::collections::{BTreeMap, HashMap};

use super::value::Value;

/// Variables assigned during one program run.
///
/// Created fresh per run and written only by assignments, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableEnvironment {
    variables: HashMap<String, Value>,
}

impl VariableEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins.
    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Name-ordered copy handed to action dispatch.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.variables
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut env = VariableEnvironment::new();
        env.assign("service", "SendGrid");
        env.assign("service", "Twilio");
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("service"), Some(&Value::from("Twilio")));
    }

    #[test]
    fn test_snapshot_is_ordered() {
        let mut env = VariableEnvironment::new();
        env.assign("b", 2i64);
        env.assign("a", true);
        let keys: Vec<_> = env.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
