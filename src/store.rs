use indexmap::IndexMap;

use crate::value::Value;

/// Process-wide variables of one program run.
///
/// Entries are created or overwritten by assignment, `/input` and `/random`
/// and are never removed. Reads of unknown names go through [`lookup`],
/// which yields `Int(0)` without materializing the name.
///
/// [`lookup`]: VariableStore::lookup
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    bindings: IndexMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Defined-or-zero read used by expression evaluation.
    pub fn lookup(&self, name: &str) -> Value {
        self.bindings.get(name).cloned().unwrap_or(Value::Int(0))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in the order they were first assigned.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for VariableStore {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (name, value) in iter {
            store.assign(name, value);
        }
        store
    }
}

/// Non-empty ASCII alphanumeric/underscore text not starting with a digit.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}
