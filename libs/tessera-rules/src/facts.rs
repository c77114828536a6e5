//! Fact store shared by conditions, actions and the engines
//!
//! Facts are named `serde_json::Value`s. A lookup distinguishes an absent fact
//! (`None`) from a fact that is present with a null or zero value.

use std::collections::hash_map::{self, HashMap};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, RuleError};

/// Mutable named value store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts {
    facts: HashMap<String, Value>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a fact, returning the previous value if any
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.facts.insert(name.into(), value.into())
    }

    /// Add or replace a fact from any serializable value
    pub fn put_serialized<T: Serialize>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Option<Value>> {
        let value = serde_json::to_value(value)?;
        Ok(self.facts.insert(name.into(), value))
    }

    /// Remove a fact by name
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.facts.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.facts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    /// Typed lookup: `Ok(None)` when absent, `Err(FactType)` when the value
    /// cannot be read as `T`
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.facts.get(name) {
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| RuleError::fact_type(name, e.to_string())),
            None => Ok(None),
        }
    }

    /// Typed lookup of a fact that must be present
    pub fn require<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.get_as(name)?
            .ok_or_else(|| RuleError::missing_fact(name))
    }

    /// Full mapping view
    pub fn as_map(&self) -> &HashMap<String, Value> {
        &self.facts
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.facts.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }
}

impl<'a> IntoIterator for &'a Facts {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            facts: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Facts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sorted so log lines are stable between runs
        let mut names: Vec<&String> = self.facts.keys().collect();
        names.sort();
        write!(f, "[")?;
        for (i, name) in names.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, self.facts[name])?;
        }
        write!(f, "]")
    }
}
