//! Ordered, duplicate-free rule collection

use std::collections::btree_set::{self, BTreeSet};
use std::sync::Arc;

use crate::rule::{Rule, RuleRef};

/// Rules kept in natural order (priority, then name)
///
/// Registering a rule equal to one already present is a no-op.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeSet<RuleRef>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, returning `false` if an equal rule is already present
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> bool {
        self.rules.insert(RuleRef::new(rule))
    }

    /// Register a shared rule handle
    pub fn register_shared(&mut self, rule: Arc<dyn Rule>) -> bool {
        self.rules.insert(RuleRef::from(rule))
    }

    pub fn register_ref(&mut self, rule: RuleRef) -> bool {
        self.rules.insert(rule)
    }

    /// Remove the rule equal to `rule`, if any
    pub fn unregister(&mut self, rule: &dyn Rule) -> bool {
        let found = self
            .rules
            .iter()
            .find(|r| {
                r.priority() == rule.priority()
                    && r.name() == rule.name()
                    && r.description() == rule.description()
            })
            .cloned();
        match found {
            Some(r) => self.rules.remove(&r),
            None => false,
        }
    }

    /// Remove every rule with the given name, returning how many were removed
    pub fn unregister_by_name(&mut self, name: &str) -> usize {
        let before = self.rules.len();
        self.rules.retain(|r| r.name() != name);
        before - self.rules.len()
    }

    pub fn get(&self, name: &str) -> Option<&RuleRef> {
        self.rules.iter().find(|r| r.name() == name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate in natural order
    pub fn iter(&self) -> btree_set::Iter<'_, RuleRef> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleRef;
    type IntoIter = btree_set::Iter<'a, RuleRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<RuleRef> for RuleSet {
    fn from_iter<I: IntoIterator<Item = RuleRef>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl Extend<RuleRef> for RuleSet {
    fn extend<I: IntoIterator<Item = RuleRef>>(&mut self, iter: I) {
        self.rules.extend(iter);
    }
}
