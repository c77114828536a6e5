//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tessera_rules::{EngineListener, Facts, Result, Rule, RuleError, RuleListener, RuleSet};

/// Ordered record of what happened during a session
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Rule with a constant condition that journals evaluations and executions
pub struct TrackedRule {
    name: String,
    priority: i32,
    condition: bool,
    fail: bool,
    journal: Journal,
}

impl TrackedRule {
    pub fn new(name: &str, priority: i32, condition: bool, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            priority,
            condition,
            fail: false,
            journal: journal.clone(),
        }
    }

    /// Same rule, but its action fails
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Rule for TrackedRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn evaluate(&self, _facts: &Facts) -> Result<bool> {
        self.journal.push(format!("eval:{}", self.name));
        Ok(self.condition)
    }

    fn execute(&self, _facts: &mut Facts) -> Result<()> {
        self.journal.push(format!("exec:{}", self.name));
        if self.fail {
            return Err(RuleError::execution(format!("{} failed", self.name)));
        }
        Ok(())
    }
}

/// Engine listener counting session notifications
#[derive(Default)]
pub struct SessionCounter {
    pub before: AtomicUsize,
    pub after: AtomicUsize,
}

impl SessionCounter {
    pub fn before(&self) -> usize {
        self.before.load(Ordering::SeqCst)
    }

    pub fn after(&self) -> usize {
        self.after.load(Ordering::SeqCst)
    }
}

impl EngineListener for SessionCounter {
    fn before_evaluate(&self, _rules: &RuleSet, _facts: &Facts) -> Result<()> {
        self.before.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn after_execute(&self, _rules: &RuleSet, _facts: &Facts) -> Result<()> {
        self.after.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Rule listener vetoing the evaluation of one rule by name
pub struct Veto(pub &'static str);

impl RuleListener for Veto {
    fn before_evaluate(&self, rule: &dyn Rule, _facts: &Facts) -> Result<bool> {
        Ok(rule.name() != self.0)
    }
}
