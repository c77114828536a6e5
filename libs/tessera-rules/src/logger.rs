//! Rule outcome logger
//!
//! [`RuleLogger`] is a [`RuleListener`] that emits one structured tracing
//! event per rule outcome and keeps per-rule counters for later inspection.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::error::{Result, RuleError};
use crate::facts::Facts;
use crate::listener::RuleListener;
use crate::rule::Rule;

/// Outcome counters for one rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleStats {
    pub evaluated: u64,
    pub triggered: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub evaluation_errors: u64,
}

/// Listener that logs rule outcomes and counts them per rule name
#[derive(Debug, Default)]
pub struct RuleLogger {
    stats: Mutex<HashMap<String, RuleStats>>,
}

impl RuleLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for a rule, if it was seen
    pub fn stats(&self, rule_name: &str) -> Option<RuleStats> {
        self.stats.lock().get(rule_name).copied()
    }

    /// Counters for every rule seen so far
    pub fn snapshot(&self) -> HashMap<String, RuleStats> {
        self.stats.lock().clone()
    }

    pub fn reset(&self) {
        self.stats.lock().clear();
    }

    fn record(&self, rule: &dyn Rule, update: impl FnOnce(&mut RuleStats)) {
        let mut stats = self.stats.lock();
        update(stats.entry(rule.name().to_string()).or_default());
    }
}

impl RuleListener for RuleLogger {
    fn after_evaluate(&self, rule: &dyn Rule, _facts: &Facts, evaluation_result: bool) -> Result<()> {
        self.record(rule, |s| {
            s.evaluated += 1;
            if evaluation_result {
                s.triggered += 1;
            }
        });
        Ok(())
    }

    fn on_evaluation_error(&self, rule: &dyn Rule, _facts: &Facts, error: &RuleError) -> Result<()> {
        self.record(rule, |s| s.evaluation_errors += 1);
        warn!(
            rule = rule.name(),
            priority = rule.priority(),
            outcome = "evaluation_error",
            error = %error,
            "[RULE] {} evaluation error",
            rule.name()
        );
        Ok(())
    }

    fn on_success(&self, rule: &dyn Rule, _facts: &Facts) -> Result<()> {
        self.record(rule, |s| s.succeeded += 1);
        info!(
            rule = rule.name(),
            priority = rule.priority(),
            outcome = "success",
            "[RULE] {} OK",
            rule.name()
        );
        Ok(())
    }

    fn on_failure(&self, rule: &dyn Rule, _facts: &Facts, error: &RuleError) -> Result<()> {
        self.record(rule, |s| s.failed += 1);
        warn!(
            rule = rule.name(),
            priority = rule.priority(),
            outcome = "failure",
            error = %error,
            "[RULE] {} FAIL",
            rule.name()
        );
        Ok(())
    }
}
