//! Rule engines
//!
//! - [`DefaultRulesEngine`]: single pass over the rules in natural order
//! - [`InferenceRulesEngine`]: forward chaining until no rule is triggered

mod default;
mod inference;

pub use default::DefaultRulesEngine;
pub use inference::InferenceRulesEngine;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, RuleError};
use crate::facts::Facts;
use crate::listener::{EngineListener, RuleListener};
use crate::parameters::EngineParameters;
use crate::rule::{Rule, RuleRef};
use crate::rules::RuleSet;

/// Evaluation results returned by [`RulesEngine::check`]
pub type CheckResult = BTreeMap<RuleRef, bool>;

/// Common contract of the firing strategies
pub trait RulesEngine {
    /// Copy of the parameters used by every session of this engine
    fn parameters(&self) -> EngineParameters;

    fn rule_listeners(&self) -> &[Arc<dyn RuleListener>];

    fn engine_listeners(&self) -> &[Arc<dyn EngineListener>];

    /// Fire the rules against the facts
    ///
    /// Rule failures are reported to listeners; only listener errors are
    /// returned.
    fn fire(&self, rules: &RuleSet, facts: &mut Facts) -> Result<()>;

    /// Evaluate the rules without executing them
    fn check(&self, rules: &RuleSet, facts: &Facts) -> Result<CheckResult>;
}

// ============================================================================
// Listener fan-out shared by both engines
// ============================================================================

#[derive(Clone, Default)]
pub(crate) struct Listeners {
    rule: Vec<Arc<dyn RuleListener>>,
    engine: Vec<Arc<dyn EngineListener>>,
}

impl Listeners {
    pub(crate) fn rule(&self) -> &[Arc<dyn RuleListener>] {
        &self.rule
    }

    pub(crate) fn engine(&self) -> &[Arc<dyn EngineListener>] {
        &self.engine
    }

    pub(crate) fn add_rule_listener(&mut self, listener: Arc<dyn RuleListener>) {
        self.rule.push(listener);
    }

    pub(crate) fn add_engine_listener(&mut self, listener: Arc<dyn EngineListener>) {
        self.engine.push(listener);
    }

    pub(crate) fn before_rules(&self, rules: &RuleSet, facts: &Facts) -> Result<()> {
        self.engine
            .iter()
            .try_for_each(|l| l.before_evaluate(rules, facts))
    }

    pub(crate) fn after_rules(&self, rules: &RuleSet, facts: &Facts) -> Result<()> {
        self.engine
            .iter()
            .try_for_each(|l| l.after_execute(rules, facts))
    }

    /// `false` as soon as one listener vetoes the evaluation
    pub(crate) fn should_evaluate(&self, rule: &dyn Rule, facts: &Facts) -> Result<bool> {
        for listener in &self.rule {
            if !listener.before_evaluate(rule, facts)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn after_evaluate(&self, rule: &dyn Rule, facts: &Facts, result: bool) -> Result<()> {
        self.rule
            .iter()
            .try_for_each(|l| l.after_evaluate(rule, facts, result))
    }

    pub(crate) fn on_evaluation_error(
        &self,
        rule: &dyn Rule,
        facts: &Facts,
        error: &RuleError,
    ) -> Result<()> {
        self.rule
            .iter()
            .try_for_each(|l| l.on_evaluation_error(rule, facts, error))
    }

    pub(crate) fn before_execute(&self, rule: &dyn Rule, facts: &Facts) -> Result<()> {
        self.rule
            .iter()
            .try_for_each(|l| l.before_execute(rule, facts))
    }

    pub(crate) fn on_success(&self, rule: &dyn Rule, facts: &Facts) -> Result<()> {
        self.rule.iter().try_for_each(|l| l.on_success(rule, facts))
    }

    pub(crate) fn on_failure(&self, rule: &dyn Rule, facts: &Facts, error: &RuleError) -> Result<()> {
        self.rule
            .iter()
            .try_for_each(|l| l.on_failure(rule, facts, error))
    }
}
