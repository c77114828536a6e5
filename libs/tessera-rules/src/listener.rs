//! Listener hooks invoked synchronously by the engines
//!
//! Every hook returns a `Result`. The engines do not catch listener errors:
//! an `Err` aborts the session and is returned from `fire`/`check`.

use crate::error::{Result, RuleError};
use crate::facts::Facts;
use crate::rule::Rule;
use crate::rules::RuleSet;

/// Per-rule hooks
#[allow(unused_variables)]
pub trait RuleListener: Send + Sync {
    /// Called before evaluating a rule; returning `false` skips the rule
    fn before_evaluate(&self, rule: &dyn Rule, facts: &Facts) -> Result<bool> {
        Ok(true)
    }

    fn after_evaluate(&self, rule: &dyn Rule, facts: &Facts, evaluation_result: bool) -> Result<()> {
        Ok(())
    }

    /// Called when the rule's condition failed to evaluate
    fn on_evaluation_error(&self, rule: &dyn Rule, facts: &Facts, error: &RuleError) -> Result<()> {
        Ok(())
    }

    fn before_execute(&self, rule: &dyn Rule, facts: &Facts) -> Result<()> {
        Ok(())
    }

    fn on_success(&self, rule: &dyn Rule, facts: &Facts) -> Result<()> {
        Ok(())
    }

    fn on_failure(&self, rule: &dyn Rule, facts: &Facts, error: &RuleError) -> Result<()> {
        Ok(())
    }
}

/// Per-session hooks, called exactly once per `fire`/`check`
#[allow(unused_variables)]
pub trait EngineListener: Send + Sync {
    fn before_evaluate(&self, rules: &RuleSet, facts: &Facts) -> Result<()> {
        Ok(())
    }

    fn after_execute(&self, rules: &RuleSet, facts: &Facts) -> Result<()> {
        Ok(())
    }
}
