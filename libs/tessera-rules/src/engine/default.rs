//! Single-pass rules engine
//!
//! Iterates the rule set once in natural order:
//! 1. Stop at the first rule above the priority threshold
//! 2. Skip rules vetoed by a rule listener
//! 3. Evaluate the condition, then execute the actions if it holds
//! 4. Apply the skip policies after each rule

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::{CheckResult, Listeners, RulesEngine};
use crate::error::Result;
use crate::facts::Facts;
use crate::listener::{EngineListener, RuleListener};
use crate::parameters::EngineParameters;
use crate::rules::RuleSet;

/// Default single-pass engine
#[derive(Clone, Default)]
pub struct DefaultRulesEngine {
    parameters: EngineParameters,
    listeners: Listeners,
}

impl DefaultRulesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: EngineParameters) -> Self {
        Self {
            parameters,
            listeners: Listeners::default(),
        }
    }

    pub fn register_rule_listener(&mut self, listener: Arc<dyn RuleListener>) {
        self.listeners.add_rule_listener(listener);
    }

    pub fn register_rule_listeners(
        &mut self,
        listeners: impl IntoIterator<Item = Arc<dyn RuleListener>>,
    ) {
        for listener in listeners {
            self.listeners.add_rule_listener(listener);
        }
    }

    pub fn register_engine_listener(&mut self, listener: Arc<dyn EngineListener>) {
        self.listeners.add_engine_listener(listener);
    }

    pub fn register_engine_listeners(
        &mut self,
        listeners: impl IntoIterator<Item = Arc<dyn EngineListener>>,
    ) {
        for listener in listeners {
            self.listeners.add_engine_listener(listener);
        }
    }

    /// Fire without the session-level engine listener notifications
    pub(crate) fn do_fire(&self, rules: &RuleSet, facts: &mut Facts) -> Result<()> {
        if rules.is_empty() {
            warn!("No rules registered! Nothing to apply");
            return Ok(());
        }
        let params = self.parameters;
        log_session(&params, rules, facts);
        debug!("Rules evaluation started");

        for rule in rules {
            let name = rule.name();
            let priority = rule.priority();
            if priority > params.priority_threshold {
                debug!(
                    "Rule priority threshold ({}) exceeded at rule '{}' with priority={}, next rules will be skipped",
                    params.priority_threshold, name, priority
                );
                break;
            }
            if !self.listeners.should_evaluate(&**rule, facts)? {
                debug!("Rule '{}' has been skipped before being evaluated", name);
                continue;
            }

            let triggered = match rule.evaluate(facts) {
                Ok(result) => result,
                Err(e) => {
                    error!("Rule '{}' evaluated with error: {}", name, e);
                    self.listeners.on_evaluation_error(&**rule, facts, &e)?;
                    if params.skip_on_first_non_triggered_rule {
                        debug!("Next rules will be skipped since parameter skip_on_first_non_triggered_rule is set");
                        break;
                    }
                    false
                },
            };

            if triggered {
                debug!("Rule '{}' triggered", name);
                self.listeners.after_evaluate(&**rule, facts, true)?;
                self.listeners.before_execute(&**rule, facts)?;
                match rule.execute(facts) {
                    Ok(()) => {
                        debug!("Rule '{}' performed successfully", name);
                        self.listeners.on_success(&**rule, facts)?;
                        if params.skip_on_first_applied_rule {
                            debug!("Next rules will be skipped since parameter skip_on_first_applied_rule is set");
                            break;
                        }
                    },
                    Err(e) => {
                        error!("Rule '{}' performed with error: {}", name, e);
                        self.listeners.on_failure(&**rule, facts, &e)?;
                        if params.skip_on_first_failed_rule {
                            debug!("Next rules will be skipped since parameter skip_on_first_failed_rule is set");
                            break;
                        }
                    },
                }
            } else {
                debug!("Rule '{}' has been evaluated to false, it has not been executed", name);
                self.listeners.after_evaluate(&**rule, facts, false)?;
                if params.skip_on_first_non_triggered_rule {
                    debug!("Next rules will be skipped since parameter skip_on_first_non_triggered_rule is set");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Evaluate every rule the listeners allow, without engine listener notifications
    pub(crate) fn do_check(&self, rules: &RuleSet, facts: &Facts) -> Result<CheckResult> {
        debug!("Checking rules");
        let mut result = CheckResult::new();
        for rule in rules {
            if !self.listeners.should_evaluate(&**rule, facts)? {
                continue;
            }
            let evaluation = match rule.evaluate(facts) {
                Ok(value) => value,
                Err(e) => {
                    error!("Rule '{}' evaluated with error: {}", rule.name(), e);
                    self.listeners.on_evaluation_error(&**rule, facts, &e)?;
                    false
                },
            };
            result.insert(rule.clone(), evaluation);
        }
        Ok(result)
    }
}

impl RulesEngine for DefaultRulesEngine {
    fn parameters(&self) -> EngineParameters {
        self.parameters
    }

    fn rule_listeners(&self) -> &[Arc<dyn RuleListener>] {
        self.listeners.rule()
    }

    fn engine_listeners(&self) -> &[Arc<dyn EngineListener>] {
        self.listeners.engine()
    }

    fn fire(&self, rules: &RuleSet, facts: &mut Facts) -> Result<()> {
        self.listeners.before_rules(rules, facts)?;
        self.do_fire(rules, facts)?;
        self.listeners.after_rules(rules, facts)
    }

    fn check(&self, rules: &RuleSet, facts: &Facts) -> Result<CheckResult> {
        self.listeners.before_rules(rules, facts)?;
        let result = self.do_check(rules, facts)?;
        self.listeners.after_rules(rules, facts)?;
        Ok(result)
    }
}

fn log_session(params: &EngineParameters, rules: &RuleSet, facts: &Facts) {
    debug!("{}", params);
    debug!("Registered rules:");
    for rule in rules {
        debug!(
            "Rule {{ name = '{}', description = '{}', priority = '{}' }}",
            rule.name(),
            rule.description(),
            rule.priority()
        );
    }
    debug!("Known facts: {}", facts);
}
