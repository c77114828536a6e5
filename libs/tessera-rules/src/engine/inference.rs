//! Forward-chaining rules engine
//!
//! Repeats until a fixpoint is reached:
//! 1. Select every rule whose condition holds against the current facts
//! 2. Stop when nothing is selected
//! 3. Fire the selection with single-pass semantics
//!
//! There is no cycle cap. Termination relies on the rules' actions eventually
//! making every condition false. Rules above the priority threshold are never
//! candidates, so they cannot keep the loop alive.

use std::sync::Arc;

use tracing::debug;

use super::{CheckResult, DefaultRulesEngine, Listeners, RulesEngine};
use crate::error::Result;
use crate::facts::Facts;
use crate::listener::{EngineListener, RuleListener};
use crate::parameters::EngineParameters;
use crate::rules::RuleSet;

/// Inference engine delegating each cycle to a [`DefaultRulesEngine`]
///
/// Rule listeners are shared with the delegate and see every cycle; engine
/// listeners are notified once for the whole inference session.
#[derive(Clone, Default)]
pub struct InferenceRulesEngine {
    parameters: EngineParameters,
    listeners: Listeners,
    delegate: DefaultRulesEngine,
}

impl InferenceRulesEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: EngineParameters) -> Self {
        Self {
            parameters,
            listeners: Listeners::default(),
            delegate: DefaultRulesEngine::with_parameters(parameters),
        }
    }

    pub fn register_rule_listener(&mut self, listener: Arc<dyn RuleListener>) {
        self.listeners.add_rule_listener(listener.clone());
        self.delegate.register_rule_listener(listener);
    }

    pub fn register_rule_listeners(
        &mut self,
        listeners: impl IntoIterator<Item = Arc<dyn RuleListener>>,
    ) {
        for listener in listeners {
            self.register_rule_listener(listener);
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

    /// Rules within the priority threshold whose condition currently holds;
    /// evaluation errors count as false
    fn select_candidates(&self, rules: &RuleSet, facts: &Facts) -> RuleSet {
        let threshold = self.parameters.priority_threshold;
        rules
            .iter()
            .take_while(|rule| rule.priority() <= threshold)
            .filter(|rule| match rule.evaluate(facts) {
                Ok(triggered) => triggered,
                Err(e) => {
                    debug!(
                        "Rule '{}' not selected, condition evaluated with error: {}",
                        rule.name(),
                        e
                    );
                    false
                },
            })
            .cloned()
            .collect()
    }
}

impl RulesEngine for InferenceRulesEngine {
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
        let mut cycle: u64 = 0;
        loop {
            let candidates = self.select_candidates(rules, facts);
            if candidates.is_empty() {
                debug!("No candidate rules found for facts: {}", facts);
                break;
            }
            cycle += 1;
            debug!(
                "Inference cycle {}: firing {} candidate rule(s)",
                cycle,
                candidates.len()
            );
            self.delegate.do_fire(&candidates, facts)?;
        }
        debug!("Fixpoint reached after {} cycle(s)", cycle);
        self.listeners.after_rules(rules, facts)
    }

    fn check(&self, rules: &RuleSet, facts: &Facts) -> Result<CheckResult> {
        self.listeners.before_rules(rules, facts)?;
        let result = self.delegate.do_check(rules, facts)?;
        self.listeners.after_rules(rules, facts)?;
        Ok(result)
    }
}
