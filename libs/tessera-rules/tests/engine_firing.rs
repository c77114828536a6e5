//! Integration tests for single-pass firing
//!
//! Covers rule set ordering, skip policies, the priority threshold, listener
//! hooks and `check`.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{Journal, SessionCounter, TrackedRule, Veto};
use tessera_rules::{
    BasicRule, DefaultRulesEngine, EngineParameters, Facts, Result, Rule, RuleBuilder, RuleError,
    RuleListener, RuleSet, RulesEngine,
};

fn journal_rules(journal: &Journal, rules: &[(&str, i32, bool)]) -> RuleSet {
    let mut set = RuleSet::new();
    for &(name, priority, condition) in rules {
        set.register(TrackedRule::new(name, priority, condition, journal));
    }
    set
}

// ============================================================================
// Rule set
// ============================================================================

#[test]
fn test_rule_set_natural_order() {
    let mut rules = RuleSet::new();
    rules.register(BasicRule::new("c").with_priority(2));
    rules.register(BasicRule::new("b").with_priority(1));
    rules.register(BasicRule::new("a").with_priority(2));
    rules.register(BasicRule::new("z").with_priority(-5));
    rules.register(BasicRule::new("default"));

    let order: Vec<(i32, String)> = rules
        .iter()
        .map(|r| (r.priority(), r.name().to_string()))
        .collect();

    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
    assert_eq!(order[0].1, "z");
    assert_eq!(order[4].1, "default");
}

#[test]
fn test_duplicate_registration_keeps_size() {
    let mut rules = RuleSet::new();
    assert!(rules.register(BasicRule::new("rule").with_priority(1)));
    assert!(!rules.register(BasicRule::new("rule").with_priority(1)));
    assert_eq!(rules.len(), 1);

    // Same name, different priority is a different rule
    assert!(rules.register(BasicRule::new("rule").with_priority(2)));
    assert_eq!(rules.len(), 2);
}

// ============================================================================
// Firing order and listeners
// ============================================================================

#[test]
fn test_empty_rule_set_notifies_engine_listeners_once() {
    let counter = Arc::new(SessionCounter::default());
    let mut engine = DefaultRulesEngine::new();
    engine.register_engine_listener(counter.clone());

    engine.fire(&RuleSet::new(), &mut Facts::new()).unwrap();

    assert_eq!(counter.before(), 1);
    assert_eq!(counter.after(), 1);
}

#[test]
fn test_rules_fire_in_priority_order() {
    let journal = Journal::new();
    let rules = journal_rules(&journal, &[("R2", 2, true), ("R1", 1, true)]);

    DefaultRulesEngine::new()
        .fire(&rules, &mut Facts::new())
        .unwrap();

    assert_eq!(
        journal.entries(),
        vec!["eval:R1", "exec:R1", "eval:R2", "exec:R2"]
    );
}

#[test]
fn test_threshold_applies_after_veto() {
    let journal = Journal::new();
    let rules = journal_rules(&journal, &[("vetoed", 1, true), ("late", 2, true)]);

    let mut engine =
        DefaultRulesEngine::with_parameters(EngineParameters::new().priority_threshold(1));
    engine.register_rule_listener(Arc::new(Veto("vetoed")));
    engine.fire(&rules, &mut Facts::new()).unwrap();

    assert!(journal.entries().is_empty());
}

#[test]
fn test_veto_skips_only_the_vetoed_rule() {
    let journal = Journal::new();
    let rules = journal_rules(&journal, &[("a", 1, true), ("b", 2, true)]);

    let mut engine = DefaultRulesEngine::new();
    engine.register_rule_listener(Arc::new(Veto("a")));
    engine.fire(&rules, &mut Facts::new()).unwrap();

    assert_eq!(journal.entries(), vec!["eval:b", "exec:b"]);
}

// ============================================================================
// Skip policies
// ============================================================================

#[test]
fn test_skip_on_first_applied_rule() {
    let journal = Journal::new();
    let rules = journal_rules(&journal, &[("a", 1, false), ("b", 2, true), ("c", 3, true)]);

    DefaultRulesEngine::with_parameters(EngineParameters::new().skip_on_first_applied_rule(true))
        .fire(&rules, &mut Facts::new())
        .unwrap();

    assert_eq!(journal.entries(), vec!["eval:a", "eval:b", "exec:b"]);
}

#[test]
fn test_skip_on_first_applied_rule_ignores_failures() {
    let journal = Journal::new();
    let mut rules = RuleSet::new();
    rules.register(TrackedRule::new("a", 1, true, &journal).failing());
    rules.register(TrackedRule::new("b", 2, true, &journal));
    rules.register(TrackedRule::new("c", 3, true, &journal));

    DefaultRulesEngine::with_parameters(EngineParameters::new().skip_on_first_applied_rule(true))
        .fire(&rules, &mut Facts::new())
        .unwrap();

    assert_eq!(
        journal.entries(),
        vec!["eval:a", "exec:a", "eval:b", "exec:b"]
    );
}

#[test]
fn test_skip_on_first_failed_rule() {
    let journal = Journal::new();
    let mut rules = RuleSet::new();
    rules.register(TrackedRule::new("a", 1, true, &journal).failing());
    rules.register(TrackedRule::new("b", 2, true, &journal));

    DefaultRulesEngine::with_parameters(EngineParameters::new().skip_on_first_failed_rule(true))
        .fire(&rules, &mut Facts::new())
        .unwrap();

    assert_eq!(journal.entries(), vec!["eval:a", "exec:a"]);
}

#[test]
fn test_skip_on_first_non_triggered_rule() {
    let journal = Journal::new();
    let rules = journal_rules(&journal, &[("a", 1, true), ("b", 2, false), ("c", 3, true)]);

    DefaultRulesEngine::with_parameters(
        EngineParameters::new().skip_on_first_non_triggered_rule(true),
    )
    .fire(&rules, &mut Facts::new())
    .unwrap();

    assert_eq!(journal.entries(), vec!["eval:a", "exec:a", "eval:b"]);
}

#[test]
fn test_evaluation_error_counts_as_non_triggered() {
    let executed = Arc::new(AtomicUsize::new(0));
    let counter = executed.clone();

    let mut rules = RuleSet::new();
    rules.register(
        RuleBuilder::new()
            .name("broken")
            .priority(1)
            .when(|facts| facts.require::<bool>("missing"))
            .build(),
    );
    rules.register(
        RuleBuilder::new()
            .name("next")
            .priority(2)
            .when(|_| Ok(true))
            .then(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build(),
    );

    // Without the flag the session goes on
    DefaultRulesEngine::new()
        .fire(&rules, &mut Facts::new())
        .unwrap();
    assert_eq!(executed.load(Ordering::SeqCst), 1);

    // With the flag the evaluation error stops it
    DefaultRulesEngine::with_parameters(
        EngineParameters::new().skip_on_first_non_triggered_rule(true),
    )
    .fire(&rules, &mut Facts::new())
    .unwrap();
    assert_eq!(executed.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Listener hooks
// ============================================================================

#[derive(Default)]
struct HookRecorder {
    journal: Journal,
}

impl RuleListener for HookRecorder {
    fn before_evaluate(&self, rule: &dyn Rule, _facts: &Facts) -> Result<bool> {
        self.journal.push(format!("before_evaluate:{}", rule.name()));
        Ok(true)
    }

    fn after_evaluate(&self, rule: &dyn Rule, _facts: &Facts, evaluation_result: bool) -> Result<()> {
        self.journal
            .push(format!("after_evaluate:{}:{}", rule.name(), evaluation_result));
        Ok(())
    }

    fn on_evaluation_error(&self, rule: &dyn Rule, _facts: &Facts, _error: &RuleError) -> Result<()> {
        self.journal.push(format!("on_evaluation_error:{}", rule.name()));
        Ok(())
    }

    fn before_execute(&self, rule: &dyn Rule, _facts: &Facts) -> Result<()> {
        self.journal.push(format!("before_execute:{}", rule.name()));
        Ok(())
    }

    fn on_success(&self, rule: &dyn Rule, _facts: &Facts) -> Result<()> {
        self.journal.push(format!("on_success:{}", rule.name()));
        Ok(())
    }

    fn on_failure(&self, rule: &dyn Rule, _facts: &Facts, error: &RuleError) -> Result<()> {
        self.journal
            .push(format!("on_failure:{}:{}", rule.name(), error));
        Ok(())
    }
}

#[test]
fn test_rule_listener_hook_sequence() {
    let journal = Journal::new();
    let mut rules = RuleSet::new();
    rules.register(TrackedRule::new("ok", 1, true, &journal));
    rules.register(TrackedRule::new("ko", 2, true, &journal).failing());
    rules.register(TrackedRule::new("idle", 3, false, &journal));
    rules.register(
        RuleBuilder::new()
            .name("broken")
            .priority(4)
            .when(|facts| facts.require::<bool>("missing"))
            .build(),
    );

    let recorder = Arc::new(HookRecorder::default());
    let mut engine = DefaultRulesEngine::new();
    engine.register_rule_listener(recorder.clone());
    engine.fire(&rules, &mut Facts::new()).unwrap();

    let hooks = recorder.journal.entries();
    assert_eq!(
        hooks,
        vec![
            "before_evaluate:ok",
            "after_evaluate:ok:true",
            "before_execute:ok",
            "on_success:ok",
            "before_evaluate:ko",
            "after_evaluate:ko:true",
            "before_execute:ko",
            "on_failure:ko:Action execution error: ko failed",
            "before_evaluate:idle",
            "after_evaluate:idle:false",
            "before_evaluate:broken",
            "on_evaluation_error:broken",
            "after_evaluate:broken:false",
        ]
    );
}

struct FailingListener;

impl RuleListener for FailingListener {
    fn on_success(&self, _rule: &dyn Rule, _facts: &Facts) -> Result<()> {
        Err(RuleError::listener("audit sink unavailable"))
    }
}

#[test]
fn test_listener_error_aborts_session() {
    let journal = Journal::new();
    let rules = journal_rules(&journal, &[("first", 1, true), ("second", 2, true)]);
    let counter = Arc::new(SessionCounter::default());

    let mut engine = DefaultRulesEngine::new();
    engine.register_rule_listener(Arc::new(FailingListener));
    engine.register_engine_listener(counter.clone());

    let err = engine.fire(&rules, &mut Facts::new()).unwrap_err();

    assert!(matches!(err, RuleError::Listener(_)));
    assert_eq!(journal.entries(), vec!["eval:first", "exec:first"]);
    assert_eq!(counter.before(), 1);
    assert_eq!(counter.after(), 0);
}

#[test]
fn test_listeners_are_exposed_in_registration_order() {
    let first: Arc<dyn RuleListener> = Arc::new(Veto("x"));
    let second: Arc<dyn RuleListener> = Arc::new(FailingListener);

    let mut engine = DefaultRulesEngine::new();
    engine.register_rule_listeners(vec![first.clone(), second.clone()]);

    let listeners = engine.rule_listeners();
    assert_eq!(listeners.len(), 2);
    assert!(Arc::ptr_eq(&listeners[0], &first));
    assert!(Arc::ptr_eq(&listeners[1], &second));
    assert!(engine.engine_listeners().is_empty());
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_check_evaluates_without_executing() {
    let journal = Journal::new();
    let rules = journal_rules(&journal, &[("a", 1, true), ("b", 2, true)]);
    let counter = Arc::new(SessionCounter::default());

    let mut engine = DefaultRulesEngine::new();
    engine.register_engine_listener(counter.clone());
    let result = engine.check(&rules, &Facts::new()).unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.values().all(|&v| v));
    assert_eq!(journal.entries(), vec!["eval:a", "eval:b"]);
    assert_eq!((counter.before(), counter.after()), (1, 1));
}

#[test]
fn test_check_applies_veto_and_records_errors_as_false() {
    let journal = Journal::new();
    let mut rules = journal_rules(&journal, &[("vetoed", 1, true)]);
    rules.register(
        RuleBuilder::new()
            .name("broken")
            .priority(2)
            .when(|facts| facts.require::<bool>("missing"))
            .build(),
    );

    let mut engine = DefaultRulesEngine::new();
    engine.register_rule_listener(Arc::new(Veto("vetoed")));
    let result = engine.check(&rules, &Facts::new()).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.get(rules.get("broken").unwrap()), Some(&false));
    assert!(journal.entries().is_empty());
}
