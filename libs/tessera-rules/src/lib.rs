//! Tessera Rules - Production Rule Engine Library
//!
//! Rules are condition/action pairs fired against a bag of named facts:
//! - Rule sets ordered by priority, then name
//! - Single-pass firing with skip policies and a priority threshold
//! - Forward-chaining inference until no rule is triggered
//! - Composite rules (unit, conditional and activation groups)
//! - Listener hooks around every rule and every session
//! - Declarative rule definitions bound to named conditions and actions
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │ RuleFactory  │────▶│     RuleSet      │────▶│ RulesEngine │
//! │ (definitions)│     │ (natural order)  │     │ fire/check  │
//! └──────────────┘     └──────────────────┘     └─────────────┘
//!                                                  │       │
//!                                                  ▼       ▼
//!                                         ┌──────────┐ ┌──────────┐
//!                                         │  Facts   │ │Listeners │
//!                                         └──────────┘ └──────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tessera_rules::{DefaultRulesEngine, Facts, RuleBuilder, RuleSet, RulesEngine};
//!
//! let mut rules = RuleSet::new();
//! rules.register(
//!     RuleBuilder::new()
//!         .name("weather rule")
//!         .description("if it rains then take an umbrella")
//!         .when(|facts| facts.require::<bool>("rain"))
//!         .then(|facts| {
//!             facts.put("umbrella", true);
//!             Ok(())
//!         })
//!         .build(),
//! );
//!
//! let mut facts = Facts::new();
//! facts.put("rain", true);
//!
//! DefaultRulesEngine::new().fire(&rules, &mut facts).unwrap();
//! assert!(facts.contains("umbrella"));
//! ```

mod composite;
mod condition;
mod definition;
mod engine;
mod error;
mod facts;
mod listener;
pub mod logger;
mod parameters;
mod rule;
mod rules;

// Re-export public API
pub use composite::{CompositeKind, CompositeRule, CompositeRuleBuilder};
pub use condition::{Action, Condition, Constant, FactCondition};
pub use definition::{RuleDefinition, RuleFactory};
pub use engine::{CheckResult, DefaultRulesEngine, InferenceRulesEngine, RulesEngine};
pub use error::{Result, RuleError};
pub use facts::Facts;
pub use listener::{EngineListener, RuleListener};
pub use logger::{RuleLogger, RuleStats};
pub use parameters::{EngineParameters, ENV_PREFIX};
pub use rule::{
    natural_order, BasicRule, DefaultRule, Rule, RuleBuilder, RuleRef, DEFAULT_DESCRIPTION,
    DEFAULT_NAME, DEFAULT_PRIORITY,
};
pub use rules::RuleSet;
