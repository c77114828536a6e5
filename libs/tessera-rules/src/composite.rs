//! Composite rules
//!
//! A [`CompositeRule`] is a [`Rule`] built from an ordered list of composing
//! rules. The [`CompositeKind`] decides how the group behaves:
//!
//! | Kind          | Condition                         | Action                                        |
//! |---------------|-----------------------------------|-----------------------------------------------|
//! | `Unit`        | all composing conditions hold     | every composing action, natural order         |
//! | `Conditional` | first registered rule (the gate)  | remaining actions, registration order         |
//! | `Activation`  | any composing condition holds     | only the best-priority triggered rule         |
//!
//! `evaluate` records which composing rules were selected and `execute` acts
//! on that record, so composing conditions run once per firing. A group
//! executed without a preceding `evaluate` resolves itself at that point.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RuleError};
use crate::facts::Facts;
use crate::rule::{Rule, RuleRef, DEFAULT_DESCRIPTION};

/// Combination policy of a composite rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositeKind {
    /// All-or-nothing group
    #[serde(rename = "UnitRuleGroup", alias = "unit")]
    Unit,
    /// Gate rule followed by unconditional consequents
    #[serde(rename = "ConditionalRuleGroup", alias = "conditional")]
    Conditional,
    /// First match wins
    #[serde(rename = "ActivationRuleGroup", alias = "activation")]
    Activation,
}

impl CompositeKind {
    /// Minimum number of composing rules for this kind
    pub fn min_rules(self) -> usize {
        match self {
            CompositeKind::Unit | CompositeKind::Activation => 1,
            CompositeKind::Conditional => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompositeKind::Unit => "UnitRuleGroup",
            CompositeKind::Conditional => "ConditionalRuleGroup",
            CompositeKind::Activation => "ActivationRuleGroup",
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompositeKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "UnitRuleGroup" | "unit" => Ok(CompositeKind::Unit),
            "ConditionalRuleGroup" | "conditional" => Ok(CompositeKind::Conditional),
            "ActivationRuleGroup" | "activation" => Ok(CompositeKind::Activation),
            other => Err(RuleError::invalid_definition(format!(
                "Unknown composite rule type: {}",
                other
            ))),
        }
    }
}

/// What a group resolves to against a given set of facts
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    /// Group condition does not hold
    Inactive,
    /// Execute these composing rules, in this order
    Execute(Vec<usize>),
}

/// Rule composed from child rules
pub struct CompositeRule {
    name: String,
    description: String,
    priority: i32,
    kind: CompositeKind,
    /// Registration order
    rules: Vec<RuleRef>,
    /// Indices into `rules`, sorted by natural order
    natural: Vec<usize>,
    /// Outcome of the last `evaluate`, consumed by `execute`
    resolved: Mutex<Option<Resolution>>,
}

impl CompositeRule {
    pub fn builder(kind: CompositeKind, name: impl Into<String>) -> CompositeRuleBuilder {
        CompositeRuleBuilder {
            kind,
            name: name.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
            priority: None,
            rules: Vec::new(),
        }
    }

    pub fn unit(name: impl Into<String>, rules: Vec<RuleRef>) -> Result<Self> {
        Self::builder(CompositeKind::Unit, name).rules(rules).build()
    }

    pub fn conditional(name: impl Into<String>, rules: Vec<RuleRef>) -> Result<Self> {
        Self::builder(CompositeKind::Conditional, name)
            .rules(rules)
            .build()
    }

    pub fn activation(name: impl Into<String>, rules: Vec<RuleRef>) -> Result<Self> {
        Self::builder(CompositeKind::Activation, name)
            .rules(rules)
            .build()
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    /// Composing rules in registration order
    pub fn rules(&self) -> &[RuleRef] {
        &self.rules
    }

    fn resolve(&self, facts: &Facts) -> Result<Resolution> {
        match self.kind {
            CompositeKind::Unit => {
                for &i in &self.natural {
                    if !self.rules[i].evaluate(facts)? {
                        return Ok(Resolution::Inactive);
                    }
                }
                Ok(Resolution::Execute(self.natural.clone()))
            },
            CompositeKind::Conditional => {
                if self.rules[0].evaluate(facts)? {
                    Ok(Resolution::Execute((1..self.rules.len()).collect()))
                } else {
                    Ok(Resolution::Inactive)
                }
            },
            CompositeKind::Activation => {
                // Natural order puts the best priority first, ties by name
                for &i in &self.natural {
                    if self.rules[i].evaluate(facts)? {
                        return Ok(Resolution::Execute(vec![i]));
                    }
                }
                Ok(Resolution::Inactive)
            },
        }
    }
}

impl Rule for CompositeRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn evaluate(&self, facts: &Facts) -> Result<bool> {
        // A failed evaluation must not leave an older selection behind
        *self.resolved.lock() = None;
        let resolution = self.resolve(facts)?;
        let triggered = matches!(resolution, Resolution::Execute(_));
        *self.resolved.lock() = Some(resolution);
        Ok(triggered)
    }

    fn execute(&self, facts: &mut Facts) -> Result<()> {
        let recorded = self.resolved.lock().take();
        let resolution = match recorded {
            Some(resolution) => resolution,
            None => self.resolve(facts)?,
        };
        let Resolution::Execute(selected) = resolution else {
            debug!(
                "{} '{}' condition does not hold, nothing executed",
                self.kind, self.name
            );
            return Ok(());
        };
        for i in selected {
            self.rules[i].execute(facts)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompositeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeRule")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("priority", &self.priority)
            .field("kind", &self.kind)
            .field("rules", &self.rules)
            .finish()
    }
}

/// Builder for [`CompositeRule`]; construction errors surface from `build`
pub struct CompositeRuleBuilder {
    kind: CompositeKind,
    name: String,
    description: String,
    priority: Option<i32>,
    rules: Vec<RuleRef>,
}

impl CompositeRuleBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Explicit priority; defaults to the best composing-rule priority
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(RuleRef::new(rule));
        self
    }

    pub fn shared_rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(RuleRef::from(rule));
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleRef>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> Result<CompositeRule> {
        if self.rules.is_empty() {
            return Err(RuleError::invalid_argument("composing rules required"));
        }
        if self.rules.len() < self.kind.min_rules() {
            return Err(RuleError::invalid_argument(format!(
                "{} '{}' requires at least {} composing rules, got {}",
                self.kind,
                self.name,
                self.kind.min_rules(),
                self.rules.len()
            )));
        }

        let priority = match self.priority {
            Some(p) => p,
            None => self
                .rules
                .iter()
                .map(|r| r.priority())
                .min()
                .ok_or_else(|| RuleError::invalid_argument("composing rules required"))?,
        };

        let mut natural: Vec<usize> = (0..self.rules.len()).collect();
        natural.sort_by(|&a, &b| self.rules[a].cmp(&self.rules[b]));

        Ok(CompositeRule {
            name: self.name,
            description: self.description,
            priority,
            kind: self.kind,
            rules: self.rules,
            natural,
            resolved: Mutex::new(None),
        })
    }
}
