//! Declarative rule definitions
//!
//! A [`RuleDefinition`] is the record produced by descriptor readers (YAML,
//! JSON, databases, ...). [`RuleFactory`] turns definitions into rules by
//! resolving condition and action names against an explicit registry, which
//! is where facts get bound to code.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::composite::{CompositeKind, CompositeRule};
use crate::condition::{Action, Condition};
use crate::error::{Result, RuleError};
use crate::facts::Facts;
use crate::rule::{DefaultRule, RuleRef, DEFAULT_DESCRIPTION, DEFAULT_NAME, DEFAULT_PRIORITY};
use crate::rules::RuleSet;

// ============================================================================
// Rule definition record
// ============================================================================

/// Rule definition as read from a descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_description")]
    pub description: String,

    /// Explicit priority; composites fall back to their best composing rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Name of the registered condition (simple rules only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Names of the registered actions, in execution order (simple rules only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,

    /// `UnitRuleGroup`, `ConditionalRuleGroup` or `ActivationRuleGroup`
    #[serde(
        default,
        alias = "composite_rule_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub composite_rule_type: Option<String>,

    #[serde(default, alias = "composing_rules", skip_serializing_if = "Vec::is_empty")]
    pub composing_rules: Vec<RuleDefinition>,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

impl Default for RuleDefinition {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: default_description(),
            priority: None,
            condition: None,
            actions: Vec::new(),
            composite_rule_type: None,
            composing_rules: Vec::new(),
        }
    }
}

impl RuleDefinition {
    /// Simple rule definition
    pub fn new(name: impl Into<String>, condition: impl Into<String>, actions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            condition: Some(condition.into()),
            actions,
            ..Self::default()
        }
    }

    /// Composite rule definition
    pub fn composite(
        name: impl Into<String>,
        kind: CompositeKind,
        composing_rules: Vec<RuleDefinition>,
    ) -> Self {
        Self {
            name: name.into(),
            composite_rule_type: Some(kind.as_str().to_string()),
            composing_rules,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Priority of a simple rule, `DEFAULT_PRIORITY` when unspecified
    pub fn priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    pub fn is_composite(&self) -> bool {
        self.composite_rule_type.is_some()
    }

    /// Composite kind, if this is a composite definition
    pub fn composite_kind(&self) -> Result<Option<CompositeKind>> {
        self.composite_rule_type
            .as_deref()
            .map(str::parse::<CompositeKind>)
            .transpose()
    }

    /// Structural validation, recursing into composing rules
    pub fn validate(&self) -> Result<()> {
        match self.composite_kind()? {
            Some(kind) => {
                if self.composing_rules.is_empty() {
                    return Err(RuleError::invalid_argument("composing rules required"));
                }
                if self.composing_rules.len() < kind.min_rules() {
                    return Err(RuleError::invalid_argument(format!(
                        "{} '{}' requires at least {} composing rules, got {}",
                        kind,
                        self.name,
                        kind.min_rules(),
                        self.composing_rules.len()
                    )));
                }
                self.composing_rules
                    .iter()
                    .try_for_each(RuleDefinition::validate)
            },
            None => {
                if !self.composing_rules.is_empty() {
                    return Err(RuleError::invalid_definition(format!(
                        "Non-composite rule '{}' cannot declare composing rules",
                        self.name
                    )));
                }
                if self.condition.as_deref().map_or(true, str::is_empty) {
                    return Err(RuleError::invalid_definition(format!(
                        "The rule condition must be specified in '{}'",
                        self.name
                    )));
                }
                if self.actions.is_empty() {
                    return Err(RuleError::invalid_definition(format!(
                        "The rule action(s) must be specified in '{}'",
                        self.name
                    )));
                }
                Ok(())
            },
        }
    }
}

// ============================================================================
// Rule factory
// ============================================================================

/// Builds rules from definitions using named conditions and actions
#[derive(Clone, Default)]
pub struct RuleFactory {
    conditions: HashMap<String, Arc<dyn Condition>>,
    actions: HashMap<String, Arc<dyn Action>>,
}

impl RuleFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_condition<F>(&mut self, name: impl Into<String>, condition: F) -> &mut Self
    where
        F: Fn(&Facts) -> Result<bool> + Send + Sync + 'static,
    {
        self.register_shared_condition(name, Arc::new(condition))
    }

    pub fn register_shared_condition(
        &mut self,
        name: impl Into<String>,
        condition: Arc<dyn Condition>,
    ) -> &mut Self {
        self.conditions.insert(name.into(), condition);
        self
    }

    pub fn register_action<F>(&mut self, name: impl Into<String>, action: F) -> &mut Self
    where
        F: Fn(&mut Facts) -> Result<()> + Send + Sync + 'static,
    {
        self.register_shared_action(name, Arc::new(action))
    }

    pub fn register_shared_action(
        &mut self,
        name: impl Into<String>,
        action: Arc<dyn Action>,
    ) -> &mut Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Validate a definition and build the rule it describes
    pub fn create_rule(&self, definition: &RuleDefinition) -> Result<RuleRef> {
        definition.validate()?;
        self.build(definition)
    }

    /// Build every definition into one rule set
    pub fn create_rules(&self, definitions: &[RuleDefinition]) -> Result<RuleSet> {
        let mut rules = RuleSet::new();
        for definition in definitions {
            let rule = self.create_rule(definition)?;
            if !rules.register_ref(rule) {
                debug!("Duplicate rule definition '{}' ignored", definition.name);
            }
        }
        Ok(rules)
    }

    fn build(&self, definition: &RuleDefinition) -> Result<RuleRef> {
        let Some(kind) = definition.composite_kind()? else {
            return self.build_simple(definition);
        };

        let mut builder = CompositeRule::builder(kind, definition.name.clone())
            .description(definition.description.clone());
        if let Some(priority) = definition.priority {
            builder = builder.priority(priority);
        }
        let children = definition
            .composing_rules
            .iter()
            .map(|child| self.build(child))
            .collect::<Result<Vec<_>>>()?;

        Ok(RuleRef::new(builder.rules(children).build()?))
    }

    fn build_simple(&self, definition: &RuleDefinition) -> Result<RuleRef> {
        let condition_name = definition.condition.as_deref().unwrap_or_default();
        let condition = self.conditions.get(condition_name).cloned().ok_or_else(|| {
            RuleError::invalid_definition(format!(
                "Unknown condition '{}' in rule '{}'",
                condition_name, definition.name
            ))
        })?;

        let actions = definition
            .actions
            .iter()
            .map(|name| {
                self.actions.get(name).cloned().ok_or_else(|| {
                    RuleError::invalid_definition(format!(
                        "Unknown action '{}' in rule '{}'",
                        name, definition.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RuleRef::new(DefaultRule::new(
            definition.name.clone(),
            definition.description.clone(),
            definition.priority(),
            condition,
            actions,
        )))
    }
}
