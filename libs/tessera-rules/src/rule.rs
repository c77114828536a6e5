//! Rule abstraction and the concrete rule types
//!
//! - [`Rule`]: name, description, priority, condition and actions
//! - [`RuleRef`]: shared handle ordered by priority then name
//! - [`BasicRule`], [`DefaultRule`] and [`RuleBuilder`]

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::condition::{Action, Condition, Constant};
use crate::error::Result;
use crate::facts::Facts;

/// Name given to rules that do not declare one
pub const DEFAULT_NAME: &str = "rule";

/// Description given to rules that do not declare one
pub const DEFAULT_DESCRIPTION: &str = "description";

/// Priority given to rules that do not declare one
///
/// One below `i32::MAX` so that the default priority threshold never cuts
/// off unprioritized rules.
pub const DEFAULT_PRIORITY: i32 = i32::MAX - 1;

// ============================================================================
// Rule contract
// ============================================================================

/// A condition/action rule
///
/// Lower priority values are evaluated and fired first.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        DEFAULT_DESCRIPTION
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Evaluate the rule's condition against the facts
    fn evaluate(&self, facts: &Facts) -> Result<bool>;

    /// Execute the rule's actions
    fn execute(&self, facts: &mut Facts) -> Result<()>;
}

impl<R: Rule + ?Sized> Rule for Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    fn priority(&self) -> i32 {
        (**self).priority()
    }

    fn evaluate(&self, facts: &Facts) -> Result<bool> {
        (**self).evaluate(facts)
    }

    fn execute(&self, facts: &mut Facts) -> Result<()> {
        (**self).execute(facts)
    }
}

/// Natural order: priority ascending, then name
///
/// Description is the last key so that the order agrees with rule equality.
pub fn natural_order(a: &dyn Rule, b: &dyn Rule) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.description().cmp(b.description()))
}

// ============================================================================
// Shared rule handle
// ============================================================================

/// Shared handle to a rule
///
/// Two handles are equal when name, description and priority are equal,
/// regardless of which rule instances they point to.
#[derive(Clone)]
pub struct RuleRef(Arc<dyn Rule>);

impl RuleRef {
    pub fn new<R: Rule + 'static>(rule: R) -> Self {
        Self(Arc::new(rule))
    }

    pub fn as_arc(&self) -> &Arc<dyn Rule> {
        &self.0
    }
}

impl From<Arc<dyn Rule>> for RuleRef {
    fn from(rule: Arc<dyn Rule>) -> Self {
        Self(rule)
    }
}

impl Deref for RuleRef {
    type Target = dyn Rule;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for RuleRef {
    fn eq(&self, other: &Self) -> bool {
        self.priority() == other.priority()
            && self.name() == other.name()
            && self.description() == other.description()
    }
}

impl Eq for RuleRef {}

impl PartialOrd for RuleRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RuleRef {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_order(&**self, &**other)
    }
}

impl Hash for RuleRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
        self.description().hash(state);
        self.priority().hash(state);
    }
}

impl fmt::Debug for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("description", &self.description())
            .field("priority", &self.priority())
            .finish()
    }
}

impl fmt::Display for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// BasicRule
// ============================================================================

/// Rule whose condition is always false and whose action does nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicRule {
    name: String,
    description: String,
    priority: i32,
}

impl BasicRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for BasicRule {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl Rule for BasicRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn evaluate(&self, _facts: &Facts) -> Result<bool> {
        Ok(false)
    }

    fn execute(&self, _facts: &mut Facts) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// DefaultRule
// ============================================================================

/// Rule built from one condition and an ordered list of actions
pub struct DefaultRule {
    name: String,
    description: String,
    priority: i32,
    condition: Arc<dyn Condition>,
    actions: Vec<Arc<dyn Action>>,
}

impl DefaultRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        priority: i32,
        condition: Arc<dyn Condition>,
        actions: Vec<Arc<dyn Action>>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority,
            condition,
            actions,
        }
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

impl Rule for DefaultRule {
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
        self.condition.evaluate(facts)
    }

    /// Run actions in declaration order, stopping at the first failure
    fn execute(&self, facts: &mut Facts) -> Result<()> {
        for action in &self.actions {
            action.execute(facts)?;
        }
        Ok(())
    }
}

// ============================================================================
// RuleBuilder
// ============================================================================

/// Fluent builder for [`DefaultRule`]
///
/// ```
/// use tessera_rules::{Facts, Rule, RuleBuilder};
///
/// let rule = RuleBuilder::new()
///     .name("weather rule")
///     .description("if it rains then take an umbrella")
///     .priority(1)
///     .when(|facts| facts.require::<bool>("rain"))
///     .then(|facts| {
///         facts.put("umbrella", true);
///         Ok(())
///     })
///     .build();
///
/// let mut facts = Facts::new();
/// facts.put("rain", true);
/// assert!(rule.evaluate(&facts).unwrap());
/// rule.execute(&mut facts).unwrap();
/// assert!(facts.contains("umbrella"));
/// ```
pub struct RuleBuilder {
    name: String,
    description: String,
    priority: i32,
    condition: Arc<dyn Condition>,
    actions: Vec<Arc<dyn Action>>,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            priority: DEFAULT_PRIORITY,
            condition: Arc::new(Constant(false)),
            actions: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the condition from a closure
    pub fn when<F>(self, condition: F) -> Self
    where
        F: Fn(&Facts) -> Result<bool> + Send + Sync + 'static,
    {
        self.when_condition(Arc::new(condition))
    }

    pub fn when_condition(mut self, condition: Arc<dyn Condition>) -> Self {
        self.condition = condition;
        self
    }

    /// Append an action from a closure
    pub fn then<F>(self, action: F) -> Self
    where
        F: Fn(&mut Facts) -> Result<()> + Send + Sync + 'static,
    {
        self.then_action(Arc::new(action))
    }

    pub fn then_action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn build(self) -> DefaultRule {
        DefaultRule::new(
            self.name,
            self.description,
            self.priority,
            self.condition,
            self.actions,
        )
    }
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
