//! Condition and action capabilities
//!
//! Conditions read facts and must not mutate them (they receive `&Facts`).
//! Actions may mutate facts. Both may fail; the engines turn those failures
//! into listener notifications instead of aborting the session.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::facts::Facts;

/// Boolean predicate over facts
pub trait Condition: Send + Sync {
    fn evaluate(&self, facts: &Facts) -> Result<bool>;
}

impl<F> Condition for F
where
    F: Fn(&Facts) -> Result<bool> + Send + Sync,
{
    fn evaluate(&self, facts: &Facts) -> Result<bool> {
        self(facts)
    }
}

/// Side-effecting operation over facts
pub trait Action: Send + Sync {
    fn execute(&self, facts: &mut Facts) -> Result<()>;
}

impl<F> Action for F
where
    F: Fn(&mut Facts) -> Result<()> + Send + Sync,
{
    fn execute(&self, facts: &mut Facts) -> Result<()> {
        self(facts)
    }
}

/// Condition that always evaluates to `value`
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub bool);

impl Condition for Constant {
    fn evaluate(&self, _facts: &Facts) -> Result<bool> {
        Ok(self.0)
    }
}

/// Condition bound to a single named fact of type `T`
///
/// The fact is read through [`Facts::require`], so a missing fact or a fact of
/// the wrong type surfaces as an evaluation error rather than `false`.
///
/// ```
/// use tessera_rules::{Condition, FactCondition, Facts};
///
/// let adult = FactCondition::new("age", |age: u32| age >= 18);
/// let mut facts = Facts::new();
/// facts.put("age", 21);
/// assert!(adult.evaluate(&facts).unwrap());
/// ```
pub struct FactCondition<T, F> {
    fact: String,
    predicate: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> FactCondition<T, F>
where
    T: DeserializeOwned,
    F: Fn(T) -> bool + Send + Sync,
{
    pub fn new(fact: impl Into<String>, predicate: F) -> Self {
        Self {
            fact: fact.into(),
            predicate,
            _marker: PhantomData,
        }
    }

    pub fn fact(&self) -> &str {
        &self.fact
    }
}

impl<T, F> Condition for FactCondition<T, F>
where
    T: DeserializeOwned,
    F: Fn(T) -> bool + Send + Sync,
{
    fn evaluate(&self, facts: &Facts) -> Result<bool> {
        let value: T = facts.require(&self.fact)?;
        Ok((self.predicate)(value))
    }
}
