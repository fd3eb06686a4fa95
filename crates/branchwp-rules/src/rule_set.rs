//! # Rule Sets
//!
//! Ordered collections of rules. Rules have no identity of their own;
//! they are addressed by position or by value.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::rule::Rule;

/// An ordered list of branch write protection rules.
///
/// Order carries no meaning for evaluation but is preserved so that the
/// legacy encoding of an unchanged set stays stable.
///
/// # Example
///
/// ```
/// use branchwp_rules::{Rule, RuleSet};
///
/// let mut rules = RuleSet::new();
/// rules.push(Rule::allow_user("main", "trillian"));
/// rules.push(Rule::deny_group("main", "vogons"));
///
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules.deny_rules().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a new empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Remove the rule at `index`.
    ///
    /// # Returns
    ///
    /// The removed rule, or `None` if the index is out of bounds
    pub fn remove(&mut self, index: usize) -> Option<Rule> {
        if index < self.rules.len() {
            Some(self.rules.remove(index))
        } else {
            None
        }
    }

    /// Remove the first rule equal to `rule`.
    ///
    /// # Returns
    ///
    /// `true` if a rule was removed, `false` otherwise
    pub fn remove_rule(&mut self, rule: &Rule) -> bool {
        match self.rules.iter().position(|r| r == rule) {
            Some(index) => {
                self.rules.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the rule at `index`.
    ///
    /// # Returns
    ///
    /// The previous rule, or `None` (leaving the set untouched) if the
    /// index is out of bounds
    pub fn replace(&mut self, index: usize, rule: Rule) -> Option<Rule> {
        self.rules
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, rule))
    }

    /// Get the rule at `index`.
    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Iterate over the rules in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Iterate over the allow rules.
    pub fn allow_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| !r.is_deny)
    }

    /// Iterate over the deny rules.
    pub fn deny_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_deny)
    }

    /// Check if the set contains a rule.
    pub fn contains(&self, rule: &Rule) -> bool {
        self.rules.contains(rule)
    }

    /// Get the count of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Clear all rules.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Validate every rule, reporting the first invalid one.
    ///
    /// # Example
    ///
    /// ```
    /// use branchwp_rules::{CodecError, Rule, RuleSet};
    ///
    /// let rules: RuleSet = vec![
    ///     Rule::allow_user("main", "trillian"),
    ///     Rule::allow_user("main", ""),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let err = rules.validate().unwrap_err();
    /// assert!(matches!(err, CodecError::InvalidRule { index: 1, .. }));
    /// ```
    pub fn validate(&self) -> CodecResult<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate()
                .map_err(|source| CodecError::InvalidRule { index, source })?;
        }
        Ok(())
    }

    /// View the rules as a slice.
    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }

    /// Consume the set, returning its rules.
    pub fn into_vec(self) -> Vec<Rule> {
        self.rules
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl Extend<Rule> for RuleSet {
    fn extend<T: IntoIterator<Item = Rule>>(&mut self, iter: T) {
        self.rules.extend(iter);
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
