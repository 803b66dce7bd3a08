//! Rule definitions for the Horn logic engines.
//!
//! Rules come in two shapes:
//! - [`RuleSpec`]: the textual form exchanged with callers (`A∧B => C`).
//! - [`Rule`]: the linked form stored in a [`Graph`](crate::Graph), whose antecedents and
//!   consequent are [`VariableId`] handles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::variable::VariableId;

/// The token separating a rule's body from its head.
pub const IMPLIES: &str = "=>";

/// The conjunction joining several antecedents in a rule body.
pub const CONJUNCTION: char = '∧';

/// An ASCII alternative to [`CONJUNCTION`], accepted when reading rule bodies.
pub const ASCII_CONJUNCTION: char = '&';

/// A stable handle to a [`Rule`] inside the graph that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    /// Returns the arena index behind this handle.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One linked implication: every antecedent must hold for the consequent to hold.
#[derive(Debug, Clone)]
pub struct Rule {
    /// The body of the rule; repeated antecedents are kept and counted.
    pub(crate) antecedents: Vec<VariableId>,
    /// The head of the rule.
    pub(crate) consequent: VariableId,
    /// Forward: antecedents not yet seen true. Backward: blocked antecedents not yet proved.
    pub(crate) counter: usize,
    /// Antecedents found in progress by the backward engine (a cycle was hit).
    pub(crate) blocked: Vec<VariableId>,
}

impl Rule {
    pub(crate) fn new(antecedents: Vec<VariableId>, consequent: VariableId) -> Self {
        Self {
            antecedents,
            consequent,
            counter: 0,
            blocked: Vec::new(),
        }
    }

    /// Returns the rule's antecedents in body order.
    pub fn antecedents(&self) -> &[VariableId] {
        &self.antecedents
    }

    /// Returns the rule's consequent.
    pub fn consequent(&self) -> VariableId {
        self.consequent
    }

    /// Returns the rule's current counter.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Returns the antecedents the backward engine found blocked by a cycle.
    pub fn blocked(&self) -> &[VariableId] {
        &self.blocked
    }

    /// Decrements the counter, refusing to go below zero.
    ///
    /// Returns `true` when the counter reaches zero.
    pub(crate) fn decrement(&mut self) -> Result<bool> {
        self.counter = self.counter.checked_sub(1).ok_or_else(|| {
            Error::inconsistent(format!(
                "counter underflow on rule concluding {}",
                self.consequent
            ))
        })?;
        Ok(self.counter == 0)
    }

    /// Restores the post-construction condition.
    pub(crate) fn reset(&mut self) {
        self.counter = 0;
        self.blocked.clear();
    }
}

/// The textual form of a rule: an antecedent body and a single consequent name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleSpec {
    /// The body; several names may be joined with [`CONJUNCTION`].
    pub antecedents: String,
    /// The head.
    pub consequent: String,
}

impl RuleSpec {
    /// Creates a rule specification from a body text and a consequent name.
    pub fn new(antecedents: impl Into<String>, consequent: impl Into<String>) -> Self {
        Self {
            antecedents: antecedents.into(),
            consequent: consequent.into(),
        }
    }

    /// Creates a rule specification from individual antecedent names.
    pub fn conjunction<I, S>(antecedents: I, consequent: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let body = antecedents
            .into_iter()
            .map(|a| a.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&CONJUNCTION.to_string());
        Self::new(body, consequent)
    }

    /// Parses the `body => head` notation.
    ///
    /// # Arguments
    ///
    /// * `text` - A rule such as `P0∧P1 => P2`.
    ///
    /// # Returns
    ///
    /// The parsed `RuleSpec`, or [`Error::MalformedInput`] if the text does not contain
    /// exactly one implication or its head is not a single name.
    pub fn parse(text: &str) -> Result<Self> {
        let (body, head) = text
            .split_once(IMPLIES)
            .ok_or_else(|| Error::malformed(format!("rule `{}` has no `{}`", text, IMPLIES)))?;
        if head.contains(IMPLIES) {
            return Err(Error::malformed(format!(
                "rule `{}` has more than one `{}`",
                text, IMPLIES
            )));
        }
        let spec = Self::new(body.trim(), head.trim());
        spec.consequent_name()?;
        Ok(spec)
    }

    /// Splits the body into trimmed antecedent names.
    ///
    /// # Returns
    ///
    /// The antecedent names in body order, or [`Error::MalformedInput`] if the body or
    /// any conjunct is empty.
    pub fn antecedent_names(&self) -> Result<Vec<&str>> {
        self.antecedents
            .split([CONJUNCTION, ASCII_CONJUNCTION])
            .map(str::trim)
            .map(|name| {
                if name.is_empty() {
                    Err(Error::malformed(format!(
                        "rule `{}` has an empty antecedent",
                        self
                    )))
                } else {
                    Ok(name)
                }
            })
            .collect()
    }

    /// Returns the trimmed consequent name.
    ///
    /// # Returns
    ///
    /// The name, or [`Error::MalformedInput`] if it is empty or is itself a conjunction.
    pub fn consequent_name(&self) -> Result<&str> {
        let name = self.consequent.trim();
        if name.is_empty() {
            return Err(Error::malformed(format!(
                "rule `{}` has no consequent",
                self
            )));
        }
        if name.contains([CONJUNCTION, ASCII_CONJUNCTION]) {
            return Err(Error::malformed(format!(
                "rule `{}` must have exactly one consequent",
                self
            )));
        }
        Ok(name)
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.antecedents, IMPLIES, self.consequent)
    }
}

impl FromStr for RuleSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<A: Into<String>, C: Into<String>> From<(A, C)> for RuleSpec {
    fn from((antecedents, consequent): (A, C)) -> Self {
        Self::new(antecedents, consequent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conjunction() {
        let spec = RuleSpec::parse("P0∧P1 => P2").unwrap();
        assert_eq!(spec.antecedent_names().unwrap(), vec!["P0", "P1"]);
        assert_eq!(spec.consequent_name().unwrap(), "P2");
    }

    #[test]
    fn test_parse_ascii_conjunction() {
        let spec: RuleSpec = " A & B &C=>D ".parse().unwrap();
        assert_eq!(spec.antecedent_names().unwrap(), vec!["A", "B", "C"]);
        assert_eq!(spec.consequent_name().unwrap(), "D");
    }

    #[test]
    fn test_parse_rejects_missing_implication() {
        assert!(matches!(
            RuleSpec::parse("A∧B"),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn test_parse_rejects_two_implications() {
        assert!(RuleSpec::parse("A => B => C").is_err());
    }

    #[test]
    fn test_rejects_conjunctive_head() {
        assert!(RuleSpec::parse("A => B∧C").is_err());
        assert!(RuleSpec::new("A", "").consequent_name().is_err());
    }

    #[test]
    fn test_rejects_empty_conjunct() {
        let spec = RuleSpec::new("A∧∧B", "C");
        assert!(spec.antecedent_names().is_err());
        assert!(RuleSpec::new("  ", "C").antecedent_names().is_err());
    }

    #[test]
    fn test_repeated_antecedents_are_kept() {
        let spec = RuleSpec::conjunction(["A", "A", "B"], "C");
        assert_eq!(spec.antecedents, "A∧A∧B");
        assert_eq!(spec.antecedent_names().unwrap().len(), 3);
    }

    #[test]
    fn test_display_round_trips() {
        let spec = RuleSpec::from(("A∧B", "Q"));
        assert_eq!(spec.to_string(), "A∧B => Q");
        assert_eq!(RuleSpec::parse(&spec.to_string()).unwrap(), spec);
    }

    #[test]
    fn test_decrement_refuses_underflow() {
        let mut rule = Rule::new(vec![VariableId(0)], VariableId(1));
        rule.counter = 1;
        assert!(rule.decrement().unwrap());
        assert!(matches!(rule.decrement(), Err(Error::Inconsistent(_))));
    }
}
