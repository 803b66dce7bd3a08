//! Propositions and their per-run state.
//!
//! A [`Variable`] is owned by the arena of a [`Graph`](crate::Graph) and addressed by a
//! [`VariableId`]. Every link a variable keeps towards rules is a [`RuleId`], so the
//! graph holds no reference cycles and no link can outlive its target.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rule::RuleId;

/// A stable handle to a [`Variable`] inside the graph that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariableId(pub(crate) usize);

impl VariableId {
    /// Returns the arena index behind this handle.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// The truth state of a proposition during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VariableState {
    /// Not yet evaluated.
    #[default]
    Unknown,
    /// Asserted as a fact or derived.
    True,
    /// Shown not to be derivable.
    False,
    /// Under evaluation by the backward engine.
    InProgress,
}

impl VariableState {
    /// Returns a short label for the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableState::Unknown => "unknown",
            VariableState::True => "true",
            VariableState::False => "false",
            VariableState::InProgress => "in-progress",
        }
    }
}

impl fmt::Display for VariableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named proposition.
#[derive(Debug, Clone)]
pub struct Variable {
    /// The identity of the proposition; unique within a graph.
    pub(crate) name: String,
    /// The current truth state.
    pub(crate) state: VariableState,
    /// Rules in which this variable is an antecedent (forward engine).
    pub(crate) appears_in: Vec<RuleId>,
    /// Rules that conclude this variable (backward engine).
    pub(crate) derived_by: Vec<RuleId>,
    /// Rules waiting on this variable to be proved (backward engine).
    pub(crate) pending: Vec<RuleId>,
    /// Whether the forward engine already expanded this variable.
    pub(crate) used: bool,
    /// Discovery order assigned by the backward engine.
    pub(crate) order: Option<usize>,
}

impl Variable {
    /// Creates a fresh, unevaluated variable.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: VariableState::Unknown,
            appears_in: Vec::new(),
            derived_by: Vec::new(),
            pending: Vec::new(),
            used: false,
            order: None,
        }
    }

    /// Returns the proposition's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current truth state.
    pub fn state(&self) -> VariableState {
        self.state
    }

    /// Returns `true` if the variable is currently known to hold.
    pub fn is_true(&self) -> bool {
        self.state == VariableState::True
    }

    /// Returns `true` once the forward engine has expanded the variable.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Returns the discovery order assigned by the backward engine, if any.
    pub fn order(&self) -> Option<usize> {
        self.order
    }

    /// Returns the rules this variable is an antecedent of, as linked by the forward engine.
    pub fn appears_in(&self) -> &[RuleId] {
        &self.appears_in
    }

    /// Returns the rules concluding this variable, as linked by the backward engine.
    pub fn derived_by(&self) -> &[RuleId] {
        &self.derived_by
    }

    /// Returns the rules currently waiting on this variable.
    pub fn pending(&self) -> &[RuleId] {
        &self.pending
    }

    pub(crate) fn assign(&mut self, state: VariableState) {
        self.state = state;
    }

    /// Restores the post-construction condition.
    pub(crate) fn reset(&mut self) {
        self.state = VariableState::Unknown;
        self.appears_in.clear();
        self.derived_by.clear();
        self.pending.clear();
        self.used = false;
        self.order = None;
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_variable_is_unknown() {
        let var = Variable::new("P0");
        assert_eq!(var.name(), "P0");
        assert_eq!(var.state(), VariableState::Unknown);
        assert!(!var.is_used());
        assert!(var.order().is_none());
    }

    #[test]
    fn test_reset_clears_run_state() {
        let mut var = Variable::new("A");
        var.assign(VariableState::InProgress);
        var.used = true;
        var.order = Some(3);
        var.appears_in.push(RuleId(0));
        var.derived_by.push(RuleId(1));
        var.pending.push(RuleId(2));

        var.reset();

        assert_eq!(var.state(), VariableState::Unknown);
        assert!(!var.is_used());
        assert!(var.order().is_none());
        assert!(var.appears_in().is_empty());
        assert!(var.derived_by().is_empty());
        assert!(var.pending().is_empty());
    }

    #[test]
    fn test_display() {
        let mut var = Variable::new("Q");
        var.assign(VariableState::True);
        assert_eq!(var.to_string(), "Q (true)");
    }
}
