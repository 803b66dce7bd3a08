//! The Variable/Rule graph.
//!
//! A [`Graph`] owns every [`Variable`] and [`Rule`] of one dataset in two arenas. All
//! links between them (rule ↔ antecedent/consequent, appears-in, derived-by, pending and
//! blocked lists) are handles into those arenas, so nothing but the graph keeps an entity
//! alive and the whole structure can be reset in place.
//!
//! ```text
//!   registry: name ──► VariableId ──► variables[i]
//!                                        │ appears_in / derived_by / pending
//!                                        ▼
//!                                    RuleId ──► rules[j] ──► antecedents, consequent
//! ```

use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};
use crate::log_targets;
use crate::rule::{Rule, RuleId, RuleSpec, CONJUNCTION, IMPLIES};
use crate::variable::{Variable, VariableId, VariableState};

/// A linked rule base together with its facts and question.
///
/// Engines mutate the graph in place, so a graph must be [reset](Graph::reset) before it
/// is evaluated again.
#[derive(Debug, Clone)]
pub struct Graph {
    variables: Vec<Variable>,
    rules: Vec<Rule>,
    registry: IndexMap<String, VariableId>,
    facts: Vec<VariableId>,
    question: VariableId,
}

impl Graph {
    /// Builds a graph from rule specifications, fact names and a question name.
    ///
    /// Every proposition name is registered once; every later use of the same name
    /// resolves to the same [`VariableId`].
    ///
    /// # Arguments
    ///
    /// * `rules` - The rule specifications, in evaluation order.
    /// * `facts` - The names asserted true before inference.
    /// * `question` - The name of the proposition to prove.
    ///
    /// # Returns
    ///
    /// The linked `Graph`, or [`Error::MalformedInput`] if a rule cannot be split into
    /// antecedents plus exactly one consequent, or a fact or the question is empty.
    pub fn link<S: AsRef<str>>(rules: &[RuleSpec], facts: &[S], question: &str) -> Result<Self> {
        let mut graph = Self {
            variables: Vec::new(),
            rules: Vec::with_capacity(rules.len()),
            registry: IndexMap::new(),
            facts: Vec::with_capacity(facts.len()),
            question: VariableId(0),
        };

        for spec in rules {
            let antecedents = spec
                .antecedent_names()?
                .into_iter()
                .map(|name| graph.register(name))
                .collect::<Vec<_>>();
            let consequent = graph.register(spec.consequent_name()?);
            graph.rules.push(Rule::new(antecedents, consequent));
        }

        for fact in facts {
            let name = checked_name(fact.as_ref(), "fact")?;
            let id = graph.register(name);
            graph.facts.push(id);
        }

        graph.question = graph.register(checked_name(question, "question")?);

        debug!(
            target: log_targets::GRAPH,
            "Linked {} rules over {} variables ({} facts)",
            graph.rules.len(),
            graph.variables.len(),
            graph.facts.len()
        );
        Ok(graph)
    }

    /// Returns the handle for `name`, creating the variable on first use.
    fn register(&mut self, name: &str) -> VariableId {
        if let Some(id) = self.registry.get(name) {
            return *id;
        }
        let id = VariableId(self.variables.len());
        self.variables.push(Variable::new(name));
        self.registry.insert(name.to_string(), id);
        id
    }

    /// Restores every variable and rule to its post-construction condition.
    ///
    /// After a reset the same graph may be evaluated again by either engine and yields
    /// the same answer as the first run.
    pub fn reset(&mut self) {
        for variable in &mut self.variables {
            variable.reset();
        }
        for rule in &mut self.rules {
            rule.reset();
        }
        debug!(target: log_targets::GRAPH, "Graph reset");
    }

    /// Returns the question's handle.
    pub fn question(&self) -> VariableId {
        self.question
    }

    /// Returns the fact handles in input order.
    pub fn facts(&self) -> &[VariableId] {
        &self.facts
    }

    /// Returns the number of distinct propositions.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Looks up a proposition by name.
    pub fn lookup(&self, name: &str) -> Option<VariableId> {
        self.registry.get(name).copied()
    }

    /// Returns the variable behind `id`, if it belongs to this graph.
    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    /// Returns the rule behind `id`, if it belongs to this graph.
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    /// Iterates over all variables with their handles, in registration order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VariableId(i), v))
    }

    /// Iterates over all rules with their handles, in input order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleId(i), r))
    }

    /// Returns the current state of the proposition called `name`.
    pub fn state_of(&self, name: &str) -> Option<VariableState> {
        self.lookup(name)
            .and_then(|id| self.variable(id))
            .map(Variable::state)
    }

    /// Takes a snapshot of every proposition's state, keyed by name in registration order.
    pub fn states(&self) -> IndexMap<String, VariableState> {
        self.variables
            .iter()
            .map(|v| (v.name.clone(), v.state))
            .collect()
    }

    /// Renders a rule with names and current states, e.g. `A (true) ∧ B (unknown) => C (unknown)`.
    pub fn describe_rule(&self, id: RuleId) -> Option<String> {
        let rule = self.rule(id)?;
        let describe = |v: &VariableId| {
            self.variable(*v)
                .map(|var| var.to_string())
                .unwrap_or_else(|| format!("<dangling {}>", v))
        };
        let body = rule
            .antecedents
            .iter()
            .map(describe)
            .collect::<Vec<_>>()
            .join(&format!(" {} ", CONJUNCTION));
        Some(format!("{} {} {}", body, IMPLIES, describe(&rule.consequent)))
    }

    pub(crate) fn var(&self, id: VariableId) -> Result<&Variable> {
        self.variables
            .get(id.0)
            .ok_or_else(|| Error::inconsistent(format!("unresolved variable handle {}", id)))
    }

    pub(crate) fn var_mut(&mut self, id: VariableId) -> Result<&mut Variable> {
        self.variables
            .get_mut(id.0)
            .ok_or_else(|| Error::inconsistent(format!("unresolved variable handle {}", id)))
    }

    pub(crate) fn rule_ref(&self, id: RuleId) -> Result<&Rule> {
        self.rules
            .get(id.0)
            .ok_or_else(|| Error::inconsistent(format!("unresolved rule handle {}", id)))
    }

    pub(crate) fn rule_mut(&mut self, id: RuleId) -> Result<&mut Rule> {
        self.rules
            .get_mut(id.0)
            .ok_or_else(|| Error::inconsistent(format!("unresolved rule handle {}", id)))
    }

    pub(crate) fn state(&self, id: VariableId) -> Result<VariableState> {
        Ok(self.var(id)?.state)
    }

    pub(crate) fn assign(&mut self, id: VariableId, state: VariableState) -> Result<()> {
        self.var_mut(id)?.assign(state);
        Ok(())
    }

    /// Marks every fact true; shared by both engines' pre-processing.
    pub(crate) fn assert_facts(&mut self) -> Result<()> {
        for i in 0..self.facts.len() {
            let fact = self.facts[i];
            self.assign(fact, VariableState::True)?;
        }
        Ok(())
    }
}

fn checked_name<'a>(name: &'a str, role: &str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(Error::malformed(format!("empty {} name", role)))
    } else {
        Ok(trimmed)
    }
}
