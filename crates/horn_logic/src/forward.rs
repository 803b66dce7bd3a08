//! Forward chaining: data-driven propagation from the facts toward the question.
//!
//! Every rule carries a counter of antecedent occurrences not yet known to hold. Facts
//! seed a FIFO queue; expanding a variable decrements the counter of every rule it
//! appears in, and a rule whose counter reaches zero fires, deriving its consequent and
//! queueing it. The `used` flag guarantees each variable is expanded once, so each
//! antecedent occurrence contributes exactly one decrement, each rule fires at most once,
//! and the loop terminates on any rule graph, cyclic or not.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::engine::EngineStats;
use crate::error::Result;
use crate::graph::Graph;
use crate::log_targets;
use crate::rule::RuleId;
use crate::variable::{VariableId, VariableState};

/// Runs forward chaining on a freshly built or freshly reset graph.
///
/// # Returns
///
/// `Ok(true)` if the question is a fact or gets derived, `Ok(false)` otherwise, or
/// [`Error::Inconsistent`](crate::Error::Inconsistent) if a rule counter would drop below
/// zero. Running on a graph that was not reset silently skews the answer.
pub fn forward(graph: &mut Graph) -> Result<bool> {
    forward_with_stats(graph, &mut EngineStats::default())
}

/// Runs forward chaining, accumulating counters into `stats`.
pub fn forward_with_stats(graph: &mut Graph, stats: &mut EngineStats) -> Result<bool> {
    let mut queue = pre_process(graph)?;
    let question = graph.question();
    debug!(
        target: log_targets::FORWARD,
        "Forward chaining from {} facts toward {}",
        queue.len(),
        graph.var(question)?.name()
    );

    if graph.state(question)? == VariableState::True {
        debug!(target: log_targets::FORWARD, "Question is a fact");
        return Ok(true);
    }

    while let Some(variable) = queue.pop_front() {
        if graph.var(variable)?.used {
            continue;
        }
        stats.variables_expanded += 1;
        trace!(target: log_targets::FORWARD, "Expanding {}", graph.var(variable)?);

        let fan_out = graph.var(variable)?.appears_in.len();
        for i in 0..fan_out {
            let rule_id = graph.var(variable)?.appears_in[i];
            if !graph.rule_mut(rule_id)?.decrement()? {
                continue;
            }

            stats.rules_fired += 1;
            let consequent = graph.rule_ref(rule_id)?.consequent;
            graph.assign(consequent, VariableState::True)?;
            trace!(
                target: log_targets::FORWARD,
                "Rule {} fired, derived {}",
                rule_id,
                graph.var(consequent)?.name()
            );

            if consequent == question {
                debug!(
                    target: log_targets::FORWARD,
                    "Derived question after expanding {} variables",
                    stats.variables_expanded
                );
                return Ok(true);
            }
            queue.push_back(consequent);
        }

        graph.var_mut(variable)?.used = true;
    }

    debug!(target: log_targets::FORWARD, "Queue exhausted, question not derived");
    Ok(false)
}

/// Links each rule to its antecedents, counts antecedent occurrences, asserts the facts,
/// and returns the initial queue (the facts, in input order).
fn pre_process(graph: &mut Graph) -> Result<VecDeque<VariableId>> {
    for r in 0..graph.rule_count() {
        let rule_id = RuleId(r);
        let arity = graph.rule_ref(rule_id)?.antecedents.len();
        for a in 0..arity {
            let antecedent = graph.rule_ref(rule_id)?.antecedents[a];
            graph.rule_mut(rule_id)?.counter += 1;
            graph.var_mut(antecedent)?.appears_in.push(rule_id);
        }
    }
    graph.assert_facts()?;
    Ok(graph.facts().iter().copied().collect())
}
