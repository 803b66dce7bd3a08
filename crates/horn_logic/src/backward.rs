//! Backward chaining: goal-driven search from the question toward the facts.
//!
//! The search alternates two steps:
//! - `OR`: prove a variable by trying each rule that concludes it.
//! - `AND`: satisfy every antecedent of one rule.
//!
//! A variable under evaluation is `InProgress`. Meeting one again means the rule graph
//! has a cycle; instead of recursing, the rule is *blocked* on that variable and parked
//! on its pending list with a counter of blocked antecedents. When a blocked antecedent
//! is later proved, `INVERSE` decrements the parked rules and proves their consequents
//! as counters hit zero.
//!
//! Every visited variable gets a discovery order. The cycle root is the smallest order
//! any blocked rule depends on; once the root variable has scanned all its rules, nothing
//! outside the variables discovered after it can still prove them, so every member left
//! in progress is unprovable and is set false in one batch (the flush). This is the
//! low-link closure rule of strongly connected components applied to AND/OR graphs.

use log::{debug, trace};

use crate::context::ExecutionContext;
use crate::engine::EngineStats;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::log_targets;
use crate::rule::RuleId;
use crate::variable::{VariableId, VariableState};

/// The outcome of trying to satisfy every antecedent of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conjunction {
    /// Every antecedent holds.
    Satisfied,
    /// No antecedent is false, but these are still in progress higher up the search.
    Blocked(Vec<VariableId>),
    /// Some antecedent is false.
    Refuted,
}

/// Runs backward chaining on a freshly built or freshly reset graph.
///
/// # Returns
///
/// `Ok(true)` if the question is proved, `Ok(false)` if it is not derivable, or
/// [`Error::Inconsistent`] if the graph's invariants are broken.
pub fn backward(graph: &mut Graph) -> Result<bool> {
    backward_with_stats(graph, &mut EngineStats::default(), None)
}

/// Runs backward chaining with a bound on the nesting of `OR` calls.
///
/// Exceeding the bound aborts with [`Error::MaxDepthExceeded`]; the graph is left mid-run
/// and must be reset before reuse.
pub fn backward_with_limit(graph: &mut Graph, max_depth: Option<usize>) -> Result<bool> {
    backward_with_stats(graph, &mut EngineStats::default(), max_depth)
}

/// Runs backward chaining, accumulating counters into `stats`.
///
/// # Arguments
///
/// * `graph` - The graph to evaluate; its variable states are updated in place.
/// * `stats` - Counters updated by the run.
/// * `max_depth` - Optional bound on the nesting of `OR` calls.
pub fn backward_with_stats(
    graph: &mut Graph,
    stats: &mut EngineStats,
    max_depth: Option<usize>,
) -> Result<bool> {
    pre_process(graph)?;
    let question = graph.question();
    debug!(
        target: log_targets::BACKWARD,
        "Backward chaining toward {}",
        graph.var(question)?
    );

    if graph.state(question)? == VariableState::Unknown {
        let mut ctx = ExecutionContext::with_max_depth(max_depth);
        let mut search = Search {
            graph: &mut *graph,
            stats: &mut *stats,
        };
        search.prove(question, &mut ctx)?;
        stats.deepest = stats.deepest.max(ctx.deepest());
        debug!(
            target: log_targets::BACKWARD,
            "Search visited {} variables",
            ctx.discovered()
        );
    }

    Ok(graph.state(question)? == VariableState::True)
}

/// Registers every rule on its consequent's derived-by list and asserts the facts.
fn pre_process(graph: &mut Graph) -> Result<()> {
    for r in 0..graph.rule_count() {
        let rule_id = RuleId(r);
        let consequent = graph.rule_ref(rule_id)?.consequent;
        graph.var_mut(consequent)?.derived_by.push(rule_id);
    }
    graph.assert_facts()
}

/// The search over one graph.
///
/// `OR` and `AND` steps are frames on a heap-allocated stack, so the length of a rule
/// chain is limited by memory and `max_depth`, not by the thread's call stack.
struct Search<'g> {
    graph: &'g mut Graph,
    stats: &'g mut EngineStats,
}

/// One suspended step of the search.
#[derive(Debug, Clone, Copy)]
enum Frame {
    /// `OR`: scanning the rules that conclude `variable`; `next` indexes its derived-by list.
    Goal {
        variable: VariableId,
        order: usize,
        next: usize,
        blocked: bool,
    },
    /// `AND`: walking the antecedents of `rule`. While `waiting`, the antecedent at `next`
    /// is being proved by the goal above this frame.
    Body {
        rule: RuleId,
        next: usize,
        waiting: bool,
    },
}

/// Where a walk over a rule body stopped.
enum Walk {
    /// The antecedent at this index is unknown and must be proved first.
    Descend(usize, VariableId),
    /// The body is settled.
    Done(Conjunction),
}

impl Search<'_> {
    /// Proves `question`, leaving every visited variable true, false, or (only inside a
    /// cycle that is still open) in progress.
    fn prove(&mut self, question: VariableId, ctx: &mut ExecutionContext) -> Result<()> {
        let mut stack = vec![self.open(question, ctx)?];
        // The result of the body frame that finished last, consumed by its goal.
        let mut outcome: Option<Conjunction> = None;

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Goal {
                    variable,
                    order,
                    next,
                    mut blocked,
                } => {
                    if let Some(result) = outcome.take() {
                        let rule = self.graph.var(variable)?.derived_by[next - 1];
                        match result {
                            Conjunction::Satisfied => {
                                if self.graph.state(variable)? != VariableState::True {
                                    self.graph.assign(variable, VariableState::True)?;
                                    self.inverse(variable)?;
                                }
                                trace!(
                                    target: log_targets::BACKWARD,
                                    "{} proved by {}",
                                    self.graph.var(variable)?.name(),
                                    rule
                                );
                                self.close(order, ctx)?;
                                continue;
                            }
                            Conjunction::Blocked(on) => {
                                self.suspend(rule, &on, ctx)?;
                                blocked = true;
                            }
                            Conjunction::Refuted => {}
                        }

                        // A rule parked earlier may have been completed by an INVERSE in
                        // the subtree just finished.
                        if self.graph.state(variable)? == VariableState::True {
                            self.close(order, ctx)?;
                            continue;
                        }
                    }

                    let candidate = self.graph.var(variable)?.derived_by.get(next).copied();
                    match candidate {
                        Some(rule) => {
                            stack.push(Frame::Goal {
                                variable,
                                order,
                                next: next + 1,
                                blocked,
                            });
                            self.stats.rules_evaluated += 1;
                            stack.push(Frame::Body {
                                rule,
                                next: 0,
                                waiting: false,
                            });
                        }
                        None => {
                            if blocked {
                                ctx.push_in_progress(variable);
                            } else {
                                self.graph.assign(variable, VariableState::False)?;
                                trace!(
                                    target: log_targets::BACKWARD,
                                    "{} refuted",
                                    self.graph.var(variable)?.name()
                                );
                            }
                            self.close(order, ctx)?;
                        }
                    }
                }
                Frame::Body {
                    rule,
                    mut next,
                    waiting,
                } => {
                    if waiting {
                        let antecedent = self.graph.rule_ref(rule)?.antecedents[next];
                        match self.graph.state(antecedent)? {
                            VariableState::False => {
                                outcome = Some(Conjunction::Refuted);
                                continue;
                            }
                            VariableState::InProgress => {
                                self.graph.rule_mut(rule)?.blocked.push(antecedent)
                            }
                            VariableState::True | VariableState::Unknown => {}
                        }
                        next += 1;
                    }

                    match self.walk(rule, next)? {
                        Walk::Descend(at, antecedent) => {
                            stack.push(Frame::Body {
                                rule,
                                next: at,
                                waiting: true,
                            });
                            stack.push(self.open(antecedent, ctx)?);
                        }
                        Walk::Done(result) => outcome = Some(result),
                    }
                }
            }
        }
        Ok(())
    }

    /// Starts the `OR` step for `variable`: marks it in progress and gives it an order.
    fn open(&mut self, variable: VariableId, ctx: &mut ExecutionContext) -> Result<Frame> {
        ctx.enter()?;
        self.stats.goals_explored += 1;
        let order = ctx.next_order();
        let var = self.graph.var_mut(variable)?;
        var.assign(VariableState::InProgress);
        var.order = Some(order);
        trace!(
            target: log_targets::BACKWARD,
            "OR {} (order {})",
            var.name(),
            order
        );
        Ok(Frame::Goal {
            variable,
            order,
            next: 0,
            blocked: false,
        })
    }

    /// Ends the `OR` step of the variable with discovery order `order`.
    fn close(&mut self, order: usize, ctx: &mut ExecutionContext) -> Result<()> {
        ctx.leave();
        self.flush_if_root(order, ctx)
    }

    /// Walks the antecedents of `rule` from index `from` until one must be proved first.
    fn walk(&mut self, rule: RuleId, from: usize) -> Result<Walk> {
        let arity = self.graph.rule_ref(rule)?.antecedents.len();
        for i in from..arity {
            let antecedent = self.graph.rule_ref(rule)?.antecedents[i];
            match self.graph.state(antecedent)? {
                VariableState::True => {}
                VariableState::Unknown => return Ok(Walk::Descend(i, antecedent)),
                VariableState::False => return Ok(Walk::Done(Conjunction::Refuted)),
                VariableState::InProgress => self.graph.rule_mut(rule)?.blocked.push(antecedent),
            }
        }
        self.conclude(rule).map(Walk::Done)
    }

    /// Settles a rule whose antecedents are all true or in progress.
    fn conclude(&mut self, rule: RuleId) -> Result<Conjunction> {
        // A blocked antecedent may have been proved while later antecedents were searched;
        // its INVERSE already ran, so it must not be waited on.
        let blocked = std::mem::take(&mut self.graph.rule_mut(rule)?.blocked);
        let mut still_open = Vec::with_capacity(blocked.len());
        for antecedent in blocked {
            if self.graph.state(antecedent)? == VariableState::InProgress {
                still_open.push(antecedent);
            }
        }
        self.graph.rule_mut(rule)?.blocked = still_open.clone();

        if still_open.is_empty() {
            Ok(Conjunction::Satisfied)
        } else {
            Ok(Conjunction::Blocked(still_open))
        }
    }

    /// Parks `rule_id` on every antecedent it is blocked on and lowers the cycle root.
    fn suspend(
        &mut self,
        rule_id: RuleId,
        on: &[VariableId],
        ctx: &mut ExecutionContext,
    ) -> Result<()> {
        for &antecedent in on {
            let var = self.graph.var_mut(antecedent)?;
            var.pending.push(rule_id);
            let order = var.order.ok_or_else(|| {
                Error::inconsistent(format!(
                    "in-progress variable {} has no discovery order",
                    var.name()
                ))
            })?;
            ctx.lower_root(order);
        }
        self.graph.rule_mut(rule_id)?.counter = on.len();
        trace!(
            target: log_targets::BACKWARD,
            "Rule {} blocked on {} antecedent(s), root {:?}",
            rule_id,
            on.len(),
            ctx.root()
        );
        Ok(())
    }

    /// Propagates a freshly proved `variable` to the rules parked on it, and on through
    /// every consequent those rules prove.
    fn inverse(&mut self, variable: VariableId) -> Result<()> {
        let mut proved = vec![variable];
        while let Some(current) = proved.pop() {
            let pending = self.graph.var(current)?.pending.clone();
            for rule_id in pending {
                if !self.graph.rule_mut(rule_id)?.decrement()? {
                    continue;
                }
                let consequent = self.graph.rule_ref(rule_id)?.consequent;
                if self.graph.state(consequent)? == VariableState::True {
                    continue;
                }
                self.stats.wakeups += 1;
                self.graph.assign(consequent, VariableState::True)?;
                trace!(
                    target: log_targets::BACKWARD,
                    "{} proved by parked rule {}",
                    self.graph.var(consequent)?.name(),
                    rule_id
                );
                proved.push(consequent);
            }
        }
        Ok(())
    }

    /// Settles the open cycle if the variable of discovery order `order` is its root.
    fn flush_if_root(&mut self, order: usize, ctx: &mut ExecutionContext) -> Result<()> {
        if !ctx.is_root(order) {
            return Ok(());
        }
        let members = ctx.close_cycle();
        self.stats.flushes += 1;
        let mut refuted = 0;
        for member in members {
            if self.graph.state(member)? == VariableState::InProgress {
                self.graph.assign(member, VariableState::False)?;
                refuted += 1;
            }
        }
        self.stats.cycle_refutations += refuted;
        debug!(
            target: log_targets::BACKWARD,
            "Cycle rooted at order {} closed, {} variable(s) refuted",
            order,
            refuted
        );
        Ok(())
    }
}
