//! The reasoner facade: strategy selection, cross-checking, statistics and timing.
//!
//! [`forward`](crate::forward) and [`backward`](crate::backward) are plain functions over a
//! [`Graph`]. A [`Reasoner`] wraps them with an [`EngineConfig`]: it resets the graph when
//! asked, runs one or both strategies, measures wall-clock time, accumulates
//! [`EngineStats`] and, in [`InferenceMode::Both`], refuses to report an answer the two
//! strategies disagree on.

use std::time::{Duration, Instant};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::backward::backward_with_stats;
use crate::config::{EngineConfig, InferenceMode};
use crate::error::{Error, Result};
use crate::forward::forward_with_stats;
use crate::graph::Graph;
use crate::log_targets;

/// Counters describing the work done by the engines.
///
/// Forward chaining updates the first two fields, backward chaining the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// The number of variables popped from the forward queue and expanded.
    pub variables_expanded: usize,
    /// The number of rules whose counter reached zero during forward chaining.
    pub rules_fired: usize,
    /// The number of backward `OR` calls.
    pub goals_explored: usize,
    /// The number of backward `AND` calls.
    pub rules_evaluated: usize,
    /// The number of consequents proved by a parked rule being woken.
    pub wakeups: usize,
    /// The number of cycles closed at their root.
    pub flushes: usize,
    /// The number of variables set false by a flush.
    pub cycle_refutations: usize,
    /// The deepest nesting of backward `OR` calls.
    pub deepest: usize,
    /// The number of strategy runs these counters cover.
    pub runs: usize,
}

impl EngineStats {
    /// Adds `other` into `self`; `deepest` keeps the maximum.
    pub fn merge(&mut self, other: &EngineStats) {
        self.variables_expanded += other.variables_expanded;
        self.rules_fired += other.rules_fired;
        self.goals_explored += other.goals_explored;
        self.rules_evaluated += other.rules_evaluated;
        self.wakeups += other.wakeups;
        self.flushes += other.flushes;
        self.cycle_refutations += other.cycle_refutations;
        self.deepest = self.deepest.max(other.deepest);
        self.runs += other.runs;
    }
}

/// The answer and duration of one strategy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    /// Whether the question was derived.
    pub proved: bool,
    /// Wall-clock time of the run, pre-processing included.
    pub elapsed: Duration,
}

/// The result of [`Reasoner::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// The mode the run was made in.
    pub mode: InferenceMode,
    /// The name of the question.
    pub question: String,
    /// The forward outcome, if forward chaining ran.
    pub forward: Option<StrategyOutcome>,
    /// The backward outcome, if backward chaining ran.
    pub backward: Option<StrategyOutcome>,
    /// Counters for this run only.
    pub stats: EngineStats,
}

impl RunReport {
    /// Returns whether the question was derived.
    ///
    /// When both strategies ran they agree, otherwise the run would have failed.
    pub fn answer(&self) -> bool {
        self.forward
            .or(self.backward)
            .map(|outcome| outcome.proved)
            .unwrap_or(false)
    }
}

/// The result of [`Reasoner::time`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// The number of runs averaged over.
    pub repeats: u32,
    /// Whether the question was derived.
    pub answer: bool,
    /// Mean forward duration, if forward chaining ran.
    pub forward_mean: Option<Duration>,
    /// Mean backward duration, if backward chaining ran.
    pub backward_mean: Option<Duration>,
}

/// Runs the configured strategies over graphs and keeps cumulative statistics.
#[derive(Debug, Clone, Default)]
pub struct Reasoner {
    config: EngineConfig,
    stats: EngineStats,
}

impl Reasoner {
    /// Creates a `Reasoner` with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            stats: EngineStats::default(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the statistics accumulated over every run so far.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Resets the accumulated statistics.
    pub fn clear_stats(&mut self) {
        self.stats = EngineStats::default();
    }

    /// Runs the configured strategies on `graph`.
    ///
    /// In [`InferenceMode::Both`] forward chaining runs first, then the graph is reset and
    /// backward chaining runs; the graph is left in its post-backward condition.
    ///
    /// # Arguments
    ///
    /// * `graph` - The graph to evaluate. It must be fresh or reset unless
    ///   `reset_before_run` is set.
    ///
    /// # Returns
    ///
    /// A [`RunReport`], or [`Error::Inconsistent`] if the two strategies disagree, or any
    /// error raised by a strategy.
    pub fn run(&mut self, graph: &mut Graph) -> Result<RunReport> {
        let mode = self.config.mode;
        let question = graph.var(graph.question())?.name().to_string();
        let mut stats = EngineStats::default();

        let forward = if mode.runs_forward() {
            if self.config.reset_before_run {
                graph.reset();
            }
            let start = Instant::now();
            let proved = forward_with_stats(graph, &mut stats)?;
            stats.runs += 1;
            Some(StrategyOutcome {
                proved,
                elapsed: start.elapsed(),
            })
        } else {
            None
        };

        let backward = if mode.runs_backward() {
            if self.config.reset_before_run || forward.is_some() {
                graph.reset();
            }
            let start = Instant::now();
            let proved = backward_with_stats(graph, &mut stats, self.config.max_depth)?;
            stats.runs += 1;
            Some(StrategyOutcome {
                proved,
                elapsed: start.elapsed(),
            })
        } else {
            None
        };

        if let (Some(f), Some(b)) = (forward, backward) {
            if f.proved != b.proved {
                return Err(Error::inconsistent(format!(
                    "forward answered {} but backward answered {} for {}",
                    f.proved, b.proved, question
                )));
            }
        }

        self.stats.merge(&stats);
        let report = RunReport {
            mode,
            question,
            forward,
            backward,
            stats,
        };
        debug!(
            target: log_targets::ENGINE,
            "Run in {} mode: {} is {}",
            mode,
            report.question,
            if report.answer() { "derivable" } else { "not derivable" }
        );
        Ok(report)
    }

    /// Runs the configured strategies and returns only the answer.
    pub fn prove(&mut self, graph: &mut Graph) -> Result<bool> {
        Ok(self.run(graph)?.answer())
    }

    /// Runs the configured strategies `repeats` times, resetting in between, and reports
    /// the mean duration of each strategy.
    ///
    /// # Returns
    ///
    /// The [`Timing`], or [`Error::MalformedInput`] if `repeats` is zero.
    pub fn time(&mut self, graph: &mut Graph, repeats: u32) -> Result<Timing> {
        if repeats == 0 {
            return Err(Error::malformed("repeat count must be positive"));
        }

        let mut forward_total: Option<Duration> = None;
        let mut backward_total: Option<Duration> = None;
        let mut answer = false;
        for _ in 0..repeats {
            graph.reset();
            let report = self.run(graph)?;
            answer = report.answer();
            if let Some(outcome) = report.forward {
                *forward_total.get_or_insert(Duration::ZERO) += outcome.elapsed;
            }
            if let Some(outcome) = report.backward {
                *backward_total.get_or_insert(Duration::ZERO) += outcome.elapsed;
            }
        }

        let timing = Timing {
            repeats,
            answer,
            forward_mean: forward_total.map(|total| total / repeats),
            backward_mean: backward_total.map(|total| total / repeats),
        };
        info!(
            target: log_targets::ENGINE,
            "Timed {} runs: forward {:?}, backward {:?}",
            repeats,
            timing.forward_mean,
            timing.backward_mean
        );
        Ok(timing)
    }
}
