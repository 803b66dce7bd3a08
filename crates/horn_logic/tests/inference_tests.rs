//! Integration tests for the forward and backward engines
//!
//! Every scenario is evaluated by both strategies on the same graph (reset in between),
//! and the two answers must agree.

use horn_logic::{
    backward, backward_with_stats, forward, forward_with_stats, EngineConfig, EngineStats, Error,
    Graph, InferenceMode, Reasoner, RuleSpec, VariableState,
};

fn graph(rules: &[&str], facts: &[&str], question: &str) -> Graph {
    let specs: Vec<_> = rules.iter().map(|r| RuleSpec::parse(r).unwrap()).collect();
    Graph::link(&specs, facts, question).unwrap()
}

/// Runs both strategies and returns their common answer.
fn decide(rules: &[&str], facts: &[&str], question: &str) -> bool {
    let mut g = graph(rules, facts, question);
    let forward_answer = forward(&mut g).unwrap();
    g.reset();
    let backward_answer = backward(&mut g).unwrap();
    assert_eq!(
        forward_answer, backward_answer,
        "strategies disagree on {:?} with facts {:?}",
        rules, facts
    );
    forward_answer
}

// ============================================================================
// Core Properties
// ============================================================================

#[test]
fn test_direct_derivation() {
    assert!(decide(&["A∧B => Q"], &["A", "B"], "Q"));
}

#[test]
fn test_missing_fact() {
    assert!(!decide(&["A∧B => Q"], &["A"], "Q"));
}

#[test]
fn test_positively_grounded_cycle() {
    assert!(decide(&["A => B", "B => C", "C => A", "C => Q"], &["A"], "Q"));
}

#[test]
fn test_negatively_resolved_cycle() {
    assert!(!decide(&["B => A"], &["A", "B"], "Q"));
}

#[test]
fn test_ungrounded_self_dependent_cycle() {
    assert!(!decide(&["A => B", "B => C", "C => A", "C => Q"], &[], "Q"));
    assert!(!decide(&["Q => Q"], &["A"], "Q"));
}

/// A rule whose antecedent is derived along several paths fires once.
#[test]
fn test_single_firing() {
    let mut g = graph(
        &["A => B", "C => B", "B∧D => E", "E => Q"],
        &["A", "C", "D"],
        "Q",
    );
    let mut stats = EngineStats::default();
    assert!(forward_with_stats(&mut g, &mut stats).unwrap());
    // B is derived twice, but B∧D => E still fires once.
    assert_eq!(stats.rules_fired, 4);
}

#[test]
fn test_reset_idempotence() {
    let mut g = graph(
        &["A∧B => C", "B∧C => A", "E => Q", "C∧D => E"],
        &["A", "B", "D"],
        "Q",
    );
    let first = backward(&mut g).unwrap();
    let first_states = g.states();

    g.reset();
    assert!(g.states().values().all(|s| *s == VariableState::Unknown));
    assert!(g.variables().all(|(_, v)| v.pending().is_empty() && !v.is_used()));

    let second = backward(&mut g).unwrap();
    assert_eq!(first, second);
    assert_eq!(first_states, g.states());
}

#[test]
fn test_determinism_across_fresh_graphs() {
    let rules = ["A1∧B => C", "C∧D => E", "E => A1", "B => J", "J∧K => B", "A2 => D"];
    let facts = ["A2"];

    let run = || {
        let mut g = graph(&rules, &facts, "E");
        let answer = backward(&mut g).unwrap();
        (answer, g.states())
    };
    assert_eq!(run(), run());
}

// ============================================================================
// Deduction Scenarios
// ============================================================================

#[test]
fn test_simple_deductions() {
    assert!(decide(&["A∧B => Q"], &["A", "B"], "Q"));
    assert!(decide(&["A∧B => D", "C => D"], &["A", "B"], "D"));
    assert!(decide(&["A∧B => Q", "C => Q", "D => B"], &["A", "D"], "Q"));
    assert!(decide(&["A∧B => C", "C∧D => Q"], &["A", "B", "D"], "Q"));
    assert!(decide(&["A∧B∧C => Q", "A∧B => C"], &["A", "B"], "Q"));
    assert!(decide(&["A => Q", "B∧C => Q", "D => Q"], &["B", "C"], "Q"));
}

#[test]
fn test_cycles() {
    assert!(decide(&["A => B", "B => C", "C => A", "C => Q"], &["A"], "Q"));
    assert!(decide(
        &["A∧B => C", "B∧C => A", "E => Q", "C∧D => E"],
        &["A", "B", "D"],
        "Q"
    ));
}

#[test]
fn test_multiple_cycles() {
    let rules = [
        "A1∧B => C",
        "C∧D => E",
        "E∧F => G",
        "G => A1",
        "G∧H => I",
        "I => Q",
        "J∧K => B",
        "B => J",
        "K∧L => M",
        "M∧Q => K",
        "A2 => L",
        "L∧I => D",
    ];
    assert!(decide(&rules, &["A2", "E", "F", "H"], "Q"));
    assert!(!decide(&rules, &["A2", "E", "F"], "Q"));
}

#[test]
fn test_non_deducible() {
    assert!(!decide(&["A∧B => C"], &["A", "B"], "Q"));
    assert!(!decide(
        &["A∧B => C", "C∧D => E", "E∧F => Q"],
        &["A", "B", "D"],
        "Q"
    ));
    assert!(!decide(
        &["A∧B => C", "C∧D => E", "E∧F => Q", "B => A"],
        &["A", "B", "D"],
        "Q"
    ));
}

// ============================================================================
// Shared Cycle Membership
// ============================================================================

/// Two cycles share B; the inner one is grounded through the fact D.
#[test]
fn test_overlapping_cycles_grounded_through_unrelated_path() {
    let rules = ["B => A", "A => B", "C => B", "B => C", "D => C", "A => Q"];
    let mut g = graph(&rules, &["D"], "Q");
    assert!(backward(&mut g).unwrap());
    for name in ["A", "B", "C", "Q"] {
        assert_eq!(g.state_of(name), Some(VariableState::True), "{}", name);
    }
    assert!(decide(&rules, &["D"], "Q"));
}

/// Members woken true by a parked rule survive the flush of their cycle.
#[test]
fn test_flush_keeps_members_proved_meanwhile() {
    // A is left in progress waiting on X, then woken when C => X proves X.
    let mut g = graph(&["A => X", "C => X", "X => A", "X => Q"], &["C"], "Q");
    let mut stats = EngineStats::default();
    assert!(backward_with_stats(&mut g, &mut stats, None).unwrap());
    assert_eq!(g.state_of("A"), Some(VariableState::True));
    assert_eq!(g.state_of("X"), Some(VariableState::True));
    assert_eq!(stats.wakeups, 1);
    assert_eq!(stats.flushes, 1);
    assert_eq!(stats.cycle_refutations, 0);
}

/// Overlapping cycles with no grounding are all refuted, and nothing is left in progress.
#[test]
fn test_overlapping_ungrounded_cycles_are_refuted() {
    let rules = ["A => Q", "B => A", "C => B", "A∧C => B", "B => C", "Q => C"];
    let mut g = graph(&rules, &[], "Q");
    assert!(!backward(&mut g).unwrap());
    assert!(g
        .states()
        .values()
        .all(|state| *state == VariableState::False));
}

// ============================================================================
// Reasoner
// ============================================================================

#[test]
fn test_reasoner_cross_checks_strategies() {
    let mut g = graph(&["A => B", "B => A", "B => Q"], &["A"], "Q");
    let mut reasoner = Reasoner::new(EngineConfig::default());
    let report = reasoner.run(&mut g).unwrap();
    assert_eq!(report.mode, InferenceMode::Both);
    assert!(report.answer());
}

#[test]
fn test_reasoner_reuses_a_graph() {
    let mut g = graph(&["A∧B => Q"], &["A", "B"], "Q");
    let mut reasoner = Reasoner::new(EngineConfig::backward());
    for _ in 0..3 {
        assert!(reasoner.prove(&mut g).unwrap());
    }
    assert_eq!(reasoner.stats().runs, 3);
}

#[test]
fn test_malformed_rules_are_rejected() {
    assert!(matches!(RuleSpec::parse("A ∧ B"), Err(Error::MalformedInput(_))));
    let bad = [RuleSpec::new("A∧", "Q")];
    assert!(matches!(
        Graph::link(&bad, &["A"], "Q"),
        Err(Error::MalformedInput(_))
    ));
}
