//! Property-based tests: backward chaining agrees with forward chaining on random rule bases.
//!
//! Small alphabets make cycles, shared cycle members and repeated antecedents common.

use horn_logic::{backward, forward, Graph, RuleSpec, VariableState};
use proptest::prelude::*;

/// A rule as antecedent indices and a consequent index over `P0..P(size-1)`.
type RuleDesc = (Vec<u8>, u8);

/// Rules, facts and question of one random case.
type Case = (Vec<RuleDesc>, Vec<u8>, u8);

fn arb_rule(size: u8) -> impl Strategy<Value = RuleDesc> {
    (proptest::collection::vec(0..size, 1..=3), 0..size)
}

fn arb_case() -> impl Strategy<Value = Case> {
    (2..8u8).prop_flat_map(|size| {
        (
            proptest::collection::vec(arb_rule(size), 0..14),
            proptest::collection::vec(0..size, 0..3),
            0..size,
        )
    })
}

fn name(index: u8) -> String {
    format!("P{}", index)
}

fn build(rules: &[RuleDesc], facts: &[u8], question: &str) -> Graph {
    let specs: Vec<RuleSpec> = rules
        .iter()
        .map(|(body, head)| RuleSpec::conjunction(body.iter().copied().map(name), name(*head)))
        .collect();
    let facts: Vec<String> = facts.iter().copied().map(name).collect();
    Graph::link(&specs, &facts, question).unwrap()
}

/// Whether forward chaining derives `question` from scratch.
fn derivable(rules: &[RuleDesc], facts: &[u8], question: &str) -> bool {
    forward(&mut build(rules, facts, question)).unwrap()
}

proptest! {
    #[test]
    fn prop_backward_agrees_with_forward((rules, facts, question) in arb_case()) {
        let mut graph = build(&rules, &facts, &name(question));
        let forward_answer = forward(&mut graph).unwrap();
        graph.reset();
        let backward_answer = backward(&mut graph).unwrap();
        prop_assert_eq!(forward_answer, backward_answer);
    }

    #[test]
    fn prop_backward_leaves_nothing_in_progress((rules, facts, question) in arb_case()) {
        let mut graph = build(&rules, &facts, &name(question));
        backward(&mut graph).unwrap();
        prop_assert!(graph
            .states()
            .values()
            .all(|state| *state != VariableState::InProgress));
    }

    /// Every variable the backward search settles, not just the question, is settled right.
    #[test]
    fn prop_every_settled_variable_is_correct((rules, facts, question) in arb_case()) {
        let mut graph = build(&rules, &facts, &name(question));
        backward(&mut graph).unwrap();

        for (variable, state) in graph.states() {
            match state {
                VariableState::True => prop_assert!(
                    derivable(&rules, &facts, &variable),
                    "{} was proved but is not derivable",
                    variable
                ),
                VariableState::False => prop_assert!(
                    !derivable(&rules, &facts, &variable),
                    "{} was refuted but is derivable",
                    variable
                ),
                _ => {}
            }
        }
    }

    #[test]
    fn prop_reset_reproduces_states((rules, facts, question) in arb_case()) {
        let mut graph = build(&rules, &facts, &name(question));
        backward(&mut graph).unwrap();
        let first = graph.states();
        graph.reset();
        backward(&mut graph).unwrap();
        prop_assert_eq!(first, graph.states());
    }
}
