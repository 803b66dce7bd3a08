//! Synthetic rule bases for benchmarking the engines.
//!
//! Each family is parameterised by a width `k` and, where relevant, a depth `n`, and is
//! built so the question is derivable:
//!
//! | Family | Shape | Facts | Question |
//! |---|---|---|---|
//! | 1 | `k` independent chains of length `n` | every chain head | end of the last chain |
//! | 2 | `n` alternating fan-out/fan-in layers of width `k` | `P0` | last layer's node |
//! | 3 | complete digraph over `P0..Pk`, shuffled | `P0` | `Pk` |
//! | 4 | `P(i+1)∧…∧Pk => Pi` for `1 ≤ i < k` | `Pk` | `P1` |
//! | 5 | `k`-ary tree of depth `n` | the root | the last leaf |
//!
//! Family 3 also has a worst-case ordering that lists rules by descending source.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::exchange::ExchangeRecord;
use crate::rule::RuleSpec;

/// The seed used when a caller does not pick one.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// A benchmark family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Family 1: independent chains.
    Chains,
    /// Family 2: alternating fan-out/fan-in layers.
    Layers,
    /// Family 3: a complete digraph.
    Complete,
    /// Family 4: a cascade of ever shorter conjunctions.
    Cascade,
    /// Family 5: a `k`-ary tree.
    Tree,
}

impl Family {
    /// Maps the family number (1 to 5) to a family.
    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            1 => Ok(Family::Chains),
            2 => Ok(Family::Layers),
            3 => Ok(Family::Complete),
            4 => Ok(Family::Cascade),
            5 => Ok(Family::Tree),
            other => Err(Error::malformed(format!(
                "unknown benchmark family {} (expected 1 to 5)",
                other
            ))),
        }
    }

    /// Returns the family number.
    pub fn number(&self) -> u8 {
        match self {
            Family::Chains => 1,
            Family::Layers => 2,
            Family::Complete => 3,
            Family::Cascade => 4,
            Family::Tree => 5,
        }
    }

    /// Generates a record of this family.
    ///
    /// # Arguments
    ///
    /// * `k` - The width parameter.
    /// * `n` - The depth parameter; ignored by families 3 and 4.
    /// * `seed` - Seeds the rule shuffle of family 3.
    /// * `worst` - Use the worst-case rule ordering; only family 3 has one.
    pub fn generate(&self, k: usize, n: usize, seed: u64, worst: bool) -> Result<ExchangeRecord> {
        if worst && *self != Family::Complete {
            return Err(Error::malformed(format!(
                "family {} has no worst-case ordering",
                self.number()
            )));
        }
        match self {
            Family::Chains => chains(k, n),
            Family::Layers => layers(k, n),
            Family::Complete if worst => complete_worst(k),
            Family::Complete => complete(k, seed),
            Family::Cascade => cascade(k),
            Family::Tree => tree(k, n),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "family {}", self.number())
    }
}

fn at_least(name: &str, value: usize, min: usize) -> Result<()> {
    if value < min {
        return Err(Error::malformed(format!(
            "parameter {} must be at least {}, got {}",
            name, min, value
        )));
    }
    Ok(())
}

/// Family 1: `k` chains `P0.i => P1.i => … => Pn.i`.
pub fn chains(k: usize, n: usize) -> Result<ExchangeRecord> {
    at_least("k", k, 1)?;
    at_least("n", n, 1)?;
    let mut rules = Vec::with_capacity(k * n);
    for i in 0..k {
        for j in 0..n {
            rules.push(RuleSpec::new(format!("P{}.{}", j, i), format!("P{}.{}", j + 1, i)));
        }
    }
    let facts = rules
        .iter()
        .step_by(n)
        .map(|rule| rule.antecedents.clone())
        .collect::<Vec<_>>();
    Ok(ExchangeRecord::new(rules, facts, format!("P{}.{}", n, k - 1)))
}

/// Family 2: even layers fan `Pm` out to `Pm.0 … Pm.(k-1)`, odd layers fan them back in
/// to `P(m+1)`.
pub fn layers(k: usize, n: usize) -> Result<ExchangeRecord> {
    at_least("k", k, 1)?;
    at_least("n", n, 1)?;
    let mut rules = Vec::with_capacity(k * n);
    for j in 0..n {
        for i in 0..k {
            if j % 2 == 0 {
                rules.push(RuleSpec::new(format!("P{}", j / 2), format!("P{}.{}", j / 2, i)));
            } else {
                rules.push(RuleSpec::new(
                    format!("P{}.{}", (j - 1) / 2, i),
                    format!("P{}", (j + 1) / 2),
                ));
            }
        }
    }
    let question = if n % 2 == 0 {
        format!("P{}", n / 2)
    } else {
        format!("P{}.{}", (n - 1) / 2, k - 1)
    };
    Ok(ExchangeRecord::new(rules, ["P0"], question))
}

fn complete_rules(sources: impl Iterator<Item = usize>, k: usize) -> Vec<RuleSpec> {
    let mut rules = Vec::new();
    for i in sources {
        for j in (0..=k).filter(|&j| j != i) {
            rules.push(RuleSpec::new(format!("P{}", i), format!("P{}", j)));
        }
    }
    rules
}

/// Family 3: `Pi => Pj` for every `i < k`, `j ≤ k`, `i ≠ j`, shuffled with `seed`.
pub fn complete(k: usize, seed: u64) -> Result<ExchangeRecord> {
    at_least("k", k, 1)?;
    let mut rules = complete_rules(0..k, k);
    let mut rng = StdRng::seed_from_u64(seed);
    rules.shuffle(&mut rng);
    Ok(ExchangeRecord::new(rules, ["P0"], format!("P{}", k)))
}

/// Family 3, worst-case ordering: every `Pi => Pj`, `i ≠ j`, sources from `Pk` down to `P0`.
pub fn complete_worst(k: usize) -> Result<ExchangeRecord> {
    at_least("k", k, 1)?;
    let rules = complete_rules((0..=k).rev(), k);
    Ok(ExchangeRecord::new(rules, ["P0"], format!("P{}", k)))
}

/// Family 4: `P(i+1)∧…∧Pk => Pi` for `1 ≤ i < k`.
pub fn cascade(k: usize) -> Result<ExchangeRecord> {
    at_least("k", k, 2)?;
    let rules = (1..k)
        .map(|i| {
            RuleSpec::conjunction((i + 1..=k).map(|j| format!("P{}", j)), format!("P{}", i))
        })
        .collect::<Vec<_>>();
    Ok(ExchangeRecord::new(rules, [format!("P{}", k)], "P1"))
}

/// Family 5: node `Pi.m` has children `P(i+1).(k·m) … P(i+1).(k·m + k - 1)`, for depths
/// `1 ≤ i ≤ n`.
pub fn tree(k: usize, n: usize) -> Result<ExchangeRecord> {
    at_least("k", k, 1)?;
    at_least("n", n, 1)?;
    let exponent = u32::try_from(n).map_err(|_| Error::malformed("tree depth is too large"))?;
    let leaves = k
        .checked_pow(exponent)
        .ok_or_else(|| Error::malformed(format!("a {}-ary tree of depth {} is too large", k, n)))?;

    let mut rules = Vec::new();
    let mut width = 1;
    for i in 1..=n {
        for parent in 0..width {
            for l in 0..k {
                rules.push(RuleSpec::new(
                    format!("P{}.{}", i, parent),
                    format!("P{}.{}", i + 1, parent * k + l),
                ));
            }
        }
        width *= k;
    }
    Ok(ExchangeRecord::new(
        rules,
        ["P1.0"],
        format!("P{}.{}", n + 1, leaves - 1),
    ))
}
