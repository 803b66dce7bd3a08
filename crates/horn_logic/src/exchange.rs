//! The exchange record: a rule base, its facts and one question, as JSON.
//!
//! ```json
//! {
//!   "base_of_rules": ["P0∧P1 => P2", ["P2", "Q"]],
//!   "base_of_facts": ["P0", "P1"],
//!   "question": "Q"
//! }
//! ```
//!
//! Rules are accepted either as `"body => head"` strings or as `[body, head]` pairs, and
//! are always written back as strings. The keys `rules`/`base_of_rules` and
//! `facts`/`base_of_facts`/`facts base` are interchangeable on input.

use std::fs;
use std::path::Path;

use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::log_targets;
use crate::rule::RuleSpec;

/// A dataset handed to the engines: rules, facts and a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// The rule base, in evaluation order.
    #[serde(
        rename = "base_of_rules",
        alias = "rules",
        serialize_with = "serialize_rules",
        deserialize_with = "deserialize_rules"
    )]
    pub rules: Vec<RuleSpec>,
    /// The names asserted true before inference.
    #[serde(rename = "base_of_facts", alias = "facts", alias = "facts base")]
    pub facts: Vec<String>,
    /// The name of the proposition to prove.
    pub question: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleEntry {
    Pair([String; 2]),
    Text(String),
}

fn deserialize_rules<'de, D>(deserializer: D) -> std::result::Result<Vec<RuleSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<RuleEntry>::deserialize(deserializer)?
        .into_iter()
        .map(|entry| match entry {
            RuleEntry::Pair([body, head]) => Ok(RuleSpec::new(body, head)),
            RuleEntry::Text(text) => RuleSpec::parse(&text).map_err(D::Error::custom),
        })
        .collect()
}

fn serialize_rules<S>(rules: &[RuleSpec], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(rules.iter().map(ToString::to_string))
}

impl ExchangeRecord {
    /// Creates a record from its parts.
    pub fn new<R, F>(rules: R, facts: F, question: impl Into<String>) -> Self
    where
        R: IntoIterator<Item = RuleSpec>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            rules: rules.into_iter().collect(),
            facts: facts.into_iter().map(Into::into).collect(),
            question: question.into(),
        }
    }

    /// Parses a record from JSON text.
    ///
    /// # Returns
    ///
    /// The record, [`Error::MalformedInput`] if the JSON is well formed but a key is missing
    /// or a value has the wrong shape, or [`Error::Serialization`] if the text is not JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            if e.is_data() {
                Error::malformed(e.to_string())
            } else {
                e.into()
            }
        })
    }

    /// Reads and parses a record file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let record = Self::from_json(&text)?;
        debug!(
            target: log_targets::EXCHANGE,
            "Loaded {} rules and {} facts from {}",
            record.rules.len(),
            record.facts.len(),
            path.display()
        );
        Ok(record)
    }

    /// Serializes the record as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the record to `path` as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Builds the [`Graph`] for this record.
    pub fn link(&self) -> Result<Graph> {
        Graph::link(&self.rules, &self.facts, &self.question)
    }
}
