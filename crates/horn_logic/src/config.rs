//! Configuration for the [`Reasoner`](crate::Reasoner).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Specifies which inference strategy a [`Reasoner`](crate::Reasoner) runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMode {
    /// Data-driven: propagate from the facts until the question is derived or nothing changes.
    Forward,
    /// Goal-driven: search from the question toward the facts.
    Backward,
    /// Run both strategies on the same graph, resetting in between, and cross-check them.
    #[default]
    Both,
}

impl InferenceMode {
    /// Returns `true` if this mode runs forward chaining.
    pub fn runs_forward(&self) -> bool {
        matches!(self, InferenceMode::Forward | InferenceMode::Both)
    }

    /// Returns `true` if this mode runs backward chaining.
    pub fn runs_backward(&self) -> bool {
        matches!(self, InferenceMode::Backward | InferenceMode::Both)
    }

    /// Returns the lowercase name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceMode::Forward => "forward",
            InferenceMode::Backward => "backward",
            InferenceMode::Both => "both",
        }
    }
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InferenceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(InferenceMode::Forward),
            "backward" => Ok(InferenceMode::Backward),
            "both" => Ok(InferenceMode::Both),
            other => Err(Error::malformed(format!("unknown inference mode `{}`", other))),
        }
    }
}

/// Configuration of one [`Reasoner`](crate::Reasoner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The strategy (or strategies) to run.
    pub mode: InferenceMode,
    /// Bound on the nesting of backward `OR` calls; `None` means unbounded.
    pub max_depth: Option<usize>,
    /// Reset the graph before each run, so a graph can be handed over after a previous run.
    pub reset_before_run: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: InferenceMode::Both,
            max_depth: None,
            reset_before_run: true,
        }
    }
}

impl EngineConfig {
    /// Returns a configuration that runs forward chaining only.
    pub fn forward() -> Self {
        Self {
            mode: InferenceMode::Forward,
            ..Self::default()
        }
    }

    /// Returns a configuration that runs backward chaining only.
    pub fn backward() -> Self {
        Self {
            mode: InferenceMode::Backward,
            ..Self::default()
        }
    }

    /// Sets the inference mode.
    pub fn with_mode(mut self, mode: InferenceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the bound on the nesting of backward goals.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets whether the graph is reset before each run.
    pub fn with_reset_before_run(mut self, reset: bool) -> Self {
        self.reset_before_run = reset;
        self
    }
}
