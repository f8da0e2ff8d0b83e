//! Resolver configuration.

use serde::{Deserialize, Serialize};

/// What the resolver does when a connection points back into its active path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Abort with `GraphError::CycleDetected`.
    #[default]
    Error,

    /// Log the cyclic edge and ignore it. The resulting order is best-effort
    /// for vertices inside the cycle.
    Skip,
}

impl std::fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Skip => "skip",
        };
        write!(f, "{}", s)
    }
}

/// Options for a [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    pub cycle_policy: CyclePolicy,
}

impl ResolveOptions {
    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }
}
