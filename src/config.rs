//! Engine-wide knobs.
//!
//! The engine is otherwise unconfigurable by design — there is no config
//! file format to parse, mirroring the crate's narrow env-var surface
//! rather than a general settings layer (out of scope, same reasoning as
//! excluding a CLI front-end). The two knobs here resolve Open Questions
//! that `spec.md` deliberately leaves for the implementer.

use std::env;

/// Name of the env var that overrides [`EngineConfig::max_rule_attempts`].
pub const MAX_RULE_ATTEMPTS_VAR: &str = "LAZYSEQ_MAX_RULE_ATTEMPTS";

/// Engine-wide configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Bound on how many candidates [`crate::generator::Generator::next`]
    /// will draw from its rule before giving up on a run of removed
    /// values. `None` (the default) preserves the spec's unbounded
    /// contract — a rule that never produces a non-removed value loops
    /// forever, as documented.
    pub max_rule_attempts: Option<u32>,

    /// Whether [`crate::node::WhereNode::length`] memoizes the predicate
    /// evaluations it performs while counting matches, so a later `get`
    /// does not re-scan the prefix `length` already covered. Defaults to
    /// `true`; see `DESIGN.md` for the rationale.
    pub where_memoize: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_rule_attempts: None,
            where_memoize: true,
        }
    }
}

impl EngineConfig {
    /// Reads [`MAX_RULE_ATTEMPTS_VAR`] from the environment (parsed as
    /// `u32`, `0` or unset meaning "unbounded") and otherwise takes the
    /// defaults. Malformed values are logged and ignored rather than
    /// treated as a hard error — configuration by environment variable is
    /// advisory, not load-bearing.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(raw) = env::var(MAX_RULE_ATTEMPTS_VAR) {
            match raw.parse::<u32>() {
                Ok(0) => cfg.max_rule_attempts = None,
                Ok(n) => cfg.max_rule_attempts = Some(n),
                Err(_) => {
                    log::warn!(
                        "ignoring malformed {MAX_RULE_ATTEMPTS_VAR}={raw:?}: not a u32"
                    );
                }
            }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded_and_memoizing() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_rule_attempts, None);
        assert!(cfg.where_memoize);
    }
}
