//! Crate-wide error type.
//!
//! Every fallible operation in this crate returns [`Result`]; nothing in the
//! public API panics on caller-reachable bad input (bugs inside the crate
//! itself are a different matter and are asserted against in debug builds).

use thiserror::Error;

/// The failure kinds a lazy-sequence operation can surface.
///
/// Names are illustrative, matching the error kinds enumerated in the
/// design: index errors, finiteness violations, missing generators,
/// malformed arguments, stream exhaustion, and base-type mismatches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An index was negative (impossible in `usize`, but the variant stays
    /// named for the source concept) or past the end of a finite sequence.
    #[error("index {index} out of range for sequence of length {length}")]
    OutOfRange { index: usize, length: String },

    /// An operation that requires a finite length was called on an
    /// `Omega`-length sequence.
    #[error("operation requires a finite length: {context}")]
    InfiniteNotAllowed { context: &'static str },

    /// `get` ran past the materialized prefix with no generator attached,
    /// or `Generator::next` was called with empty queues and no rule.
    #[error("no generator attached: {context}")]
    NoGenerator { context: &'static str },

    /// A caller-supplied argument was structurally invalid (null stream,
    /// negative count, missing serializer, …).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A read was attempted on a [`crate::stream::ReadStream`] after
    /// `close()` was called. Reaching the end of a still-open finite
    /// source is not an error — `read_next` reports that cleanly as
    /// `Ok(None)`, matching the original's `IsEndOfStream` query being a
    /// separate, non-throwing call from `Read`.
    #[error("end of stream")]
    EndOfStream,

    /// A `Concat` peer or seed sequence did not expose the indexable
    /// prefix the operation expected.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A generator's rule produced only removed candidates for more than
    /// the configured attempt bound. The bare engine never imposes this
    /// bound on its own (an unbounded rule is a valid, if risky, contract);
    /// it only fires when [`crate::config::EngineConfig::max_rule_attempts`]
    /// opts in.
    #[error("rule produced no accepted value within {attempts} attempts")]
    NonTerminatingRule { attempts: u32 },

    /// The underlying reader/writer a stream wraps failed. Carries the
    /// formatted source error rather than the `io::Error` itself, so
    /// `Error` can stay `Clone + PartialEq`.
    #[error("io error: {0}")]
    Io(String),

    /// A stream's element failed to (de)serialize.
    #[error("codec error: {0}")]
    Codec(String),
}

/// Shorthand for `Result<T, Error>`, used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_mention_context() {
        let e = Error::OutOfRange {
            index: 3,
            length: "2".into(),
        };
        assert!(e.to_string().contains('3'));

        let e = Error::NonTerminatingRule { attempts: 5 };
        assert!(e.to_string().contains('5'));
    }
}
