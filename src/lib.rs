//! Lazy, composable sequences over typed elements, finite or countably
//! infinite.
//!
//! A sequence is a DAG of views ([`node::LazyNode`]) rooted at a
//! materialized, possibly generator-fed core. Reading an index either
//! serves it from what is already materialized or drives the attached
//! [`generator::Generator`] until it is — derived views (`map`, `where_`,
//! `zip`, `append_value`, …) never own a generator of their own; they
//! read through whatever upstream generator is still live.
//!
//! Start at [`sequence::LazySequence`]; [`cardinal::Cardinal`] is the
//! length type every operation reasons about (`Finite(n)` or `Omega`).
//! [`tape::TapeMachine`] is a worked example: a Turing machine whose
//! execution trace is just another [`sequence::LazySequence`].
//!
//! No logger is installed by this crate — it emits through the [`log`]
//! facade, same as `examples/getsynth-synth`'s `synth-gen`. Binaries
//! embedding this crate wire up their own subscriber (`env_logger`, in
//! this repo's own tests and benchmarks).

pub mod cardinal;
pub mod config;
pub mod eager;
pub mod error;
pub mod generator;
pub mod node;
pub mod sequence;
pub mod stream;
pub mod tape;

/// Re-exports of the types most call sites need, so `use lazyseq::prelude::*;`
/// covers the common case — mirrors `synth_gen::prelude` in
/// `examples/getsynth-synth/gen/src/generator/mod.rs`.
pub mod prelude {
    pub use crate::cardinal::Cardinal;
    pub use crate::config::EngineConfig;
    pub use crate::eager::{EagerSequence, ImmutableEagerSequence};
    pub use crate::error::{Error, Result};
    pub use crate::generator::Generator;
    pub use crate::node::LazyNode;
    pub use crate::sequence::{concat, reduce, LazySequence};
    pub use crate::stream::{Deserializer, ReadStream, Serializer, WriteStream};
    pub use crate::tape::{Configuration, Direction, Tape, TapeMachine, Transition};
}
