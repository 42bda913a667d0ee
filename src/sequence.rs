//! [`LazySequence`]: the handle callers actually hold. Pairs a
//! [`LazyNode`] DAG root with an optional, shared, interior-mutable
//! [`Generator`] that can extend that root's leaf cache on demand.
//!
//! Grounded on `examples/original_source/LazySequence.h`'s
//! `LazySequence<T>` wrapper (root pointer + optional generator pointer)
//! and its free `Concat()` function, which this module's [`concat`]
//! reproduces branch-for-branch.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cardinal::Cardinal;
use crate::config::EngineConfig;
use crate::eager::EagerSequence;
use crate::error::{Error, Result};
use crate::generator::{Generator, Rule};
use crate::node::LazyNode;

/// A lazy, possibly-infinite, possibly-derived sequence.
///
/// The generator is held behind `Rc<RefCell<_>>` rather than owned
/// outright: `concat`'s "root is already infinite, return it unchanged"
/// and "prefix is empty, return the other operand unchanged" branches
/// hand back an aliased handle that must still be able to drive the
/// *same* generator the original handle would have, not a frozen copy of
/// it.
pub struct LazySequence<T> {
    root: LazyNode<T>,
    gen: Option<Rc<RefCell<Generator<T>>>>,
}

impl<T> Clone for LazySequence<T> {
    fn clone(&self) -> Self {
        LazySequence {
            root: self.root.clone(),
            gen: self.gen.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> LazySequence<T> {
    pub fn empty() -> Self {
        LazySequence {
            root: LazyNode::core_empty(),
            gen: None,
        }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        LazySequence {
            root: LazyNode::core_from_vec(items),
            gen: None,
        }
    }

    pub fn from_eager(seq: &EagerSequence<T>) -> Self {
        LazySequence {
            root: LazyNode::core_from_eager(seq),
            gen: None,
        }
    }

    /// A sequence seeded with `seed` and extended on demand by `rule`.
    pub fn generated(rule: Rule<T>, seed: Vec<T>) -> Self {
        let root = LazyNode::core_with_rule(rule.clone(), seed);
        let cache = root
            .as_core()
            .expect("core_with_rule always builds a Core")
            .borrow()
            .cache_handle();
        let gen = Generator::with_rule(cache, rule);
        LazySequence {
            root,
            gen: Some(Rc::new(RefCell::new(gen))),
        }
    }

    pub fn length(&self) -> Cardinal {
        self.root.length()
    }

    pub fn is_empty(&self) -> bool {
        self.root.length() == Cardinal::Finite(0)
    }

    pub fn has_generator(&self) -> bool {
        self.gen.is_some()
    }

    /// The number of elements directly servable without driving a
    /// generator — the user-facing counterpart of
    /// [`crate::node::LazyNode::materialized_count`], and the quantity
    /// `SPEC_FULL.md`'s "monotone materialization" invariant is stated
    /// over.
    pub fn materialized_count(&self) -> usize {
        self.root.materialized_count()
    }

    /// Attaches a generator bound to `rule`, sharing the root core's cache,
    /// matching `LazySequence::SetGenerator` in
    /// `examples/original_source/LazySequence.h`. Only valid on a
    /// Core-rooted handle — panics otherwise, same as the original's
    /// `dynamic_cast` check.
    pub fn set_generator(&mut self, rule: Rule<T>) {
        let core = self
            .root
            .as_core()
            .expect("set_generator: root is not a Core");
        core.borrow_mut().set_rule(rule.clone());
        let cache = core.borrow().cache_handle();
        self.gen = Some(Rc::new(RefCell::new(Generator::with_rule(cache, rule))));
    }

    /// Reads index `i`: serve it directly if already materialized,
    /// otherwise drive the attached generator until it is. With no
    /// generator attached, falls back to asking the root directly rather
    /// than failing outright — this is what lets a `Where`/`Map` view
    /// with an as-yet-empty `materialized_count` still serve an index its
    /// own scan can satisfy from an already-available base (a `Where`
    /// view's `match_idx` starts empty and only grows when asked, not
    /// when the base does), and also lets a `Core`'s ruleless tail
    /// children be read through the combined view. `examples/original_source/LazySequence.h`'s
    /// `Get` has no such fallback, but there it never needed one: `Where`/`Map`/`Zip`
    /// are raw view objects there, queried directly rather than through
    /// the `LazySequence` wrapper's materialized-count gate at all. See
    /// `DESIGN.md` Open Question 4.
    pub fn get(&self, index: usize) -> Result<T> {
        if index < self.root.materialized_count() {
            return self.root.get(index);
        }
        match &self.gen {
            Some(gen) => {
                let max_attempts = EngineConfig::from_env().max_rule_attempts;
                while self.root.materialized_count() <= index {
                    gen.borrow_mut().next(max_attempts)?;
                }
                self.root.get(index)
            }
            None => self.root.get(index),
        }
    }

    pub fn get_first(&self) -> Result<T> {
        self.get(0)
    }

    /// Only defined for a finite sequence — driving a generator
    /// indefinitely in search of a "last" element that does not exist
    /// would never return.
    pub fn get_last(&self) -> Result<T> {
        let len = self.root.length().value().map_err(|_| Error::InfiniteNotAllowed {
            context: "LazySequence::get_last on an Omega-length sequence",
        })?;
        if len == 0 {
            return Err(Error::OutOfRange {
                index: 0,
                length: "0".into(),
            });
        }
        self.get(len - 1)
    }

    /// Returns a new view with `value` appended. The generator is
    /// preserved (still attached to the same underlying core), matching
    /// `LazySequence::AppendValue` in
    /// `examples/original_source/LazySequence.h` — `Appended`'s
    /// `materialized_count` is a direct pass-through of the base's, so
    /// driving the shared generator from either handle is visible through
    /// this one too.
    pub fn append_value(&self, value: T) -> Self {
        LazySequence {
            root: LazyNode::appended(self.root.clone(), value),
            gen: self.gen.clone(),
        }
    }

    pub fn prepend_value(&self, value: T) -> Self {
        LazySequence {
            root: LazyNode::prepended(self.root.clone(), value),
            gen: self.gen.clone(),
        }
    }

    pub fn insert_at_value(&self, value: T, idx: usize) -> Result<Self> {
        Ok(LazySequence {
            root: LazyNode::inserted_at(self.root.clone(), value, idx)?,
            gen: self.gen.clone(),
        })
    }

    /// Returns a mapped view with no generator of its own. Unlike
    /// `Appended`/`Prepended`/`InsertedAt`, `Map`'s `materialized_count` is
    /// its own independently-grown cache (see `MapNode::get`), not a
    /// pass-through of the base's — so carrying the generator forward here
    /// would drive the base's raw cache without ever advancing `Map`'s own
    /// count, and the read loop in [`Self::get`] would never terminate.
    /// Reading past what `map` has already produced requires driving the
    /// base sequence's own handle first.
    pub fn map<R: Clone + 'static>(&self, f: Rc<dyn Fn(T) -> R>) -> LazySequence<R> {
        LazySequence {
            root: LazyNode::mapped(self.root.clone(), f),
            gen: None,
        }
    }

    /// Returns a filtered view with no generator of its own, for the same
    /// reason as [`Self::map`]: `Where`'s `match_idx` is independently
    /// grown by scanning the base, not a pass-through of the base's own
    /// count.
    pub fn where_(&self, pred: Rc<dyn Fn(&T) -> bool>) -> Self {
        let memoize = EngineConfig::from_env().where_memoize;
        LazySequence {
            root: LazyNode::where_by(self.root.clone(), pred, memoize),
            gen: None,
        }
    }

    /// No generator of its own, for the same reason as [`Self::map`] --
    /// and `Zip` additionally has two bases, so one shared generator slot
    /// could not represent both anyway.
    pub fn zip<U: Clone + 'static>(&self, other: &LazySequence<U>) -> LazySequence<(T, U)> {
        LazySequence {
            root: LazyNode::zipped(self.root.clone(), other.root.clone()),
            gen: None,
        }
    }

    /// Concatenates `self` then `other`. Four branches, matching
    /// `Concat()` in `examples/original_source/LazySequence.h`:
    ///
    /// 1. Both finite: fully materialize both sides and flatten into one
    ///    new core, dropping any generator.
    /// 2. `self` is already infinite: `other` can never be reached;
    ///    return `self` aliased, generator included.
    /// 3. `self` is empty: return `other` aliased, generator included.
    /// 4. `self` is finite and nonempty, `other` is infinite:
    ///    - if `other`'s root is itself a rule-bearing core, materialize
    ///      `self` plus whatever `other` has produced so far into a
    ///      fresh seed, and carry `other`'s rule into a brand new
    ///      generator (decoupled from `other`'s own growth from this
    ///      point on);
    ///    - otherwise (`other`'s infinity comes from a nested child,
    ///      not a rule of its own) attach `other`'s root unchanged as a
    ///      tail child — aliased, not deep-copied — and drop the
    ///      generator.
    pub fn concat_with(&self, other: &LazySequence<T>) -> Result<LazySequence<T>> {
        let la = self.root.length();
        let lb = other.root.length();

        if let (Cardinal::Finite(na), Cardinal::Finite(nb)) = (la, lb) {
            let mut elems = Vec::with_capacity(na + nb);
            for i in 0..na {
                elems.push(self.root.get(i)?);
            }
            for i in 0..nb {
                elems.push(other.root.get(i)?);
            }
            return Ok(LazySequence {
                root: LazyNode::core_from_vec(elems),
                gen: None,
            });
        }

        if la.is_omega() {
            return Ok(self.clone());
        }

        let na = la.value().expect("checked finite above");
        if na == 0 {
            return Ok(other.clone());
        }

        if let Some(rule) = other.root.rule_of() {
            let mut seed = Vec::with_capacity(na);
            for i in 0..na {
                seed.push(self.root.get(i)?);
            }
            let other_core = other
                .root
                .as_core()
                .expect("rule_of returned Some, so this is a Core");
            let snapshot: Vec<T> = other_core.borrow().cache_handle().borrow().clone();
            seed.extend(snapshot);
            return Ok(LazySequence::generated(rule, seed));
        }

        let mut head = Vec::with_capacity(na);
        for i in 0..na {
            head.push(self.root.get(i)?);
        }
        let new_root = LazyNode::core_from_vec(head);
        if let Some(core) = new_root.as_core() {
            core.borrow_mut().append_tail_child(other.root.clone());
        }
        Ok(LazySequence {
            root: new_root,
            gen: None,
        })
    }
}

/// Free-function form of [`LazySequence::concat_with`], matching the
/// original's free `Concat(a, b)` call shape.
pub fn concat<T: Clone + PartialEq + 'static>(
    a: &LazySequence<T>,
    b: &LazySequence<T>,
) -> Result<LazySequence<T>> {
    a.concat_with(b)
}

/// Left-folds a *finite* sequence. A finite `length()` means no rule
/// exists anywhere in the DAG (see [`crate::node::CoreNode::length`]),
/// so every index is directly reachable without driving a generator.
pub fn reduce<T, A, F>(seq: &LazySequence<T>, init: A, f: F) -> Result<A>
where
    T: Clone + 'static,
    F: Fn(A, T) -> A,
{
    let len = seq.root.length().value().map_err(|_| Error::InfiniteNotAllowed {
        context: "reduce: sequence is not finite",
    })?;
    let mut acc = init;
    for i in 0..len {
        acc = f(acc, seq.root.get(i)?);
    }
    Ok(acc)
}
