//! The derived-view DAG.
//!
//! [`LazyNode`] is the tagged variant spec.md calls for: `Core`, `Appended`,
//! `Prepended`, `InsertedAt`, `Map`, `Where`, `Zip`. Dispatch on `get`,
//! `length`, and `materialized_count` is a plain `match` on the tag rather
//! than virtual-call-plus-downcast (the C++ ancestor in
//! `examples/original_source/LazySequence.h` recovers a `Core`'s rule by
//! `dynamic_cast`-ing a `LazySequenceBase<T>*`; here `as_core`/`rule_of`
//! are just methods on the enum, so there is nothing to downcast).
//!
//! `Map` and `Zip` change the element type (`T -> R`, `(T, U)`), which a
//! single closed enum over one type parameter can't express directly. Each
//! keeps the outer tag closed by erasing only its own hidden type parameter
//! behind a small local trait object (`MapView<R>`, `ZipView<P>`) — the
//! match on `LazyNode`'s tag still drives everything.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cardinal::Cardinal;
use crate::eager::EagerSequence;
use crate::error::{Error, Result};
use crate::generator::{Cache, Rule};

/// Leaf of the DAG: owns a materialized prefix, optionally a generation
/// rule, and a possibly-empty list of tail children consulted once the
/// prefix is exhausted.
pub struct CoreNode<T> {
    cache: Cache<T>,
    rule: Option<Rule<T>>,
    children: Vec<LazyNode<T>>,
}

impl<T: Clone + 'static> CoreNode<T> {
    fn get(&self, index: usize) -> Result<T> {
        let len = self.cache.borrow().len();
        if index < len {
            return Ok(self.cache.borrow()[index].clone());
        }

        let mut offset = len;
        for child in &self.children {
            match child.length() {
                Cardinal::Omega => return child.get(index - offset),
                Cardinal::Finite(n) => {
                    if index < offset + n {
                        return child.get(index - offset);
                    }
                    offset += n;
                }
            }
        }

        Err(Error::OutOfRange {
            index,
            length: offset.to_string(),
        })
    }

    fn length(&self) -> Cardinal {
        if self.rule.is_some() {
            return Cardinal::Omega;
        }
        let mut total = Cardinal::Finite(self.cache.borrow().len());
        for child in &self.children {
            let child_len = child.length();
            if child_len.is_omega() {
                return Cardinal::Omega;
            }
            total = total + child_len;
        }
        total
    }

    /// The core's *own* materialized count — deliberately not counting
    /// whatever tail children can already serve.
    /// [`crate::sequence::LazySequence::get`] uses this as the threshold
    /// for whether it needs to drive a generator at all; when this core
    /// has no generator of its own, `LazySequence::get` falls back to
    /// [`CoreNode::get`] directly, which does walk the child list, so a
    /// ruleless tail child is still reachable through the combined view.
    /// See `DESIGN.md` Open Question 4.
    fn materialized_count(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn rule(&self) -> Option<Rule<T>> {
        self.rule.clone()
    }

    pub fn set_rule(&mut self, rule: Rule<T>) {
        self.rule = Some(rule);
    }

    pub fn cache_handle(&self) -> Cache<T> {
        self.cache.clone()
    }

    pub fn append_tail_child(&mut self, child: LazyNode<T>) {
        self.children.push(child);
    }

    pub fn has_generator(&self) -> bool {
        self.rule.is_some() || self.children.iter().any(|c| c.length().is_omega())
    }
}

/// `get(index)` result for `index >= base.length()` on an
/// `Appended`/`Prepended`/`InsertedAt` view over a finite base.
fn out_of_range_after(base_len: Cardinal, index: usize) -> Error {
    Error::OutOfRange {
        index,
        length: (base_len + Cardinal::Finite(1)).to_string(),
    }
}

pub struct AppendedNode<T> {
    base: LazyNode<T>,
    value: T,
}

impl<T: Clone + 'static> AppendedNode<T> {
    fn get(&self, index: usize) -> Result<T> {
        match self.base.length() {
            Cardinal::Finite(n) => {
                if index < n {
                    self.base.get(index)
                } else if index == n {
                    Ok(self.value.clone())
                } else {
                    Err(out_of_range_after(Cardinal::Finite(n), index))
                }
            }
            Cardinal::Omega => self.base.get(index),
        }
    }

    fn length(&self) -> Cardinal {
        self.base.length() + Cardinal::Finite(1)
    }

    fn materialized_count(&self) -> usize {
        self.base.materialized_count() + 1
    }
}

pub struct PrependedNode<T> {
    base: LazyNode<T>,
    value: T,
}

impl<T: Clone + 'static> PrependedNode<T> {
    fn get(&self, index: usize) -> Result<T> {
        if index == 0 {
            Ok(self.value.clone())
        } else {
            self.base.get(index - 1)
        }
    }

    fn length(&self) -> Cardinal {
        self.base.length() + Cardinal::Finite(1)
    }

    fn materialized_count(&self) -> usize {
        self.base.materialized_count() + 1
    }
}

pub struct InsertedAtNode<T> {
    base: LazyNode<T>,
    value: T,
    idx: usize,
}

impl<T: Clone + 'static> InsertedAtNode<T> {
    fn get(&self, index: usize) -> Result<T> {
        use std::cmp::Ordering;
        match index.cmp(&self.idx) {
            Ordering::Equal => Ok(self.value.clone()),
            Ordering::Less => self.base.get(index),
            Ordering::Greater => self.base.get(index - 1),
        }
    }

    fn length(&self) -> Cardinal {
        self.base.length() + Cardinal::Finite(1)
    }

    fn materialized_count(&self) -> usize {
        self.base.materialized_count() + 1
    }
}

/// Erases `Map`'s source type parameter so `LazyNode<R>::Map` can hold it
/// without `LazyNode` itself needing a second type parameter.
pub trait MapView<R> {
    fn get(&self, index: usize) -> Result<R>;
    fn length(&self) -> Cardinal;
    fn materialized_count(&self) -> usize;
}

pub struct MapNode<T, R> {
    base: LazyNode<T>,
    f: Rc<dyn Fn(T) -> R>,
    cache: RefCell<Vec<R>>,
}

impl<T: Clone + 'static, R: Clone> MapView<R> for MapNode<T, R> {
    fn get(&self, index: usize) -> Result<R> {
        if let Some(r) = self.cache.borrow().get(index) {
            return Ok(r.clone());
        }
        let v = self.base.get(index)?;
        let r = (self.f)(v);
        // Appended unconditionally, matching the call-order contract:
        // only valid for monotonically increasing index access, same as
        // examples/original_source/LazySequence.h's MapLazySequence.
        self.cache.borrow_mut().push(r.clone());
        Ok(r)
    }

    fn length(&self) -> Cardinal {
        self.base.length()
    }

    fn materialized_count(&self) -> usize {
        self.cache.borrow().len()
    }
}

pub struct WhereNode<T> {
    base: LazyNode<T>,
    pred: Rc<dyn Fn(&T) -> bool>,
    match_idx: RefCell<Vec<usize>>,
    /// Resolves the "does `length()` memoize its predicate evaluations?"
    /// Open Question from spec.md §9 — see `SPEC_FULL.md` §4.7a.
    memoize: bool,
}

impl<T: Clone + 'static> WhereNode<T> {
    fn next_scan_start(&self) -> usize {
        self.match_idx.borrow().last().map(|l| l + 1).unwrap_or(0)
    }

    /// Grows `match_idx` until it covers `idx_needed`, or fails once the
    /// base is exhausted first.
    fn grow_until(&self, idx_needed: usize) -> Result<()> {
        if self.match_idx.borrow().len() > idx_needed {
            return Ok(());
        }
        let base_len = self.base.length();
        loop {
            if self.match_idx.borrow().len() > idx_needed {
                return Ok(());
            }
            let cur = self.next_scan_start();
            if let Cardinal::Finite(limit) = base_len {
                if cur >= limit {
                    return Err(Error::OutOfRange {
                        index: idx_needed,
                        length: self.match_idx.borrow().len().to_string(),
                    });
                }
            }
            let v = self.base.get(cur)?;
            if (self.pred)(&v) {
                self.match_idx.borrow_mut().push(cur);
            }
        }
    }

    /// Scans the (finite) base to completion, memoizing every match.
    /// Only called when `base.length()` is finite.
    fn grow_to_completion(&self, limit: usize) -> usize {
        let mut cur = self.next_scan_start();
        while cur < limit {
            if let Ok(v) = self.base.get(cur) {
                if (self.pred)(&v) {
                    self.match_idx.borrow_mut().push(cur);
                }
            }
            cur += 1;
        }
        self.match_idx.borrow().len()
    }

    fn get(&self, index: usize) -> Result<T> {
        self.grow_until(index)?;
        let base_idx = self.match_idx.borrow()[index];
        self.base.get(base_idx)
    }

    fn length(&self) -> Cardinal {
        match self.base.length() {
            Cardinal::Omega => Cardinal::Omega,
            Cardinal::Finite(limit) => {
                if self.memoize {
                    Cardinal::Finite(self.grow_to_completion(limit))
                } else {
                    let mut count = 0usize;
                    for i in 0..limit {
                        if let Ok(v) = self.base.get(i) {
                            if (self.pred)(&v) {
                                count += 1;
                            }
                        }
                    }
                    Cardinal::Finite(count)
                }
            }
        }
    }

    fn materialized_count(&self) -> usize {
        self.match_idx.borrow().len()
    }
}

/// Erases `Zip`'s two source type parameters behind the pair type `P`.
pub trait ZipView<P> {
    fn get(&self, index: usize) -> Result<P>;
    fn length(&self) -> Cardinal;
    fn materialized_count(&self) -> usize;
}

pub struct ZipNode<A, B> {
    a: LazyNode<A>,
    b: LazyNode<B>,
}

impl<A: Clone + 'static, B: Clone + 'static> ZipView<(A, B)> for ZipNode<A, B> {
    fn get(&self, index: usize) -> Result<(A, B)> {
        Ok((self.a.get(index)?, self.b.get(index)?))
    }

    fn length(&self) -> Cardinal {
        self.a.length().min(self.b.length())
    }

    fn materialized_count(&self) -> usize {
        self.a.materialized_count().min(self.b.materialized_count())
    }
}

/// A node in the derived-view DAG. Cheap to clone (every variant is an
/// `Rc`); cloning a view never mutates the node it wraps.
pub enum LazyNode<T> {
    Core(Rc<RefCell<CoreNode<T>>>),
    Appended(Rc<AppendedNode<T>>),
    Prepended(Rc<PrependedNode<T>>),
    InsertedAt(Rc<InsertedAtNode<T>>),
    Map(Rc<dyn MapView<T>>),
    Where(Rc<WhereNode<T>>),
    Zip(Rc<dyn ZipView<T>>),
}

impl<T> Clone for LazyNode<T> {
    fn clone(&self) -> Self {
        match self {
            LazyNode::Core(n) => LazyNode::Core(n.clone()),
            LazyNode::Appended(n) => LazyNode::Appended(n.clone()),
            LazyNode::Prepended(n) => LazyNode::Prepended(n.clone()),
            LazyNode::InsertedAt(n) => LazyNode::InsertedAt(n.clone()),
            LazyNode::Map(n) => LazyNode::Map(n.clone()),
            LazyNode::Where(n) => LazyNode::Where(n.clone()),
            LazyNode::Zip(n) => LazyNode::Zip(n.clone()),
        }
    }
}

impl<T: Clone + 'static> LazyNode<T> {
    pub fn core_empty() -> Self {
        LazyNode::Core(Rc::new(RefCell::new(CoreNode {
            cache: Rc::new(RefCell::new(Vec::new())),
            rule: None,
            children: Vec::new(),
        })))
    }

    pub fn core_from_vec(items: Vec<T>) -> Self {
        LazyNode::Core(Rc::new(RefCell::new(CoreNode {
            cache: Rc::new(RefCell::new(items)),
            rule: None,
            children: Vec::new(),
        })))
    }

    pub fn core_from_eager(seq: &EagerSequence<T>) -> Self {
        Self::core_from_vec(seq.as_slice().to_vec())
    }

    pub fn core_with_rule(rule: Rule<T>, seed: Vec<T>) -> Self {
        LazyNode::Core(Rc::new(RefCell::new(CoreNode {
            cache: Rc::new(RefCell::new(seed)),
            rule: Some(rule),
            children: Vec::new(),
        })))
    }

    pub fn appended(base: LazyNode<T>, value: T) -> Self {
        LazyNode::Appended(Rc::new(AppendedNode { base, value }))
    }

    pub fn prepended(base: LazyNode<T>, value: T) -> Self {
        LazyNode::Prepended(Rc::new(PrependedNode { base, value }))
    }

    pub fn inserted_at(base: LazyNode<T>, value: T, idx: usize) -> Result<Self> {
        if let Cardinal::Finite(n) = base.length() {
            if idx > n {
                return Err(Error::OutOfRange {
                    index: idx,
                    length: n.to_string(),
                });
            }
        }
        Ok(LazyNode::InsertedAt(Rc::new(InsertedAtNode {
            base,
            value,
            idx,
        })))
    }

    pub fn mapped<R: Clone + 'static>(base: LazyNode<T>, f: Rc<dyn Fn(T) -> R>) -> LazyNode<R> {
        LazyNode::Map(Rc::new(MapNode {
            base,
            f,
            cache: RefCell::new(Vec::new()),
        }))
    }

    pub fn where_by(base: LazyNode<T>, pred: Rc<dyn Fn(&T) -> bool>, memoize: bool) -> Self {
        LazyNode::Where(Rc::new(WhereNode {
            base,
            pred,
            match_idx: RefCell::new(Vec::new()),
            memoize,
        }))
    }

    pub fn zipped<U: Clone + 'static>(a: LazyNode<T>, b: LazyNode<U>) -> LazyNode<(T, U)> {
        LazyNode::Zip(Rc::new(ZipNode { a, b }))
    }

    pub fn get(&self, index: usize) -> Result<T> {
        match self {
            LazyNode::Core(n) => n.borrow().get(index),
            LazyNode::Appended(n) => n.get(index),
            LazyNode::Prepended(n) => n.get(index),
            LazyNode::InsertedAt(n) => n.get(index),
            LazyNode::Map(n) => n.get(index),
            LazyNode::Where(n) => n.get(index),
            LazyNode::Zip(n) => n.get(index),
        }
    }

    pub fn length(&self) -> Cardinal {
        match self {
            LazyNode::Core(n) => n.borrow().length(),
            LazyNode::Appended(n) => n.length(),
            LazyNode::Prepended(n) => n.length(),
            LazyNode::InsertedAt(n) => n.length(),
            LazyNode::Map(n) => n.length(),
            LazyNode::Where(n) => n.length(),
            LazyNode::Zip(n) => n.length(),
        }
    }

    pub fn materialized_count(&self) -> usize {
        match self {
            LazyNode::Core(n) => n.borrow().materialized_count(),
            LazyNode::Appended(n) => n.materialized_count(),
            LazyNode::Prepended(n) => n.materialized_count(),
            LazyNode::InsertedAt(n) => n.materialized_count(),
            LazyNode::Map(n) => n.materialized_count(),
            LazyNode::Where(n) => n.materialized_count(),
            LazyNode::Zip(n) => n.materialized_count(),
        }
    }

    pub fn as_core(&self) -> Option<Rc<RefCell<CoreNode<T>>>> {
        match self {
            LazyNode::Core(c) => Some(c.clone()),
            _ => None,
        }
    }

    pub fn rule_of(&self) -> Option<Rule<T>> {
        self.as_core().and_then(|c| c.borrow().rule())
    }

    pub fn has_generator(&self) -> bool {
        match self.as_core() {
            Some(c) => c.borrow().has_generator(),
            None => false,
        }
    }
}
