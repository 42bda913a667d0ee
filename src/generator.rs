//! Stateful producers that extend a [`crate::node::CoreNode`]'s cache one
//! element at a time, mediating rule output through three overlay queues.
//!
//! Grounded on `examples/getsynth-synth/gen/src/generator/mod.rs`'s
//! `Generator` trait for the step-one-value-per-call shape, and on
//! `examples/original_source/Generator.h` for the three-queue overlay
//! semantics this crate must preserve exactly (prepend-FIFO, then
//! append-FIFO, then rule, filtered by a remove multiset).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{Error, Result};

/// A pure function from the current materialized prefix to the next
/// element of the sequence. Rules do not observe the overlay queues.
pub type Rule<T> = Rc<dyn Fn(&[T]) -> T>;

/// Shared, appendable materialized array. Both a [`crate::node::CoreNode`]
/// and the [`Generator`] feeding it hold a handle to the same `Cache`, so
/// that generation is visible to every derived view reading through the
/// core without either side copying on every step.
pub type Cache<T> = Rc<RefCell<Vec<T>>>;

/// Stepping machine that extends a core's cache by one element per call.
///
/// Overlay-builder methods (`prepend_value`, `append_sequence`,
/// `remove_value`, …) return a *new* `Generator` with the corresponding
/// queue edited. Per the shared-cache policy, the new generator's cache is
/// a deep copy unless the caller explicitly asks to keep sharing it via
/// [`Generator::fork_sharing_cache`] — aliasing is an opt-in, not the
/// default, because two live generators driving the same cache would
/// double-append.
pub struct Generator<T> {
    cache: Cache<T>,
    rule: Option<Rule<T>>,
    prepend_queue: VecDeque<T>,
    append_queue: VecDeque<T>,
    remove_set: Vec<T>,
    pos: isize,
}

impl<T> Generator<T> {
    /// A generator over `cache` with no rule and empty overlay queues.
    /// `next` will fail with [`Error::NoGenerator`] until a rule is
    /// attached or a value is queued.
    pub fn new(cache: Cache<T>) -> Self {
        let pos = (cache.borrow().len() as isize) - 1;
        Generator {
            cache,
            rule: None,
            prepend_queue: VecDeque::new(),
            append_queue: VecDeque::new(),
            remove_set: Vec::new(),
            pos,
        }
    }

    /// A generator over `cache` driven by `rule`.
    pub fn with_rule(cache: Cache<T>, rule: Rule<T>) -> Self {
        let mut g = Self::new(cache);
        g.rule = Some(rule);
        g
    }

    pub fn set_rule(&mut self, rule: Rule<T>) {
        self.rule = Some(rule);
    }

    pub fn has_rule(&self) -> bool {
        self.rule.is_some()
    }

    pub fn rule(&self) -> Option<Rule<T>> {
        self.rule.clone()
    }

    /// Index of the last yielded element, or `-1` if nothing has been
    /// yielded yet.
    pub fn position(&self) -> isize {
        self.pos
    }

    pub fn cache_handle(&self) -> Cache<T> {
        self.cache.clone()
    }
}

impl<T: Clone + PartialEq> Generator<T> {
    /// Pulls the next value: prepend queue, then append queue, then the
    /// rule (looping past removed candidates), in that order. `max_attempts`
    /// bounds the rule-candidate loop; `None` leaves it unbounded, matching
    /// the spec's base contract.
    pub fn next(&mut self, max_attempts: Option<u32>) -> Result<T> {
        if let Some(v) = self.prepend_queue.pop_front() {
            self.cache.borrow_mut().push(v.clone());
            self.pos += 1;
            return Ok(v);
        }

        if let Some(v) = self.append_queue.pop_front() {
            self.cache.borrow_mut().push(v.clone());
            self.pos += 1;
            return Ok(v);
        }

        let rule = self.rule.clone().ok_or(Error::NoGenerator {
            context: "Generator::next: no rule and no queued elements",
        })?;

        let mut attempts: u32 = 0;
        loop {
            let candidate = {
                let prefix = self.cache.borrow();
                rule(&prefix)
            };
            // Always appended, whether or not it survives the remove
            // filter below -- the rule must see its own skipped
            // candidates on the next invocation.
            self.cache.borrow_mut().push(candidate.clone());

            if !self.remove_set.contains(&candidate) {
                self.pos += 1;
                return Ok(candidate);
            }

            attempts += 1;
            if let Some(max) = max_attempts {
                if attempts >= max {
                    log::warn!("generator rule exceeded {max} attempts without a kept value");
                    return Err(Error::NonTerminatingRule { attempts });
                }
            }
        }
    }

    /// `next`, converting any failure to `None`.
    pub fn try_next(&mut self, max_attempts: Option<u32>) -> Option<T> {
        self.next(max_attempts).ok()
    }

    fn deep_clone(&self) -> Self {
        Generator {
            cache: Rc::new(RefCell::new(self.cache.borrow().clone())),
            rule: self.rule.clone(),
            prepend_queue: self.prepend_queue.clone(),
            append_queue: self.append_queue.clone(),
            remove_set: self.remove_set.clone(),
            pos: self.pos,
        }
    }

    /// Overlay builder: front-inject `item`. Consumed before the append
    /// queue and before the rule.
    pub fn prepend_value(&self, item: T) -> Self {
        log::trace!("generator: prepend_value");
        let mut g = self.deep_clone();
        g.prepend_queue.push_back(item);
        g
    }

    /// Front-inject every element of `items`, preserving their order at
    /// the front of the queue.
    pub fn prepend_sequence(&self, items: &[T]) -> Self {
        log::trace!("generator: prepend_sequence of {} values", items.len());
        let mut g = self.deep_clone();
        for item in items {
            g.prepend_queue.push_back(item.clone());
        }
        g
    }

    /// Overlay builder: back-inject `item`, consumed after the prepend
    /// queue is empty but before the rule runs.
    pub fn append_value(&self, item: T) -> Self {
        log::trace!("generator: append_value");
        let mut g = self.deep_clone();
        g.append_queue.push_back(item);
        g
    }

    pub fn append_sequence(&self, items: &[T]) -> Self {
        log::trace!("generator: append_sequence of {} values", items.len());
        let mut g = self.deep_clone();
        for item in items {
            g.append_queue.push_back(item.clone());
        }
        g
    }

    /// Overlay builder: filter `item` out of rule output. Queued
    /// prepend/append values are never filtered -- only rule candidates
    /// are checked against the remove set.
    pub fn remove_value(&self, item: T) -> Self {
        log::trace!("generator: remove_value");
        let mut g = self.deep_clone();
        g.remove_set.push(item);
        g
    }

    pub fn remove_sequence(&self, items: &[T]) -> Self {
        log::trace!("generator: remove_sequence of {} values", items.len());
        let mut g = self.deep_clone();
        g.remove_set.extend(items.iter().cloned());
        g
    }

    /// Opt-in alternative to the overlay builders above: returns a new
    /// `Generator` that keeps pointing at the *same* cache `Rc` rather
    /// than deep-copying it. Only safe when the caller has not retained
    /// (and will not keep driving) the generator this was forked from --
    /// two live generators sharing one cache would both append to it.
    pub fn fork_sharing_cache(&self) -> Self {
        Generator {
            cache: self.cache.clone(),
            rule: self.rule.clone(),
            prepend_queue: self.prepend_queue.clone(),
            append_queue: self.append_queue.clone(),
            remove_set: self.remove_set.clone(),
            pos: self.pos,
        }
    }
}
