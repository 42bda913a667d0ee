//! `TapeMachine`: a deterministic Turing machine whose execution trace is
//! exposed as a [`LazySequence`] of [`Configuration`]s — a demonstration
//! of the generator/rule machinery driving something richer than a
//! numeric recurrence.
//!
//! Grounded directly on `examples/original_source/TuringMachine.h`'s
//! `TuringTape`/`TMState`/`LazyTuringMachine`: the two-array tape
//! (negative head positions grow a separate left array rather than a
//! single re-centered buffer), the per-step rule closure that looks up a
//! matching transition and rewrites the most recent configuration, and
//! the "already halted configurations repeat themselves" rule used to
//! stop the trace from wandering once it reaches accept/reject.

use std::rc::Rc;

use crate::generator::Rule;
use crate::sequence::LazySequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Stay,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from_state: i64,
    pub read_symbol: char,
    pub to_state: i64,
    pub write_symbol: char,
    pub direction: Direction,
}

impl Transition {
    pub fn new(
        from_state: i64,
        read_symbol: char,
        to_state: i64,
        write_symbol: char,
        direction: Direction,
    ) -> Self {
        Transition {
            from_state,
            read_symbol,
            to_state,
            write_symbol,
            direction,
        }
    }
}

/// A bi-infinite tape backed by two growable arrays, one per direction
/// from the starting cell. `head` is signed: negative positions index
/// into `left`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    left: Vec<char>,
    right: Vec<char>,
    head: i64,
    blank: char,
}

impl Tape {
    pub fn new(blank: char) -> Self {
        Tape {
            left: Vec::new(),
            right: Vec::new(),
            head: 0,
            blank,
        }
    }

    pub fn load_from_str(&mut self, input: &str) {
        self.right = input.chars().collect();
        self.left.clear();
        self.head = 0;
    }

    pub fn read(&self) -> char {
        self.read_at(self.head)
    }

    fn read_at(&self, pos: i64) -> char {
        if pos >= 0 {
            self.right
                .get(pos as usize)
                .copied()
                .unwrap_or(self.blank)
        } else {
            let idx = (-pos - 1) as usize;
            self.left.get(idx).copied().unwrap_or(self.blank)
        }
    }

    pub fn write(&mut self, c: char) {
        if self.head >= 0 {
            let idx = self.head as usize;
            if idx >= self.right.len() {
                self.right.resize(idx + 1, self.blank);
            }
            self.right[idx] = c;
        } else {
            let idx = (-self.head - 1) as usize;
            if idx >= self.left.len() {
                self.left.resize(idx + 1, self.blank);
            }
            self.left[idx] = c;
        }
    }

    pub fn move_left(&mut self) {
        self.head -= 1;
    }

    pub fn move_right(&mut self) {
        self.head += 1;
    }

    /// The tape within `radius` cells either side of the head, with the
    /// head's own cell bracketed (`[c]`).
    pub fn snapshot(&self, radius: usize) -> String {
        let radius = radius as i64;
        let mut out = String::new();
        for i in (self.head - radius)..=(self.head + radius) {
            let c = self.read_at(i);
            if i == self.head {
                out.push('[');
                out.push(c);
                out.push(']');
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// One step of a [`TapeMachine`]'s execution: the tape, the current
/// state, the step count, and whether this configuration is already a
/// halting one (the generator rule returns halted configurations
/// unchanged forever after).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub tape: Tape,
    pub state: i64,
    pub step: u64,
    halted: bool,
}

impl Configuration {
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn snapshot(&self, radius: usize) -> String {
        self.tape.snapshot(radius)
    }
}

/// A deterministic Turing machine: a transition table plus start/accept/
/// reject states. [`TapeMachine::execution_trace`] turns it into a
/// lazily-extended sequence of [`Configuration`]s — one element per step,
/// materialized only as far as a caller actually reads.
pub struct TapeMachine {
    transitions: Vec<Transition>,
    start_state: i64,
    accept_state: i64,
    reject_state: i64,
    blank: char,
}

impl Default for TapeMachine {
    fn default() -> Self {
        TapeMachine {
            transitions: Vec::new(),
            start_state: 0,
            accept_state: -1,
            reject_state: -2,
            blank: '_',
        }
    }
}

impl TapeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blank(blank: char) -> Self {
        TapeMachine {
            blank,
            ..Self::default()
        }
    }

    pub fn set_start_state(&mut self, s: i64) -> &mut Self {
        self.start_state = s;
        self
    }

    pub fn set_accept_state(&mut self, s: i64) -> &mut Self {
        self.accept_state = s;
        self
    }

    pub fn set_reject_state(&mut self, s: i64) -> &mut Self {
        self.reject_state = s;
        self
    }

    pub fn add_transition(&mut self, t: Transition) -> &mut Self {
        self.transitions.push(t);
        self
    }

    /// Builds the lazily-extended trace of configurations starting from
    /// `input` loaded onto a fresh tape. The returned sequence's rule
    /// closes over a clone of the transition table and the accept/reject
    /// states, exactly as `LazyTuringMachine::GetExecutionTrace` captures
    /// them in `examples/original_source/TuringMachine.h`.
    pub fn execution_trace(&self, input: &str) -> LazySequence<Configuration> {
        let mut tape = Tape::new(self.blank);
        tape.load_from_str(input);
        let seed = Configuration {
            tape,
            state: self.start_state,
            step: 0,
            halted: false,
        };

        let transitions = self.transitions.clone();
        let accept_state = self.accept_state;
        let reject_state = self.reject_state;

        let rule: Rule<Configuration> = Rc::new(move |history: &[Configuration]| {
            let prev = history
                .last()
                .expect("seed guarantees a non-empty history")
                .clone();

            if prev.halted {
                return prev;
            }

            let cur_char = prev.tape.read();
            let mut next = prev.clone();
            next.step += 1;

            let matched = transitions
                .iter()
                .find(|tr| tr.from_state == prev.state && tr.read_symbol == cur_char);

            match matched {
                Some(tr) => {
                    next.tape.write(tr.write_symbol);
                    match tr.direction {
                        Direction::Left => next.tape.move_left(),
                        Direction::Right => next.tape.move_right(),
                        Direction::Stay => {}
                    }
                    next.state = tr.to_state;
                }
                None => {
                    next.state = reject_state;
                }
            }

            next.halted = next.state == accept_state || next.state == reject_state;
            next
        });

        LazySequence::generated(rule, vec![seed])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts binary strings with an even number of `1`s.
    fn even_ones_machine() -> TapeMachine {
        let mut m = TapeMachine::new();
        m.set_start_state(0).set_accept_state(100).set_reject_state(-100);
        m.add_transition(Transition::new(0, '0', 0, '0', Direction::Right));
        m.add_transition(Transition::new(0, '1', 1, '1', Direction::Right));
        m.add_transition(Transition::new(1, '0', 1, '0', Direction::Right));
        m.add_transition(Transition::new(1, '1', 0, '1', Direction::Right));
        m.add_transition(Transition::new(0, '_', 100, '_', Direction::Stay));
        m.add_transition(Transition::new(1, '_', -100, '_', Direction::Stay));
        m
    }

    #[test]
    fn accepts_a_string_with_an_even_number_of_ones() {
        let m = even_ones_machine();
        let trace = m.execution_trace("0011");
        let last = trace.get(5).unwrap();
        assert!(last.is_halted());
        assert_eq!(last.state, 100);
    }

    #[test]
    fn rejects_a_string_with_an_odd_number_of_ones() {
        let m = even_ones_machine();
        let trace = m.execution_trace("001");
        let last = trace.get(4).unwrap();
        assert!(last.is_halted());
        assert_eq!(last.state, -100);
    }

    #[test]
    fn halted_configurations_repeat() {
        let m = even_ones_machine();
        let trace = m.execution_trace("0011");
        let halted_at = trace.get(5).unwrap();
        let one_more = trace.get(6).unwrap();
        assert_eq!(halted_at.state, one_more.state);
        assert_eq!(halted_at.step, one_more.step);
    }

    #[test]
    fn tape_write_grows_left_and_right_independently() {
        let mut t = Tape::new('_');
        t.load_from_str("ab");
        assert_eq!(t.read(), 'a');
        t.move_left();
        assert_eq!(t.read(), '_');
        t.write('x');
        assert_eq!(t.read(), 'x');
        t.move_right();
        t.move_right();
        assert_eq!(t.read(), 'b');
    }

    #[test]
    fn snapshot_brackets_the_head() {
        let mut t = Tape::new('_');
        t.load_from_str("ab");
        assert_eq!(t.snapshot(1), "_[a]b");
    }
}
