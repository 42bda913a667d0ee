//! End-to-end scenarios, one per behavior called out in `spec.md`'s
//! worked-examples section. Unit tests inside each module cover the
//! individual operations; these exercise whole sequences the way a
//! caller actually would.

use std::rc::Rc;

use lazyseq::prelude::*;

fn naturals_from(start: i64) -> LazySequence<i64> {
    let rule: Rule = Rc::new(|prefix: &[i64]| prefix.last().map(|n| n + 1).unwrap_or(0));
    LazySequence::generated(rule, vec![start])
}

// `Rule<T>` is only exported generically; alias it concretely here for
// readability in this file's helper.
type Rule = lazyseq::generator::Rule<i64>;

#[test]
fn finite_concat_finite_flattens_into_one_sequence() {
    let a = LazySequence::from_vec(vec![1, 2, 3]);
    let b = LazySequence::from_vec(vec![4, 5]);
    let c = concat(&a, &b).unwrap();

    assert_eq!(c.length(), Cardinal::finite(5));
    for (i, expected) in [1i64, 2, 3, 4, 5].into_iter().enumerate() {
        assert_eq!(c.get(i).unwrap(), expected);
    }
}

#[test]
fn finite_concat_infinite_with_rule_carries_the_rule_forward() {
    let a = LazySequence::from_vec(vec![10, 20]);
    let b = naturals_from(0);
    let c = a.concat_with(&b).unwrap();

    assert!(c.length().is_omega());
    assert_eq!(c.get(0).unwrap(), 10);
    assert_eq!(c.get(1).unwrap(), 20);
    assert_eq!(c.get(2).unwrap(), 0);
    assert_eq!(c.get(3).unwrap(), 1);
    assert_eq!(c.get(4).unwrap(), 2);
}

#[test]
fn infinite_concat_finite_makes_the_tail_unreachable() {
    let a = naturals_from(0);
    let b = LazySequence::from_vec(vec![7, 8, 9]);
    let c = a.concat_with(&b).unwrap();

    assert!(c.length().is_omega());
    assert_eq!(c.get(0).unwrap(), 0);
    assert_eq!(c.get(1).unwrap(), 1);
    assert_eq!(c.get(2).unwrap(), 2);
}

#[test]
fn where_reports_out_of_range_once_matches_are_exhausted() {
    let a = LazySequence::from_vec(vec![1, 2, 3, 4, 5]);
    let evens = a.where_(Rc::new(|x: &i64| x % 2 == 0));

    assert_eq!(evens.length(), Cardinal::finite(2));
    assert_eq!(evens.get(0).unwrap(), 2);
    assert_eq!(evens.get(1).unwrap(), 4);
    assert!(matches!(evens.get(2), Err(Error::OutOfRange { .. })));
}

#[test]
fn map_transforms_each_element_lazily() {
    let a = LazySequence::from_vec(vec![1, 2, 3]);
    let squared = a.map(Rc::new(|x: i64| x * x));

    assert_eq!(squared.length(), Cardinal::finite(3));
    assert_eq!(squared.get(0).unwrap(), 1);
    assert_eq!(squared.get(1).unwrap(), 4);
    assert_eq!(squared.get(2).unwrap(), 9);
}

#[test]
fn fibonacci_grows_through_a_two_element_rule() {
    let rule: Rule = Rc::new(|prefix: &[i64]| {
        let n = prefix.len();
        if n < 2 {
            1
        } else {
            prefix[n - 1] + prefix[n - 2]
        }
    });
    let fib = LazySequence::generated(rule, Vec::new());

    let first_eight: Vec<i64> = (0..8).map(|i| fib.get(i).unwrap()).collect();
    assert_eq!(first_eight, vec![1, 1, 2, 3, 5, 8, 13, 21]);
}

#[test]
fn tape_machine_accepts_and_rejects_by_parity_of_ones() {
    let mut m = TapeMachine::new();
    m.set_start_state(0).set_accept_state(100).set_reject_state(-100);
    m.add_transition(Transition::new(0, '0', 0, '0', Direction::Right));
    m.add_transition(Transition::new(0, '1', 1, '1', Direction::Right));
    m.add_transition(Transition::new(1, '0', 1, '0', Direction::Right));
    m.add_transition(Transition::new(1, '1', 0, '1', Direction::Right));
    m.add_transition(Transition::new(0, '_', 100, '_', Direction::Stay));
    m.add_transition(Transition::new(1, '_', -100, '_', Direction::Stay));

    let accepted = m.execution_trace("0011");
    let last = accepted.get(5).unwrap();
    assert!(last.is_halted());
    assert_eq!(last.state, 100);

    let rejected = m.execution_trace("001");
    let last = rejected.get(4).unwrap();
    assert!(last.is_halted());
    assert_eq!(last.state, -100);
}
