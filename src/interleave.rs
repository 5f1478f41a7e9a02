//! Interleaving enumeration and model-level validation.
//!
//! A case is kept only if *every* topological interleaving of its prefix
//! with its parallel threads is valid against the model. Any interleaving is
//! a serialisation the runner may observe; if one were invalid, an observed
//! discrepancy could be an artefact of the case rather than a bug.

use crate::case::{Case, CommandCall};
use crate::command::Spec;
use crate::symbolic::{Handle, Symbolic};
use std::collections::HashSet;

/// Lazy iterator over every topological interleaving of `sequential` with
/// the `parallel` threads: the prefix comes first and each thread's internal
/// order is preserved. With no parallel threads it yields the prefix alone.
///
/// For *n* threads of *k* commands each there are `(nk)!/(k!)ⁿ`
/// interleavings; they are produced one at a time, never materialised as a
/// whole.
pub fn every_interleaving<'a, S, V>(
    sequential: &'a [CommandCall<S, V>],
    parallel: &'a [Vec<CommandCall<S, V>>],
) -> Interleavings<'a, S, V> {
    Interleavings {
        sequential,
        parallel,
        stack: vec![Node {
            order: Vec::new(),
            taken: vec![0; parallel.len()],
        }],
    }
}

struct Node {
    // thread indices in pick order
    order: Vec<usize>,
    // how many calls of each thread the order already contains
    taken: Vec<usize>,
}

/// See [`every_interleaving`].
pub struct Interleavings<'a, S, V> {
    sequential: &'a [CommandCall<S, V>],
    parallel: &'a [Vec<CommandCall<S, V>>],
    stack: Vec<Node>,
}

impl<'a, S, V> Iterator for Interleavings<'a, S, V> {
    type Item = Vec<&'a CommandCall<S, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            let mut extended = false;
            for thread in (0..self.parallel.len()).rev() {
                if node.taken[thread] < self.parallel[thread].len() {
                    extended = true;
                    let mut order = node.order.clone();
                    order.push(thread);
                    let mut taken = node.taken.clone();
                    taken[thread] += 1;
                    self.stack.push(Node { order, taken });
                }
            }
            if !extended {
                let mut calls: Vec<&CommandCall<S, V>> = self.sequential.iter().collect();
                let mut cursor = vec![0; self.parallel.len()];
                for &thread in &node.order {
                    calls.push(&self.parallel[thread][cursor[thread]]);
                    cursor[thread] += 1;
                }
                return Some(calls);
            }
        }
        None
    }
}

/// Validate one command sequence against the model.
///
/// Folds `(state, bindings)` over the calls, rejecting as soon as a call's
/// `requires` fails, one of its symbolic arguments references an unbound
/// handle, or its precondition fails.
pub fn valid_sequence<S, V>(
    calls: &[&CommandCall<S, V>],
    initial: &S,
    bindings: &HashSet<Handle>,
) -> bool
where
    S: Clone + 'static,
    V: Clone + 'static,
{
    let mut state = initial.clone();
    let mut bound = bindings.clone();

    for call in calls {
        if !call.command.requires(&state) {
            return false;
        }
        if !call.args.iter().all(|arg| arg.valid(&bound)) {
            return false;
        }
        if !call.command.precondition(&state, &call.args) {
            return false;
        }
        state = call
            .command
            .next_state(&state, &call.args, &Symbolic::root(call.handle.clone()));
        bound.insert(call.handle.clone());
    }
    true
}

/// Whether every interleaving of the case is valid against the model,
/// starting from the spec's initial state and bindings. Stops at the first
/// invalid interleaving.
pub fn well_formed<S, V>(spec: &Spec<S, V>, case: &Case<S, V>) -> bool
where
    S: Clone + 'static,
    V: Clone + 'static,
{
    let initial = spec.initial_state();
    let bindings = spec.initial_bindings();
    every_interleaving(&case.sequential, &case.parallel)
        .all(|calls| valid_sequence(&calls, &initial, &bindings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::symbolic::Arg;
    use std::rc::Rc;

    fn call(handle: Handle, command: &Rc<Command<i32, i32>>) -> CommandCall<i32, i32> {
        CommandCall {
            handle,
            command: Rc::clone(command),
            args: Vec::new(),
        }
    }

    fn noop() -> Rc<Command<i32, i32>> {
        Rc::new(Command::new("noop"))
    }

    fn thread(len: usize, index: usize, command: &Rc<Command<i32, i32>>) -> Vec<CommandCall<i32, i32>> {
        (1..=len)
            .map(|position| call(Handle::thread(position, index), command))
            .collect()
    }

    fn factorial(n: usize) -> usize {
        (1..=n).product()
    }

    #[test]
    fn test_no_threads_yields_the_prefix_alone() {
        let command = noop();
        let prefix = vec![call(Handle::prefix(1), &command)];

        let all: Vec<_> = every_interleaving(&prefix, &[]).collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].len(), 1);
    }

    #[test]
    fn test_interleaving_counts() {
        let command = noop();

        for threads in 0..=3usize {
            for len in 0..=3usize {
                let parallel: Vec<_> = (0..threads)
                    .map(|index| thread(len, index, &command))
                    .collect();

                let expected =
                    factorial(threads * len) / factorial(len).pow(threads as u32);
                let count = every_interleaving(&[], &parallel).count();
                assert_eq!(count, expected, "threads={threads} len={len}");
            }
        }
    }

    #[test]
    fn test_intra_thread_order_is_preserved() {
        let command = noop();
        let parallel = vec![thread(2, 0, &command), thread(2, 1, &command)];

        for calls in every_interleaving(&[], &parallel) {
            let positions_a: Vec<_> = calls
                .iter()
                .filter(|c| c.handle.name().ends_with('a'))
                .map(|c| c.handle.clone())
                .collect();
            assert_eq!(positions_a, vec![Handle::thread(1, 0), Handle::thread(2, 0)]);
        }
    }

    #[test]
    fn test_unbound_symbolic_argument_rejects() {
        let command = noop();
        let mut produced = call(Handle::prefix(1), &command);
        produced.args = vec![Arg::symbolic(Handle::prefix(2))];

        assert!(!valid_sequence(&[&produced], &0, &HashSet::new()));

        // bound earlier in the same sequence
        let first = call(Handle::prefix(2), &command);
        assert!(valid_sequence(&[&first, &produced], &0, &HashSet::new()));
    }

    #[test]
    fn test_requires_is_checked_against_the_reached_state() {
        let incr: Rc<Command<i32, i32>> =
            Rc::new(Command::new("incr").with_next_state(|state: &i32, _, _| state + 1));
        let guarded: Rc<Command<i32, i32>> =
            Rc::new(Command::new("guarded").with_requires(|state: &i32| *state >= 1));

        let a = call(Handle::prefix(1), &incr);
        let b = call(Handle::prefix(2), &guarded);

        assert!(valid_sequence(&[&a, &b], &0, &HashSet::new()));
        assert!(!valid_sequence(&[&b, &a], &0, &HashSet::new()));
    }
}
