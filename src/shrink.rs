//! Multi-axis shrinking of a case.
//!
//! Shrinking is explicit rather than derived from the per-call trees alone
//! because the useful moves cross component boundaries: a command can leave
//! a parallel thread and join the prefix. Candidates are proposed here;
//! the caller keeps only those that stay well-formed.

use crate::case::{CaseTree, CommandCall};
use crate::tree::Tree;

type Calls<S, V> = Vec<Tree<CommandCall<S, V>>>;

impl<S, V: Clone> CaseTree<S, V> {
    /// One layer of candidate smaller cases, in order: remove or shrink a
    /// prefix command, remove or shrink a command in one thread, pull the
    /// first command of a thread into the prefix, and the two-level variants
    /// of the remove/shrink moves. Empty threads are pruned from every
    /// candidate, so a thread can be eliminated entirely.
    ///
    /// Recursion is the consumer's loop: pick a candidate that still fails,
    /// then ask it for its own shrinks.
    pub fn shrinks(&self) -> Vec<CaseTree<S, V>> {
        let mut candidates = Vec::new();

        for sequential in one_step(&self.sequential) {
            candidates.push(pruned(sequential, self.parallel.clone()));
        }

        for (index, thread) in self.parallel.iter().enumerate() {
            for variant in one_step(thread) {
                let mut parallel = self.parallel.clone();
                parallel[index] = variant;
                candidates.push(pruned(self.sequential.clone(), parallel));
            }
        }

        for (index, thread) in self.parallel.iter().enumerate() {
            if thread.is_empty() {
                continue;
            }
            let mut sequential = self.sequential.clone();
            sequential.push(thread[0].clone());
            let mut parallel = self.parallel.clone();
            parallel[index].remove(0);
            candidates.push(pruned(sequential, parallel));
        }

        for first in one_step(&self.sequential) {
            for second in one_step(&first) {
                candidates.push(pruned(second, self.parallel.clone()));
            }
        }

        for (index, thread) in self.parallel.iter().enumerate() {
            for first in one_step(thread) {
                for second in one_step(&first) {
                    let mut parallel = self.parallel.clone();
                    parallel[index] = second;
                    candidates.push(pruned(self.sequential.clone(), parallel));
                }
            }
        }

        candidates
    }
}

/// Every way to remove one call from the list or replace one call by one of
/// its own shrink candidates.
fn one_step<S, V: Clone>(calls: &Calls<S, V>) -> Vec<Calls<S, V>> {
    let mut variants = Vec::new();
    for index in 0..calls.len() {
        let mut removed = calls.clone();
        removed.remove(index);
        variants.push(removed);

        for child in &calls[index].children {
            let mut replaced = calls.clone();
            replaced[index] = child.clone();
            variants.push(replaced);
        }
    }
    variants
}

fn pruned<S, V>(
    sequential: Calls<S, V>,
    parallel: Vec<Calls<S, V>>,
) -> CaseTree<S, V> {
    CaseTree::new(
        sequential,
        parallel
            .into_iter()
            .filter(|thread| !thread.is_empty())
            .collect(),
    )
}
