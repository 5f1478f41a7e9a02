//! Test cases: a sequential prefix plus parallel suffix threads.

use crate::command::{Command, Spec};
use crate::data::{CaseOptions, Seed, Size};
use crate::error::{Result, StatecheckError};
use crate::interleave::well_formed;
use crate::sequence::draw_sequence;
use crate::symbolic::{thread_letter, Arg, Handle, MAX_THREADS};
use crate::tree::Tree;
use std::fmt;
use std::fmt::Debug;
use std::rc::Rc;

/// One generated call: the symbolic handle naming its pending result, the
/// command, and the drawn arguments.
pub struct CommandCall<S, V> {
    pub handle: Handle,
    pub command: Rc<Command<S, V>>,
    pub args: Vec<Arg<V>>,
}

impl<S, V: Clone> Clone for CommandCall<S, V> {
    fn clone(&self) -> Self {
        CommandCall {
            handle: self.handle.clone(),
            command: Rc::clone(&self.command),
            args: self.args.clone(),
        }
    }
}

impl<S, V: PartialEq> PartialEq for CommandCall<S, V> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
            && self.command.name == other.command.name
            && self.args == other.args
    }
}

impl<S, V: Debug> fmt::Display for CommandCall<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}(", self.handle, self.command.name)?;
        for (index, arg) in self.args.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

impl<S, V: Debug> fmt::Debug for CommandCall<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// A generated test case, immutable once handed to the runner.
///
/// `parallel[i]` is thread *i*'s call list; the prefix runs before all
/// threads, the threads run concurrently with no mutual ordering.
pub struct Case<S, V> {
    pub sequential: Vec<CommandCall<S, V>>,
    pub parallel: Vec<Vec<CommandCall<S, V>>>,
}

impl<S, V: Clone> Clone for Case<S, V> {
    fn clone(&self) -> Self {
        Case {
            sequential: self.sequential.clone(),
            parallel: self.parallel.clone(),
        }
    }
}

impl<S, V: PartialEq> PartialEq for Case<S, V> {
    fn eq(&self, other: &Self) -> bool {
        self.sequential == other.sequential && self.parallel == other.parallel
    }
}

impl<S, V> Case<S, V> {
    /// Total number of calls across the prefix and every thread.
    pub fn total_len(&self) -> usize {
        self.sequential.len() + self.parallel.iter().map(Vec::len).sum::<usize>()
    }

    /// Number of calls in the parallel threads only.
    pub fn parallel_len(&self) -> usize {
        self.parallel.iter().map(Vec::len).sum()
    }

    /// Every handle in the case, prefix first, then thread by thread.
    pub fn handles(&self) -> impl Iterator<Item = &Handle> {
        self.sequential
            .iter()
            .chain(self.parallel.iter().flatten())
            .map(|call| &call.handle)
    }
}

impl<S, V: Debug> fmt::Debug for Case<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("sequential", &self.sequential)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl<S, V: Debug> fmt::Display for Case<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for call in &self.sequential {
            writeln!(f, "{call}")?;
        }
        for (thread, calls) in self.parallel.iter().enumerate() {
            writeln!(f, "thread {}:", thread_letter(thread))?;
            for call in calls {
                writeln!(f, "  {call}")?;
            }
        }
        Ok(())
    }
}

/// A case whose calls still carry their shrink trees.
///
/// The concrete case in use is the roots of the trees ([`CaseTree::case`]);
/// the shrinker draws candidates from the trees' children and from
/// structural moves across the prefix and threads.
pub struct CaseTree<S, V> {
    pub sequential: Vec<Tree<CommandCall<S, V>>>,
    pub parallel: Vec<Vec<Tree<CommandCall<S, V>>>>,
}

impl<S, V: Clone> Clone for CaseTree<S, V> {
    fn clone(&self) -> Self {
        CaseTree {
            sequential: self.sequential.clone(),
            parallel: self.parallel.clone(),
        }
    }
}

impl<S, V: Debug> fmt::Debug for CaseTree<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseTree")
            .field("sequential", &self.sequential)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl<S, V> CaseTree<S, V> {
    pub fn new(
        sequential: Vec<Tree<CommandCall<S, V>>>,
        parallel: Vec<Vec<Tree<CommandCall<S, V>>>>,
    ) -> Self {
        CaseTree {
            sequential,
            parallel,
        }
    }

    /// Collapse every call tree to its root.
    pub fn case(&self) -> Case<S, V>
    where
        V: Clone,
    {
        Case {
            sequential: self
                .sequential
                .iter()
                .map(|tree| tree.value.clone())
                .collect(),
            parallel: self
                .parallel
                .iter()
                .map(|thread| thread.iter().map(|tree| tree.value.clone()).collect())
                .collect(),
        }
    }
}

/// Draw a well-formed case: a sequential prefix followed by
/// `options.threads` parallel threads.
///
/// Lengths scale with `size` and reach `options.max_length` at
/// `options.max_size`. Every thread is drawn from the state the prefix ends
/// in; threads never observe one another's model effects. A drawn candidate
/// is kept only if every interleaving of it is valid against the model;
/// otherwise the whole case is redrawn, up to `options.discard_limit`.
pub fn draw_case<S, V>(
    spec: &Spec<S, V>,
    options: &CaseOptions,
    size: Size,
    seed: Seed,
) -> Result<CaseTree<S, V>>
where
    S: Clone + Debug + 'static,
    V: Clone + 'static,
{
    if options.threads > MAX_THREADS {
        return Err(StatecheckError::TooManyThreads {
            requested: options.threads,
            max: MAX_THREADS,
        });
    }

    let mut seed = seed;
    for _ in 0..options.discard_limit {
        let tree = draw_candidate(spec, options, size, seed.step())?;
        if well_formed(spec, &tree.case()) {
            return Ok(tree);
        }
    }
    Err(StatecheckError::TooManyDiscards {
        limit: options.discard_limit,
    })
}

fn draw_candidate<S, V>(
    spec: &Spec<S, V>,
    options: &CaseOptions,
    size: Size,
    seed: Seed,
) -> Result<CaseTree<S, V>>
where
    S: Clone + Debug + 'static,
    V: Clone + 'static,
{
    let mut seed = seed;
    let max_size = options.max_size.max(1);
    let scaled = size.get().min(max_size);
    let prefix_budget = options.max_length.sequential * scaled / max_size;
    let thread_budget = options.max_length.parallel * scaled / max_size;

    let initial = spec.initial_state();
    let prefix_handles: Vec<Handle> = (1..=prefix_budget).map(Handle::prefix).collect();
    let (sequential, after_prefix) = draw_sequence(
        spec,
        &initial,
        &prefix_handles,
        size,
        &mut seed,
        options.discard_limit,
    )?;

    let mut parallel = Vec::with_capacity(options.threads);
    for thread in (0..options.threads).rev() {
        let thread_handles: Vec<Handle> = (1..=thread_budget)
            .map(|position| Handle::thread(position, thread))
            .collect();
        let (calls, _) = draw_sequence(
            spec,
            &after_prefix,
            &thread_handles,
            size,
            &mut seed,
            options.discard_limit,
        )?;
        parallel.push(calls);
    }
    parallel.reverse();

    Ok(CaseTree::new(sequential, parallel))
}
