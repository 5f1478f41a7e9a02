//! Command records and the specification that collects them.
//!
//! A command models one operation of the system under test. All callbacks
//! run against the abstract model state only; the result of a call is a
//! symbolic handle during generation, never a real value.

use crate::gen::Gen;
use crate::symbolic::{Arg, Handle, Symbolic};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// A named, modelled operation of the system under test.
///
/// Unset callbacks default to: `requires` always true, empty argument list,
/// `precondition` always true, `next_state` identity.
pub struct Command<S, V> {
    pub name: String,
    requires: Rc<dyn Fn(&S) -> bool>,
    args: Rc<dyn Fn(&S) -> Gen<Vec<Arg<V>>>>,
    precondition: Rc<dyn Fn(&S, &[Arg<V>]) -> bool>,
    next_state: Rc<dyn Fn(&S, &[Arg<V>], &Symbolic) -> S>,
}

impl<S, V> Command<S, V>
where
    S: Clone + 'static,
    V: Clone + 'static,
{
    /// Create a command with the given name and default callbacks.
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            requires: Rc::new(|_| true),
            args: Rc::new(|_| Gen::constant(Vec::new())),
            precondition: Rc::new(|_, _| true),
            next_state: Rc::new(|state: &S, _, _| state.clone()),
        }
    }

    /// Guard deciding whether this command may be drawn at all in a state.
    pub fn with_requires(mut self, f: impl Fn(&S) -> bool + 'static) -> Self {
        self.requires = Rc::new(f);
        self
    }

    /// Argument generator; arguments may reference earlier results
    /// symbolically.
    pub fn with_args(mut self, f: impl Fn(&S) -> Gen<Vec<Arg<V>>> + 'static) -> Self {
        self.args = Rc::new(f);
        self
    }

    /// Check on the drawn arguments; failing draws are redrawn, never kept.
    pub fn with_precondition(mut self, f: impl Fn(&S, &[Arg<V>]) -> bool + 'static) -> Self {
        self.precondition = Rc::new(f);
        self
    }

    /// Model state transition. Must be a pure function of state, args, and
    /// the symbolic result handle.
    pub fn with_next_state(
        mut self,
        f: impl Fn(&S, &[Arg<V>], &Symbolic) -> S + 'static,
    ) -> Self {
        self.next_state = Rc::new(f);
        self
    }

    pub fn requires(&self, state: &S) -> bool {
        (self.requires)(state)
    }

    pub fn args_gen(&self, state: &S) -> Gen<Vec<Arg<V>>> {
        (self.args)(state)
    }

    pub fn precondition(&self, state: &S, args: &[Arg<V>]) -> bool {
        (self.precondition)(state, args)
    }

    pub fn next_state(&self, state: &S, args: &[Arg<V>], result: &Symbolic) -> S {
        (self.next_state)(state, args, result)
    }
}

impl<S, V> fmt::Debug for Command<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

enum InitialState<S> {
    Plain(Rc<dyn Fn() -> S>),
    WithSetup(Rc<dyn Fn(&Symbolic) -> S>),
}

/// A model of a system under test: its commands, how to produce the initial
/// model state, and optionally how to choose which command to try next.
pub struct Spec<S, V> {
    commands: BTreeMap<String, Rc<Command<S, V>>>,
    initial: InitialState<S>,
    generate_command: Option<Rc<dyn Fn(&S) -> Gen<String>>>,
}

impl<S, V> Spec<S, V>
where
    S: Clone + 'static,
    V: Clone + 'static,
{
    /// Create a spec whose initial model state is produced by `initial`.
    pub fn new(initial: impl Fn() -> S + 'static) -> Self {
        Spec {
            commands: BTreeMap::new(),
            initial: InitialState::Plain(Rc::new(initial)),
            generate_command: None,
        }
    }

    /// Create a spec with a setup phase: `initial` receives the reserved
    /// setup handle, which is pre-bound before any command runs.
    pub fn with_setup(initial: impl Fn(&Symbolic) -> S + 'static) -> Self {
        Spec {
            commands: BTreeMap::new(),
            initial: InitialState::WithSetup(Rc::new(initial)),
            generate_command: None,
        }
    }

    /// Add a command, keyed by its name.
    pub fn with_command(mut self, command: Command<S, V>) -> Self {
        self.commands.insert(command.name.clone(), Rc::new(command));
        self
    }

    /// Override uniform command choice with a name generator.
    pub fn with_command_gen(mut self, f: impl Fn(&S) -> Gen<String> + 'static) -> Self {
        self.generate_command = Some(Rc::new(f));
        self
    }

    /// Look up a command by name.
    pub fn command(&self, name: &str) -> Option<&Rc<Command<S, V>>> {
        self.commands.get(name)
    }

    /// All commands, in stable name order.
    pub fn commands(&self) -> impl Iterator<Item = &Rc<Command<S, V>>> {
        self.commands.values()
    }

    /// Number of commands in the spec.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Whether this spec declares a setup phase.
    pub fn has_setup(&self) -> bool {
        matches!(self.initial, InitialState::WithSetup(_))
    }

    /// Produce the initial model state.
    pub fn initial_state(&self) -> S {
        match &self.initial {
            InitialState::Plain(f) => f(),
            InitialState::WithSetup(f) => f(&Symbolic::root(Handle::setup())),
        }
    }

    /// Handles bound before the first command runs.
    pub fn initial_bindings(&self) -> HashSet<Handle> {
        if self.has_setup() {
            [Handle::setup()].into_iter().collect()
        } else {
            HashSet::new()
        }
    }

    pub(crate) fn command_gen(&self) -> Option<&Rc<dyn Fn(&S) -> Gen<String>>> {
        self.generate_command.as_ref()
    }
}
