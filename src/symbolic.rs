//! Symbolic result handles and the argument values that may reference them.
//!
//! During generation a command's result does not exist yet; it is stood in
//! for by a symbolic handle that later commands can pass as an argument.
//! Resolving handles to real values is the runner's concern.

use std::collections::HashSet;
use std::fmt;

/// The reserved handle bound before the first command when the spec
/// declares a setup phase.
pub const SETUP_HANDLE: &str = "setup";

/// Parallel threads are named by letter, which caps how many a case can have.
pub const MAX_THREADS: usize = 26;

pub(crate) fn thread_letter(thread: usize) -> char {
    debug_assert!(thread < MAX_THREADS);
    (b'a' + thread as u8) as char
}

/// A unique name for the pending result of a command call.
///
/// Prefix handles count up from `"1"`; handles in parallel thread *t* carry
/// that thread's letter as a suffix (`"1a"`, `"2a"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(String);

impl Handle {
    /// Create a handle with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Handle(name.into())
    }

    /// The reserved setup handle.
    pub fn setup() -> Self {
        Handle(SETUP_HANDLE.to_string())
    }

    /// The `position`-th handle (1-based) of the sequential prefix.
    pub fn prefix(position: usize) -> Self {
        Handle(position.to_string())
    }

    /// The `position`-th handle (1-based) of parallel thread `thread`.
    pub fn thread(position: usize, thread: usize) -> Self {
        Handle(format!("{position}{}", thread_letter(thread)))
    }

    /// The handle's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A placeholder for a value that will only exist during execution.
///
/// `Root` names a command result directly; `Lookup` is field access on a
/// pending result. Validity passes through a lookup to its root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbolic {
    Root(Handle),
    Lookup(Box<Symbolic>, String),
}

impl Symbolic {
    /// A symbolic reference to the result named by `handle`.
    pub fn root(handle: Handle) -> Self {
        Symbolic::Root(handle)
    }

    /// Field access on this pending value.
    pub fn lookup(self, key: impl Into<String>) -> Self {
        Symbolic::Lookup(Box::new(self), key.into())
    }

    /// The handle this value ultimately refers to.
    pub fn root_handle(&self) -> &Handle {
        match self {
            Symbolic::Root(handle) => handle,
            Symbolic::Lookup(inner, _) => inner.root_handle(),
        }
    }

    /// Whether every root this value references is already bound.
    pub fn valid(&self, bindings: &HashSet<Handle>) -> bool {
        bindings.contains(self.root_handle())
    }
}

impl fmt::Display for Symbolic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbolic::Root(handle) => write!(f, "{handle}"),
            Symbolic::Lookup(inner, key) => write!(f, "{inner}.{key}"),
        }
    }
}

/// An argument to a command call: either a concrete value or a symbolic
/// reference to an earlier result. The core never resolves symbolic
/// arguments; it only checks that their handles are bound in time.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg<V> {
    Symbolic(Symbolic),
    Value(V),
}

impl<V> Arg<V> {
    /// A symbolic argument referencing the result named by `handle`.
    pub fn symbolic(handle: Handle) -> Self {
        Arg::Symbolic(Symbolic::root(handle))
    }

    /// A concrete argument.
    pub fn value(value: V) -> Self {
        Arg::Value(value)
    }

    /// Whether this argument resolves against the given binding set.
    /// Concrete values always do.
    pub fn valid(&self, bindings: &HashSet<Handle>) -> bool {
        match self {
            Arg::Symbolic(symbolic) => symbolic.valid(bindings),
            Arg::Value(_) => true,
        }
    }

    /// The symbolic reference, when this argument is one.
    pub fn as_symbolic(&self) -> Option<&Symbolic> {
        match self {
            Arg::Symbolic(symbolic) => Some(symbolic),
            Arg::Value(_) => None,
        }
    }
}

impl<V: fmt::Debug> fmt::Display for Arg<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Symbolic(symbolic) => write!(f, "#{symbolic}"),
            Arg::Value(value) => write!(f, "{value:?}"),
        }
    }
}
