//! Core generation and shrinking for stateful, parallel property-based tests.
//!
//! This crate turns a user-supplied specification (named commands with a
//! model state transition, argument generator, precondition, and `requires`
//! guard) into random test cases: a sequential prefix of command calls
//! followed by zero or more parallel suffix threads. Command results are
//! symbolic handles that later commands may use as arguments; real execution
//! is the runner's job and happens elsewhere.
//!
//! Emitted cases are well-formed: every topological interleaving of the
//! prefix with the parallel threads is valid against the model, so any
//! discrepancy the runner observes reflects a real bug. Shrinking preserves
//! that guarantee.

pub mod case;
pub mod command;
pub mod data;
pub mod error;
pub mod gen;
pub mod interleave;
pub mod picker;
pub mod sequence;
pub mod shrink;
pub mod symbolic;
pub mod tree;

// Re-export the main types
pub use case::*;
pub use command::*;
pub use data::*;
pub use error::*;
pub use gen::*;
pub use interleave::*;
pub use picker::*;
pub use sequence::*;
pub use symbolic::*;
pub use tree::*;
