//! Error types for case generation.

use thiserror::Error;

/// Main error type for case generation.
///
/// The core fails loudly and never guesses: it does not invent states,
/// insert no-ops, or rearrange user callbacks. Panics raised inside user
/// callbacks propagate untouched.
#[derive(Error, Debug)]
pub enum StatecheckError {
    /// Zero commands can be drawn at the current model state, either because
    /// none satisfies `requires` or because the spec's command generator
    /// produced a name with no matching command.
    #[error("no applicable command: {detail} (model state: {state})")]
    NoCommandApplicable { detail: String, state: String },

    /// A rejection loop ran out of retries.
    #[error("generator failed: {reason}")]
    GeneratorFailed { reason: String },

    /// The case-level well-formedness filter rejected too many candidates.
    #[error("too many generated cases discarded (limit: {limit})")]
    TooManyDiscards { limit: usize },

    /// Thread handles are named by letter, which caps the thread count.
    #[error("at most {max} parallel threads are supported, requested {requested}")]
    TooManyThreads { requested: usize, max: usize },
}

/// Result type for case generation.
pub type Result<T> = std::result::Result<T, StatecheckError>;
