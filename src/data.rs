//! Core data types: sizes, splittable seeds, and case options.

use std::fmt;

/// Size parameter for controlling test data generation.
///
/// Size typically grows from 0 as the host framework escalates difficulty;
/// case lengths reach their configured maxima at [`CaseOptions::max_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Size(pub usize);

impl Size {
    /// Create a new size value.
    pub fn new(value: usize) -> Self {
        Size(value)
    }

    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for Size {
    fn from(value: usize) -> Self {
        Size(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Splittable random seed for deterministic generation.
///
/// Seeds can be split to create independent random streams, ensuring
/// reproducible runs. Draws use SplitMix64 mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        Seed(value, value.wrapping_mul(0x9e3779b97f4a7c15))
    }

    /// Split a seed into two independent seeds.
    pub fn split(self) -> (Self, Self) {
        let Seed(a, b) = self;
        let c = a.wrapping_add(b);
        let d = b.wrapping_add(c);
        (Seed(a, c), Seed(b, d))
    }

    /// Take a seed for the next draw, advancing this seed in place.
    pub fn step(&mut self) -> Self {
        let (draw, rest) = self.split();
        *self = rest;
        draw
    }

    /// Generate a random seed.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed(rng.gen(), rng.gen())
    }

    fn mix(self) -> u64 {
        let Seed(a, b) = self;
        let mut z = a.wrapping_add(b.rotate_left(31)).wrapping_add(0x9e3779b97f4a7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Draw a value in `[0, bound)` together with a successor seed.
    pub fn next_bounded(self, bound: u64) -> (u64, Seed) {
        let (draw, next) = self.split();
        (draw.mix() % bound.max(1), next)
    }

    /// Draw a boolean together with a successor seed.
    pub fn next_bool(self) -> (bool, Seed) {
        let (value, next) = self.next_bounded(2);
        (value == 1, next)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// Length bounds for a generated case.
///
/// Convert from a single `usize` to apply the same bound to the sequential
/// prefix and to each parallel thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxLength {
    /// Maximum number of calls in the sequential prefix.
    pub sequential: usize,
    /// Maximum number of calls in each parallel thread.
    pub parallel: usize,
}

impl MaxLength {
    pub fn new(sequential: usize, parallel: usize) -> Self {
        MaxLength {
            sequential,
            parallel,
        }
    }
}

impl Default for MaxLength {
    fn default() -> Self {
        MaxLength {
            sequential: 10,
            parallel: 10,
        }
    }
}

impl From<usize> for MaxLength {
    fn from(bound: usize) -> Self {
        MaxLength {
            sequential: bound,
            parallel: bound,
        }
    }
}

/// Configuration for case generation.
#[derive(Debug, Clone)]
pub struct CaseOptions {
    /// Number of parallel suffix threads.
    pub threads: usize,

    /// Length bounds for the prefix and for each thread.
    pub max_length: MaxLength,

    /// The size at which full lengths are reached.
    pub max_size: usize,

    /// Maximum number of rejected draws before giving up.
    pub discard_limit: usize,
}

impl Default for CaseOptions {
    fn default() -> Self {
        CaseOptions {
            threads: 0,
            max_length: MaxLength::default(),
            max_size: 200,
            discard_limit: 100,
        }
    }
}

impl CaseOptions {
    /// Create options with the given number of parallel threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Create options with the given length bounds.
    pub fn with_max_length(mut self, max_length: impl Into<MaxLength>) -> Self {
        self.max_length = max_length.into();
        self
    }

    /// Create options with the given full-length size.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Create options with the given discard limit.
    pub fn with_discard_limit(mut self, discard_limit: usize) -> Self {
        self.discard_limit = discard_limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_split_is_deterministic() {
        let seed = Seed::from_u64(42);
        assert_eq!(seed.split(), seed.split());

        let (left, right) = seed.split();
        assert_ne!(left, right);
    }

    #[test]
    fn test_step_advances_in_place() {
        let mut seed = Seed::from_u64(7);
        let first = seed.step();
        let second = seed.step();
        assert_ne!(first, second);
    }

    #[test]
    fn test_next_bounded_stays_in_range() {
        let mut seed = Seed::from_u64(99);
        for bound in [1u64, 2, 3, 10, 26] {
            for _ in 0..50 {
                let (value, _) = seed.step().next_bounded(bound);
                assert!(value < bound);
            }
        }
    }

    #[test]
    fn test_max_length_from_single_bound() {
        let bounds = MaxLength::from(7);
        assert_eq!(bounds.sequential, 7);
        assert_eq!(bounds.parallel, 7);
    }

    #[test]
    fn test_default_options() {
        let options = CaseOptions::default();
        assert_eq!(options.threads, 0);
        assert_eq!(options.max_length, MaxLength::new(10, 10));
        assert_eq!(options.max_size, 200);
    }
}
