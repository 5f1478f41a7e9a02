//! Generator combinators for argument and command-name generation.

use crate::{data::*, tree::*};

/// A generator for test data of type `T`.
///
/// Generators are explicit, first-class values that can be composed with
/// combinator functions; every draw yields a [`Tree`] so shrinks survive
/// composition.
pub struct Gen<T> {
    generator: Box<dyn Fn(Size, Seed) -> Tree<T>>,
}

impl<T> Gen<T> {
    /// Create a new generator from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Size, Seed) -> Tree<T> + 'static,
    {
        Gen {
            generator: Box::new(f),
        }
    }

    /// Generate a value using the given size and seed.
    pub fn generate(&self, size: Size, seed: Seed) -> Tree<T> {
        (self.generator)(size, seed)
    }

    /// Create a generator that always produces the same value.
    pub fn constant(value: T) -> Self
    where
        T: Clone + 'static,
    {
        Gen::new(move |_size, _seed| Tree::singleton(value.clone()))
    }
}

impl<T> Gen<T>
where
    T: 'static,
{
    /// Map a function over the generated values.
    pub fn map<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(T) -> U + 'static + Clone,
        U: 'static,
    {
        Gen::new(move |size, seed| self.generate(size, seed).map(f.clone()))
    }
}

impl<T> Gen<T>
where
    T: Clone + 'static,
{
    /// Choose among the given items, shrinking toward the front of the list.
    ///
    /// Panics when `items` is empty; there is nothing to draw.
    pub fn element_of(items: Vec<T>) -> Self {
        assert!(!items.is_empty(), "element_of requires at least one item");
        Gen::new(move |_size, seed| {
            let (index, _) = seed.next_bounded(items.len() as u64);
            let index = index as usize;
            let children = items[..index]
                .iter()
                .cloned()
                .map(Tree::singleton)
                .collect();
            Tree::with_children(items[index].clone(), children)
        })
    }
}

/// Primitive generators.
impl Gen<bool> {
    /// Generate a random boolean.
    pub fn bool() -> Self {
        Gen::new(|_size, seed| {
            let (value, _) = seed.next_bool();
            Tree::singleton(value)
        })
    }
}

impl Gen<i32> {
    /// Generate an integer in the given range, shrinking toward the origin
    /// (the in-range value closest to zero).
    pub fn int_range(min: i32, max: i32) -> Self {
        Gen::new(move |_size, seed| {
            let range = (max - min + 1) as u64;
            let (value, _) = seed.next_bounded(range);
            let result = min + value as i32;

            let origin = if min <= 0 && max >= 0 {
                0
            } else if min > 0 {
                min
            } else {
                max
            };

            let mut shrinks = Vec::new();
            if origin != result {
                shrinks.push(Tree::singleton(origin));
            }

            // Halve the distance to the origin until it closes
            let mut current = result;
            loop {
                current = if current > origin {
                    current - (current - origin + 1) / 2
                } else if current < origin {
                    current + (origin - current + 1) / 2
                } else {
                    break;
                };
                if current != result && current != origin {
                    shrinks.push(Tree::singleton(current));
                }
            }

            Tree::with_children(result, shrinks)
        })
    }
}
