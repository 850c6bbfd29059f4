use core::iter::FusedIterator;

use crate::{IdGenerator, Result, TimeSource};

/// An endless iterator of identifiers drawn from an [`IdGenerator`].
///
/// Each call to [`next`](Iterator::next) delegates to
/// [`IdGenerator::next_id`]. The iterator yields `Ok` values until the
/// generator reports an error; that error is yielded once and the iterator
/// then ends.
///
/// All iterators over one generator share its state. Two iterators consumed
/// side by side interleave a single stream of identifiers, and a fresh
/// iterator continues where the last one stopped.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use flakegen::IdGenerator;
///
/// let generator = IdGenerator::new(0).unwrap();
/// let ids: HashSet<u64> = generator
///     .ids()
///     .take(1000)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(ids.len(), 1000);
/// ```
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Ids<'a, T>
where
    T: TimeSource,
{
    generator: &'a IdGenerator<T>,
    finished: bool,
}

impl<'a, T> Ids<'a, T>
where
    T: TimeSource,
{
    pub(crate) const fn new(generator: &'a IdGenerator<T>) -> Self {
        Self {
            generator,
            finished: false,
        }
    }
}

impl<T> Iterator for Ids<'_, T>
where
    T: TimeSource,
{
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let next = self.generator.next_id();
        self.finished = next.is_err();
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (usize::MAX, None)
        }
    }
}

impl<T> FusedIterator for Ids<'_, T> where T: TimeSource {}

impl<'a, T> IntoIterator for &'a IdGenerator<T>
where
    T: TimeSource,
{
    type Item = Result<u64>;
    type IntoIter = Ids<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        Ids::new(self)
    }
}
