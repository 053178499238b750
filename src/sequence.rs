use std::{any::Any, cmp::Ordering, ops::Index};

use crate::{BufferedPipeline, Capacity, Dynamic, Pipeline};

/// An eager, in-memory, ordered sequence.
///
/// `Sequence` is where pipelines usually start and end: [`Sequence::to_pipeline`] and
/// [`Sequence::to_buffered`] stream its elements in order, and draining a pipeline with
/// `to_sequence()` materializes it again.
///
/// # Example
/// ```rust
/// use sluice::Sequence;
///
/// let seq = Sequence::from(vec![3, 1, 2, 4])
///     .filter(|x| *x > 1)
///     .map(|x| x * 10)
///     .sort_by(|a, b| a.cmp(b));
///
/// assert_eq!(seq.as_slice(), &[20, 30, 40]);
/// assert_eq!(seq.reduce(0, |acc, x| acc + x), 90);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence<T> {
    items: Vec<T>,
}

impl<T> Sequence<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Keeps the elements matching `predicate`, in order
    pub fn filter<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        self.items.into_iter().filter(|x| predicate(x)).collect()
    }

    pub fn map<F, U>(self, map_fn: F) -> Sequence<U>
    where
        F: FnMut(T) -> U,
    {
        self.items.into_iter().map(map_fn).collect()
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.items.iter().for_each(f)
    }

    /// Folds every element into `initial`, left to right
    pub fn reduce<F>(self, initial: T, reduce_fn: F) -> T
    where
        F: FnMut(T, T) -> T,
    {
        self.items.into_iter().fold(initial, reduce_fn)
    }

    pub fn fold<A, F>(self, init: A, fold_fn: F) -> A
    where
        F: FnMut(A, T) -> A,
    {
        self.items.into_iter().fold(init, fold_fn)
    }

    /// The first element matching `predicate`
    pub fn find<F>(&self, mut predicate: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().find(|x| predicate(x))
    }

    /// Whether at least one element matches. `false` for an empty sequence.
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().any(predicate)
    }

    /// Whether every element matches. `true` for an empty sequence.
    pub fn all<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().all(predicate)
    }

    /// Stable sort, equal elements keep their relative order
    pub fn sort_by<F>(mut self, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.sort_by(compare);
        self
    }

    pub fn concat(mut self, other: impl IntoIterator<Item = T>) -> Self {
        self.items.extend(other);
        self
    }

    /// Elements in `start..end`. An out of bounds or inverted range yields an empty sequence.
    pub fn slice(self, start: usize, end: usize) -> Self {
        if start > end || end > self.items.len() {
            return Self::new(Vec::new());
        }

        self.items.into_iter().skip(start).take(end - start).collect()
    }
}

impl<T> Sequence<T>
where
    T: Send + 'static,
{
    /// Streams the elements, in order, through a hand-off [`Pipeline`]
    pub fn to_pipeline(self) -> Pipeline<T> {
        Pipeline::from_sequence(self)
    }

    /// Streams the elements, in order, through a [`BufferedPipeline`]
    pub fn to_buffered(self, capacity: impl Into<Capacity>) -> BufferedPipeline<T> {
        BufferedPipeline::from_sequence(self, capacity)
    }

    pub fn erase(self) -> Sequence<Dynamic>
    where
        T: Any,
    {
        self.map(|x| Box::new(x) as Dynamic)
    }
}

impl Sequence<Dynamic> {
    /// Keeps the elements holding a `U`, dropping every other element.
    ///
    /// The drop is intentional, see [`Pipeline::recast`].
    pub fn recast<U>(self) -> Sequence<U>
    where
        U: Any,
    {
        let before = self.len();
        let recast: Sequence<U> = self
            .items
            .into_iter()
            .filter_map(|x| x.downcast::<U>().ok().map(|x| *x))
            .collect();

        let dropped = before - recast.len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                expected = std::any::type_name::<U>(),
                "recast dropped mismatching elements"
            );
        }

        recast
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> Index<usize> for Sequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}
