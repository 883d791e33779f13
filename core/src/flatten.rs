//! A lazy, restartable view of a slice of containers as one flat sequence.
//!
//! The same adaptor walks the accumulator's locked shards and a batch of
//! per-query result lists. Empty containers are skipped eagerly so that every
//! non-end position points at a real element, which keeps position equality
//! meaningful.

use std::iter::{FusedIterator, Peekable};

/// Cursor coordinates of a [`Flattened`] sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Element `inner` of container `outer`.
    At { outer: usize, inner: usize },
    /// Every container has been exhausted.
    End,
}

pub struct Flattened<'a, C, I: Iterator, F> {
    outer: &'a [C],
    open: F,
    outer_pos: usize,
    inner: Option<Peekable<I>>,
    inner_pos: usize,
}

/// A [`Flattened`] sequence over containers that iterate by reference.
pub type FlattenedRefs<'a, C> =
    Flattened<'a, C, <&'a C as IntoIterator>::IntoIter, fn(&'a C) -> <&'a C as IntoIterator>::IntoIter>;

impl<'a, C> FlattenedRefs<'a, C>
where
    &'a C: IntoIterator,
{
    pub fn new(outer: &'a [C]) -> Self {
        Self::with(outer, <&'a C as IntoIterator>::into_iter)
    }
}

impl<'a, C, I, F> Flattened<'a, C, I, F>
where
    I: Iterator,
    F: Fn(&'a C) -> I,
{
    /// Flatten `outer`, opening each container with `open`.
    pub fn with(outer: &'a [C], open: F) -> Self {
        let mut seq = Self { outer, open, outer_pos: 0, inner: None, inner_pos: 0 };
        seq.settle();
        seq
    }

    pub fn position(&self) -> Position {
        if self.outer_pos == self.outer.len() {
            Position::End
        } else {
            Position::At { outer: self.outer_pos, inner: self.inner_pos }
        }
    }

    /// Move the cursor back to the first element.
    pub fn rewind(&mut self) {
        self.outer_pos = 0;
        self.inner = None;
        self.inner_pos = 0;
        self.settle();
    }

    // Advance the outer cursor past empty containers.
    fn settle(&mut self) {
        let outer = self.outer;
        while self.outer_pos < outer.len() {
            if self.inner.is_none() {
                self.inner_pos = 0;
                self.inner = Some((self.open)(&outer[self.outer_pos]).peekable());
            }
            if self.inner.as_mut().is_some_and(|inner| inner.peek().is_some()) {
                return;
            }
            self.inner = None;
            self.outer_pos += 1;
        }
    }
}

impl<'a, C, I, F> Iterator for Flattened<'a, C, I, F>
where
    I: Iterator,
    F: Fn(&'a C) -> I,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        let item = inner.next()?;
        self.inner_pos += 1;
        if inner.peek().is_none() {
            self.inner = None;
            self.outer_pos += 1;
            self.settle();
        }
        Some(item)
    }
}

impl<'a, C, I, F> FusedIterator for Flattened<'a, C, I, F>
where
    I: Iterator,
    F: Fn(&'a C) -> I,
{
}

impl<'a, C, I, F> Clone for Flattened<'a, C, I, F>
where
    I: Iterator + Clone,
    I::Item: Clone,
    F: Clone,
{
    fn clone(&self) -> Self {
        Self {
            outer: self.outer,
            open: self.open.clone(),
            outer_pos: self.outer_pos,
            inner: self.inner.clone(),
            inner_pos: self.inner_pos,
        }
    }
}

/// Two cursors are equal when they walk the same containers and sit at the
/// same position; all exhausted cursors over the same containers are equal.
impl<'a, C, I, F> PartialEq for Flattened<'a, C, I, F>
where
    I: Iterator,
    F: Fn(&'a C) -> I,
{
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.outer, other.outer) && self.position() == other.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_and_skips_empty_containers() {
        let nested: Vec<Vec<i32>> = vec![vec![], vec![1, 2], vec![], vec![], vec![3], vec![]];
        let flat: Vec<i32> = Flattened::new(&nested).copied().collect();
        assert_eq!(flat, vec![1, 2, 3]);
    }

    #[test]
    fn all_empty_is_immediately_at_end() {
        let nested: Vec<Vec<i32>> = vec![vec![], vec![]];
        let seq = Flattened::new(&nested);
        assert_eq!(seq.position(), Position::End);

        let none: Vec<Vec<i32>> = Vec::new();
        assert_eq!(Flattened::new(&none).count(), 0);
    }

    #[test]
    fn positions_track_outer_and_inner_cursors() {
        let nested = vec![vec!['a', 'b'], vec![], vec!['c']];
        let mut seq = Flattened::new(&nested);
        assert_eq!(seq.position(), Position::At { outer: 0, inner: 0 });
        seq.next();
        assert_eq!(seq.position(), Position::At { outer: 0, inner: 1 });
        seq.next();
        assert_eq!(seq.position(), Position::At { outer: 2, inner: 0 });
        seq.next();
        assert_eq!(seq.position(), Position::End);
        assert_eq!(seq.next(), None);
    }

    #[test]
    fn equality_and_restart() {
        let nested = vec![vec![1, 2], vec![3]];
        let mut a = Flattened::new(&nested);
        let b = a.clone();
        assert!(a == b);
        a.next();
        assert!(a != b);

        let mut end_a = Flattened::new(&nested);
        end_a.by_ref().for_each(drop);
        let mut end_b = Flattened::new(&nested);
        end_b.by_ref().for_each(drop);
        assert!(end_a == end_b);

        a.rewind();
        assert!(a == b);
        assert_eq!(a.copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn custom_opener() {
        let nested = vec!["ab".to_string(), String::new(), "c".to_string()];
        let chars: String = Flattened::with(&nested, |s| s.chars()).collect();
        assert_eq!(chars, "abc");
    }
}
