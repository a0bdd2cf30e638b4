//! Pull cursors
//!
//! Each stage evaluates through a cursor: a state-holding object that
//! produces the next element or reports the end. A terminal evaluator opens
//! the outermost cursor and pulls; each cursor pulls from its upstream only
//! as far as it needs to.

use std::sync::Arc;

use crate::error::Result;

use super::window::Window;

/// "Produce next element or end" contract implemented by every stage.
pub trait Cursor<T> {
    /// Pull the next element. `Ok(None)` is the end of the sequence.
    fn next(&mut self) -> Result<Option<T>>;

    /// Discard up to `n` elements, returning how many were discarded.
    ///
    /// Discarded elements still run through upstream callbacks.
    fn advance_by(&mut self, n: usize) -> Result<usize> {
        for done in 0..n {
            if self.next()?.is_none() {
                return Ok(done);
            }
        }
        Ok(n)
    }

    /// Bounds on the remaining length, same contract as `Iterator::size_hint`.
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

pub type BoxCursor<'a, T> = Box<dyn Cursor<T> + 'a>;

/// Cursor over a borrowed slice
pub struct SliceCursor<'a, S> {
    items: &'a [S],
}

impl<'a, S> SliceCursor<'a, S> {
    pub fn new(items: &'a [S]) -> Self {
        SliceCursor { items }
    }
}

impl<'a, S> Cursor<&'a S> for SliceCursor<'a, S> {
    #[inline]
    fn next(&mut self) -> Result<Option<&'a S>> {
        match self.items.split_first() {
            Some((head, rest)) => {
                self.items = rest;
                Ok(Some(head))
            }
            None => Ok(None),
        }
    }

    fn advance_by(&mut self, n: usize) -> Result<usize> {
        let step = n.min(self.items.len());
        self.items = &self.items[step..];
        Ok(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.items.len(), Some(self.items.len()))
    }
}

/// Cursor over a materialized result
pub struct OwnedCursor<T> {
    items: std::vec::IntoIter<T>,
}

impl<T> OwnedCursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        OwnedCursor {
            items: items.into_iter(),
        }
    }
}

impl<T> Cursor<T> for OwnedCursor<T> {
    fn next(&mut self) -> Result<Option<T>> {
        Ok(self.items.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

/// One-to-one projection
pub struct SelectCursor<'a, T, F> {
    upstream: BoxCursor<'a, T>,
    f: Arc<F>,
}

impl<'a, T, F> SelectCursor<'a, T, F> {
    pub fn new(upstream: BoxCursor<'a, T>, f: Arc<F>) -> Self {
        SelectCursor { upstream, f }
    }
}

impl<'a, T, U, F> Cursor<U> for SelectCursor<'a, T, F>
where
    F: Fn(T) -> Result<U>,
{
    #[inline]
    fn next(&mut self) -> Result<Option<U>> {
        match self.upstream.next()? {
            Some(item) => (self.f)(item).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.upstream.size_hint()
    }
}

/// Predicate filter
pub struct WhereCursor<'a, T, P> {
    upstream: BoxCursor<'a, T>,
    predicate: Arc<P>,
}

impl<'a, T, P> WhereCursor<'a, T, P> {
    pub fn new(upstream: BoxCursor<'a, T>, predicate: Arc<P>) -> Self {
        WhereCursor {
            upstream,
            predicate,
        }
    }
}

impl<'a, T, P> Cursor<T> for WhereCursor<'a, T, P>
where
    P: Fn(&T) -> Result<bool>,
{
    #[inline]
    fn next(&mut self) -> Result<Option<T>> {
        while let Some(item) = self.upstream.next()? {
            if (self.predicate)(&item)? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.upstream.size_hint().1)
    }
}

/// Normalized Skip/Take window over the upstream index stream
pub struct WindowCursor<'a, T> {
    upstream: BoxCursor<'a, T>,
    window: Window,
    /// Upstream index of the next element to be pulled
    position: usize,
}

impl<'a, T> WindowCursor<'a, T> {
    pub fn new(upstream: BoxCursor<'a, T>, window: Window) -> Self {
        WindowCursor {
            upstream,
            window,
            position: 0,
        }
    }
}

impl<'a, T> Cursor<T> for WindowCursor<'a, T> {
    fn next(&mut self) -> Result<Option<T>> {
        if self.position < self.window.offset() {
            let wanted = self.window.offset() - self.position;
            let skipped = self.upstream.advance_by(wanted)?;
            self.position += skipped;
            if skipped < wanted {
                return Ok(None);
            }
        }

        // Past the end nothing more is pulled from upstream.
        if self.window.is_past_end(self.position) {
            return Ok(None);
        }

        let item = self.upstream.next()?;
        if item.is_some() {
            self.position += 1;
        }
        Ok(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.upstream.size_hint();
        let pending_skip = self.window.offset().saturating_sub(self.position);
        let remaining = self
            .window
            .len()
            .map(|len| (self.window.offset() + len).saturating_sub(self.position.max(self.window.offset())));

        let lower = lower.saturating_sub(pending_skip);
        let upper = upper.map(|u| u.saturating_sub(pending_skip));
        match remaining {
            Some(rem) => (lower.min(rem), Some(upper.map_or(rem, |u| u.min(rem)))),
            None => (lower, upper),
        }
    }
}

/// Flattening projection
pub struct SelectManyCursor<'a, T, I: IntoIterator, F> {
    upstream: BoxCursor<'a, T>,
    f: Arc<F>,
    current: Option<I::IntoIter>,
}

impl<'a, T, I: IntoIterator, F> SelectManyCursor<'a, T, I, F> {
    pub fn new(upstream: BoxCursor<'a, T>, f: Arc<F>) -> Self {
        SelectManyCursor {
            upstream,
            f,
            current: None,
        }
    }
}

impl<'a, T, I, F> Cursor<I::Item> for SelectManyCursor<'a, T, I, F>
where
    I: IntoIterator,
    F: Fn(T) -> I,
{
    fn next(&mut self) -> Result<Option<I::Item>> {
        loop {
            if let Some(inner) = self.current.as_mut() {
                if let Some(item) = inner.next() {
                    return Ok(Some(item));
                }
                self.current = None;
            }

            match self.upstream.next()? {
                Some(item) => self.current = Some((self.f)(item).into_iter()),
                None => return Ok(None),
            }
        }
    }
}

/// Cursor that consumes its whole upstream on the first pull.
///
/// Used by the grouping and ordering boundaries; `finish` turns the drained
/// upstream into the materialized output.
pub struct MaterializeCursor<'a, T, U, F> {
    pending: Option<(BoxCursor<'a, T>, F)>,
    output: Option<std::vec::IntoIter<U>>,
}

impl<'a, T, U, F> MaterializeCursor<'a, T, U, F>
where
    F: FnOnce(BoxCursor<'a, T>) -> Result<Vec<U>>,
{
    pub fn new(upstream: BoxCursor<'a, T>, finish: F) -> Self {
        MaterializeCursor {
            pending: Some((upstream, finish)),
            output: None,
        }
    }
}

impl<'a, T, U, F> Cursor<U> for MaterializeCursor<'a, T, U, F>
where
    F: FnOnce(BoxCursor<'a, T>) -> Result<Vec<U>>,
{
    fn next(&mut self) -> Result<Option<U>> {
        if let Some((upstream, finish)) = self.pending.take() {
            self.output = Some(finish(upstream)?.into_iter());
        }
        Ok(self.output.as_mut().and_then(Iterator::next))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.output {
            Some(output) => output.size_hint(),
            None => (0, None),
        }
    }
}

/// Drain a cursor into a vector.
pub fn drain<T>(cursor: &mut dyn Cursor<T>) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(cursor.size_hint().0);
    while let Some(item) = cursor.next()? {
        out.push(item);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;

    fn slice<'a>(items: &'a [i32]) -> BoxCursor<'a, &'a i32> {
        Box::new(SliceCursor::new(items))
    }

    #[test]
    fn test_slice_cursor() {
        let data = [1, 2, 3];
        let mut cursor = SliceCursor::new(&data);
        assert_eq!(cursor.size_hint(), (3, Some(3)));
        assert_eq!(cursor.next().unwrap(), Some(&1));
        assert_eq!(cursor.advance_by(5).unwrap(), 2);
        assert_eq!(cursor.next().unwrap(), None);
    }

    #[test]
    fn test_select_where() {
        let data = [1, 2, 3, 4, 5, 6];
        let select: BoxCursor<'_, i32> = Box::new(SelectCursor::new(
            slice(&data),
            Arc::new(|v: &i32| Ok::<_, QueryError>(v * 10)),
        ));
        let mut filter = WhereCursor::new(select, Arc::new(|v: &i32| Ok::<_, QueryError>(*v > 30)));

        assert_eq!(drain(&mut filter).unwrap(), vec![40, 50, 60]);
    }

    #[test]
    fn test_window_cursor() {
        let data: Vec<i32> = (0..10).collect();
        let window = Window::UNBOUNDED.skip(3).take(4);
        let mut cursor = WindowCursor::new(slice(&data), window);

        assert_eq!(cursor.size_hint(), (4, Some(4)));
        let out: Vec<i32> = drain(&mut cursor).unwrap().into_iter().copied().collect();
        assert_eq!(out, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_window_past_source_end() {
        let data = [1, 2, 3];
        let mut cursor = WindowCursor::new(slice(&data), Window::UNBOUNDED.skip(10));
        assert_eq!(cursor.next().unwrap(), None);
        assert_eq!(cursor.next().unwrap(), None);
    }

    #[test]
    fn test_window_stops_pulling_at_end() {
        use std::cell::Cell;

        let data: Vec<i32> = (0..100).collect();
        let pulled = Cell::new(0);
        let select: BoxCursor<'_, i32> = Box::new(SelectCursor::new(
            slice(&data),
            Arc::new(|v: &i32| {
                pulled.set(pulled.get() + 1);
                Ok::<_, QueryError>(*v)
            }),
        ));
        let mut cursor = WindowCursor::new(select, Window::UNBOUNDED.skip(5).take(3));

        assert_eq!(drain(&mut cursor).unwrap(), vec![5, 6, 7]);
        assert_eq!(pulled.get(), 8);
    }

    #[test]
    fn test_select_many_cursor() {
        let data = [1, 2, 3];
        let mut cursor: SelectManyCursor<'_, &i32, [i32; 2], _> =
            SelectManyCursor::new(slice(&data), Arc::new(|v: &i32| [*v, -*v]));
        assert_eq!(drain(&mut cursor).unwrap(), vec![1, -1, 2, -2, 3, -3]);
    }

    #[test]
    fn test_materialize_is_deferred() {
        let data = [3, 1, 2];
        let finish = |mut upstream: BoxCursor<'_, &i32>| -> Result<Vec<i32>> {
            let mut all: Vec<i32> = drain(upstream.as_mut())?.into_iter().copied().collect();
            all.sort();
            Ok(all)
        };
        let mut cursor = MaterializeCursor::new(slice(&data), finish);
        assert_eq!(cursor.size_hint(), (0, None));
        assert_eq!(cursor.next().unwrap(), Some(1));
        assert_eq!(cursor.size_hint(), (2, Some(2)));
        assert_eq!(drain(&mut cursor).unwrap(), vec![2, 3]);
    }
}
