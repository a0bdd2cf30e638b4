//! Terminal evaluators
//!
//! Each terminal opens the chain from the source, pulls what it needs and
//! drops every cursor on return. Nothing is cached between calls.

use std::ops::Add;

use tracing::debug;

use crate::error::{QueryError, Result};

use super::cursor::{drain, BoxCursor};
use super::query::Query;

impl<'a, T: 'a> Query<'a, T> {
    fn open(&self, terminal: &'static str) -> Result<BoxCursor<'a, T>> {
        debug!(terminal, "evaluating query");
        self.plan.open()
    }

    /// Fold every remaining element with `+`. An empty sequence sums to
    /// `T::default()`.
    pub fn sum(&self) -> Result<T>
    where
        T: Default + Add<Output = T>,
    {
        let mut cursor = self.open("sum")?;
        let mut total = T::default();
        while let Some(item) = cursor.next()? {
            total = total + item;
        }
        Ok(total)
    }

    /// Pull exactly one element.
    pub fn first(&self) -> Result<T> {
        let mut cursor = self.open("first")?;
        cursor.next()?.ok_or(QueryError::EmptySequence)
    }

    /// Materialize the whole sequence.
    pub fn all(&self) -> Result<Vec<T>> {
        let mut cursor = self.open("all")?;
        drain(cursor.as_mut())
    }

    pub fn count(&self) -> Result<usize> {
        let mut cursor = self.open("count")?;
        let mut count = 0;
        while cursor.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }
}
