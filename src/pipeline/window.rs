//! Skip/Take windowing
//!
//! A run of Skip and Take appends is collapsed into one half-open interval
//! `[start, end)` over the logical index space of the upstream sequence.
//! Intervals are narrowed in append order:
//!
//! ```text
//! [0, inf)  --Skip(20000)-->   [20000, inf)
//!           --Take(500000)-->  [20000, 520000)
//!           --Take(190000)-->  [20000, 210000)
//!           --Skip(20000)-->   [40000, 210000)   == Skip(40000).Take(170000)
//! ```

use std::fmt;

/// Normalized offset-and-length window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    start: usize,
    /// Exclusive upper bound, `None` when unbounded.
    end: Option<usize>,
}

impl Window {
    /// The window that admits every index.
    pub const UNBOUNDED: Window = Window {
        start: 0,
        end: None,
    };

    /// Build a window directly from an offset and optional length.
    pub fn new(offset: usize, len: Option<usize>) -> Self {
        Window {
            start: offset,
            end: len.map(|len| offset.saturating_add(len)),
        }
    }

    /// Narrow by a Skip: the start moves forward, never past the end.
    pub fn skip(self, n: usize) -> Self {
        let start = self.start.saturating_add(n);
        let start = match self.end {
            Some(end) => start.min(end),
            None => start,
        };
        Window {
            start,
            end: self.end,
        }
    }

    /// Narrow by a Take: the end is capped at `start + n`.
    pub fn take(self, n: usize) -> Self {
        let limit = self.start.saturating_add(n);
        let end = match self.end {
            Some(end) => end.min(limit),
            None => limit,
        };
        Window {
            start: self.start,
            end: Some(end),
        }
    }

    /// Total elements skipped before the window opens.
    pub fn offset(&self) -> usize {
        self.start
    }

    /// Window length, `None` if unbounded.
    pub fn len(&self) -> Option<usize> {
        self.end.map(|end| end - self.start)
    }

    /// True when no index can ever fall inside.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && !self.is_past_end(index)
    }

    /// True once `index` is at or beyond the exclusive end.
    pub fn is_past_end(&self, index: usize) -> bool {
        matches!(self.end, Some(end) if index >= end)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.len() {
            Some(len) => write!(f, "Skip({}).Take({})", self.start, len),
            None => write!(f, "Skip({})", self.start),
        }
    }
}
