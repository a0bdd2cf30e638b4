//! querypipe: lazily evaluated query pipelines over in-memory sequences
//!
//! Build a chain of stages (select, filter, skip/take, group, order,
//! flatten) over a borrowed slice; nothing runs until a terminal (`sum`,
//! `first`, `all`, `count`) pulls the result through.
//!
//! ```
//! use querypipe::Query;
//!
//! let data: Vec<i32> = (0..100).collect();
//! let total = Query::from_slice(&data)
//!     .copied()
//!     .filter(|v| *v % 2 == 0)
//!     .skip(10)?
//!     .take(5)?
//!     .sum()?;
//! assert_eq!(total, 20 + 22 + 24 + 26 + 28);
//! # Ok::<(), querypipe::QueryError>(())
//! ```

pub mod error;
pub mod pipeline;

pub use error::{BoxError, QueryError, Result};
pub use pipeline::{
    asc, desc, Cursor, Direction, ExecutionPlan, Group, Grouping, PipeIR, Query, SegmentKind,
    SortKey, Step, Window,
};
