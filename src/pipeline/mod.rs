//! Lazy query pipelines
//!
//! This module builds and evaluates chains of query stages over in-memory
//! sequences:
//!
//! 1. **Query**: immutable builder; each operator call appends one plan node
//! 2. **IR**: the chain flattened into a linear list of steps
//! 3. **Planner**: splits the IR into streaming segments and materializing
//!    boundaries (GroupBy, OrderBy)
//! 4. **Cursors**: pull-based evaluation, one cursor per stage
//!
//! ## Architecture
//!
//! ```text
//! Query::from_slice(&data).select(..).filter(..).skip(40000)?.take(160000)?.sum()
//!     ↓
//! PipeIR: [Source[200000], Select, Where, Skip(40000).Take(160000)]
//!     ↓
//! ExecutionPlan: [Streaming(Source, Select, Where, Window)]
//!     ↓
//! Cursors: Window <- Where <- Select <- Slice, pulled one element at a time
//! ```
//!
//! ## Evaluation rules
//!
//! - Building never runs user callbacks; only terminals (`sum`, `first`,
//!   `all`, `count`) do, and each terminal re-walks the chain from the source.
//! - Consecutive Skip/Take appends collapse into a single window over the
//!   upstream index space. A Where before the window shifts which elements
//!   fall inside it; a Where after the window only sees windowed elements.
//! - GroupBy and OrderBy drain their upstream on the first pull.
//! - Single-threaded pull evaluation. A built query may be shared across
//!   threads, each evaluation runs on the calling thread.

pub mod cursor;
pub mod execution_plan;
pub mod group;
pub mod ir;
pub mod order;
pub mod planner;
pub mod query;
pub mod terminal;
pub mod window;

pub use cursor::{BoxCursor, Cursor};
pub use execution_plan::{ExecutionPlan, Segment, SegmentKind};
pub use group::{Group, Grouping};
pub use ir::{PipeIR, Step};
pub use order::{asc, desc, Direction, SortKey};
pub use planner::Planner;
pub use query::Query;
pub use window::Window;
