//! Execution plan with segments
//!
//! Splits a pipeline into lazy segments separated by materializing
//! boundaries. Inside a streaming segment elements are pulled one at a time;
//! a boundary segment consumes everything upstream before emitting anything.

use std::fmt;

use super::ir::Step;

/// Kind of execution segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Pull-through stages (source, select, where, window, select-many)
    Streaming,

    /// A single GroupBy or OrderBy step
    Materializing,
}

/// A run of steps sharing one evaluation strategy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub steps: Vec<Step>,
}

/// Complete execution plan for a pipeline
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Segments to execute in order
    pub segments: Vec<Segment>,
}

impl ExecutionPlan {
    /// Create empty execution plan
    pub fn new() -> Self {
        ExecutionPlan {
            segments: Vec::new(),
        }
    }

    /// Add a segment to the plan
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Number of segments in plan
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of materializing boundaries
    pub fn materializations(&self) -> usize {
        self.segments
            .iter()
            .filter(|seg| seg.kind == SegmentKind::Materializing)
            .count()
    }
}

impl Segment {
    /// Create a new segment
    pub fn new(kind: SegmentKind) -> Self {
        Segment {
            kind,
            steps: Vec::new(),
        }
    }

    /// Add a step to this segment
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn is_lazy(&self) -> bool {
        self.kind == SegmentKind::Streaming
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            let steps: Vec<String> = seg.steps.iter().map(ToString::to_string).collect();
            match seg.kind {
                SegmentKind::Streaming => write!(f, "{}", steps.join(" -> "))?,
                SegmentKind::Materializing => write!(f, "[{}]", steps.join(" -> "))?,
            }
        }
        Ok(())
    }
}
