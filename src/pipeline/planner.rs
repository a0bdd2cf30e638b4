//! Pipeline planner
//!
//! Converts PipeIR into ExecutionPlan by splitting the step list at
//! materializing boundaries (GroupBy, OrderBy). Each boundary gets a segment
//! of its own; everything between boundaries stays in one streaming segment.

use super::execution_plan::{ExecutionPlan, Segment, SegmentKind};
use super::ir::{PipeIR, Step};

/// Pipeline planner
pub struct Planner {
    /// Current streaming segment being built
    current_segment: Option<Segment>,

    /// Completed segments
    segments: Vec<Segment>,
}

impl Planner {
    pub fn new() -> Self {
        Planner {
            current_segment: None,
            segments: Vec::new(),
        }
    }

    /// Plan a pipeline IR into an execution plan
    pub fn plan(ir: &PipeIR) -> ExecutionPlan {
        let mut planner = Planner::new();

        for step in &ir.steps {
            planner.process_step(step);
        }

        planner.flush_segment();

        ExecutionPlan {
            segments: planner.segments,
        }
    }

    fn process_step(&mut self, step: &Step) {
        if step.is_materializing() {
            self.flush_segment();
            let mut boundary = Segment::new(SegmentKind::Materializing);
            boundary.push(step.clone());
            self.segments.push(boundary);
            return;
        }

        self.current_segment
            .get_or_insert_with(|| Segment::new(SegmentKind::Streaming))
            .push(step.clone());
    }

    /// Flush current segment to completed list
    fn flush_segment(&mut self) {
        if let Some(seg) = self.current_segment.take() {
            if !seg.steps.is_empty() {
                self.segments.push(seg);
            }
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}
