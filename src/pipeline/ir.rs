//! Intermediate Representation for query pipelines
//!
//! A built `Query` is a chain of typed nodes. The IR flattens that chain
//! into a linear list of untyped steps, source first, so it can be planned
//! and printed without knowing the element types.

use std::fmt;

use super::order::Direction;
use super::window::Window;

/// A single step in the pipeline IR
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Borrowed slice source
    Source { len: usize },

    /// One-to-one projection
    Select,

    /// Predicate filter
    Where,

    /// Collapsed Skip/Take run
    Window(Window),

    /// Flattening projection
    SelectMany,

    /// Grouping boundary (materializes upstream)
    GroupBy,

    /// Ordering boundary (materializes upstream)
    OrderBy { directions: Vec<Direction> },
}

impl Step {
    /// Whether this step must consume its whole upstream before emitting.
    pub fn is_materializing(&self) -> bool {
        matches!(self, Step::GroupBy | Step::OrderBy { .. })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Source { len } => write!(f, "Source[{len}]"),
            Step::Select => write!(f, "Select"),
            Step::Where => write!(f, "Where"),
            Step::Window(window) => write!(f, "{window}"),
            Step::SelectMany => write!(f, "SelectMany"),
            Step::GroupBy => write!(f, "GroupBy"),
            Step::OrderBy { directions } => {
                write!(f, "OrderBy(")?;
                for (i, dir) in directions.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{dir}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Pipeline intermediate representation
///
/// Steps are stored in append order, source first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipeIR {
    pub steps: Vec<Step>,
}

impl PipeIR {
    /// Create empty pipeline
    pub fn new() -> Self {
        PipeIR { steps: Vec::new() }
    }

    /// Add a step to the pipeline
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Number of steps in pipeline
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Windows present in the chain
    pub fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        self.steps.iter().filter_map(|step| match step {
            Step::Window(window) => Some(*window),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_ir_creation() {
        let mut ir = PipeIR::new();
        assert!(ir.is_empty());

        ir.push(Step::Source { len: 3 });
        ir.push(Step::Select);
        ir.push(Step::Window(Window::UNBOUNDED.skip(1)));

        assert_eq!(ir.len(), 3);
        assert_eq!(ir.windows().collect::<Vec<_>>(), vec![Window::new(1, None)]);
    }

    #[test]
    fn test_materializing_steps() {
        assert!(Step::GroupBy.is_materializing());
        assert!(Step::OrderBy { directions: vec![Direction::Ascending] }.is_materializing());
        assert!(!Step::Where.is_materializing());
        assert!(!Step::Window(Window::UNBOUNDED).is_materializing());
    }

    #[test]
    fn test_step_display() {
        let step = Step::OrderBy {
            directions: vec![Direction::Ascending, Direction::Descending],
        };
        assert_eq!(step.to_string(), "OrderBy(asc, desc)");
        assert_eq!(Step::Source { len: 10 }.to_string(), "Source[10]");
    }
}
