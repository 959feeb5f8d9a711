//! A small async step pipeline.
//!
//! Workflows are declared as ordered, named steps. Each step may carry
//! `before`, `on` and `after` handlers; handlers share state through
//! [`ContextData`] and steer the run with [`PipelineControl`].

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline};
pub use step::{SkipCondition, StepDef};
