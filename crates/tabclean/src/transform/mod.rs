//! Transformation studio: pure column transformations and the pipeline that
//! chains them.

mod pipeline;
mod transformations;

pub use pipeline::{PipelineState, PipelineStep, StepId, TransformPipeline, run_pipeline};
pub use transformations::{
    TransformKind, apply_transformation, normalize, one_hot_encode, standardize,
};
