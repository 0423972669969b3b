//! Pipeline state objects and their resource bindings.

mod binding;
mod builder;

pub use binding::ShaderResourceBinding;
pub use builder::{PipelineBuilder, PipelineState};
