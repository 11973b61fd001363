pub mod compute_pipeline;
pub mod pipeline_layout;
pub mod shader;
