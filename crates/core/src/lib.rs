pub mod engine;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod producer;

pub use engine::{FixpointOutcome, PolicyEngine, ViewStore};
pub use error::{Result, StencilError};
pub use pipeline::{Phase, Pipeline, PipelineBuilder, PipelineConfig, PipelineReport};
pub use producer::EventProducer;
