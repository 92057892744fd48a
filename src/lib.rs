// Core modules
pub mod batcher;
pub mod error;
pub mod loader;
pub mod persona;
pub mod prompt;
pub mod prospect;
pub mod reconcile;
pub mod response_parser;
pub mod writer;

// Completion service
pub mod llm_config;
pub mod llm_service;

// Configuration and orchestration
pub mod config;
pub mod pipeline;
pub mod pipeline_config;
pub mod traits;

pub use error::{EnrichError, Result};
pub use pipeline::{EnrichmentOutcome, EnrichmentPipeline};
pub use traits::{Classifier, ProspectLoader};
