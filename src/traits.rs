/// Dependency injection traits for the enrichment pipeline
///
/// This module provides trait-based abstractions for:
/// - Job title classification (LLM completion services)
/// - Prospect list loading
///
/// This allows the batching and reconciliation logic to be exercised with
/// scripted classifiers and in-memory tables instead of a live service.
use crate::error::Result;
use crate::prospect::ProspectTable;
use async_trait::async_trait;

// ============================================================================
// Classifier Trait
// ============================================================================

/// Trait for sending a classification prompt to a text-completion service
///
/// Implementations can use:
/// - LLM APIs (OpenAI, Anthropic, Ollama, etc.)
/// - Canned responses for tests
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Send one prompt and return the raw completion text
    ///
    /// The call is awaited to completion before the next batch is sent.
    /// Any failure is fatal to the run; implementations must not retry.
    async fn classify(&self, prompt: &str) -> Result<String>;

    /// Get the name/identifier of this classifier (for reporting)
    fn name(&self) -> &str;
}

#[async_trait]
impl<C: Classifier + ?Sized> Classifier for Box<C> {
    async fn classify(&self, prompt: &str) -> Result<String> {
        (**self).classify(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// Prospect Loader Trait
// ============================================================================

/// Trait for loading a prospect list
pub trait ProspectLoader {
    /// Load every row of the source, unfiltered
    fn load(&self) -> Result<ProspectTable>;

    /// Get the source name (for reporting)
    fn name(&self) -> &str;
}
