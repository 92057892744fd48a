use crate::batcher::DEFAULT_BATCH_SIZE;
use crate::error::{EnrichError, Result};
use crate::loader::DEFAULT_EXCLUSION_PATTERNS;
use crate::prospect::ColumnNames;
use crate::response_parser::RowPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub columns: ColumnNames,
    pub exclusion_patterns: Vec<String>,
    pub row_policy: RowPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            columns: ColumnNames::default(),
            exclusion_patterns: DEFAULT_EXCLUSION_PATTERNS.iter().map(|p| p.to_string()).collect(),
            row_policy: RowPolicy::Strict,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small batches for debugging prompts by hand
    pub fn debugging() -> Self {
        Self {
            batch_size: 10,
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_exclusion_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusion_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_row_policy(mut self, policy: RowPolicy) -> Self {
        self.row_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(EnrichError::Config("batch size must be at least 1".to_string()));
        }
        Ok(())
    }
}
