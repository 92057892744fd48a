/// End-to-end enrichment pipeline
///
/// load -> filter -> batch -> (prompt -> classify) per batch -> parse -> reconcile
///
/// Batches are sent strictly one after another. The first failure aborts the
/// run and discards every response gathered so far.
use crate::batcher::split_into_batches;
use crate::error::Result;
use crate::loader::{filter_prospects, ExclusionFilter};
use crate::persona::ClassificationResult;
use crate::pipeline_config::PipelineConfig;
use crate::prompt::PromptBuilder;
use crate::prospect::ProspectTable;
use crate::reconcile::{reconcile, ReconciledTable};
use crate::response_parser::{parse_response, RowPolicy};
use crate::traits::{Classifier, ProspectLoader};

/// Everything a run produces before it is written out
#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    pub reconciled: ReconciledTable,
    /// Raw completion text, one entry per batch, in batch order
    pub raw_responses: Vec<String>,
    pub filtered_count: usize,
}

pub struct EnrichmentPipeline<C> {
    classifier: C,
    prompts: PromptBuilder,
    exclusions: ExclusionFilter,
    batch_size: usize,
    row_policy: RowPolicy,
}

impl<C: Classifier> EnrichmentPipeline<C> {
    pub fn new(classifier: C, config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            classifier,
            prompts: PromptBuilder::default(),
            exclusions: ExclusionFilter::new(&config.exclusion_patterns)?,
            batch_size: config.batch_size,
            row_policy: config.row_policy,
        })
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Load, filter and enrich the prospects from `loader`.
    pub async fn run_from_loader<L: ProspectLoader + ?Sized>(&self, loader: &L) -> Result<EnrichmentOutcome> {
        tracing::info!("Loading prospects from {}", loader.name());
        let prospects = loader.load()?;
        let filtered = filter_prospects(prospects, &self.exclusions);
        self.run(&filtered).await
    }

    /// Enrich an already filtered table.
    pub async fn run(&self, prospects: &ProspectTable) -> Result<EnrichmentOutcome> {
        let raw_responses = self.classify_batches(prospects).await?;

        let mut results: Vec<ClassificationResult> = Vec::new();
        for (batch, response) in raw_responses.iter().enumerate() {
            results.extend(parse_response(batch, response, self.row_policy)?);
        }

        let reconciled = reconcile(prospects, &results);
        tracing::info!(
            "Reconciled {} of {} prospects ({} classification rows returned)",
            reconciled.stats.matched,
            prospects.len(),
            results.len()
        );

        Ok(EnrichmentOutcome {
            reconciled,
            raw_responses,
            filtered_count: prospects.len(),
        })
    }

    /// Send one prompt per batch and collect the raw responses in order.
    pub async fn classify_batches(&self, prospects: &ProspectTable) -> Result<Vec<String>> {
        let batches = split_into_batches(prospects.records(), self.batch_size)?;
        let total = batches.len();
        tracing::info!(
            "Number of iterations: {} (batch size {}, classifier {})",
            total,
            self.batch_size,
            self.classifier.name()
        );

        let mut responses = Vec::with_capacity(total);
        for batch in &batches {
            let prompt = self.prompts.build_for_batch(prospects, batch);
            tracing::info!("Classifying batch {}/{} ({} rows)", batch.index + 1, total, batch.len());
            tracing::debug!("Batch {} prompt is {} bytes", batch.index + 1, prompt.len());

            let response = self.classifier.classify(&prompt).await?;
            responses.push(response);
        }

        Ok(responses)
    }
}
