use std::env;
use std::path::PathBuf;

use crate::error::{EnrichError, Result};
use crate::llm_config::LLMProviderConfig;
use crate::pipeline_config::PipelineConfig;
use crate::prompt::{PromptBuilder, PERSONA_PREAMBLE};
use crate::prospect::ColumnNames;
use crate::writer::RawLogSink;

/// Where run output lands
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub raw_log: RawLogSink,
    pub reconciled_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_log: RawLogSink::default(),
            reconciled_path: PathBuf::from("reconciled_results.csv"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub llm: LLMProviderConfig,
    pub output: OutputConfig,

    // Optional file replacing the built-in persona preamble
    pub prompt_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PipelineConfig::default();
        let default_columns = ColumnNames::default();

        let batch_size = match lookup("PERSONA_BATCH_SIZE") {
            Some(v) => v.trim().parse().map_err(|_| {
                EnrichError::Config(format!("PERSONA_BATCH_SIZE must be a positive integer, got '{}'", v))
            })?,
            None => defaults.batch_size,
        };

        let columns = ColumnNames {
            id: lookup("PERSONA_ID_COLUMN").unwrap_or(default_columns.id),
            email: lookup("PERSONA_EMAIL_COLUMN").unwrap_or(default_columns.email),
            title: lookup("PERSONA_TITLE_COLUMN").unwrap_or(default_columns.title),
        };

        let exclusion_patterns = match lookup("PERSONA_EXCLUDE_PATTERNS") {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.exclusion_patterns,
        };

        let row_policy = match lookup("PERSONA_ROW_POLICY") {
            Some(v) => v.parse().map_err(EnrichError::Config)?,
            None => defaults.row_policy,
        };

        let pipeline = PipelineConfig::new()
            .with_batch_size(batch_size)
            .with_columns(columns)
            .with_exclusion_patterns(exclusion_patterns)
            .with_row_policy(row_policy);
        pipeline.validate()?;

        let default_sink = RawLogSink::default();
        let output = OutputConfig {
            raw_log: RawLogSink::new(
                lookup("PERSONA_OUTPUT_DIR").map(PathBuf::from).unwrap_or(default_sink.dir),
                lookup("PERSONA_RAW_LOG_PREFIX").unwrap_or(default_sink.prefix),
            ),
            reconciled_path: lookup("PERSONA_RECONCILED_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| OutputConfig::default().reconciled_path),
        };

        Ok(Config {
            pipeline,
            llm: LLMProviderConfig::from_lookup(&lookup)?,
            output,
            prompt_file: lookup("PERSONA_PROMPT_FILE").map(PathBuf::from),
        })
    }

    /// Prompt builder using the configured preamble file, if any.
    pub fn prompt_builder(&self) -> Result<PromptBuilder> {
        match &self.prompt_file {
            Some(path) => {
                let preamble = std::fs::read_to_string(path).map_err(|e| {
                    EnrichError::Config(format!("cannot read prompt file {}: {}", path.display(), e))
                })?;
                Ok(PromptBuilder::new(preamble))
            }
            None => Ok(PromptBuilder::new(PERSONA_PREAMBLE)),
        }
    }

    pub fn log_config(&self) {
        tracing::info!("📋 Configuration:");
        tracing::info!("   Batch size: {}", self.pipeline.batch_size);
        tracing::info!(
            "   Columns: id='{}', email='{}', title='{}'",
            self.pipeline.columns.id,
            self.pipeline.columns.email,
            self.pipeline.columns.title
        );
        tracing::info!("   Excluded email patterns: {:?}", self.pipeline.exclusion_patterns);
        tracing::info!("   Row policy: {:?}", self.pipeline.row_policy);
        tracing::info!("   LLM Provider: {}", self.llm.provider);
        tracing::info!("   LLM Model: {}", self.llm.model);
        tracing::info!("   LLM API Key: {}", self.llm.masked_api_key());
        if let Some(ref endpoint) = self.llm.endpoint {
            tracing::info!("   LLM Endpoint: {}", endpoint);
        }
        if let Some(ref prompt_file) = self.prompt_file {
            tracing::info!("   Prompt file: {}", prompt_file.display());
        }
        tracing::info!("   Raw log directory: {}", self.output.raw_log.dir.display());
        tracing::info!("   Reconciled output: {}", self.output.reconciled_path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response_parser::RowPolicy;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        Config::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.output, OutputConfig::default());
        assert!(config.prompt_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PERSONA_BATCH_SIZE", "25"),
            ("PERSONA_ID_COLUMN", "Prospect ID"),
            ("PERSONA_EXCLUDE_PATTERNS", "@aiven, test ,,@example"),
            ("PERSONA_ROW_POLICY", "skip_invalid"),
            ("PERSONA_OUTPUT_DIR", "/tmp/personas"),
            ("LLM_PROVIDER", "ollama"),
        ])
        .unwrap();

        assert_eq!(config.pipeline.batch_size, 25);
        assert_eq!(config.pipeline.columns.id, "Prospect ID");
        assert_eq!(config.pipeline.exclusion_patterns, vec!["@aiven", "test", "@example"]);
        assert_eq!(config.pipeline.row_policy, RowPolicy::SkipInvalid);
        assert_eq!(config.output.raw_log.dir, PathBuf::from("/tmp/personas"));
        assert_eq!(config.llm.provider, "ollama");
    }

    #[test]
    fn test_invalid_batch_size() {
        assert!(config_from(&[("PERSONA_BATCH_SIZE", "0")]).is_err());
        assert!(config_from(&[("PERSONA_BATCH_SIZE", "many")]).is_err());
    }

    #[test]
    fn test_prompt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preamble.txt");
        std::fs::write(&path, "Classify these:\n").unwrap();

        let config = config_from(&[("PERSONA_PROMPT_FILE", path.to_str().unwrap())]).unwrap();
        assert_eq!(config.prompt_builder().unwrap().preamble(), "Classify these:\n");
    }
}
