/// End-to-end pipeline behaviour with a scripted classifier
use async_trait::async_trait;
use persona_enricher::loader::CsvProspectLoader;
use persona_enricher::persona::Persona;
use persona_enricher::pipeline::EnrichmentPipeline;
use persona_enricher::pipeline_config::PipelineConfig;
use persona_enricher::prompt::PERSONA_PREAMBLE;
use persona_enricher::prospect::ColumnNames;
use persona_enricher::response_parser::RowPolicy;
use persona_enricher::writer::{write_reconciled, RawLogSink};
use persona_enricher::{Classifier, EnrichError, Result};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

/// Replays canned responses, or echoes the prompted rows when none are left
struct ScriptedClassifier {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    fn echo() -> Self {
        Self::with_responses(Vec::<String>::new())
    }

    fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Title table lines of a prompt
    fn table_rows(prompt: &str) -> Vec<String> {
        prompt
            .strip_prefix(PERSONA_PREAMBLE)
            .expect("prompt starts with the preamble")
            .lines()
            .map(String::from)
            .collect()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(canned) = self.responses.lock().unwrap().pop_front() {
            return Ok(canned);
        }

        Ok(Self::table_rows(prompt)
            .iter()
            .map(|row| format!("{},Developer,0.80", row))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn write_prospects(dir: &tempfile::TempDir, rows: &[&str]) -> PathBuf {
    let path = dir.path().join("prospects.csv");
    let mut contents = String::from("Prospect Id,Email,Job Title,Company\n");
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    std::fs::write(&path, contents).unwrap();
    path
}

fn loader(path: &PathBuf) -> CsvProspectLoader {
    CsvProspectLoader::new(path, ColumnNames::default())
}

#[tokio::test]
async fn test_internal_email_is_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(
        &dir,
        &[
            "1,jane@acme.com,CTO,Acme",
            "2,foo@aiven.io,Developer Advocate,Aiven",
            "3,bob@globex.com,Platform Engineer,Globex",
        ],
    );

    let pipeline = EnrichmentPipeline::new(ScriptedClassifier::echo(), &PipelineConfig::default()).unwrap();
    let outcome = pipeline.run_from_loader(&loader(&path)).await.unwrap();

    assert_eq!(outcome.filtered_count, 2);
    let ids: Vec<_> = outcome
        .reconciled
        .records
        .iter()
        .map(|r| r.classification.prospect_id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_empty_title_is_excluded_regardless_of_email() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(
        &dir,
        &["1,jane@acme.com,,Acme", "2,bob@globex.com,Software Engineer,Globex"],
    );

    let pipeline = EnrichmentPipeline::new(ScriptedClassifier::echo(), &PipelineConfig::default()).unwrap();
    let outcome = pipeline.run_from_loader(&loader(&path)).await.unwrap();

    assert_eq!(outcome.filtered_count, 1);
    let rows = ScriptedClassifier::table_rows(&pipeline.classifier().prompts()[0]);
    assert_eq!(rows, vec!["2,Software Engineer"]);
}

#[tokio::test]
async fn test_batches_preserve_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(
        &dir,
        &[
            "a1,a@acme.com,CEO,Acme",
            "a2,b@acme.com,CIO,Acme",
            "a3,c@acme.com,Cloud Architect,Acme",
            "a4,d@acme.com,Student,Acme",
            "a5,e@acme.com,Software Engineer,Acme",
        ],
    );

    let config = PipelineConfig::new().with_batch_size(2);
    let pipeline = EnrichmentPipeline::new(ScriptedClassifier::echo(), &config).unwrap();
    let outcome = pipeline.run_from_loader(&loader(&path)).await.unwrap();

    let prompts = pipeline.classifier().prompts();
    let sizes: Vec<_> = prompts.iter().map(|p| ScriptedClassifier::table_rows(p).len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    let prompted_ids: Vec<String> = prompts
        .iter()
        .flat_map(|p| ScriptedClassifier::table_rows(p))
        .map(|row| row.split(',').next().unwrap().to_string())
        .collect();
    assert_eq!(prompted_ids, vec!["a1", "a2", "a3", "a4", "a5"]);

    assert_eq!(outcome.raw_responses.len(), 3);
    assert_eq!(outcome.reconciled.len(), 5);
}

#[tokio::test]
async fn test_title_commas_are_sanitized_in_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(&dir, &["7,jane@acme.com,\"Senior, Cloud Architect\",Acme"]);

    let pipeline = EnrichmentPipeline::new(ScriptedClassifier::echo(), &PipelineConfig::default()).unwrap();
    let outcome = pipeline.run_from_loader(&loader(&path)).await.unwrap();

    let rows = ScriptedClassifier::table_rows(&pipeline.classifier().prompts()[0]);
    assert_eq!(rows, vec!["7,Senior  Cloud Architect"]);

    // The original title passes through untouched
    let record = &outcome.reconciled.records[0];
    assert_eq!(record.prospect.field(2), "Senior, Cloud Architect");
    assert_eq!(record.classification.job_title, "Senior  Cloud Architect");
}

#[tokio::test]
async fn test_omitted_identifier_is_silently_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(
        &dir,
        &[
            "1,a@acme.com,CTO,Acme",
            "2,b@acme.com,Head of Infrastructure,Acme",
            "3,c@acme.com,Software Engineer,Acme",
        ],
    );

    let classifier = ScriptedClassifier::with_responses([
        "1,CTO,Executive,0.97\n3,Software Engineer,Developer,0.91",
    ]);
    let pipeline = EnrichmentPipeline::new(classifier, &PipelineConfig::default()).unwrap();
    let outcome = pipeline.run_from_loader(&loader(&path)).await.unwrap();

    assert_eq!(outcome.reconciled.len(), 2);
    assert_eq!(outcome.reconciled.stats.unmatched_prospects, 1);
    assert_eq!(outcome.reconciled.records[0].classification.persona, Persona::Executive);
}

#[tokio::test]
async fn test_unknown_identifier_from_service_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(&dir, &["1,a@acme.com,CTO,Acme"]);

    let classifier = ScriptedClassifier::with_responses(["1,CTO,Executive,0.97\n99,Intern,Not a target,0.99"]);
    let pipeline = EnrichmentPipeline::new(classifier, &PipelineConfig::default()).unwrap();
    let outcome = pipeline.run_from_loader(&loader(&path)).await.unwrap();

    assert_eq!(outcome.reconciled.len(), 1);
    assert_eq!(outcome.reconciled.stats.unmatched_results, 1);
}

#[tokio::test]
async fn test_malformed_row_fails_run_in_strict_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(&dir, &["1,a@acme.com,CTO,Acme", "2,b@acme.com,Developer,Acme"]);

    let classifier = ScriptedClassifier::with_responses(["1,CTO,Executive,0.97", "2,Developer,Developer,very sure"]);
    let config = PipelineConfig::new().with_batch_size(1);
    let pipeline = EnrichmentPipeline::new(classifier, &config).unwrap();

    let err = pipeline.run_from_loader(&loader(&path)).await.unwrap_err();
    match err {
        EnrichError::MalformedRow { batch, line, .. } => {
            assert_eq!(batch, 1);
            assert_eq!(line, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_skip_invalid_keeps_remaining_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(&dir, &["1,a@acme.com,CTO,Acme", "2,b@acme.com,Developer,Acme"]);

    let classifier = ScriptedClassifier::with_responses(["1,CTO,Executive,0.97\n2,Developer,Wizard,0.50"]);
    let config = PipelineConfig::new().with_row_policy(RowPolicy::SkipInvalid);
    let pipeline = EnrichmentPipeline::new(classifier, &config).unwrap();

    let outcome = pipeline.run_from_loader(&loader(&path)).await.unwrap();
    assert_eq!(outcome.reconciled.len(), 1);
}

#[tokio::test]
async fn test_missing_input_file() {
    let pipeline = EnrichmentPipeline::new(ScriptedClassifier::echo(), &PipelineConfig::default()).unwrap();
    let missing = PathBuf::from("/no/such/prospects.csv");

    let err = pipeline.run_from_loader(&loader(&missing)).await.unwrap_err();
    assert!(matches!(err, EnrichError::InputNotFound(_)));
    assert!(pipeline.classifier().prompts().is_empty());
}

#[tokio::test]
async fn test_outputs_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prospects(&dir, &["1,a@acme.com,CTO,Acme", "2,b@acme.com,Student,Acme"]);

    let config = PipelineConfig::new().with_batch_size(1);
    let pipeline = EnrichmentPipeline::new(ScriptedClassifier::echo(), &config).unwrap();
    let outcome = pipeline.run_from_loader(&loader(&path)).await.unwrap();

    let reconciled_path = dir.path().join("reconciled_results.csv");
    write_reconciled(&outcome.reconciled, &reconciled_path).unwrap();

    let sink = RawLogSink::new(dir.path(), "Personas");
    let raw_path = sink.write(&outcome.raw_responses, &chrono::Local::now()).unwrap();

    let reconciled = std::fs::read_to_string(&reconciled_path).unwrap();
    assert_eq!(
        reconciled.lines().next(),
        Some("Prospect Id,Email,Job Title,Company,Classified Job Title,Persona,Persona Certainty")
    );
    assert_eq!(reconciled.lines().count(), 3);

    let raw = std::fs::read_to_string(&raw_path).unwrap();
    assert_eq!(raw, "1,CTO,Developer,0.80\n2,Student,Developer,0.80");

    let file_name = raw_path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("Personas "));
    assert!(file_name.ends_with(".txt"));
}
