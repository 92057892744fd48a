/// Parsing of completion responses into classification rows
///
/// Each response is expected to be a headerless four-column CSV table:
/// prospect id, echoed job title, persona, certainty. Every row is checked
/// against that schema before it is accepted.
use crate::error::{EnrichError, Result};
use crate::persona::{Certainty, ClassificationResult, Persona};
use serde::{Deserialize, Serialize};

const EXPECTED_COLUMNS: usize = 4;

/// What to do with a row that violates the four-column schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Fail the run on the first invalid row
    #[default]
    Strict,
    /// Drop invalid rows with a warning
    SkipInvalid,
}

impl std::str::FromStr for RowPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(RowPolicy::Strict),
            "skip_invalid" | "skip-invalid" | "skip" => Ok(RowPolicy::SkipInvalid),
            other => Err(format!("unknown row policy '{}'", other)),
        }
    }
}

/// Validate one split row against the schema.
pub fn validate_row(fields: &[&str]) -> std::result::Result<ClassificationResult, String> {
    if fields.len() != EXPECTED_COLUMNS {
        return Err(format!(
            "expected {} columns, found {}",
            EXPECTED_COLUMNS,
            fields.len()
        ));
    }

    let prospect_id = fields[0].trim();
    if prospect_id.is_empty() {
        return Err("prospect id is empty".to_string());
    }

    let persona: Persona = fields[2].parse()?;
    let certainty: Certainty = fields[3].parse()?;

    Ok(ClassificationResult {
        prospect_id: prospect_id.to_string(),
        job_title: fields[1].trim().to_string(),
        persona,
        certainty,
    })
}

/// Markdown code fences some models wrap tables in
fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Parse the raw text returned for batch `batch`.
///
/// Blank lines and code fences are ignored. Line numbers in errors are
/// 1-based positions within `response`.
pub fn parse_response(batch: usize, response: &str, policy: RowPolicy) -> Result<Vec<ClassificationResult>> {
    let mut results = Vec::new();

    for (idx, line) in response.lines().enumerate() {
        if line.trim().is_empty() || is_fence(line) {
            continue;
        }

        let line_no = idx + 1;
        let parsed = split_csv_line(line).and_then(|fields| {
            let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
            validate_row(&refs)
        });

        match parsed {
            Ok(result) => results.push(result),
            Err(reason) => match policy {
                RowPolicy::Strict => {
                    return Err(EnrichError::MalformedRow {
                        batch,
                        line: line_no,
                        reason,
                    })
                }
                RowPolicy::SkipInvalid => {
                    tracing::warn!(
                        "Skipping malformed row in batch {}, line {}: {} ({:?})",
                        batch,
                        line_no,
                        reason,
                        line
                    );
                }
            },
        }
    }

    Ok(results)
}

/// Split one line with CSV quoting rules.
fn split_csv_line(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => Ok(record.iter().map(|f| f.to_string()).collect()),
        Some(Err(e)) => Err(format!("unreadable CSV: {}", e)),
        None => Err("empty row".to_string()),
    }
}
