/// Prospect list loading and filtering
///
/// Reads a CSV prospect export, then drops internal and test addresses and
/// rows without a job title. Filters run in that order.
use crate::error::{EnrichError, Result};
use crate::prospect::{ColumnNames, ProspectRecord, ProspectTable};
use crate::traits::ProspectLoader;
use regex::Regex;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Email fragments excluded by default: internal staff and test accounts
pub const DEFAULT_EXCLUSION_PATTERNS: [&str; 2] = ["@aiven", "test"];

/// Strip whitespace and surrounding quotes from a typed or pasted path.
pub fn clean_input_path(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches(|c: char| c == '"' || c == '\''))
}

pub struct CsvProspectLoader {
    path: PathBuf,
    columns: ColumnNames,
    name: String,
}

impl CsvProspectLoader {
    pub fn new(path: impl AsRef<Path>, columns: ColumnNames) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("prospects")
            .to_string();

        Self { path, columns, name }
    }
}

impl ProspectLoader for CsvProspectLoader {
    fn load(&self) -> Result<ProspectTable> {
        let file = File::open(&self.path).map_err(|_| EnrichError::InputNotFound(self.path.clone()))?;

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            records.push(ProspectRecord::new(row.iter().map(|f| f.to_string()).collect()));
        }

        tracing::debug!("Loaded {} rows from {}", records.len(), self.path.display());

        ProspectTable::new(headers, &self.columns, records)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Case-sensitive email exclusion built from regex fragments
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    pattern: Option<Regex>,
}

impl ExclusionFilter {
    /// Combine `fragments` into one alternation. An empty list excludes nothing.
    pub fn new<S: AsRef<str>>(fragments: &[S]) -> Result<Self> {
        let parts: Vec<&str> = fragments
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| !f.is_empty())
            .collect();

        if parts.is_empty() {
            return Ok(Self { pattern: None });
        }

        let combined = parts.join("|");
        let pattern = Regex::new(&combined)
            .map_err(|e| EnrichError::Config(format!("invalid exclusion pattern '{}': {}", combined, e)))?;

        Ok(Self { pattern: Some(pattern) })
    }

    pub fn is_excluded(&self, email: &str) -> bool {
        self.pattern.as_ref().map_or(false, |re| re.is_match(email))
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new(&DEFAULT_EXCLUSION_PATTERNS).expect("default exclusion patterns are valid regex")
    }
}

/// Drop excluded emails, then rows with a blank job title.
pub fn filter_prospects(table: ProspectTable, exclusions: &ExclusionFilter) -> ProspectTable {
    let total = table.len();

    let table = table.retain(|t, r| !exclusions.is_excluded(t.email_of(r)));
    let after_exclusion = table.len();

    let table = table.retain(|t, r| !t.title_of(r).trim().is_empty());

    tracing::info!(
        "Filtered prospects: {} loaded, {} excluded by email, {} without job title, {} remaining",
        total,
        total - after_exclusion,
        after_exclusion - table.len(),
        table.len()
    );

    table
}
