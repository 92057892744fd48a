/// Prospect table model
///
/// A prospect list is kept as an ordered table of string rows so that every
/// column of the input file passes through to the enriched output untouched.
/// Only three columns carry meaning: the identifier, the email and the job title.
use crate::error::{EnrichError, Result};

/// Names of the columns the pipeline reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub id: String,
    pub email: String,
    pub title: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "Prospect Id".to_string(),
            email: "Email".to_string(),
            title: "Job Title".to_string(),
        }
    }
}

/// Resolved positions of the meaningful columns within a header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub id: usize,
    pub email: usize,
    pub title: usize,
}

impl ColumnIndex {
    /// Locate the named columns in `headers`, failing on the first one absent.
    pub fn resolve(headers: &[String], names: &ColumnNames) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| EnrichError::MissingColumn {
                    column: column.to_string(),
                    available: headers.join(", "),
                })
        };

        Ok(Self {
            id: find(&names.id)?,
            email: find(&names.email)?,
            title: find(&names.title)?,
        })
    }
}

/// One row of the input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProspectRecord {
    fields: Vec<String>,
}

impl ProspectRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `idx`, or the empty string when the row is short.
    pub fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// Ordered prospect rows plus the header they were read with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProspectTable {
    headers: Vec<String>,
    columns: ColumnIndex,
    records: Vec<ProspectRecord>,
}

impl ProspectTable {
    pub fn new(headers: Vec<String>, names: &ColumnNames, records: Vec<ProspectRecord>) -> Result<Self> {
        let columns = ColumnIndex::resolve(&headers, names)?;
        Ok(Self {
            headers,
            columns,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> ColumnIndex {
        self.columns
    }

    pub fn records(&self) -> &[ProspectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn id_of<'a>(&self, record: &'a ProspectRecord) -> &'a str {
        record.field(self.columns.id).trim()
    }

    pub fn email_of<'a>(&self, record: &'a ProspectRecord) -> &'a str {
        record.field(self.columns.email)
    }

    pub fn title_of<'a>(&self, record: &'a ProspectRecord) -> &'a str {
        record.field(self.columns.title)
    }

    /// Keep only the rows for which `keep` holds, preserving order.
    pub fn retain<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&Self, &ProspectRecord) -> bool,
    {
        let records = std::mem::take(&mut self.records);
        let kept: Vec<ProspectRecord> = records.into_iter().filter(|r| keep(&self, r)).collect();
        self.records = kept;
        self
    }
}
