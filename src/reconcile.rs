/// Reconciliation of classification rows with the filtered prospects
///
/// Strict inner join on prospect id. Rows on either side without a partner
/// are dropped; the counts are reported but never raised as errors.
/// Duplicate ids fan out like any relational join.
use crate::persona::ClassificationResult;
use crate::prospect::{ProspectRecord, ProspectTable};
use rustc_hash::{FxHashMap, FxHashSet};

/// Column names appended to the prospect columns in the enriched table
pub const CLASSIFICATION_COLUMNS: [&str; 3] = ["Classified Job Title", "Persona", "Persona Certainty"];

/// A prospect row paired with its classification
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRecord {
    pub prospect: ProspectRecord,
    pub classification: ClassificationResult,
}

impl ReconciledRecord {
    /// Prospect fields followed by the classification columns.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = self.prospect.fields().to_vec();
        row.push(self.classification.job_title.clone());
        row.push(self.classification.persona.to_string());
        row.push(self.classification.certainty.to_string());
        row
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Rows in the joined output
    pub matched: usize,
    /// Prospects whose id never came back from the classifier
    pub unmatched_prospects: usize,
    /// Returned rows whose id matches no prospect
    pub unmatched_results: usize,
}

/// Joined table ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledTable {
    pub headers: Vec<String>,
    pub records: Vec<ReconciledRecord>,
    pub stats: ReconcileStats,
}

impl ReconciledTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Inner-join `results` onto `prospects` by id, in prospect order.
pub fn reconcile(prospects: &ProspectTable, results: &[ClassificationResult]) -> ReconciledTable {
    let mut by_id: FxHashMap<&str, Vec<&ClassificationResult>> = FxHashMap::default();
    for result in results {
        by_id.entry(result.prospect_id.as_str()).or_default().push(result);
    }

    let mut records = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut unmatched_prospects = 0;

    for prospect in prospects.records() {
        let id = prospects.id_of(prospect);
        match by_id.get(id) {
            Some(matches) => {
                seen.insert(id);
                for classification in matches {
                    records.push(ReconciledRecord {
                        prospect: prospect.clone(),
                        classification: (*classification).clone(),
                    });
                }
            }
            None => unmatched_prospects += 1,
        }
    }

    let unmatched_results = results
        .iter()
        .filter(|r| !seen.contains(r.prospect_id.as_str()))
        .count();

    let stats = ReconcileStats {
        matched: records.len(),
        unmatched_prospects,
        unmatched_results,
    };

    if stats.unmatched_prospects > 0 || stats.unmatched_results > 0 {
        tracing::warn!(
            "Reconciliation dropped rows: {} prospects had no classification, {} classifications had no prospect",
            stats.unmatched_prospects,
            stats.unmatched_results
        );
    }

    let mut headers = prospects.headers().to_vec();
    headers.extend(CLASSIFICATION_COLUMNS.iter().map(|c| c.to_string()));

    ReconciledTable {
        headers,
        records,
        stats,
    }
}
