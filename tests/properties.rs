// Property-based tests for batching, title sanitization and reconciliation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use persona_enricher::batcher::split_into_batches;
use persona_enricher::persona::{Certainty, ClassificationResult, Persona};
use persona_enricher::prompt::sanitize_title;
use persona_enricher::prospect::{ColumnNames, ProspectRecord, ProspectTable};
use persona_enricher::reconcile::reconcile;
use persona_enricher::response_parser::{parse_response, RowPolicy};
use proptest::prelude::*;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_title() -> impl Strategy<Value = String> {
    r"[A-Za-z ,&/-]{0,40}"
}

fn arb_ids(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(r"[0-9]{1,5}", 0..max).prop_map(|s| s.into_iter().collect())
}

fn table(ids: &[String]) -> ProspectTable {
    let headers = vec!["Prospect Id".to_string(), "Email".to_string(), "Job Title".to_string()];
    let records = ids
        .iter()
        .map(|id| ProspectRecord::new(vec![id.clone(), format!("{}@acme.com", id), "Engineer".to_string()]))
        .collect();
    ProspectTable::new(headers, &ColumnNames::default(), records).unwrap()
}

fn result(id: &str) -> ClassificationResult {
    ClassificationResult {
        prospect_id: id.to_string(),
        job_title: "Engineer".to_string(),
        persona: Persona::Developer,
        certainty: Certainty::new(0.5).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn batches_concatenate_to_input(
        rows in prop::collection::vec(any::<u32>(), 0..500),
        batch_size in 1usize..200,
    ) {
        let batches = split_into_batches(&rows, batch_size).unwrap();

        let rejoined: Vec<u32> = batches.iter().flat_map(|b| b.records.iter().copied()).collect();
        prop_assert_eq!(&rejoined, &rows);

        for (i, batch) in batches.iter().enumerate() {
            prop_assert_eq!(batch.index, i);
            prop_assert!(!batch.is_empty());
            if i + 1 < batches.len() {
                prop_assert_eq!(batch.len(), batch_size);
            } else {
                prop_assert!(batch.len() <= batch_size);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn sanitized_titles_only_swap_commas(title in arb_title()) {
        let sanitized = sanitize_title(&title);

        prop_assert!(!sanitized.contains(','));
        prop_assert_eq!(sanitized.chars().count(), title.chars().count());
        for (before, after) in title.chars().zip(sanitized.chars()) {
            if before == ',' {
                prop_assert_eq!(after, ' ');
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn join_keeps_exactly_shared_ids(
        prospect_ids in arb_ids(40),
        returned_ids in arb_ids(40),
    ) {
        let prospects = table(&prospect_ids);
        let results: Vec<_> = returned_ids.iter().map(|id| result(id)).collect();

        let joined = reconcile(&prospects, &results);

        prop_assert!(joined.len() <= prospect_ids.len().min(returned_ids.len()));

        let left: HashSet<&str> = prospect_ids.iter().map(String::as_str).collect();
        let right: HashSet<&str> = returned_ids.iter().map(String::as_str).collect();
        let expected: HashSet<&str> = left.intersection(&right).copied().collect();
        let actual: HashSet<&str> = joined
            .records
            .iter()
            .map(|r| r.classification.prospect_id.as_str())
            .collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(joined.stats.matched + joined.stats.unmatched_prospects, prospect_ids.len());
    }

    #[test]
    fn well_formed_response_reconciles_every_row(prospect_ids in arb_ids(60)) {
        let prospects = table(&prospect_ids);
        let response = prospect_ids
            .iter()
            .map(|id| format!("{},Engineer,Developer,0.70", id))
            .collect::<Vec<_>>()
            .join("\n");

        let results = parse_response(0, &response, RowPolicy::Strict).unwrap();
        let joined = reconcile(&prospects, &results);

        prop_assert_eq!(results.len(), prospect_ids.len());
        prop_assert_eq!(joined.len(), prospect_ids.len());
    }
}
