//! Concurrency tests for the shared match store
//!
//! Submissions and reconciliation sweeps run on many threads at once. Every
//! store mutation is atomic, so the invariants must hold at any instant: the
//! index mirrors the matched collection, no document sits in both sets, and
//! no document is lost or duplicated.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};

use sample_matcher::core::types::Sample;
use sample_matcher::{
    Document, MatchError, MatchIndex, MatchService, MatchStore, MatchingConfig, ReconcileMode,
    SampleCatalog,
};

fn embedded_store() -> Arc<MatchStore> {
    let catalog = SampleCatalog::load_embedded().expect("embedded samples should load");
    Arc::new(MatchStore::new(Arc::new(catalog)))
}

/// Documents that overlap each other heavily so sweeps keep moving records
fn make_document(thread_id: usize, i: usize) -> Document {
    let customer = match i % 4 {
        0 => "Bread Co",
        1 => "Bella's Bakery",
        2 => "Titan Heavy Industries",
        _ => "Nobody In Particular",
    };
    Document::new(json!({
        "Customer Name": customer,
        "ref": format!("R{}", i % 7),
        "batch": format!("B{}", (thread_id + i) % 5),
        "unique": format!("t{thread_id}-d{i}"),
    }))
}

fn unique_key(document: &Document) -> Value {
    document.as_value()["unique"].clone()
}

fn assert_store_invariants(store: &MatchStore, expected_total: usize) {
    assert!(store.index_is_consistent(), "index diverged from matched records");

    // One lock acquisition; separate reads could straddle a promotion
    let snapshot = store.snapshot();
    let (records, unmatched, index) = (snapshot.matched, snapshot.unmatched, snapshot.index);
    assert_eq!(records.len() + unmatched.len(), expected_total);
    assert_eq!(index.len(), records.len());
    assert_eq!(index, MatchIndex::from_records(&records));

    let matched_keys: HashSet<Value> = records
        .iter()
        .map(|r| unique_key(&r.matched.document))
        .collect();
    let unmatched_keys: HashSet<Value> = unmatched.iter().map(|u| unique_key(&u.document)).collect();

    assert_eq!(matched_keys.len(), records.len(), "matched document duplicated");
    assert_eq!(unmatched_keys.len(), unmatched.len(), "unmatched document duplicated");
    assert!(
        matched_keys.is_disjoint(&unmatched_keys),
        "document present in both sets"
    );

    for record in &records {
        assert!(store.samples().contains(&record.matched.sample_id));
        assert!(record.matched.match_score > 0);
    }
}

#[test]
fn concurrent_inline_submissions_keep_invariants() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 40;

    let store = embedded_store();
    let service = MatchService::new(
        Arc::clone(&store),
        MatchingConfig {
            reconcile: ReconcileMode::Inline,
        },
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let service = service.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    match service.submit(make_document(t, i)) {
                        Ok(_) | Err(MatchError::NoMatchFound { .. }) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_store_invariants(&store, THREADS * PER_THREAD);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_background_sweeps_keep_invariants() {
    const TASKS: usize = 6;
    const PER_TASK: usize = 30;

    let store = embedded_store();
    let service = MatchService::new(Arc::clone(&store), MatchingConfig::default());

    let handles: Vec<_> = (0..TASKS)
        .map(|t| {
            let service = service.clone();
            tokio::task::spawn_blocking(move || {
                for i in 0..PER_TASK {
                    let _ = service.submit(make_document(t, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    // Sweeps may still be running; every instant must satisfy the invariants
    for _ in 0..10 {
        assert_store_invariants(&store, TASKS * PER_TASK);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}

#[test]
fn inline_matching_is_deterministic() {
    let run = || {
        let store = embedded_store();
        let service = MatchService::new(
            Arc::clone(&store),
            MatchingConfig {
                reconcile: ReconcileMode::Inline,
            },
        );
        for i in 0..50 {
            let _ = service.submit(make_document(0, i));
        }
        (store.index(), store.unmatched().len())
    };

    assert_eq!(run(), run());
}

#[test]
fn match_through_earlier_document() {
    let catalog = SampleCatalog::from_samples(vec![
        Sample::new("A", json!({"name": "alpha"})),
        Sample::new("B", json!({"name": "beta"})),
    ])
    .unwrap();
    let store = Arc::new(MatchStore::new(Arc::new(catalog)));
    let service = MatchService::new(
        Arc::clone(&store),
        MatchingConfig {
            reconcile: ReconcileMode::Inline,
        },
    );

    let first = service
        .submit(Document::new(json!({"name": "beta", "order": 7781})))
        .unwrap();
    assert_eq!(first.matched.sample_id.as_str(), "B");

    // Shares nothing with either sample, only the order number with the first document
    let second = service.submit(Document::new(json!({"order": 7781}))).unwrap();
    assert_eq!(second.matched.sample_id.as_str(), "B");
    assert_eq!(second.matched.match_score, 1);
}
