//! Integration tests for merge failures.

use pdfbatch::error::{MergeCause, PdfBatchError};
use pdfbatch::merge::{InputEntry, MergeEngine, OrderedEntrySet};
use pdfbatch::observer::RecordingObserver;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use crate::common::labeled_pdf;

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.r#gen()).collect()
}

#[test]
fn test_random_bytes_abort_merge() {
    let engine = MergeEngine::new(Arc::new(RecordingObserver::new()));
    let set: OrderedEntrySet = vec![
        InputEntry::new("a.pdf", 1, labeled_pdf(&["a"])),
        InputEntry::new("scan.pdf", 7, random_bytes(42, 2048)),
        InputEntry::new("c.pdf", 8, labeled_pdf(&["c"])),
    ]
    .into_iter()
    .collect();

    let err = engine.merge(set).unwrap_err();
    assert!(err.is_merge_failure());
    assert!(matches!(
        &err,
        PdfBatchError::MergeFailed { name, sequence: 7, cause: MergeCause::Decode { .. } }
            if name == "scan.pdf"
    ));

    let message = err.to_string();
    assert!(message.starts_with("Error processing file 'scan.pdf' (sequence: 7):"));
}

#[test]
fn test_failure_reports_first_bad_entry() {
    let engine = MergeEngine::new(Arc::new(RecordingObserver::new()));
    let set: OrderedEntrySet = vec![
        InputEntry::new("bad-1.pdf", 1, random_bytes(1, 64)),
        InputEntry::new("bad-2.pdf", 2, random_bytes(2, 64)),
    ]
    .into_iter()
    .collect();

    let err = engine.merge(set).unwrap_err();
    assert!(matches!(err, PdfBatchError::MergeFailed { sequence: 1, .. }));
}

#[test]
fn test_truncated_pdf_fails() {
    let bytes = labeled_pdf(&["a", "b"]);
    let truncated = bytes[..bytes.len() / 3].to_vec();

    let engine = MergeEngine::new(Arc::new(RecordingObserver::new()));
    let set: OrderedEntrySet = vec![InputEntry::new("cut.pdf", 3, truncated)]
        .into_iter()
        .collect();

    let err = engine.merge(set).unwrap_err();
    assert!(matches!(err, PdfBatchError::MergeFailed { sequence: 3, .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_nameless_entry_still_identified_by_sequence() {
    let engine = MergeEngine::new(Arc::new(RecordingObserver::new()));
    let set: OrderedEntrySet = vec![InputEntry::new("", 11, b"garbage".to_vec())]
        .into_iter()
        .collect();

    let err = engine.merge(set).unwrap_err();
    assert!(err.to_string().starts_with("Error processing file '' (sequence: 11):"));
}
