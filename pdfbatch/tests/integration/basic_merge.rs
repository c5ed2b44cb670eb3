//! Integration tests for ordered merging.

use pdfbatch::config::CompressionLevel;
use pdfbatch::merge::{InputEntry, MergeEngine, OrderedEntrySet};
use pdfbatch::observer::{ObservedEvent, RecordingObserver};
use rstest::rstest;
use std::sync::Arc;

use crate::common::{labeled_pdf, page_count, page_labels};

fn engine() -> (MergeEngine, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::new());
    (MergeEngine::new(observer.clone()), observer)
}

fn entries(items: Vec<(&str, i64, Vec<u8>)>) -> OrderedEntrySet {
    items
        .into_iter()
        .map(|(name, sequence, content)| InputEntry::new(name, sequence, content))
        .collect()
}

#[test]
fn test_pages_follow_entry_order() {
    let (engine, _) = engine();
    let set = entries(vec![
        ("first.pdf", 1, labeled_pdf(&["1a", "1b"])),
        ("second.pdf", 2, labeled_pdf(&["2a"])),
        ("third.pdf", 3, labeled_pdf(&["3a", "3b", "3c"])),
    ]);

    let outcome = engine.merge(set).unwrap();
    assert_eq!(
        page_labels(&outcome.content),
        vec!["1a", "1b", "2a", "3a", "3b", "3c"]
    );
}

#[test]
fn test_engine_does_not_resort() {
    let (engine, _) = engine();
    let set = entries(vec![
        ("late.pdf", 9, labeled_pdf(&["late"])),
        ("early.pdf", 1, labeled_pdf(&["early"])),
    ]);

    let outcome = engine.merge(set).unwrap();
    assert_eq!(page_labels(&outcome.content), vec!["late", "early"]);
}

#[rstest]
#[case(vec![1, 2, 3])]
#[case(vec![5])]
#[case(vec![2, 0, 2])]
fn test_page_count_is_sum_of_inputs(#[case] counts: Vec<usize>) {
    let (engine, _) = engine();
    let set: OrderedEntrySet = counts
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let labels: Vec<String> = (0..n).map(|p| format!("d{i}p{p}")).collect();
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            InputEntry::new(format!("doc{i}.pdf"), i as i64 + 1, labeled_pdf(&labels))
        })
        .collect();

    let outcome = engine.merge(set).unwrap();
    let expected: usize = counts.iter().sum();
    assert_eq!(outcome.statistics.total_pages, expected);
    assert_eq!(page_count(&outcome.content), expected);
}

#[test]
fn test_skip_empty_entries() {
    let (engine, observer) = engine();
    let set = entries(vec![
        ("a.pdf", 1, labeled_pdf(&["a"])),
        ("b.pdf", 2, Vec::new()),
        ("c.pdf", 3, labeled_pdf(&["c"])),
    ]);

    let outcome = engine.merge(set).unwrap();
    assert_eq!(page_labels(&outcome.content), vec!["a", "c"]);
    assert_eq!(outcome.statistics.entries_skipped, 1);
    assert_eq!(
        observer.warnings(),
        vec![ObservedEvent::EntrySkipped {
            name: "b.pdf".to_string(),
            sequence: 2,
        }]
    );
}

#[test]
fn test_all_entries_empty_gives_empty_document() {
    let (engine, observer) = engine();
    let set = entries(vec![("a.pdf", 1, Vec::new()), ("b.pdf", 2, Vec::new())]);

    let outcome = engine.merge(set).unwrap();
    assert_eq!(page_count(&outcome.content), 0);
    assert_eq!(observer.warnings().len(), 2);
}

#[test]
fn test_empty_input_is_valid_pdf() {
    let (engine, _) = engine();
    let outcome = engine.merge(OrderedEntrySet::new()).unwrap();

    assert!(outcome.content.starts_with(b"%PDF-"));
    assert_eq!(page_count(&outcome.content), 0);
}

#[test]
fn test_merge_twice_gives_same_result() {
    let (engine, _) = engine();
    let set = entries(vec![
        ("a.pdf", 1, labeled_pdf(&["a1", "a2"])),
        ("b.pdf", 2, labeled_pdf(&["b1"])),
    ]);

    let first = engine.merge(set.clone()).unwrap();
    let second = engine.merge(set).unwrap();

    assert_eq!(page_labels(&first.content), page_labels(&second.content));
    assert_eq!(first.content, second.content);
}

#[test]
fn test_merged_output_can_be_merged_again() {
    let (engine, _) = engine();
    let inner = engine
        .merge(entries(vec![
            ("a.pdf", 1, labeled_pdf(&["a"])),
            ("b.pdf", 2, labeled_pdf(&["b"])),
        ]))
        .unwrap();

    let outer = engine
        .merge(entries(vec![
            ("ab.pdf", 1, inner.content),
            ("c.pdf", 2, labeled_pdf(&["c"])),
        ]))
        .unwrap();

    assert_eq!(page_labels(&outer.content), vec!["a", "b", "c"]);
}

#[test]
fn test_inherited_resources_survive_merge() {
    let (engine, _) = engine();
    let outcome = engine
        .merge_document(entries(vec![("a.pdf", 1, labeled_pdf(&["a"]))]))
        .unwrap();

    let (document, _) = outcome;
    let page_id = *document.get_pages().values().next().unwrap();
    let page = document.get_dictionary(page_id).unwrap();
    assert!(page.has(b"Resources"));
    assert!(page.has(b"MediaBox"));
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Maximum)]
fn test_compression_keeps_pages(#[case] level: CompressionLevel) {
    let engine = MergeEngine::new(Arc::new(RecordingObserver::new())).with_compression(level);
    let outcome = engine
        .merge(entries(vec![
            ("a.pdf", 1, labeled_pdf(&["a"])),
            ("b.pdf", 2, labeled_pdf(&["b"])),
        ]))
        .unwrap();

    assert_eq!(page_labels(&outcome.content), vec!["a", "b"]);
}
