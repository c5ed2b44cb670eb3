//! Integration tests for running batches against record stores.

use pdfbatch::config::{
    ColumnMap, Config, DEFAULT_OUTPUT_FILENAME, TRIGGER_BINDING, TRIGGER_FILENAME,
    TRIGGER_INPUT_TABLE, TRIGGER_OUTPUT_TABLE,
};
use pdfbatch::error::PdfBatchError;
use pdfbatch::observer::{ObservedEvent, RecordingObserver};
use pdfbatch::orchestrator::Orchestrator;
use pdfbatch::record::{FieldValue, Row, TableId};
use pdfbatch::store::{JsonStore, MemoryStore};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use crate::common::{labeled_pdf, page_labels};

struct Batch {
    store: Arc<MemoryStore>,
    input: TableId,
    output: TableId,
    binding: Uuid,
}

impl Batch {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let input = store.create_table();
        let output = store.create_table();
        Self {
            store,
            input,
            output,
            binding: Uuid::new_v4(),
        }
    }

    fn add(&self, sequence: i64, name: &str, content: Vec<u8>) {
        let row = ColumnMap::default().input_row(self.input, self.binding, sequence, name, content);
        self.store.insert_row(row).unwrap();
    }

    fn config(&self) -> Config {
        Config::new(self.input, self.output, self.binding)
    }

    fn orchestrator(
        &self,
        config: Config,
        observer: Arc<RecordingObserver>,
    ) -> Orchestrator<Arc<MemoryStore>, Arc<MemoryStore>> {
        Orchestrator::new(config, self.store.clone(), self.store.clone(), observer)
    }
}

#[tokio::test]
async fn test_three_entry_scenario_with_one_empty() {
    let batch = Batch::new();
    batch.add(3, "c.pdf", labeled_pdf(&["c1", "c2", "c3"]));
    batch.add(1, "a.pdf", labeled_pdf(&["a1", "a2"]));
    batch.add(2, "b.pdf", Vec::new());

    let observer = Arc::new(RecordingObserver::new());
    let report = batch
        .orchestrator(batch.config(), observer.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.rows_received, 3);
    assert_eq!(report.statistics.total_pages, 5);
    assert_eq!(report.document.filename, DEFAULT_OUTPUT_FILENAME);
    assert_eq!(
        page_labels(&report.document.content),
        vec!["a1", "a2", "c1", "c2", "c3"]
    );

    assert_eq!(
        observer.warnings(),
        vec![ObservedEvent::EntrySkipped {
            name: "b.pdf".to_string(),
            sequence: 2,
        }]
    );

    let written = batch.store.rows(batch.output).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].text("Filename"), Some(DEFAULT_OUTPUT_FILENAME));
    assert_eq!(written[0].id("ManagedBindingID"), Some(batch.binding));
    assert_eq!(
        written[0].bytes("Content"),
        Some(report.document.content.as_slice())
    );
}

#[tokio::test]
async fn test_only_rows_of_the_binding_are_merged() {
    let batch = Batch::new();
    batch.add(1, "mine.pdf", labeled_pdf(&["mine"]));

    let other = ColumnMap::default().input_row(
        batch.input,
        Uuid::new_v4(),
        0,
        "theirs.pdf",
        labeled_pdf(&["theirs"]),
    );
    batch.store.insert_row(other).unwrap();

    let report = batch
        .orchestrator(batch.config(), Arc::new(RecordingObserver::new()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.rows_received, 1);
    assert_eq!(page_labels(&report.document.content), vec!["mine"]);
}

#[tokio::test]
async fn test_text_binding_rows_are_merged() {
    let batch = Batch::new();
    batch.add(1, "id.pdf", labeled_pdf(&["id"]));

    let mut row = ColumnMap::default().input_row(
        batch.input,
        batch.binding,
        2,
        "text.pdf",
        labeled_pdf(&["text"]),
    );
    row.set("ManagedBindingID", batch.binding.to_string());
    batch.store.insert_row(row).unwrap();

    let report = batch
        .orchestrator(batch.config(), Arc::new(RecordingObserver::new()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.rows_received, 2);
    assert_eq!(page_labels(&report.document.content), vec!["id", "text"]);
}

#[tokio::test]
async fn test_failure_writes_nothing() {
    let batch = Batch::new();
    batch.add(1, "a.pdf", labeled_pdf(&["a"]));
    batch.add(2, "broken.pdf", b"definitely not a pdf".to_vec());

    let observer = Arc::new(RecordingObserver::new());
    let err = batch
        .orchestrator(batch.config(), observer.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PdfBatchError::MergeFailed { sequence: 2, .. }));
    assert!(batch.store.rows(batch.output).unwrap().is_empty());
    assert!(matches!(
        observer.events().last(),
        Some(ObservedEvent::BatchFailed { message }) if message.contains("broken.pdf")
    ));
}

#[tokio::test]
async fn test_row_limit_reached_warns() {
    let batch = Batch::new();
    for seq in 1..=3 {
        let label = seq.to_string();
        batch.add(seq, &format!("{seq}.pdf"), labeled_pdf(&[label.as_str()]));
    }

    let mut config = batch.config();
    config.row_limit = 2;

    let observer = Arc::new(RecordingObserver::new());
    let report = batch
        .orchestrator(config, observer.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(report.rows_received, 2);
    assert_eq!(page_labels(&report.document.content), vec!["1", "2"]);
    assert!(observer
        .events()
        .contains(&ObservedEvent::PossiblyTruncated { limit: 2 }));
}

#[tokio::test]
async fn test_output_row_follows_template_columns() {
    let batch = Batch::new();
    batch.add(1, "a.pdf", labeled_pdf(&["a"]));
    batch
        .store
        .insert_row(
            Row::new(batch.output)
                .with("Filename", "previous.pdf")
                .with("Content", vec![0u8])
                .with("ManagedBindingID", Uuid::new_v4())
                .with("Notes", "kept as a column"),
        )
        .unwrap();

    batch
        .orchestrator(batch.config(), Arc::new(RecordingObserver::new()))
        .run()
        .await
        .unwrap();

    let written = batch.store.rows(batch.output).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[1].get("Notes"), Some(&FieldValue::Null));
    assert_eq!(written[1].id("ManagedBindingID"), Some(batch.binding));
}

#[tokio::test]
async fn test_trigger_row_drives_batch() {
    let batch = Batch::new();
    batch.add(1, "a.pdf", labeled_pdf(&["a"]));

    let trigger = Row::new(TableId::generate())
        .with(TRIGGER_FILENAME, "invoice.pdf")
        .with(TRIGGER_INPUT_TABLE, batch.input.as_uuid())
        .with(TRIGGER_OUTPUT_TABLE, batch.output.as_uuid().to_string())
        .with(TRIGGER_BINDING, batch.binding);

    let observer = Arc::new(RecordingObserver::new());
    let config = Config::from_trigger_row(&trigger, observer.as_ref()).unwrap();
    let report = batch.orchestrator(config, observer).run().await.unwrap();

    assert_eq!(report.document.filename, "invoice.pdf");
    let written = batch.store.rows(batch.output).unwrap();
    assert_eq!(written[0].text("Filename"), Some("invoice.pdf"));
}

#[tokio::test]
async fn test_json_store_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonStore::open(dir.path()).await.unwrap());
    let input = store.create_table().await.unwrap();
    let output = store.create_table().await.unwrap();
    let binding = Uuid::new_v4();

    let columns = ColumnMap::default();
    for (seq, label) in [(2, "second"), (1, "first")] {
        let name = format!("{label}.pdf");
        let row = columns.input_row(input, binding, seq, &name, labeled_pdf(&[label]));
        store.insert_row(row).await.unwrap();
    }

    let observer = Arc::new(RecordingObserver::new());
    let config = Config::new(input, output, binding);
    let orchestrator = Orchestrator::new(config, store.clone(), store.clone(), observer.clone());
    orchestrator.run().await.unwrap();

    let reopened = JsonStore::open(dir.path()).await.unwrap();
    let written = reopened.rows(output).await.unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(
        page_labels(written[0].bytes("Content").unwrap()),
        vec!["first", "second"]
    );
    assert!(observer
        .events()
        .contains(&ObservedEvent::RowsReceived { count: 2 }));
}

#[tokio::test]
async fn test_missing_output_table_fails_before_write() {
    let batch = Batch::new();
    batch.add(1, "a.pdf", labeled_pdf(&["a"]));

    let config = Config::new(batch.input, TableId::generate(), batch.binding);
    let err = batch
        .orchestrator(config, Arc::new(RecordingObserver::new()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PdfBatchError::UnknownTable { .. }));
}
