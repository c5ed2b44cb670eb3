//! Shared fixtures for the integration tests.
//!
//! Fixture PDFs are built in memory. Each page carries a text label in its
//! content stream so tests can check page order after a merge.

#![allow(dead_code)]

use lopdf::{Document, Object, Stream, dictionary};

/// Build a PDF with one page per label.
pub fn labeled_pdf(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::new();
    for label in labels {
        let content = format!("BT /F1 18 Tf 72 720 Td ({label}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => labels.len() as i64,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }
        .into(),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize fixture");
    bytes
}

/// Labels of every page of a PDF, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let mut doc = Document::load_mem(bytes).expect("Merged output must decode");
    doc.decompress();

    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).expect("Page has content");
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').expect("Label start") + 1;
            let end = text[start..].find(')').expect("Label end") + start;
            text[start..end].to_string()
        })
        .collect()
}

/// Number of pages in a PDF.
pub fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes)
        .expect("PDF must decode")
        .get_pages()
        .len()
}
