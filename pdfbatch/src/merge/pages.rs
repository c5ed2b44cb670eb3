//! Page import into an output document.
//!
//! This module handles the structural copy of pages between documents:
//! - Object renumbering to avoid id collisions
//! - Materializing inherited page attributes before re-parenting
//! - Page tree manipulation on the output side

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::BTreeSet;

use crate::error::MergeCause;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` and `Kids` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// A document under construction with a flat page tree.
///
/// All imported pages become direct kids of a single `Pages` root.
#[derive(Debug)]
pub struct OutputDocument {
    document: Document,
    pages_root: ObjectId,
}

impl OutputDocument {
    /// Create an empty document with a catalog and an empty page tree.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");

        let pages_root = document.new_object_id();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        };
        document.objects.insert(pages_root, pages.into());

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_root,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_root,
        }
    }

    /// Append every page of `source`, in its internal order.
    ///
    /// Returns the number of pages added.
    ///
    /// # Errors
    ///
    /// Returns [`MergeCause::PageCopy`] if any kid in the source page tree
    /// is missing or is not a page or page tree dictionary, or if the output
    /// page tree is malformed. The output is left untouched when a source
    /// page is rejected.
    pub fn import_pages(&mut self, mut source: Document) -> Result<usize, MergeCause> {
        // Dangling kids keep their ids through renumbering and could then
        // alias a renumbered object, so the tree is checked first.
        source_page_ids(&source)?;
        source.renumber_objects_with(self.document.max_id + 1);

        let page_ids = source_page_ids(&source)?;

        // Resolve every page before touching the output so a bad page
        // cannot leave a half-imported document behind.
        let mut prepared = Vec::with_capacity(page_ids.len());
        for (index, &page_id) in page_ids.iter().enumerate() {
            let page_number = index as u32 + 1;
            let mut page = source
                .get_dictionary(page_id)
                .map_err(|err| MergeCause::page_copy(page_number, err.to_string()))?
                .clone();

            for key in INHERITABLE_ATTRIBUTES {
                if !page.has(key)
                    && let Some(value) = inherited_attribute(&source, &page, key)
                {
                    page.set(key, value);
                }
            }
            page.set("Parent", self.pages_root);
            prepared.push((page_id, page));
        }

        let skipped = page_tree_nodes(&source);
        self.document.max_id = self.document.max_id.max(source.max_id);

        for (id, object) in source.objects {
            if !skipped.contains(&id) {
                self.document.objects.insert(id, object);
            }
        }
        for (id, page) in prepared {
            self.document.objects.insert(id, Object::Dictionary(page));
        }

        self.append_kids(&page_ids)?;
        Ok(page_ids.len())
    }

    /// Number of pages currently in the output.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Finish the document, dropping objects no page can reach.
    pub fn finish(mut self) -> Document {
        self.document.prune_objects();
        self.document
    }

    /// Add page references to the root `Kids` array and patch `Count`.
    fn append_kids(&mut self, page_ids: &[ObjectId]) -> Result<(), MergeCause> {
        let first_new_page = self.page_count() as u32 + 1;
        let tree_error = |reason: &str| MergeCause::page_copy(first_new_page, reason);

        let pages = self
            .document
            .get_object_mut(self.pages_root)
            .map_err(|_| tree_error("output page tree root is missing"))?;

        let Object::Dictionary(dict) = pages else {
            return Err(tree_error("output page tree root is not a dictionary"));
        };

        match dict.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => {
                kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));
            }
            _ => return Err(tree_error("output page tree has no Kids array")),
        }

        let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
        dict.set("Count", current_count + page_ids.len() as i64);

        Ok(())
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Page ids of a document in page tree order.
///
/// Unlike [`Document::get_pages`], a kid that does not resolve is an error
/// rather than a silently missing page.
fn source_page_ids(doc: &Document) -> Result<Vec<ObjectId>, MergeCause> {
    let root = doc
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| MergeCause::page_copy(1, "document has no page tree"))?;

    let mut pages = Vec::new();
    collect_pages(doc, root, 0, &mut pages)?;
    Ok(pages)
}

fn collect_pages(
    doc: &Document,
    node_id: ObjectId,
    depth: usize,
    pages: &mut Vec<ObjectId>,
) -> Result<(), MergeCause> {
    if depth >= MAX_TREE_DEPTH {
        return Err(MergeCause::page_copy(next_page(pages), "page tree is nested too deeply"));
    }

    let kids = doc
        .get_dictionary(node_id)
        .and_then(|node| node.get(b"Kids"))
        .and_then(|kids| doc.dereference(kids))
        .and_then(|(_, kids)| kids.as_array())
        .map_err(|_| {
            MergeCause::page_copy(
                next_page(pages),
                format!("page tree node {} {} R has no Kids array", node_id.0, node_id.1),
            )
        })?;

    for kid in kids {
        let page_number = next_page(pages);
        let kid_id = kid
            .as_reference()
            .map_err(|_| MergeCause::page_copy(page_number, "page tree kid is not a reference"))?;
        let node = doc.get_dictionary(kid_id).map_err(|_| {
            MergeCause::page_copy(
                page_number,
                format!("object {} {} R is missing or not a dictionary", kid_id.0, kid_id.1),
            )
        })?;

        match node.get(b"Type").and_then(Object::as_name) {
            Ok(b"Pages") => collect_pages(doc, kid_id, depth + 1, pages)?,
            Ok(b"Page") | Err(_) => pages.push(kid_id),
            Ok(other) => {
                return Err(MergeCause::page_copy(
                    page_number,
                    format!("page tree kid has type /{}", String::from_utf8_lossy(other)),
                ));
            }
        }
    }

    Ok(())
}

/// 1-indexed number of the next page to be collected.
fn next_page(pages: &[ObjectId]) -> u32 {
    pages.len() as u32 + 1
}

/// Look up an inheritable attribute on the ancestors of a page.
fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

/// Ids of the catalog and intermediate page tree nodes of a document.
///
/// These are replaced by the output's own catalog and page tree.
fn page_tree_nodes(doc: &Document) -> BTreeSet<ObjectId> {
    let mut nodes: BTreeSet<ObjectId> = doc
        .objects
        .iter()
        .filter(|(_, object)| {
            matches!(
                object,
                Object::Dictionary(dict)
                    if matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Pages")
            )
        })
        .map(|(&id, _)| id)
        .collect();

    if let Ok(root) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
        nodes.insert(root);
    }

    nodes
}
