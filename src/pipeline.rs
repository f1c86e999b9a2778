//! Pass composition.
//!
//! Each pass is a pure classify-then-link step over an in-memory tree; the
//! store-driven runners reproduce the batch control flow, re-loading the
//! document between passes so a later heuristic observes the persisted
//! mutations of an earlier one.

use crate::classify::{
    classify_graphics_parent, classify_graphics_sibling, classify_tables, link_references,
    CaptionRecord, RefType,
};
use crate::error::Result;
use crate::tree::{DocumentStore, Tree};

/// Classify table captions and link their in-text mentions.
pub fn tables_pass(tree: &mut Tree) -> Result<Vec<CaptionRecord>> {
    let records = classify_tables(tree)?;
    link_references(tree, &records, RefType::Table);
    Ok(records)
}

/// Classify graphic captions via the parent-placement heuristic and link.
pub fn graphics_parent_pass(tree: &mut Tree) -> Result<Vec<CaptionRecord>> {
    let records = classify_graphics_parent(tree)?;
    link_references(tree, &records, RefType::Figure);
    Ok(records)
}

/// Classify graphic captions via the sibling-placement heuristic and link.
pub fn graphics_sibling_pass(tree: &mut Tree) -> Result<Vec<CaptionRecord>> {
    let records = classify_graphics_sibling(tree)?;
    link_references(tree, &records, RefType::Figure);
    Ok(records)
}

/// Run the table pass against a stored document: load, classify, link,
/// persist.
pub fn run_tables(store: &DocumentStore) -> Result<Vec<CaptionRecord>> {
    log::debug!("Attempting to classify captions for table objects");

    let mut tree = store.load()?;
    let records = tables_pass(&mut tree)?;
    store.persist(&tree)?;
    Ok(records)
}

/// Run both graphic passes against a stored document.
///
/// The parent-placement pass is persisted before the sibling-placement pass
/// loads, so the second heuristic sees the first one's restructuring.
pub fn run_graphics(store: &DocumentStore) -> Result<Vec<CaptionRecord>> {
    log::debug!("Attempting to classify captions for graphics objects");

    let mut tree = store.load()?;
    let mut records = graphics_parent_pass(&mut tree)?;
    store.persist(&tree)?;

    let mut tree = store.load()?;
    let sibling_records = graphics_sibling_pass(&mut tree)?;
    store.persist(&tree)?;

    records.extend(sibling_records);
    Ok(records)
}

/// Run the table pass, then both graphic passes.
pub fn run_all(store: &DocumentStore) -> Result<Vec<CaptionRecord>> {
    let mut records = run_tables(store)?;
    records.extend(run_graphics(store)?);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::xml::parse_str;

    #[test]
    fn test_tables_pass_classifies_and_links() {
        let mut tree = parse_str(
            "<sec><table-wrap><table/></table-wrap><p>Table 1: Results</p>\
             <p>See Table 1 for details.</p></sec>",
        )
        .unwrap();

        let records = tables_pass(&mut tree).unwrap();
        assert_eq!(records.len(), 1);

        // the mention paragraph now carries an xref to the table's id
        let xrefs = tree.find_all("xref");
        assert_eq!(xrefs.len(), 1);
        assert_eq!(tree.attr(xrefs[0], "rid"), Some(records[0].id.as_str()));
        assert_eq!(tree.attr(xrefs[0], "ref-type"), Some("table"));
    }

    #[test]
    fn test_title_stripped_from_caption_body() {
        // stripping removes every title occurrence from the moved caption
        // paragraph, so a self-mention inside the body is erased rather
        // than linked
        let mut tree = parse_str(
            "<sec><table-wrap><table/></table-wrap>\
             <p>Table 1: see Table 1 below</p></sec>",
        )
        .unwrap();

        tables_pass(&mut tree).unwrap();
        assert!(tree.find_all("xref").is_empty());

        let caption = tree.find_all("caption")[0];
        let body = tree.children(caption)[0];
        assert_eq!(tree.text(body), Some("see  below"));
    }

    #[test]
    fn test_graphics_passes_share_link_primitive() {
        let mut tree = parse_str(
            r#"<sec><p>Figure 1: a pub<graphic xlink:href="x.jpg"/></p><p>As Figure 1 shows.</p></sec>"#,
        )
        .unwrap();

        let records = graphics_parent_pass(&mut tree).unwrap();
        assert_eq!(records.len(), 1);

        let xrefs = tree.find_all("xref");
        assert_eq!(xrefs.len(), 1);
        assert_eq!(tree.attr(xrefs[0], "ref-type"), Some("fig"));
    }
}
