//! In-text cross-reference linking.
//!
//! More involved than a straight replace because a title mention can sit
//! inside inline markup (like an italic run) or in the tail text after one,
//! so every text run of a paragraph has to be checked separately.

use crate::classify::{CaptionRecord, RefType};
use crate::tree::{NodeId, NodeKind, Tree};

/// Rewrite in-text mentions of the recorded titles as `<xref>` elements.
///
/// Every paragraph in the document is scanned against every record, in
/// detection order. A title is matched at most once per text run (first
/// occurrence only); identifiers resolve through the first record carrying
/// the title, so duplicate titles all link to the first object detected
/// with that title.
pub fn link_references(tree: &mut Tree, records: &[CaptionRecord], ref_type: RefType) {
    let paragraphs = tree.find_all("p");

    for &paragraph in &paragraphs {
        for record in records {
            let rid = resolve_id(records, &record.title);
            let title = record.title.as_str();

            if tree.text(paragraph).is_some_and(|t| t.contains(title)) {
                replace_in_text(tree, rid, paragraph, title, ref_type);
                log::debug!("Successfully linked {} to {}", title, rid);
            }

            // iterate the live child list: an xref inserted after the
            // current child is visited next, so a chain of mentions split
            // across tails all get linked in one pass
            let mut index = 0;
            while index < tree.children(paragraph).len() {
                let child = tree.children(paragraph)[index];

                // only element text is prose; a comment's content must not
                // grow a nested xref, though its tail is still fair game
                if tree.kind(child) == NodeKind::Element
                    && tree.name(child) != "xref"
                    && tree.text(child).is_some_and(|t| t.contains(title))
                {
                    replace_in_text(tree, rid, child, title, ref_type);
                    log::debug!(
                        "Successfully linked {} to {} from sub-element",
                        title,
                        rid
                    );
                }

                if tree.tail(child).is_some_and(|t| t.contains(title)) {
                    replace_in_tail(tree, rid, child, title, ref_type);
                    log::debug!("Successfully linked {} to {} from sub-tail", title, rid);
                }

                index += 1;
            }
        }
    }
}

/// First-match identifier resolution over the parallel record list.
fn resolve_id<'a>(records: &'a [CaptionRecord], title: &str) -> &'a str {
    records
        .iter()
        .find(|r| r.title == title)
        .map(|r| r.id.as_str())
        .unwrap_or_default()
}

/// Split an element's direct text at the first title occurrence and append
/// a cross-reference holding the matched text and the remainder as tail.
fn replace_in_text(tree: &mut Tree, rid: &str, element: NodeId, title: &str, ref_type: RefType) {
    let text = tree.text(element).unwrap_or_default().to_string();
    let Some((before, after)) = text.split_once(title) else {
        return;
    };
    let before = before.to_string();
    let after = after.to_string();

    tree.set_text(element, Some(before));
    let xref = new_xref(tree, rid, title, &after, ref_type);
    tree.append_safe(element, xref);
}

/// Split an element's tail at the first title occurrence and insert a
/// cross-reference as the element's next sibling (not nested inside it).
fn replace_in_tail(tree: &mut Tree, rid: &str, element: NodeId, title: &str, ref_type: RefType) {
    let tail = tree.tail(element).unwrap_or_default().to_string();
    let Some((before, after)) = tail.split_once(title) else {
        return;
    };
    let before = before.to_string();
    let after = after.to_string();

    let Some(parent) = tree.parent(element) else {
        return;
    };
    let Some(position) = tree.position(element) else {
        return;
    };

    let xref = new_xref(tree, rid, title, &after, ref_type);
    tree.insert_child(parent, position + 1, xref);
    tree.set_tail(element, Some(before));
}

fn new_xref(tree: &mut Tree, rid: &str, title: &str, tail: &str, ref_type: RefType) -> NodeId {
    let xref = tree.new_element("xref");
    tree.set_attr(xref, "rid", rid);
    tree.set_attr(xref, "ref-type", ref_type.as_str());
    tree.set_text(xref, Some(title.to_string()));
    tree.set_tail(xref, Some(tail.to_string()));
    xref
}
