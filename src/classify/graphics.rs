//! Graphic caption classification.
//!
//! Word processors drop images in inconsistent places, so two placement
//! heuristics run in sequence. The first treats the graphic's own parent as
//! the caption source:
//!
//! ```xml
//! <p>Figure 1: Martin Eve at the pub<graphic xlink:href="media/image1.jpeg"/></p>
//! ```
//!
//! The second, applied afterwards to graphics still uncaptioned, looks at
//! the parent's next sibling paragraph. Both accept a candidate only when
//! its flattened text is under 140 characters and contains a colon.

use crate::classify::{ensure_id, split_caption, strip_caption_text, CaptionRecord};
use crate::error::Result;
use crate::tree::{NodeId, Tree};

/// Longest flattened text still plausible as a caption.
const MAX_CAPTION_LEN: usize = 140;

/// Detect graphic captions held in the graphic's parent element.
///
/// The parent must be a `p` or `fig`. On a match the graphic gains a
/// `label` child with the title, a `caption` child wrapping a fresh
/// paragraph with the caption body, and an `id` if it lacks one; the title
/// and body text is stripped out of the parent's text and the graphic's
/// tail.
pub fn classify_graphics_parent(tree: &mut Tree) -> Result<Vec<CaptionRecord>> {
    let mut records = Vec::new();

    for graphic in tree.find_all("graphic") {
        let Some(parent) = tree.parent(graphic) else {
            continue;
        };
        if tree.name(parent) != "p" && tree.name(parent) != "fig" {
            continue;
        }

        let text = tree.stripped_text(parent);
        if !accepts_caption(&text) {
            continue;
        }

        let record = restructure(tree, graphic, &text, parent);
        records.push(record);
    }

    Ok(records)
}

/// Detect graphic captions held in the paragraph after the graphic's parent.
///
/// Runs strictly after [`classify_graphics_parent`] has been applied and
/// persisted. Graphics already followed by a `title` sibling are skipped,
/// which keeps repeated runs from re-splitting an existing caption.
pub fn classify_graphics_sibling(tree: &mut Tree) -> Result<Vec<CaptionRecord>> {
    let mut records = Vec::new();

    for graphic in tree.find_all("graphic") {
        if let Some(next) = tree.next_sibling(graphic) {
            if tree.name(next) == "title" {
                continue;
            }
        }

        let Some(parent) = tree.parent(graphic) else {
            continue;
        };
        let Some(candidate) = tree.next_sibling(parent) else {
            continue;
        };
        if tree.name(candidate) != "p" {
            continue;
        }

        let text = tree.stripped_text(candidate);
        if !accepts_caption(&text) {
            continue;
        }

        let record = restructure(tree, graphic, &text, candidate);
        records.push(record);
    }

    Ok(records)
}

/// Caption acceptance rule shared by both heuristics.
fn accepts_caption(text: &str) -> bool {
    text.chars().count() < MAX_CAPTION_LEN && text.contains(':')
}

/// Split the candidate text and rebuild the graphic's caption structure.
///
/// `source` is the element whose direct text carried the caption prose (the
/// parent for the first heuristic, the sibling paragraph for the second);
/// the identifying text is stripped from it and from the graphic's tail,
/// each independently.
fn restructure(tree: &mut Tree, graphic: NodeId, text: &str, source: NodeId) -> CaptionRecord {
    let (title, caption) = split_caption(text);

    log::debug!("Handling title and caption for \"{}\"", title);

    let label = tree.find_or_create_first_child(graphic, "label");
    tree.set_text(label, Some(title.clone()));

    let caption_element = tree.new_element("caption");
    let body = tree.new_element("p");
    tree.set_text(body, Some(caption.clone()));
    tree.append_safe(caption_element, body);
    tree.append_safe(graphic, caption_element);

    if let Some(direct) = tree.text(source) {
        let stripped = strip_caption_text(direct, &[&title, &caption]);
        tree.set_text(source, Some(stripped));
    }
    if tree.tail(graphic).is_some_and(|t| !t.is_empty()) {
        let tail = tree.tail(graphic).unwrap_or_default().to_string();
        let stripped = strip_caption_text(&tail, &[&title, &caption]);
        tree.set_tail(graphic, Some(stripped));
    }

    let id = ensure_id(tree, graphic);
    CaptionRecord { id, title }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::xml::parse_str;

    #[test]
    fn test_parent_paragraph_caption() {
        let mut tree = parse_str(
            r#"<sec><p>Figure 1: Martin Eve at the pub<graphic xlink:href="media/image1.jpeg"/></p></sec>"#,
        )
        .unwrap();

        let records = classify_graphics_parent(&mut tree).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Figure 1");
        assert!(records[0].id.starts_with("ID"));

        let graphic = tree.find_all("graphic")[0];
        let label = tree.find_child(graphic, "label").unwrap();
        assert_eq!(tree.text(label), Some("Figure 1"));

        let caption = tree.find_child(graphic, "caption").unwrap();
        let body = tree.children(caption)[0];
        assert_eq!(tree.name(body), "p");
        assert_eq!(tree.text(body), Some("Martin Eve at the pub"));

        // prose stripped out of the carrying paragraph
        let p = tree.parent(graphic).unwrap();
        assert_eq!(tree.text(p), Some(""));
    }

    #[test]
    fn test_parent_fig_wrapper_accepted() {
        let mut tree = parse_str(
            r#"<sec><fig>Figure 2: a wrapped image<graphic xlink:href="x.png"/></fig></sec>"#,
        )
        .unwrap();

        let records = classify_graphics_parent(&mut tree).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Figure 2");
    }

    #[test]
    fn test_long_text_rejected() {
        let long = "Figure 1: ".to_string() + &"x".repeat(140);
        let xml = format!(r#"<sec><p>{}<graphic xlink:href="x.png"/></p></sec>"#, long);
        let mut tree = parse_str(&xml).unwrap();

        let records = classify_graphics_parent(&mut tree).unwrap();
        assert!(records.is_empty());

        let graphic = tree.find_all("graphic")[0];
        assert!(tree.find_child(graphic, "label").is_none());
        assert_eq!(tree.attr(graphic, "id"), None);
    }

    #[test]
    fn test_no_colon_rejected() {
        let mut tree = parse_str(
            r#"<sec><p>Figure 1 without separator<graphic xlink:href="x.png"/></p></sec>"#,
        )
        .unwrap();

        let records = classify_graphics_parent(&mut tree).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_graphic_tail_stripped() {
        let mut tree = parse_str(
            r#"<sec><p><graphic xlink:href="x.png"/>Figure 3: tail caption</p></sec>"#,
        )
        .unwrap();

        let records = classify_graphics_parent(&mut tree).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Figure 3");

        let graphic = tree.find_all("graphic")[0];
        assert_eq!(tree.tail(graphic), Some(""));
    }

    #[test]
    fn test_sibling_paragraph_caption() {
        let mut tree = parse_str(
            r#"<sec><p><graphic xlink:href="x.png"/></p><p>Figure 4: sibling caption</p></sec>"#,
        )
        .unwrap();

        let records = classify_graphics_sibling(&mut tree).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Figure 4");

        let graphic = tree.find_all("graphic")[0];
        let caption = tree.find_child(graphic, "caption").unwrap();
        let body = tree.children(caption)[0];
        assert_eq!(tree.text(body), Some("sibling caption"));

        // the candidate paragraph stays in place, its prose stripped
        let sec = tree.root().unwrap();
        let sibling = tree.children(sec)[1];
        assert_eq!(tree.name(sibling), "p");
        assert_eq!(tree.text(sibling), Some(""));
    }

    #[test]
    fn test_sibling_skips_already_titled_graphic() {
        let mut tree = parse_str(
            r#"<sec><p><graphic xlink:href="x.png"/><title>done</title></p><p>Figure 5: late caption</p></sec>"#,
        )
        .unwrap();

        let records = classify_graphics_sibling(&mut tree).unwrap();
        assert!(records.is_empty());

        let graphic = tree.find_all("graphic")[0];
        assert!(tree.find_child(graphic, "caption").is_none());
    }

    #[test]
    fn test_sibling_requires_paragraph() {
        let mut tree = parse_str(
            r#"<sec><p><graphic xlink:href="x.png"/></p><sec>Figure 6: not a paragraph</sec></sec>"#,
        )
        .unwrap();

        let records = classify_graphics_sibling(&mut tree).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_existing_label_reused() {
        let mut tree = parse_str(
            r#"<sec><p>Figure 7: new caption<graphic xlink:href="x.png"><label>old</label></graphic></p></sec>"#,
        )
        .unwrap();

        classify_graphics_parent(&mut tree).unwrap();

        let graphic = tree.find_all("graphic")[0];
        let labels: Vec<_> = tree
            .children(graphic)
            .iter()
            .filter(|&&c| tree.name(c) == "label")
            .collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(tree.text(*labels[0]), Some("Figure 7"));
    }
}
