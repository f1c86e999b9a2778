//! Table caption classification.
//!
//! A table's caption usually sits in a plain paragraph directly after the
//! `<table-wrap>` element, sometimes directly before it:
//!
//! ```xml
//! <table-wrap>...</table-wrap>
//! <p>Table 1: Participant demographics</p>
//! ```
//!
//! The paragraph is accepted when its flattened text looks like
//! `"<words> <digits>: <text>"` or `"<words> <digits>. <text>"`. The next
//! sibling takes precedence over the previous one; the split key is always
//! the first colon even when the dot pattern matched.

use regex::Regex;

use crate::classify::{ensure_id, split_caption, strip_caption_text, CaptionRecord};
use crate::error::Result;
use crate::tree::{NodeId, Tree};

/// Which candidate paragraph matched for a given table, if any.
///
/// Computed fresh per table; a match on one table carries no state over to
/// the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateMatch {
    Unmatched,
    Next(NodeId),
    Previous(NodeId),
}

/// Detect and restructure table captions.
///
/// For every matched table: the caption paragraph's text is split on the
/// first colon, a `title` child receives the title, the paragraph itself is
/// moved under a new `caption` child, and the table gets an `id` if it
/// lacks one. Returns the (id, title) records in detection order.
pub fn classify_tables(tree: &mut Tree) -> Result<Vec<CaptionRecord>> {
    let colon_pattern = Regex::new(r"^.+?\s*\d+:.+").unwrap();
    let dot_pattern = Regex::new(r"^.+?\s*\d+\..+").unwrap();

    let mut records = Vec::new();

    for table in tree.find_all("table-wrap") {
        let candidate = match_candidate(tree, table, &colon_pattern, &dot_pattern);
        let paragraph = match candidate {
            CandidateMatch::Unmatched => continue,
            CandidateMatch::Next(p) | CandidateMatch::Previous(p) => p,
        };

        let text = tree.stripped_text(paragraph);
        let (title, _) = split_caption(&text);

        log::debug!("Handling title and caption for \"{}\"", title);

        let title_element = tree.find_or_create_first_child(table, "title");
        tree.set_text(title_element, Some(title.clone()));

        // the caption paragraph is moved, not copied
        let caption_element = tree.new_element("caption");
        tree.detach(paragraph);
        tree.append_safe(caption_element, paragraph);
        tree.insert_child(table, 1, caption_element);

        if let Some(direct) = tree.text(paragraph) {
            let stripped = strip_caption_text(direct, &[&title]);
            tree.set_text(paragraph, Some(stripped));
        }

        let id = ensure_id(tree, table);
        records.push(CaptionRecord { id, title });
    }

    Ok(records)
}

/// Try the next sibling, then the previous sibling, as the caption source.
fn match_candidate(
    tree: &Tree,
    table: NodeId,
    colon_pattern: &Regex,
    dot_pattern: &Regex,
) -> CandidateMatch {
    if let Some(next) = tree.next_sibling(table) {
        if tree.name(next) == "p" {
            let text = tree.stripped_text(next);
            if colon_pattern.is_match(&text) || dot_pattern.is_match(&text) {
                return CandidateMatch::Next(next);
            }
        }
    }

    if let Some(previous) = tree.prev_sibling(table) {
        if tree.name(previous) == "p" {
            let text = tree.stripped_text(previous);
            if colon_pattern.is_match(&text) || dot_pattern.is_match(&text) {
                return CandidateMatch::Previous(previous);
            }
        }
    }

    CandidateMatch::Unmatched
}
