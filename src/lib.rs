//! # captionize
//!
//! Caption detection and cross-reference linking for NLM/JATS XML.
//!
//! Scholarly documents converted from word processors carry their table and
//! figure captions as plain prose next to the object instead of structured
//! `title`/`label`/`caption` elements. This library finds that prose,
//! restructures it, assigns each captioned object a stable identifier, and
//! rewrites in-text mentions of the caption title as `<xref>` links.
//!
//! ## Quick Start
//!
//! ```no_run
//! use captionize::classify_all_in_file;
//!
//! fn main() -> captionize::Result<()> {
//!     // Classify tables and graphics in place, linking every mention
//!     let records = classify_all_in_file("paper.xml")?;
//!     for record in &records {
//!         println!("{} -> {}", record.title, record.id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## How it works
//!
//! - **Tables**: the paragraph directly after (or, failing that, before) a
//!   `<table-wrap>` is matched against `"<words> <digits>: <text>"` and
//!   `"<words> <digits>. <text>"` patterns, split into title and body, and
//!   moved under the table.
//! - **Graphics**: two placement heuristics in sequence — the graphic's own
//!   parent paragraph, then the parent's next sibling — accepting short
//!   (< 140 chars) colon-separated prose.
//! - **Linking**: every paragraph is scanned for the detected titles,
//!   including mentions inside inline markup and in tail text, and each
//!   first occurrence per text run becomes an `<xref>`.
//!
//! Processing is single-threaded and batch: each pass loads the document,
//! mutates the tree in place, and persists it wholesale.

pub mod classify;
pub mod error;
pub mod pipeline;
pub mod tree;

// Re-export commonly used types
pub use classify::{
    classify_graphics_parent, classify_graphics_sibling, classify_tables, link_references,
    CaptionRecord, RefType,
};
pub use error::{Error, Result};
pub use pipeline::{
    graphics_parent_pass, graphics_sibling_pass, run_all, run_graphics, run_tables, tables_pass,
};
pub use tree::{DocumentStore, NodeId, NodeKind, Tree};

use std::path::Path;

/// Classify table captions in a file and link their mentions, in place.
///
/// The file is overwritten with the restructured document; a working copy
/// with identical content lands next to it at `<path>.tmp`.
///
/// # Example
///
/// ```no_run
/// use captionize::classify_tables_in_file;
///
/// let records = classify_tables_in_file("paper.xml").unwrap();
/// println!("classified {} tables", records.len());
/// ```
pub fn classify_tables_in_file<P: AsRef<Path>>(path: P) -> Result<Vec<CaptionRecord>> {
    let store = DocumentStore::new(path.as_ref());
    run_tables(&store)
}

/// Classify graphic captions in a file and link their mentions, in place.
///
/// Runs the parent-placement heuristic, persists, then runs the
/// sibling-placement heuristic against the persisted result.
pub fn classify_graphics_in_file<P: AsRef<Path>>(path: P) -> Result<Vec<CaptionRecord>> {
    let store = DocumentStore::new(path.as_ref());
    run_graphics(&store)
}

/// Classify tables, then graphics, in a file.
pub fn classify_all_in_file<P: AsRef<Path>>(path: P) -> Result<Vec<CaptionRecord>> {
    let store = DocumentStore::new(path.as_ref());
    run_all(&store)
}
