//! Caption classification and cross-reference linking.
//!
//! Three entry points share one linking primitive: [`classify_tables`]
//! restructures table captions, [`classify_graphics_parent`] and
//! [`classify_graphics_sibling`] restructure graphic captions (two placement
//! heuristics, tried in sequence), and [`link_references`] rewrites in-text
//! mentions of the detected titles as `<xref>` elements.

pub mod graphics;
pub mod link;
pub mod tables;

pub use graphics::{classify_graphics_parent, classify_graphics_sibling};
pub use link::link_references;
pub use tables::classify_tables;

use serde::Serialize;
use uuid::Uuid;

use crate::tree::{NodeId, Tree};

/// A detected caption: the owning object's identifier and its title text.
///
/// Records accumulate in detection order. Identifier resolution during
/// linking goes through the *first* record carrying a given title, so two
/// objects with identical titles both resolve to the first one's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionRecord {
    /// The captioned object's `id` attribute.
    pub id: String,
    /// The title portion of the caption (e.g. "Table 1").
    pub title: String,
}

/// The kind of object a cross-reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefType {
    /// A table (`ref-type="table"`).
    #[serde(rename = "table")]
    Table,
    /// A figure or graphic (`ref-type="fig"`).
    #[serde(rename = "fig")]
    Figure,
}

impl RefType {
    /// The `ref-type` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            RefType::Table => "table",
            RefType::Figure => "fig",
        }
    }
}

/// Generate a fresh prefixed identifier for a captioned object.
pub(crate) fn generate_id() -> String {
    format!("ID{}", Uuid::new_v4())
}

/// Return the object's `id` attribute, assigning a fresh one if absent.
///
/// An id already present is never regenerated.
pub(crate) fn ensure_id(tree: &mut Tree, object: NodeId) -> String {
    match tree.attr(object, "id") {
        Some(id) => id.to_string(),
        None => {
            let id = generate_id();
            tree.set_attr(object, "id", id.clone());
            id
        }
    }
}

/// Split caption prose on the first colon into (title, caption body).
///
/// The remaining segments are concatenated with the separators dropped and
/// the result trimmed; with no colon present the title is the whole text
/// and the body is empty.
pub(crate) fn split_caption(text: &str) -> (String, String) {
    let mut segments = text.split(':');
    let title = segments.next().unwrap_or_default().to_string();
    let body: String = segments.collect::<Vec<_>>().concat();
    (title, body.trim().to_string())
}

/// Remove the caption separator variants and the given substrings from a
/// text run: `": "` first, then `":"`, then each piece in order.
pub(crate) fn strip_caption_text(text: &str, pieces: &[&str]) -> String {
    let mut out = text.replace(": ", "").replace(':', "");
    for piece in pieces {
        if !piece.is_empty() {
            out = out.replace(piece, "");
        }
    }
    out
}
