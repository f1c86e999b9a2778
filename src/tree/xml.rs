//! XML loading and serialization for the arena tree.
//!
//! Attribute and tag names are kept verbatim, namespace prefix included
//! (`xlink:href` stays `xlink:href`), so documents round-trip without any
//! namespace bookkeeping. Comments, processing instructions and the
//! DOCTYPE are carried through the tree and re-emitted on write; only the
//! XML declaration is regenerated.

use std::fs;
use std::path::Path;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::tree::{NodeId, NodeKind, Tree};

/// Parse an XML document into a [`Tree`].
pub fn parse_str(source: &str) -> Result<Tree> {
    let mut reader = Reader::from_str(source);
    let mut tree = Tree::new();
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let id = open_element(&mut tree, &stack, &e)?;
                stack.push(id);
            }
            Event::Empty(e) => {
                open_element(&mut tree, &stack, &e)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(e) => {
                let text = e.unescape()?.into_owned();
                attach_text(&mut tree, &stack, &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                attach_text(&mut tree, &stack, &text);
            }
            Event::Comment(e) => {
                let content = String::from_utf8_lossy(&e).into_owned();
                let id = tree.new_comment(content);
                attach_node(&mut tree, &stack, id);
            }
            Event::PI(e) => {
                let content = String::from_utf8_lossy(&e).into_owned();
                let id = tree.new_processing_instruction(content);
                attach_node(&mut tree, &stack, id);
            }
            Event::DocType(e) => {
                let content = String::from_utf8_lossy(&e).into_owned();
                tree.set_doctype(content.trim().to_string());
            }
            Event::Eof => break,
            // the XML declaration is regenerated on write
            _ => {}
        }
    }

    if let Some(&open) = stack.last() {
        return Err(Error::Malformed(format!(
            "unexpected end of input, <{}> is still open",
            tree.name(open)
        )));
    }
    if tree.root().is_none() {
        return Err(Error::Malformed("document has no root element".to_string()));
    }
    Ok(tree)
}

/// Parse an XML file into a [`Tree`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Tree> {
    let source = fs::read_to_string(path)?;
    parse_str(&source)
}

fn open_element(tree: &mut Tree, stack: &[NodeId], e: &BytesStart<'_>) -> Result<NodeId> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let id = tree.new_element(name);

    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        tree.set_attr(id, key, value);
    }

    match stack.last() {
        Some(&parent) => tree.append_child(parent, id),
        None => {
            if tree.root().is_some() {
                return Err(Error::Malformed(
                    "document has more than one root element".to_string(),
                ));
            }
            tree.set_root(id);
        }
    }
    Ok(id)
}

/// Attach a comment or PI node: as a child of the open element, or into
/// the document prolog/epilog when it sits outside the root.
fn attach_node(tree: &mut Tree, stack: &[NodeId], id: NodeId) {
    match stack.last() {
        Some(&parent) => tree.append_child(parent, id),
        None => {
            if tree.root().is_some() {
                tree.push_epilog(id);
            } else {
                tree.push_prolog(id);
            }
        }
    }
}

/// Attach a text run at the current cursor: direct text if the open element
/// has no children yet, otherwise the tail of its last child.
fn attach_text(tree: &mut Tree, stack: &[NodeId], text: &str) {
    let Some(&current) = stack.last() else {
        // whitespace or stray text outside the root
        return;
    };
    match tree.children(current).last().copied() {
        Some(last) => {
            let mut tail = tree.tail(last).unwrap_or_default().to_string();
            tail.push_str(text);
            tree.set_tail(last, Some(tail));
        }
        None => {
            let mut direct = tree.text(current).unwrap_or_default().to_string();
            direct.push_str(text);
            tree.set_text(current, Some(direct));
        }
    }
}

/// Serialize a [`Tree`] back to an XML string.
pub fn to_xml_string(tree: &Tree) -> Result<String> {
    let root = tree
        .root()
        .ok_or_else(|| Error::Malformed("document has no root element".to_string()))?;
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    if let Some(doctype) = tree.doctype() {
        out.push_str("<!DOCTYPE ");
        out.push_str(doctype);
        out.push_str(">\n");
    }
    for &node in tree.prolog() {
        write_node(tree, node, &mut out);
    }
    write_node(tree, root, &mut out);
    for &node in tree.epilog() {
        write_node(tree, node, &mut out);
    }
    Ok(out)
}

fn write_node(tree: &Tree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(tree.text(id).unwrap_or_default());
            out.push_str("-->");
            if let Some(tail) = tree.tail(id) {
                out.push_str(&partial_escape(tail));
            }
            return;
        }
        NodeKind::ProcessingInstruction => {
            out.push_str("<?");
            out.push_str(tree.text(id).unwrap_or_default());
            out.push_str("?>");
            if let Some(tail) = tree.tail(id) {
                out.push_str(&partial_escape(tail));
            }
            return;
        }
        NodeKind::Element => {}
    }

    out.push('<');
    out.push_str(tree.name(id));
    for (key, value) in tree.attrs(id) {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    let text = tree.text(id);
    let children = tree.children(id);
    if text.is_none() && children.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        if let Some(text) = text {
            out.push_str(&partial_escape(text));
        }
        for &child in children {
            write_node(tree, child, out);
        }
        out.push_str("</");
        out.push_str(tree.name(id));
        out.push('>');
    }

    if let Some(tail) = tree.tail(id) {
        out.push_str(&partial_escape(tail));
    }
}
