//! Arena-backed document tree.
//!
//! Nodes are owned by the [`Tree`] and addressed by copyable [`NodeId`]
//! handles, so a node can be detached from one parent and re-attached under
//! another without any pointer aliasing. Text placement follows the usual
//! mixed-content convention: `text` is the run before the first child, and
//! each child's `tail` is the run between that child's end tag and the next
//! sibling (the tail belongs logically to the parent).

/// Handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// What a node represents.
///
/// Comments and processing instructions carry their verbatim content in
/// the `text` slot; they have no attributes or children but do own a tail
/// like any other child, so documents round-trip without losing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Comment,
    ProcessingInstruction,
}

/// A single node.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) name: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) tail: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    fn new(name: String, kind: NodeKind) -> Self {
        Self {
            kind,
            name,
            attrs: Vec::new(),
            text: None,
            tail: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An ordered, attributed element tree.
///
/// `prolog` and `epilog` hold comments and processing instructions that
/// sit outside the root element; `doctype` holds the raw DOCTYPE content.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    prolog: Vec<NodeId>,
    epilog: Vec<NodeId>,
    doctype: Option<String>,
}

/// Schema-mandated child ordering for container elements.
///
/// Children named here sort in listed order; any other child counts as
/// content and sorts after all of them.
const CHILD_ORDER: &[(&str, &[&str])] = &[
    ("table-wrap", &["label", "title", "caption"]),
    ("fig", &["label", "title", "caption"]),
];

fn schema_rank(parent: &str, child: &str) -> Option<usize> {
    CHILD_ORDER
        .iter()
        .find(|(p, _)| *p == parent)
        .and_then(|(_, order)| order.iter().position(|c| *c == child))
}

impl Tree {
    /// Create an empty tree with no root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new detached element.
    pub fn new_element(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name.into(), NodeKind::Element));
        id
    }

    /// Allocate a detached comment node holding `content` verbatim.
    pub fn new_comment(&mut self, content: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new("#comment".to_string(), NodeKind::Comment);
        node.text = Some(content.into());
        self.nodes.push(node);
        id
    }

    /// Allocate a detached processing instruction holding `content` verbatim.
    pub fn new_processing_instruction(&mut self, content: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new("#pi".to_string(), NodeKind::ProcessingInstruction);
        node.text = Some(content.into());
        self.nodes.push(node);
        id
    }

    /// The document root, if one has been set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Set the document root.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Nodes that precede the root element (comments, PIs).
    pub fn prolog(&self) -> &[NodeId] {
        &self.prolog
    }

    /// Nodes that follow the root element.
    pub fn epilog(&self) -> &[NodeId] {
        &self.epilog
    }

    pub fn push_prolog(&mut self, id: NodeId) {
        self.prolog.push(id);
    }

    pub fn push_epilog(&mut self, id: NodeId) {
        self.epilog.push(id);
    }

    /// Raw DOCTYPE content, without the `<!DOCTYPE` wrapper.
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    pub fn set_doctype(&mut self, doctype: impl Into<String>) {
        self.doctype = Some(doctype.into());
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Element tag name. Comments report `#comment`, PIs `#pi`, so name
    /// matches against real tags never hit them.
    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    /// Direct text content (before the first child).
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    pub fn set_text(&mut self, id: NodeId, text: Option<String>) {
        self.node_mut(id).text = text;
    }

    /// Tail text (after this node's end tag, owned by the parent).
    pub fn tail(&self, id: NodeId) -> Option<&str> {
        self.node(id).tail.as_deref()
    }

    pub fn set_tail(&mut self, id: NodeId, tail: Option<String>) {
        self.node_mut(id).tail = tail;
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let node = self.node_mut(id);
        if let Some(pair) = node.attrs.iter_mut().find(|(k, _)| *k == name) {
            pair.1 = value;
        } else {
            node.attrs.push((name, value));
        }
    }

    /// Attribute pairs in document order.
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        &self.node(id).attrs
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Index of `id` within its parent's child list.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let parent = self.node(id).parent?;
        self.node(parent).children.iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let pos = self.position(id)?;
        self.node(parent).children.get(pos + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let pos = self.position(id)?;
        pos.checked_sub(1)
            .map(|p| self.node(parent).children[p])
    }

    /// Detach a node from its parent. The node stays alive in the arena and
    /// can be re-attached elsewhere; its tail is cleared, since tail text
    /// belongs to the old parent's content.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
            self.node_mut(id).parent = None;
            self.node_mut(id).tail = None;
        }
    }

    /// Insert `child` at `index` in `parent`'s child list.
    ///
    /// The child must be detached; `index` is clamped to the child count.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(self.node(child).parent.is_none(), "child must be detached");
        let index = index.min(self.node(parent).children.len());
        self.node_mut(parent).children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.node(parent).children.len();
        self.insert_child(parent, index, child);
    }

    /// Append `child` into `parent`, respecting schema child ordering.
    ///
    /// For container elements with a mandated order (`table-wrap`, `fig`),
    /// a `label`/`title`/`caption` child is inserted at its schema slot
    /// rather than at the end; everything else is a plain append.
    pub fn append_safe(&mut self, parent: NodeId, child: NodeId) {
        let index = match schema_rank(&self.node(parent).name, &self.node(child).name) {
            Some(rank) => self
                .node(parent)
                .children
                .iter()
                .position(|&c| {
                    schema_rank(&self.node(parent).name, &self.node(c).name)
                        .map(|r| r > rank)
                        .unwrap_or(true)
                })
                .unwrap_or_else(|| self.node(parent).children.len()),
            None => self.node(parent).children.len(),
        };
        self.insert_child(parent, index, child);
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev());
        }
        out
    }

    /// All elements with the given tag name, in document order.
    pub fn find_all(&self, name: &str) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if self.node(root).name == name {
            out.push(root);
        }
        out.extend(
            self.descendants(root)
                .into_iter()
                .filter(|&id| self.node(id).name == name),
        );
        out
    }

    /// First child of `id` with the given tag name.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).name == name)
    }

    /// First child with the given tag name, created and inserted as the
    /// first child when absent.
    pub fn find_or_create_first_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        match self.find_child(parent, name) {
            Some(existing) => existing,
            None => {
                let created = self.new_element(name);
                self.insert_child(parent, 0, created);
                created
            }
        }
    }

    /// Flattened, whitespace-normalized text of a node and its descendants.
    ///
    /// Concatenates the node's text and, in document order, every
    /// descendant's text and tail; runs of whitespace collapse to single
    /// spaces and outer whitespace is trimmed.
    pub fn stripped_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(t) = self.node(id).text.as_deref() {
            out.push_str(t);
        }
        for &child in &self.node(id).children {
            self.collect_text(child, &mut out);
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        // Comment and PI content is not prose; their tails still are.
        if self.node(id).kind == NodeKind::Element {
            if let Some(t) = self.node(id).text.as_deref() {
                out.push_str(t);
            }
        }
        for &child in &self.node(id).children {
            self.collect_text(child, out);
        }
        if let Some(t) = self.node(id).tail.as_deref() {
            out.push_str(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_doc() -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.new_element("sec");
        tree.set_root(root);
        let p = tree.new_element("p");
        tree.set_text(p, Some("See ".to_string()));
        tree.append_child(root, p);
        let italic = tree.new_element("italic");
        tree.set_text(italic, Some("Table 1".to_string()));
        tree.set_tail(italic, Some(" above.".to_string()));
        tree.append_child(p, italic);
        (tree, root, p)
    }

    #[test]
    fn test_stripped_text_includes_tails() {
        let (tree, _, p) = small_doc();
        assert_eq!(tree.stripped_text(p), "See Table 1 above.");
    }

    #[test]
    fn test_stripped_text_skips_comment_content() {
        let (mut tree, _, p) = small_doc();
        let comment = tree.new_comment("editor: check this table");
        tree.set_tail(comment, Some(" Really.".to_string()));
        tree.append_child(p, comment);
        assert_eq!(tree.kind(comment), NodeKind::Comment);
        assert_eq!(tree.stripped_text(p), "See Table 1 above. Really.");
    }

    #[test]
    fn test_stripped_text_normalizes_whitespace() {
        let mut tree = Tree::new();
        let p = tree.new_element("p");
        tree.set_root(p);
        tree.set_text(p, Some("  Table  1:\n  Results ".to_string()));
        assert_eq!(tree.stripped_text(p), "Table 1: Results");
    }

    #[test]
    fn test_siblings() {
        let mut tree = Tree::new();
        let root = tree.new_element("sec");
        tree.set_root(root);
        let a = tree.new_element("p");
        let b = tree.new_element("table-wrap");
        let c = tree.new_element("p");
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.append_child(root, c);

        assert_eq!(tree.next_sibling(b), Some(c));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.prev_sibling(a), None);
        assert_eq!(tree.next_sibling(c), None);
    }

    #[test]
    fn test_detach_and_reattach() {
        let (mut tree, root, p) = small_doc();
        let caption = tree.new_element("caption");
        tree.set_tail(p, Some("trailing".to_string()));
        tree.detach(p);
        assert_eq!(tree.children(root).len(), 0);
        assert_eq!(tree.parent(p), None);
        // tail stays with the old parent's content, not the moved node
        assert_eq!(tree.tail(p), None);

        tree.append_safe(caption, p);
        assert_eq!(tree.parent(p), Some(caption));
        assert_eq!(tree.children(caption), &[p]);
    }

    #[test]
    fn test_append_safe_schema_order() {
        let mut tree = Tree::new();
        let table = tree.new_element("table-wrap");
        tree.set_root(table);
        let body = tree.new_element("table");
        tree.append_child(table, body);

        // caption slots in before content, label before caption
        let caption = tree.new_element("caption");
        tree.append_safe(table, caption);
        let label = tree.new_element("label");
        tree.append_safe(table, label);

        let names: Vec<&str> = tree
            .children(table)
            .iter()
            .map(|&c| tree.name(c))
            .collect();
        assert_eq!(names, vec!["label", "caption", "table"]);
    }

    #[test]
    fn test_append_safe_plain_parent_appends() {
        let mut tree = Tree::new();
        let p = tree.new_element("p");
        tree.set_root(p);
        let italic = tree.new_element("italic");
        tree.append_child(p, italic);
        let xref = tree.new_element("xref");
        tree.append_safe(p, xref);
        assert_eq!(tree.children(p), &[italic, xref]);
    }

    #[test]
    fn test_find_all_document_order() {
        let mut tree = Tree::new();
        let root = tree.new_element("article");
        tree.set_root(root);
        let sec = tree.new_element("sec");
        tree.append_child(root, sec);
        let p1 = tree.new_element("p");
        tree.append_child(sec, p1);
        let p2 = tree.new_element("p");
        tree.append_child(root, p2);

        assert_eq!(tree.find_all("p"), vec![p1, p2]);
    }

    #[test]
    fn test_find_or_create_first_child() {
        let mut tree = Tree::new();
        let table = tree.new_element("table-wrap");
        let body = tree.new_element("table");
        tree.append_child(table, body);

        let title = tree.find_or_create_first_child(table, "title");
        assert_eq!(tree.children(table), &[title, body]);

        // a second lookup reuses the created child
        assert_eq!(tree.find_or_create_first_child(table, "title"), title);
        assert_eq!(tree.children(table).len(), 2);
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut tree = Tree::new();
        let t = tree.new_element("table-wrap");
        tree.set_attr(t, "id", "ID1");
        tree.set_attr(t, "id", "ID2");
        assert_eq!(tree.attr(t, "id"), Some("ID2"));
        assert_eq!(tree.attrs(t).len(), 1);
    }
}
