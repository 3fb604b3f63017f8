// WHY: arena document model the highlighter mutates
// Detached nodes stay in the arena; only nodes reachable from the root are part of the page

use anyhow::{bail, Result};

pub mod html;

pub use html::{outer_html, parse_html, to_html};

/// Index of a node in its `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-case local name
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Text node this one was split off from, until the two are rejoined
    split_from: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
                split_from: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
            split_from: None,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// True when `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Reachable from the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root(), id)
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if matches!(self.data(parent), NodeData::Text(_) | NodeData::Comment(_)) {
            bail!("Cannot insert into a character data node {:?}", parent);
        }
        if child == self.root() {
            bail!("Cannot insert the document root");
        }
        if self.is_inclusive_ancestor(child, parent) {
            bail!("Inserting {:?} under {:?} would create a cycle", child, parent);
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Insert `child` into `parent` right before `reference`
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        self.check_insert(parent, child)?;
        if self.parent(reference) != Some(parent) {
            bail!("Reference node {:?} is not a child of {:?}", reference, parent);
        }
        if child == reference {
            return Ok(());
        }
        self.detach(child);
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(position, child);
        Ok(())
    }

    /// Insert `child` into `parent` right after `reference`
    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        let siblings = self.children(parent);
        match siblings.iter().position(|&c| c == reference) {
            Some(idx) if idx + 1 < siblings.len() => {
                let next = siblings[idx + 1];
                self.insert_before(parent, child, next)
            }
            Some(_) => self.append_child(parent, child),
            None => bail!("Reference node {:?} is not a child of {:?}", reference, parent),
        }
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            bail!("Node {:?} is not a child of {:?}", child, parent);
        }
        self.detach(child);
        Ok(())
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Text(_))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Length of a text node in chars; zero for anything else
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map(|t| t.chars().count()).unwrap_or(0)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Element whose tag is one of `tags` (compared case-insensitively)
    pub fn is_element_named(&self, id: NodeId, tags: &[&str]) -> bool {
        self.tag_name(id)
            .map(|tag| tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            .unwrap_or(false)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let NodeData::Element(element) = &mut self.nodes[id.0].data else {
            bail!("Node {:?} is not an element", id);
        };
        match element.attrs.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attrs.push((name.to_ascii_lowercase(), value.to_string())),
        }
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Replace the children of `id` with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        if let NodeData::Text(existing) = &mut self.nodes[id.0].data {
            *existing = text.to_string();
            return Ok(());
        }
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Concatenated text of every descendant text node, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut content = String::new();
        for node in self.text_nodes(id) {
            if let Some(text) = self.text(node) {
                content.push_str(text);
            }
        }
        content
    }

    /// Pre-order descendants of `id`, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Descendant text nodes of `id` in document order
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.is_text(node))
            .collect()
    }

    /// Nearest inclusive ancestor element satisfying `predicate`
    pub fn closest(&self, id: NodeId, predicate: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.element(node).is_some() && predicate(self, node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Connected elements carrying `class`, in document order
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&node| self.has_class(node, class))
            .collect()
    }

    /// First connected element with the given tag
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&node| self.is_element_named(node, &[tag]))
    }

    pub fn body(&self) -> Option<NodeId> {
        self.find_element("body")
    }

    pub fn head(&self) -> Option<NodeId> {
        self.find_element("head")
    }

    /// Editing host semantics of `contenteditable`, inherited from ancestors
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.attr(node, "contenteditable").map(|v| v.trim().to_ascii_lowercase()) {
                Some(value) if value.is_empty() || value == "true" || value == "plaintext-only" => {
                    return true
                }
                Some(value) if value == "false" => return false,
                _ => {}
            }
            current = self.parent(node);
        }
        false
    }

    /// Split a text node at `offset` chars; the tail becomes a new next sibling
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId> {
        let Some(text) = self.text(id) else {
            bail!("Node {:?} is not a text node", id);
        };
        let len = text.chars().count();
        if offset > len {
            bail!("Split offset {} exceeds text length {}", offset, len);
        }
        let byte = crate::sentence_detector::byte_offset(text, offset);
        let tail = text[byte..].to_string();
        if let NodeData::Text(head) = &mut self.nodes[id.0].data {
            head.truncate(byte);
        }
        let tail_node = self.create_text(tail);
        self.nodes[tail_node.0].split_from = Some(id);
        if let Some(parent) = self.parent(id) {
            self.insert_after(parent, tail_node, id)?;
        }
        Ok(tail_node)
    }

    /// Wrap chars `start..end` of one text node in `wrapper`.
    ///
    /// The text node is split so that the wrapped part becomes the only child
    /// of `wrapper`, which takes its place in the tree.
    pub fn surround_text(&mut self, id: NodeId, start: usize, end: usize, wrapper: NodeId) -> Result<()> {
        if !self.is_text(id) {
            bail!("Range container {:?} is not a text node", id);
        }
        let Some(parent) = self.parent(id) else {
            bail!("Text node {:?} is detached", id);
        };
        if self.element(wrapper).is_none() {
            bail!("Wrapper {:?} is not an element", wrapper);
        }
        let len = self.text_len(id);
        if start >= end || end > len {
            bail!("Invalid range {}..{} in text of length {}", start, end, len);
        }

        if end < len {
            self.split_text(id, end)?;
        }
        let middle = if start > 0 { self.split_text(id, start)? } else { id };
        self.insert_before(parent, wrapper, middle)?;
        self.append_child(wrapper, middle)?;
        Ok(())
    }

    /// Move the children of `id` into its parent in its place, then drop `id`
    pub fn unwrap_element(&mut self, id: NodeId) -> Result<NodeId> {
        let Some(parent) = self.parent(id) else {
            bail!("Element {:?} is detached", id);
        };
        for child in self.children(id).to_vec() {
            self.insert_before(parent, child, id)?;
        }
        self.remove_child(parent, id)?;
        Ok(parent)
    }

    /// Rejoin text children of `id` that `split_text` cut apart.
    ///
    /// A piece is merged into the text node right before it only when that
    /// node is the one it was split from (or has absorbed it). Text nodes that
    /// were separate before any split stay separate.
    pub fn rejoin_split_text(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        let mut absorbed: Vec<(NodeId, NodeId)> = Vec::new();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            let Some(origin) = self.nodes[child.0].split_from.take() else {
                previous_text = self.is_text(child).then_some(child);
                continue;
            };
            let origin = absorbed
                .iter()
                .rev()
                .find(|(piece, _)| *piece == origin)
                .map_or(origin, |&(_, target)| target);

            match previous_text {
                Some(target) if target == origin => {
                    let piece = self.text(child).map(str::to_string).unwrap_or_default();
                    if let NodeData::Text(existing) = &mut self.nodes[target.0].data {
                        existing.push_str(&piece);
                    }
                    self.detach(child);
                    absorbed.push((child, target));
                }
                _ => previous_text = Some(child),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(doc: &mut Document, parts: &[&str]) -> (NodeId, Vec<NodeId>) {
        let p = doc.create_element("p");
        doc.append_child(doc.root(), p).unwrap();
        let texts = parts
            .iter()
            .map(|part| {
                let t = doc.create_text(*part);
                doc.append_child(p, t).unwrap();
                t
            })
            .collect();
        (p, texts)
    }

    #[test]
    fn test_text_content_in_document_order() {
        let mut doc = Document::new();
        let (p, _) = paragraph(&mut doc, &["One. ", "Two."]);
        let em = doc.create_element("em");
        let inner = doc.create_text("Three.");
        doc.append_child(em, inner).unwrap();
        doc.append_child(p, em).unwrap();
        assert_eq!(doc.text_content(p), "One. Two.Three.");
        assert_eq!(doc.text_nodes(p).len(), 3);
    }

    #[test]
    fn test_append_rejects_cycles_and_text_parents() {
        let mut doc = Document::new();
        let (p, texts) = paragraph(&mut doc, &["x"]);
        let span = doc.create_element("span");
        assert!(doc.append_child(texts[0], span).is_err());
        doc.append_child(p, span).unwrap();
        assert!(doc.append_child(span, p).is_err());
    }

    #[test]
    fn test_surround_middle_of_text() {
        let mut doc = Document::new();
        let (p, texts) = paragraph(&mut doc, &["Hello brave world"]);
        let mark = doc.create_element("span");
        doc.surround_text(texts[0], 6, 11, mark).unwrap();

        assert_eq!(doc.text_content(mark), "brave");
        assert_eq!(doc.text_content(p), "Hello brave world");
        assert_eq!(doc.children(p).len(), 3);
        assert_eq!(doc.children(p)[1], mark);
    }

    #[test]
    fn test_surround_whole_text_reuses_node() {
        let mut doc = Document::new();
        let (p, texts) = paragraph(&mut doc, &["All of it"]);
        let mark = doc.create_element("span");
        doc.surround_text(texts[0], 0, 9, mark).unwrap();
        assert_eq!(doc.children(p), &[mark]);
        assert_eq!(doc.children(mark), &[texts[0]]);
    }

    #[test]
    fn test_surround_rejects_bad_ranges() {
        let mut doc = Document::new();
        let (p, texts) = paragraph(&mut doc, &["short"]);
        let mark = doc.create_element("span");
        assert!(doc.surround_text(texts[0], 2, 2, mark).is_err());
        assert!(doc.surround_text(texts[0], 0, 6, mark).is_err());
        assert!(doc.surround_text(p, 0, 1, mark).is_err());
        let detached = doc.create_text("loose");
        assert!(doc.surround_text(detached, 0, 1, mark).is_err());
        assert_eq!(doc.text_content(p), "short");
    }

    #[test]
    fn test_unwrap_and_merge_restore_single_text() {
        let mut doc = Document::new();
        let (p, texts) = paragraph(&mut doc, &["Hello brave world"]);
        let mark = doc.create_element("span");
        doc.surround_text(texts[0], 6, 11, mark).unwrap();

        let parent = doc.unwrap_element(mark).unwrap();
        assert_eq!(parent, p);
        assert!(!doc.is_connected(mark));
        doc.rejoin_split_text(p);
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text(doc.children(p)[0]), Some("Hello brave world"));
    }

    #[test]
    fn test_rejoin_leaves_page_text_nodes_separate() {
        let mut doc = Document::new();
        let (p, texts) = paragraph(&mut doc, &["Hello ", "brave world", " again"]);
        let mark = doc.create_element("span");
        doc.surround_text(texts[1], 0, 5, mark).unwrap();
        doc.unwrap_element(mark).unwrap();
        doc.rejoin_split_text(p);

        assert_eq!(doc.children(p).len(), 3);
        assert_eq!(doc.text(doc.children(p)[0]), Some("Hello "));
        assert_eq!(doc.text(doc.children(p)[1]), Some("brave world"));
        assert_eq!(doc.text(doc.children(p)[2]), Some(" again"));

        let whole = doc.create_element("span");
        doc.surround_text(texts[2], 0, 6, whole).unwrap();
        doc.unwrap_element(whole).unwrap();
        doc.rejoin_split_text(p);
        assert_eq!(doc.children(p), &texts[..]);
    }

    #[test]
    fn test_content_editable_inheritance() {
        let mut doc = Document::new();
        let host = doc.create_element("div");
        doc.set_attr(host, "contenteditable", "").unwrap();
        let inner = doc.create_element("span");
        let locked = doc.create_element("b");
        doc.set_attr(locked, "contenteditable", "false").unwrap();
        doc.append_child(doc.root(), host).unwrap();
        doc.append_child(host, inner).unwrap();
        doc.append_child(host, locked).unwrap();

        assert!(doc.is_content_editable(host));
        assert!(doc.is_content_editable(inner));
        assert!(!doc.is_content_editable(locked));
    }

    #[test]
    fn test_class_and_closest() {
        let mut doc = Document::new();
        let (p, texts) = paragraph(&mut doc, &["text"]);
        doc.set_attr(p, "class", "lead note").unwrap();
        assert!(doc.has_class(p, "note"));
        assert!(!doc.has_class(p, "not"));
        assert_eq!(doc.elements_with_class("lead"), vec![p]);
        assert_eq!(doc.closest(texts[0], |d, n| d.is_element_named(n, &["P"])), Some(p));
    }

    #[test]
    fn test_split_text_multibyte() {
        let mut doc = Document::new();
        let (p, texts) = paragraph(&mut doc, &["日本語テキスト"]);
        let tail = doc.split_text(texts[0], 3).unwrap();
        assert_eq!(doc.text(texts[0]), Some("日本語"));
        assert_eq!(doc.text(tail), Some("テキスト"));
        assert_eq!(doc.children(p), &[texts[0], tail]);
    }
}
