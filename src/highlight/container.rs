// WHY: the element whose concatenated text is searched for the sentence
// List items are their own containers so a sentence never spills into the next item

use crate::dom::{Document, NodeId};

use super::HIGHLIGHT_CLASS;

const STOP_TAGS: &[&str] = &["body", "div", "li", "p", "article", "section", "ul", "ol"];
const LISTS: &[&str] = &["ul", "ol"];

/// Block container of `text_node`, or `None` when it has no suitable ancestor
pub fn find_container(doc: &Document, text_node: NodeId) -> Option<NodeId> {
    let mut container = doc.parent(text_node)?;
    if doc.has_class(container, HIGHLIGHT_CLASS) {
        container = doc.parent(container)?;
    }

    while !doc.is_element_named(container, STOP_TAGS) {
        container = doc.parent(container)?;
    }

    if doc.is_element_named(container, LISTS) {
        return doc.closest(text_node, |d, n| d.is_element_named(n, &["li"]));
    }
    Some(container)
}
