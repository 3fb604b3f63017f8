// WHY: hover targets that must never be highlighted

use crate::dom::{Document, NodeId};

use super::FLOATING_UI_ATTR;

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const TEXT_FIELDS: &[&str] = &["input", "textarea"];

/// Why a target was accepted or rejected, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityReport {
    pub in_floating_ui: bool,
    pub is_editable: bool,
    pub is_heading: bool,
    pub has_text: bool,
}

impl EligibilityReport {
    pub fn inspect(doc: &Document, element: NodeId) -> Self {
        Self {
            in_floating_ui: is_part_of_floating_ui(doc, element),
            is_editable: is_editable(doc, element),
            is_heading: doc.is_element_named(element, HEADINGS),
            has_text: has_text(doc, element),
        }
    }

    pub fn is_eligible(&self) -> bool {
        !self.in_floating_ui && !self.is_editable && !self.is_heading && self.has_text
    }
}

/// Whether a hovered element is a valid highlight target
pub fn is_eligible(doc: &Document, element: NodeId) -> bool {
    EligibilityReport::inspect(doc, element).is_eligible()
}

/// The element or an ancestor is the root of the injected floating UI
pub fn is_part_of_floating_ui(doc: &Document, element: NodeId) -> bool {
    doc.closest(element, |d, n| d.attr(n, FLOATING_UI_ATTR) == Some("true"))
        .is_some()
}

pub fn is_editable(doc: &Document, element: NodeId) -> bool {
    doc.is_content_editable(element) || doc.is_element_named(element, TEXT_FIELDS)
}

pub fn has_text(doc: &Document, element: NodeId) -> bool {
    !doc.text_content(element).trim().is_empty()
}
