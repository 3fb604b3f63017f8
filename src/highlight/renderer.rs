// WHY: the only part of the pipeline that rewrites the document
// One marker per sub-range; a failed wrap is logged and the rest still proceed

use anyhow::{bail, Result};
use tracing::{debug, error, warn};

use crate::dom::{Document, NodeId};
use crate::sentence_detector::{SentenceBoundaryLocator, SentenceSpan};

use super::offsets::to_sub_ranges;
use super::style::{stylesheet, Formatting};
use super::{HIGHLIGHT_CLASS, STYLE_MARKER_ATTR};

const REHIGHLIGHT_CONTAINERS: &[&str] = &["p", "div", "article", "section", "li"];

/// Outcome of one highlight pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightReport {
    pub span: SentenceSpan,
    /// Markers inserted
    pub wrapped: usize,
    /// Sub-ranges whose wrap failed
    pub failed: usize,
}

impl HighlightReport {
    pub fn is_highlighted(&self) -> bool {
        self.wrapped > 0
    }
}

/// Unwrap every marker in the document; returns how many were removed
pub fn remove_highlights(doc: &mut Document) -> usize {
    let markers = doc.elements_with_class(HIGHLIGHT_CLASS);
    let mut parents: Vec<NodeId> = Vec::with_capacity(markers.len());
    let mut removed = 0;

    for marker in markers {
        match doc.unwrap_element(marker) {
            Ok(parent) => {
                removed += 1;
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
            Err(e) => warn!(error = %e, "Failed to remove highlight marker"),
        }
    }
    for parent in parents {
        doc.rejoin_split_text(parent);
    }
    removed
}

/// Highlight the sentence of `container`'s text around `offset`
pub fn highlight_sentence(
    doc: &mut Document,
    locator: &mut SentenceBoundaryLocator,
    container: NodeId,
    offset: usize,
) -> HighlightReport {
    remove_highlights(doc);

    let text = doc.text_content(container);
    let span = locator.find_sentence_boundaries(&text, offset);
    let mut report = HighlightReport {
        span,
        ..HighlightReport::default()
    };
    if span.is_empty() {
        debug!(offset, "No sentence to highlight");
        return report;
    }

    for range in to_sub_ranges(doc, container, span) {
        let marker = doc.create_element("span");
        let wrapped = doc
            .set_attr(marker, "class", HIGHLIGHT_CLASS)
            .and_then(|()| doc.surround_text(range.node, range.start, range.end, marker));
        match wrapped {
            Ok(()) => report.wrapped += 1,
            Err(e) => {
                error!(error = %e, node = ?range.node, start = range.start, end = range.end, "Error wrapping range");
                report.failed += 1;
            }
        }
    }

    debug!(
        start = span.start,
        end = span.end,
        wrapped = report.wrapped,
        failed = report.failed,
        "Highlighted sentence"
    );
    report
}

/// Re-run the current highlight so it picks up new styles.
///
/// Uses the first marker's text and its nearest block ancestor; returns
/// `None` when nothing was highlighted or the text can no longer be found.
pub fn rehighlight(doc: &mut Document, locator: &mut SentenceBoundaryLocator) -> Option<HighlightReport> {
    let first = doc.elements_with_class(HIGHLIGHT_CLASS).into_iter().next()?;
    let highlighted = doc.text_content(first);
    let container = doc.closest(first, |d, n| {
        n != first && d.is_element_named(n, REHIGHLIGHT_CONTAINERS)
    });

    remove_highlights(doc);

    let container = container?;
    if highlighted.is_empty() {
        return None;
    }
    let text = doc.text_content(container);
    let byte = text.find(&highlighted)?;
    let offset = text[..byte].chars().count();
    Some(highlight_sentence(doc, locator, container, offset))
}

/// Install or refresh the marker stylesheet in `<head>`
pub fn apply_styles(doc: &mut Document, formatting: &Formatting) -> Result<NodeId> {
    let existing = doc
        .descendants(doc.root())
        .into_iter()
        .find(|&n| doc.is_element_named(n, &["style"]) && doc.attr(n, STYLE_MARKER_ATTR).is_some());

    let style = match existing {
        Some(style) => style,
        None => {
            let Some(head) = doc.head() else {
                bail!("Document has no <head> to hold the highlight stylesheet");
            };
            let style = doc.create_element("style");
            doc.set_attr(style, STYLE_MARKER_ATTR, "")?;
            doc.append_child(head, style)?;
            style
        }
    };
    doc.set_text_content(style, &stylesheet(formatting))?;
    Ok(style)
}
