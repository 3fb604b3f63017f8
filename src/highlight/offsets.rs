// WHY: translate between (text node, local offset) and offsets into a container's text
// The core works on plain text-run lists; only the thin wrappers touch the document

use crate::dom::{Document, NodeId};
use crate::sentence_detector::SentenceSpan;

/// One text node of a container with its length in chars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun {
    pub node: NodeId,
    pub len: usize,
}

/// Part of a sentence span inside one text node, in node-local chars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRange {
    pub node: NodeId,
    pub start: usize,
    pub end: usize,
}

/// Text nodes of `container` in document order
pub fn text_runs(doc: &Document, container: NodeId) -> Vec<TextRun> {
    doc.text_nodes(container)
        .into_iter()
        .map(|node| TextRun {
            node,
            len: doc.text_len(node),
        })
        .collect()
}

/// Absolute offset of `local` inside `node`.
///
/// A node that is not among `runs` yields the total length.
pub fn absolute_offset(runs: &[TextRun], node: NodeId, local: usize) -> usize {
    let mut total = 0;
    for run in runs {
        if run.node == node {
            return total + local;
        }
        total += run.len;
    }
    total
}

/// Non-empty per-node overlaps of `[start, end)`
pub fn sub_ranges(runs: &[TextRun], start: usize, end: usize) -> Vec<SubRange> {
    let mut ranges = Vec::new();
    let mut position = 0;
    for run in runs {
        let node_start = position;
        let node_end = position + run.len;
        if node_end > start && node_start < end {
            let local_start = start.max(node_start) - node_start;
            let local_end = end.min(node_end) - node_start;
            if local_start < local_end {
                ranges.push(SubRange {
                    node: run.node,
                    start: local_start,
                    end: local_end,
                });
            }
        }
        position = node_end;
        if position >= end {
            break;
        }
    }
    ranges
}

pub fn to_absolute_offset(doc: &Document, container: NodeId, node: NodeId, local: usize) -> usize {
    absolute_offset(&text_runs(doc, container), node, local)
}

pub fn to_sub_ranges(doc: &Document, container: NodeId, span: SentenceSpan) -> Vec<SubRange> {
    sub_ranges(&text_runs(doc, container), span.start, span.end)
}
