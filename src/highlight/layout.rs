// WHY: a renderer-free stand-in for the browser's caret primitives
// Block elements start lines, text flows inline one column per char, (x, y) = (column, line)

use anyhow::Result;

use crate::dom::{Document, NodeId};

use super::caret::{Caret, CaretLookup, CaretSource, Point};

const BLOCK_ELEMENTS: &[&str] = &[
    "body", "div", "p", "li", "ul", "ol", "article", "section", "h1", "h2", "h3", "h4", "h5", "h6",
    "blockquote", "header", "footer", "main", "nav", "aside", "table", "tr",
];

const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "template", "noscript"];

/// A piece of one text node placed on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub node: NodeId,
    pub column: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub segments: Vec<Segment>,
}

impl Line {
    pub fn width(&self) -> usize {
        self.segments.last().map(|s| s.column + s.len).unwrap_or(0)
    }

    /// Displayed text of the line
    pub fn text(&self, doc: &Document) -> String {
        self.segments
            .iter()
            .filter_map(|segment| doc.text(segment.node))
            .collect()
    }

    /// Segment under `column`, clamping past the end onto the last one
    fn caret_at(&self, column: usize) -> Option<Caret> {
        let last = self.segments.last()?;
        let hit = self
            .segments
            .iter()
            .find(|segment| column < segment.column + segment.len)
            .unwrap_or(last);
        Some(Caret {
            node: hit.node,
            offset: column.saturating_sub(hit.column).min(hit.len),
        })
    }
}

/// Monospace line layout of the rendered part of a document.
///
/// Recomputed on every query; the document may change between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineLayout;

impl LineLayout {
    pub fn new() -> Self {
        Self
    }

    /// Lay out `<body>`, or the whole document if it has none
    pub fn lines(&self, doc: &Document) -> Vec<Line> {
        let start = doc.body().unwrap_or_else(|| doc.root());
        let mut builder = LineBuilder::default();
        builder.visit(doc, start);
        builder.finish()
    }

    /// Element under the point: the parent of the text there
    pub fn element_from_point(&self, doc: &Document, point: Point) -> Option<NodeId> {
        let caret = self.caret_at(doc, point)?;
        doc.parent(caret.node)
    }

    fn caret_at(&self, doc: &Document, point: Point) -> Option<Caret> {
        if point.y < 0.0 {
            return None;
        }
        let lines = self.lines(doc);
        let line = lines.get(point.y.floor() as usize)?;
        line.caret_at(point.x.max(0.0).floor() as usize)
    }
}

impl CaretSource for LineLayout {
    fn caret_range_from_point(&self, doc: &Document, point: Point) -> Result<CaretLookup> {
        Ok(match self.caret_at(doc, point) {
            Some(caret) => CaretLookup::Hit(caret),
            None => CaretLookup::Miss,
        })
    }
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line>,
    current: Line,
}

impl LineBuilder {
    fn break_line(&mut self) {
        if !self.current.segments.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn visit(&mut self, doc: &Document, id: NodeId) {
        if doc.is_element_named(id, HIDDEN_ELEMENTS) {
            return;
        }
        if let Some(text) = doc.text(id) {
            if !text.trim().is_empty() {
                let column = self.current.width();
                self.current.segments.push(Segment {
                    node: id,
                    column,
                    len: doc.text_len(id),
                });
            }
            return;
        }

        let block = doc.is_element_named(id, BLOCK_ELEMENTS);
        if block {
            self.break_line();
        }
        for &child in doc.children(id) {
            self.visit(doc, child);
        }
        if block {
            self.break_line();
        }
    }

    fn finish(mut self) -> Vec<Line> {
        self.break_line();
        self.lines
    }
}
