// WHY: page input and output for the CLI and tests
// html5ever builds an RcDom which is copied into the arena; serialization is hand-rolled

use anyhow::{Context, Result};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use super::{Document, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parse a full HTML page into an arena `Document`
pub fn parse_html(html: &str) -> Result<Document> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .context("Failed to parse HTML")?;

    let mut document = Document::new();
    let root = document.root();
    for child in dom.document.children.borrow().iter() {
        copy_node(child, &mut document, root)?;
    }
    Ok(document)
}

fn copy_node(handle: &Handle, document: &mut Document, parent: NodeId) -> Result<()> {
    let node = match handle.data {
        RcNodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let element = document.create_element(name.local.as_ref());
            for attr in attrs.borrow().iter() {
                document.set_attr(element, attr.name.local.as_ref(), &attr.value)?;
            }
            element
        }
        RcNodeData::Text { ref contents } => document.create_text(contents.borrow().to_string()),
        RcNodeData::Comment { ref contents } => document.create_comment(contents.to_string()),
        RcNodeData::Document | RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {
            return Ok(());
        }
    };
    document.append_child(parent, node)?;

    for child in handle.children.borrow().iter() {
        copy_node(child, document, node)?;
    }
    Ok(())
}

/// Serialize the whole document, prefixed with an HTML5 doctype
pub fn to_html(document: &Document) -> String {
    let mut html = String::from("<!DOCTYPE html>");
    for &child in document.children(document.root()) {
        serialize_node(document, child, &mut html);
    }
    html
}

/// Serialize one node and its subtree
pub fn outer_html(document: &Document, id: NodeId) -> String {
    let mut html = String::new();
    serialize_node(document, id, &mut html);
    html
}

fn serialize_node(document: &Document, id: NodeId, html: &mut String) {
    match document.data(id) {
        NodeData::Document => {
            for &child in document.children(id) {
                serialize_node(document, child, html);
            }
        }
        NodeData::Element(element) => {
            html.push('<');
            html.push_str(&element.tag);
            for (name, value) in &element.attrs {
                html.push(' ');
                html.push_str(name);
                html.push_str("=\"");
                html.push_str(&escape_attr(value));
                html.push('"');
            }
            html.push('>');

            if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                return;
            }
            for &child in document.children(id) {
                serialize_node(document, child, html);
            }
            html.push_str("</");
            html.push_str(&element.tag);
            html.push('>');
        }
        NodeData::Text(text) => {
            let raw = document
                .parent(id)
                .map(|parent| document.is_element_named(parent, RAW_TEXT_ELEMENTS))
                .unwrap_or(false);
            if raw {
                html.push_str(text);
            } else {
                html.push_str(&escape_text(text));
            }
        }
        NodeData::Comment(text) => {
            html.push_str("<!--");
            html.push_str(text);
            html.push_str("-->");
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\u{a0}', "&nbsp;")
}
