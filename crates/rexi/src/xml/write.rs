// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical XML serialization.
//!
//! Attributes keep their stored order, `&<>"` are escaped, childless
//! elements without a value collapse to `<name/>`. An element value set by
//! the data-folding parse mode is emitted as leading text content, so a
//! fold-parse round trip reproduces the original markup.

use super::dom::{Document, NodeId, NodeKind};

/// Serializes the whole document.
pub fn to_xml_string(doc: &Document) -> String {
    let mut out = String::new();
    for child in doc.children(doc.root()) {
        write_node(doc, child, &mut out);
    }
    out
}

/// Serializes one subtree.
pub fn node_to_xml_string(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.kind(node) {
        NodeKind::Document => {
            for child in doc.children(node) {
                write_node(doc, child, out);
            }
        }
        NodeKind::Element => {
            let name = doc.name(node);
            out.push('<');
            out.push_str(name);
            write_attrs(doc, node, out);

            let value = doc.value(node);
            if doc.first_child(node).is_none() && value.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            if !value.is_empty() {
                escape_into(value, false, out);
            }
            for child in doc.children(node) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        NodeKind::Text => escape_into(doc.value(node), false, out),
        NodeKind::CData => {
            out.push_str("<![CDATA[");
            out.push_str(doc.value(node));
            out.push_str("]]>");
        }
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(doc.value(node));
            out.push_str("-->");
        }
        NodeKind::Doctype => {
            out.push_str("<!DOCTYPE ");
            out.push_str(doc.value(node));
            out.push('>');
        }
        NodeKind::Pi => {
            out.push_str("<?");
            out.push_str(doc.name(node));
            let value = doc.value(node);
            if !value.is_empty() {
                out.push(' ');
                out.push_str(value);
            }
            out.push_str("?>");
        }
        NodeKind::Declaration => {
            out.push_str("<?");
            out.push_str(doc.name(node));
            write_attrs(doc, node, out);
            out.push_str("?>");
        }
    }
}

fn write_attrs(doc: &Document, node: NodeId, out: &mut String) {
    for attr in doc.attributes(node) {
        out.push(' ');
        out.push_str(doc.attr_name(attr));
        out.push_str("=\"");
        escape_into(doc.attr_value(attr), true, out);
        out.push('"');
    }
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
