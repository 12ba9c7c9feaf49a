// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML text to [`Document`] parsing.
//!
//! A thin event loop over `quick-xml`'s borrowing reader. In
//! non-destructive mode character data (text, CDATA, comments, DOCTYPE,
//! processing instructions) is stored as slices of the caller's input and
//! entities are left unexpanded; names and attribute values go through the
//! string pool, which the event parser only exposes transiently. In copy
//! mode everything is unescaped and pooled.

use std::borrow::Cow;
use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::dom::{Document, NodeId, NodeKind, TextSlice};

/// The parsing switches the codec consumes.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Reference the input buffer instead of pooling character data, and
    /// do not expand entities. The input must outlive the document.
    pub non_destructive: bool,
    /// Fold the first text child into the parent element's value slot
    /// instead of materializing text nodes.
    pub no_data_nodes: bool,
    /// Enforce well-formedness of closing tags.
    pub validate_closing_tags: bool,
    /// Materialize comment nodes.
    pub comment_nodes: bool,
    /// Materialize a DOCTYPE node carrying the raw doctype value.
    pub doctype_node: bool,
    /// Materialize processing-instruction nodes.
    pub pi_nodes: bool,
    /// Materialize the XML declaration as a node.
    pub declaration_node: bool,
}

/// Parse failure: a message and the byte offset the reader had reached.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    fn at(message: impl Into<String>, offset: usize) -> Self {
        ParseError { message: message.into(), offset }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// Parses an XML string into a document tree.
pub fn parse_str<'buf>(
    text: &'buf str,
    options: &ParseOptions,
) -> Result<Document<'buf>, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.check_end_names(options.validate_closing_tags);

    let mut doc = Document::new();
    let root = doc.root();
    let mut cursor = root;

    loop {
        let pos = reader.buffer_position();
        match reader.read_event() {
            Err(err) => return Err(ParseError::at(err.to_string(), pos)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(start)) => {
                let node = open_element(&mut doc, &start, options, pos)?;
                doc.append_child(cursor, node);
                cursor = node;
            }
            Ok(Event::Empty(start)) => {
                let node = open_element(&mut doc, &start, options, pos)?;
                doc.append_child(cursor, node);
            }
            Ok(Event::End(_)) => {
                if cursor == root {
                    return Err(ParseError::at("closing tag without an open element", pos));
                }
                cursor = doc.parent(cursor).unwrap_or(root);
            }
            Ok(Event::Text(data)) => {
                if data.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                let value: Cow<'buf, str> = if options.non_destructive {
                    cow_str(data.into_inner(), pos)?
                } else {
                    let unescaped = data
                        .unescape()
                        .map_err(|err| ParseError::at(err.to_string(), pos))?;
                    Cow::Owned(unescaped.into_owned())
                };
                if options.no_data_nodes {
                    if doc.kind(cursor) == NodeKind::Element && !doc.has_value(cursor) {
                        store_node_value(&mut doc, cursor, value, options.non_destructive);
                    }
                    continue;
                }
                let node = doc.alloc_node(NodeKind::Text);
                store_node_value(&mut doc, node, value, options.non_destructive);
                doc.append_child(cursor, node);
            }
            Ok(Event::CData(data)) => {
                let value = cow_str(data.into_inner(), pos)?;
                let node = doc.alloc_node(NodeKind::CData);
                store_node_value(&mut doc, node, value, options.non_destructive);
                doc.append_child(cursor, node);
            }
            Ok(Event::Comment(data)) => {
                if options.comment_nodes {
                    let value = cow_str(data.into_inner(), pos)?;
                    let node = doc.alloc_node(NodeKind::Comment);
                    store_node_value(&mut doc, node, value, options.non_destructive);
                    doc.append_child(cursor, node);
                }
            }
            Ok(Event::DocType(data)) => {
                if options.doctype_node {
                    let value = cow_str(data.into_inner(), pos)?;
                    let node = doc.alloc_node(NodeKind::Doctype);
                    store_node_value(&mut doc, node, value, options.non_destructive);
                    doc.append_child(cursor, node);
                }
            }
            Ok(Event::PI(data)) => {
                if options.pi_nodes {
                    let raw = cow_str(data.into_inner(), pos)?;
                    let node = doc.alloc_node(NodeKind::Pi);
                    match raw {
                        Cow::Borrowed(s) if options.non_destructive => {
                            let (target, content) = split_pi(s);
                            doc.set_name_slice(node, TextSlice::Input(target));
                            doc.set_value_slice(node, TextSlice::Input(content));
                        }
                        raw => {
                            let (target, content) = split_pi(&raw);
                            doc.set_name(node, target);
                            let content = content.to_owned();
                            doc.set_value(node, &content);
                        }
                    }
                    doc.append_child(cursor, node);
                }
            }
            Ok(Event::Decl(decl)) => {
                if options.declaration_node {
                    let node = doc.alloc_node_with(NodeKind::Declaration, Some("xml"), None);
                    let version = decl
                        .version()
                        .map_err(|err| ParseError::at(err.to_string(), pos))?;
                    push_decl_attr(&mut doc, node, "version", &version, pos)?;
                    if let Some(encoding) = decl.encoding() {
                        let encoding =
                            encoding.map_err(|err| ParseError::at(err.to_string(), pos))?;
                        push_decl_attr(&mut doc, node, "encoding", &encoding, pos)?;
                    }
                    if let Some(standalone) = decl.standalone() {
                        let standalone =
                            standalone.map_err(|err| ParseError::at(err.to_string(), pos))?;
                        push_decl_attr(&mut doc, node, "standalone", &standalone, pos)?;
                    }
                    doc.append_child(cursor, node);
                }
            }
        }
    }

    if cursor != root {
        return Err(ParseError::at(
            format!("unexpected end of data inside <{}>", doc.name(cursor)),
            text.len(),
        ));
    }
    Ok(doc)
}

fn open_element<'buf>(
    doc: &mut Document<'buf>,
    start: &BytesStart<'_>,
    options: &ParseOptions,
    pos: usize,
) -> Result<NodeId, ParseError> {
    let start_name = start.name();
    let name = utf8(start_name.as_ref(), pos)?;
    let node = doc.alloc_node(NodeKind::Element);
    doc.set_name(node, name);

    for attr in start.attributes() {
        let attr = attr.map_err(|err| ParseError::at(err.to_string(), pos))?;
        let key = utf8(attr.key.as_ref(), pos)?;
        let attr_id = doc.alloc_attr();
        doc.set_attr_name(attr_id, key);
        if options.non_destructive {
            // Entities stay unexpanded.
            let raw = utf8(attr.value.as_ref(), pos)?;
            doc.set_attr_value(attr_id, raw);
        } else {
            let value = attr
                .unescape_value()
                .map_err(|err| ParseError::at(err.to_string(), pos))?;
            doc.set_attr_value(attr_id, &value);
        }
        doc.append_attr(node, attr_id);
    }
    Ok(node)
}

fn store_node_value<'buf>(
    doc: &mut Document<'buf>,
    node: NodeId,
    value: Cow<'buf, str>,
    non_destructive: bool,
) {
    match value {
        Cow::Borrowed(slice) if non_destructive => {
            doc.set_value_slice(node, TextSlice::Input(slice));
        }
        value => doc.set_value(node, &value),
    }
}

fn push_decl_attr(
    doc: &mut Document<'_>,
    node: NodeId,
    name: &str,
    value: &[u8],
    pos: usize,
) -> Result<(), ParseError> {
    let value = utf8(value, pos)?.to_owned();
    let attr = doc.alloc_attr_with(name, &value);
    doc.append_attr(node, attr);
    Ok(())
}

fn utf8<'a>(bytes: &'a [u8], pos: usize) -> Result<&'a str, ParseError> {
    std::str::from_utf8(bytes).map_err(|err| ParseError::at(err.to_string(), pos))
}

fn cow_str(raw: Cow<'_, [u8]>, pos: usize) -> Result<Cow<'_, str>, ParseError> {
    match raw {
        Cow::Borrowed(bytes) => Ok(Cow::Borrowed(utf8(bytes, pos)?)),
        Cow::Owned(bytes) => String::from_utf8(bytes)
            .map(Cow::Owned)
            .map_err(|err| ParseError::at(err.to_string(), pos)),
    }
}

/// Splits a processing instruction into target and content.
fn split_pi(raw: &str) -> (&str, &str) {
    match raw.find(|c: char| c.is_ascii_whitespace()) {
        Some(split) => {
            let content = raw[split..].trim_start_matches(|c: char| c.is_ascii_whitespace());
            (&raw[..split], content)
        }
        None => (raw, ""),
    }
}
