// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridges between the event stream and the document tree: the decode side
//! builds a [`Document`] through [`DomBuilder`], the encode side walks one
//! with [`encode_document`].

use crate::error::{ErrorKind, ExiError, ExiResult};
use crate::options::Preserve;
use crate::xml::dom::split_qname;
use crate::xml::{AttrId, Document, NodeId, NodeKind};

use super::event::{EventSink, QName, SinkAction};
use super::writer::Writer;

/// An [`EventSink`] that assembles the decoded events into a document.
///
/// Namespace declarations come back as `xmlns` / `xmlns:prefix`
/// attributes, so a serialized tree carries the same bindings the encoder
/// saw. The wire cannot distinguish a folded element value from a leading
/// text child, so the builder offers both shapes: the default builds text
/// nodes, [`DomBuilder::with_folded_values`] folds an element's leading
/// character data into its value slot the way the data-folding parse mode
/// does, matching what [`encode_document`] emits for such trees.
#[derive(Debug, Default)]
pub struct DomBuilder {
    doc: Document<'static>,
    cursor: Option<NodeId>,
    pending_attr: Option<AttrId>,
    fold_values: bool,
    complete: bool,
}

impl DomBuilder {
    pub fn new() -> Self {
        DomBuilder::default()
    }

    /// A builder that folds leading character data into the enclosing
    /// element's value slot instead of materializing a text node.
    pub fn with_folded_values() -> Self {
        DomBuilder { fold_values: true, ..DomBuilder::default() }
    }

    /// Whether the end-document event has arrived.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn document(&self) -> &Document<'static> {
        &self.doc
    }

    pub fn into_document(self) -> Document<'static> {
        self.doc
    }

    fn cursor(&self) -> NodeId {
        self.cursor.unwrap_or_else(|| self.doc.root())
    }
}

impl EventSink for DomBuilder {
    fn start_document(&mut self) -> SinkAction {
        self.cursor = Some(self.doc.root());
        SinkAction::Continue
    }

    fn end_document(&mut self) -> SinkAction {
        self.complete = true;
        SinkAction::Continue
    }

    fn start_element(&mut self, qname: &QName) -> SinkAction {
        let parent = self.cursor();
        let name = qname.display_name();
        let node = self.doc.alloc_node_with(NodeKind::Element, Some(&name), None);
        self.doc.append_child(parent, node);
        self.cursor = Some(node);
        SinkAction::Continue
    }

    fn end_element(&mut self) -> SinkAction {
        let current = self.cursor();
        self.cursor = Some(self.doc.parent(current).unwrap_or_else(|| self.doc.root()));
        SinkAction::Continue
    }

    fn attribute(&mut self, qname: &QName) -> SinkAction {
        let owner = self.cursor();
        let name = qname.display_name();
        let attr = self.doc.alloc_attr();
        self.doc.set_attr_name(attr, &name);
        self.doc.append_attr(owner, attr);
        self.pending_attr = Some(attr);
        SinkAction::Continue
    }

    fn namespace_declaration(&mut self, uri: &str, prefix: &str, _is_local: bool) -> SinkAction {
        let owner = self.cursor();
        let name = if prefix.is_empty() {
            "xmlns".to_owned()
        } else {
            format!("xmlns:{}", prefix)
        };
        let attr = self.doc.alloc_attr_with(&name, uri);
        self.doc.append_attr(owner, attr);
        SinkAction::Continue
    }

    fn string_data(&mut self, data: &str) -> SinkAction {
        if let Some(attr) = self.pending_attr.take() {
            self.doc.set_attr_value(attr, data);
            return SinkAction::Continue;
        }
        let parent = self.cursor();
        // First content of an element with nothing else in it: the
        // encoder's folding condition, mirrored.
        if self.fold_values
            && parent != self.doc.root()
            && self.doc.kind(parent) == NodeKind::Element
            && !self.doc.has_value(parent)
            && self.doc.first_child(parent).is_none()
        {
            self.doc.set_value(parent, data);
            return SinkAction::Continue;
        }
        let node = self.doc.alloc_node_with(NodeKind::Text, None, Some(data));
        self.doc.append_child(parent, node);
        SinkAction::Continue
    }
}

/// Prefix-to-URI bindings, scoped per element.
#[derive(Debug, Default)]
struct NsScope {
    frames: Vec<usize>,
    bindings: Vec<(String, String)>,
}

impl NsScope {
    fn push(&mut self) {
        self.frames.push(self.bindings.len());
    }

    fn pop(&mut self) {
        let mark = self.frames.pop().unwrap_or(0);
        self.bindings.truncate(mark);
    }

    fn bind(&mut self, prefix: &str, uri: &str) {
        self.bindings.push((prefix.to_owned(), uri.to_owned()));
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Walks a document and emits it as an event stream.
///
/// Comments, processing instructions, DOCTYPE and declaration nodes have
/// no counterpart in the sink alphabet and are skipped; `xmlns` attributes
/// become namespace events ahead of the regular attributes.
pub fn encode_document(writer: &mut Writer<'_>, doc: &Document<'_>) -> ExiResult<()> {
    writer.emit_start_document()?;
    let mut scope = NsScope::default();
    for child in doc.children(doc.root()) {
        if doc.kind(child) == NodeKind::Element {
            encode_element(writer, doc, child, &mut scope)?;
        }
    }
    writer.emit_end_document()
}

fn encode_element(
    writer: &mut Writer<'_>,
    doc: &Document<'_>,
    node: NodeId,
    scope: &mut NsScope,
) -> ExiResult<()> {
    scope.push();
    for attr in doc.attributes(node) {
        let name = doc.attr_name(attr);
        if name == "xmlns" {
            scope.bind("", doc.attr_value(attr));
        } else if let Some(prefix) = name.strip_prefix("xmlns:") {
            scope.bind(prefix, doc.attr_value(attr));
        }
    }

    let element_qname = resolve_qname(writer, doc.name(node), scope, true)?;
    writer.emit_start_element(&element_qname)?;

    for attr in doc.attributes(node) {
        let name = doc.attr_name(attr);
        if name == "xmlns" || name.starts_with("xmlns:") {
            let prefix = name.strip_prefix("xmlns:").unwrap_or("");
            let is_local = prefix == element_qname.prefix.as_deref().unwrap_or("");
            writer.emit_namespace_declaration(doc.attr_value(attr), prefix, is_local)?;
        }
    }
    for attr in doc.attributes(node) {
        let name = doc.attr_name(attr);
        if name == "xmlns" || name.starts_with("xmlns:") {
            continue;
        }
        let qname = resolve_qname(writer, name, scope, false)?;
        writer.emit_attribute(&qname)?;
        writer.emit_string_data(doc.attr_value(attr))?;
    }

    // A value folded into the element slot comes before any child nodes.
    if doc.has_value(node) && !doc.value(node).is_empty() {
        writer.emit_string_data(doc.value(node))?;
    }

    for child in doc.children(node) {
        match doc.kind(child) {
            NodeKind::Element => encode_element(writer, doc, child, scope)?,
            NodeKind::Text | NodeKind::CData => writer.emit_string_data(doc.value(child))?,
            _ => {}
        }
    }

    writer.emit_end_element()?;
    scope.pop();
    Ok(())
}

fn resolve_qname(
    writer: &Writer<'_>,
    name: &str,
    scope: &NsScope,
    use_default_ns: bool,
) -> ExiResult<QName> {
    let (prefix, local) = split_qname(name);
    if !prefix.is_empty() && !writer.options().preserve().contains(Preserve::PREFIXES) {
        log::warn!("[Codec] qualified name {} requires preserved prefixes", name);
        return Err(ExiError::new(ErrorKind::NoPrefixesPreservedXmlSchema));
    }
    // Unprefixed attributes carry no namespace; unprefixed elements take
    // the default binding.
    let uri = if prefix.is_empty() && !use_default_ns {
        ""
    } else {
        scope.lookup(prefix).unwrap_or("")
    };
    let prefix = if prefix.is_empty() { None } else { Some(prefix.to_owned()) };
    Ok(QName { uri: uri.to_owned(), local_name: local.to_owned(), prefix })
}
