// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Index-arena XML document tree.
//!
//! A [`Document`] owns every node and attribute in flat arenas; [`NodeId`]
//! and [`AttrId`] are stable indices into them. Child and attribute lists
//! are doubly linked through sibling indices, giving O(1) insertion and
//! removal without back-pointers or cyclic ownership. Text lives either in
//! the document's string arena or, for documents parsed without copying,
//! as slices of the caller's input buffer (`'buf`).
//!
//! Node 0 is always the document node; it cannot be detached or re-linked.

use super::arena::{StrArena, StrRef};

/// Node kinds the codec distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    CData,
    Comment,
    Declaration,
    Doctype,
    Pi,
}

/// Stable index of a node within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable index of an attribute within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttrId(u32);

impl AttrId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a name or value string lives.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum TextSlice<'buf> {
    #[default]
    Empty,
    Arena(StrRef),
    Input(&'buf str),
}

#[derive(Debug)]
struct NodeData<'buf> {
    kind: NodeKind,
    name: TextSlice<'buf>,
    value: TextSlice<'buf>,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    first_attr: Option<AttrId>,
    last_attr: Option<AttrId>,
}

impl<'buf> NodeData<'buf> {
    fn new(kind: NodeKind) -> Self {
        NodeData {
            kind,
            name: TextSlice::Empty,
            value: TextSlice::Empty,
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
            first_attr: None,
            last_attr: None,
        }
    }
}

#[derive(Debug)]
struct AttrData<'buf> {
    name: TextSlice<'buf>,
    value: TextSlice<'buf>,
    owner: Option<NodeId>,
    prev_attr: Option<AttrId>,
    next_attr: Option<AttrId>,
}

/// An XML document plus the arenas backing it.
#[derive(Debug)]
pub struct Document<'buf> {
    arena: StrArena,
    nodes: Vec<NodeData<'buf>>,
    attrs: Vec<AttrData<'buf>>,
}

impl<'buf> Default for Document<'buf> {
    fn default() -> Self {
        Document::new()
    }
}

impl<'buf> Document<'buf> {
    /// An empty document: just the document node.
    pub fn new() -> Self {
        Document {
            arena: StrArena::new(),
            nodes: vec![NodeData::new(NodeKind::Document)],
            attrs: Vec::new(),
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn attr_count(&self) -> usize {
        self.attrs.len()
    }

    ////////////////////////////////////////////////////////////////////////
    // Allocation

    /// Allocates an unlinked node.
    pub fn alloc_node(&mut self, kind: NodeKind) -> NodeId {
        debug_assert!(kind != NodeKind::Document, "only node 0 is the document");
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind));
        id
    }

    /// Allocates a node and interns its name and value in one go.
    pub fn alloc_node_with(
        &mut self,
        kind: NodeKind,
        name: Option<&str>,
        value: Option<&str>,
    ) -> NodeId {
        let id = self.alloc_node(kind);
        if let Some(name) = name {
            self.set_name(id, name);
        }
        if let Some(value) = value {
            self.set_value(id, value);
        }
        id
    }

    /// Allocates an unlinked attribute.
    pub fn alloc_attr(&mut self) -> AttrId {
        let id = AttrId(self.attrs.len() as u32);
        self.attrs.push(AttrData {
            name: TextSlice::Empty,
            value: TextSlice::Empty,
            owner: None,
            prev_attr: None,
            next_attr: None,
        });
        id
    }

    /// Allocates an attribute and interns its name and value.
    pub fn alloc_attr_with(&mut self, name: &str, value: &str) -> AttrId {
        let id = self.alloc_attr();
        self.set_attr_name(id, name);
        self.set_attr_value(id, value);
        id
    }

    ////////////////////////////////////////////////////////////////////////
    // Text access

    fn resolve(&self, text: TextSlice<'buf>) -> &str {
        match text {
            TextSlice::Empty => "",
            TextSlice::Arena(handle) => self.arena.resolve(handle),
            TextSlice::Input(slice) => slice,
        }
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.index()].kind
    }

    pub fn name(&self, node: NodeId) -> &str {
        self.resolve(self.nodes[node.index()].name)
    }

    pub fn value(&self, node: NodeId) -> &str {
        self.resolve(self.nodes[node.index()].value)
    }

    pub fn attr_name(&self, attr: AttrId) -> &str {
        self.resolve(self.attrs[attr.index()].name)
    }

    pub fn attr_value(&self, attr: AttrId) -> &str {
        self.resolve(self.attrs[attr.index()].value)
    }

    /// The part of the name before the first `:`, empty when there is none.
    pub fn prefix(&self, node: NodeId) -> &str {
        split_qname(self.name(node)).0
    }

    /// The part of the name after the first `:`, the whole name otherwise.
    pub fn local_name(&self, node: NodeId) -> &str {
        split_qname(self.name(node)).1
    }

    pub fn set_name(&mut self, node: NodeId, name: &str) {
        self.nodes[node.index()].name = TextSlice::Arena(self.arena.intern(name));
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        self.nodes[node.index()].value = TextSlice::Arena(self.arena.intern(value));
    }

    pub fn set_attr_name(&mut self, attr: AttrId, name: &str) {
        self.attrs[attr.index()].name = TextSlice::Arena(self.arena.intern(name));
    }

    pub fn set_attr_value(&mut self, attr: AttrId, value: &str) {
        self.attrs[attr.index()].value = TextSlice::Arena(self.arena.intern(value));
    }

    pub(crate) fn set_name_slice(&mut self, node: NodeId, text: TextSlice<'buf>) {
        self.nodes[node.index()].name = text;
    }

    pub(crate) fn set_value_slice(&mut self, node: NodeId, text: TextSlice<'buf>) {
        self.nodes[node.index()].value = text;
    }

    /// Whether the node's value slot holds anything (even an empty string).
    pub fn has_value(&self, node: NodeId) -> bool {
        !matches!(self.nodes[node.index()].value, TextSlice::Empty)
    }

    ////////////////////////////////////////////////////////////////////////
    // Navigation

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].first_child
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].last_child
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].next_sibling
    }

    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].prev_sibling
    }

    pub fn first_attr(&self, node: NodeId) -> Option<AttrId> {
        self.nodes[node.index()].first_attr
    }

    pub fn last_attr(&self, node: NodeId) -> Option<AttrId> {
        self.nodes[node.index()].last_attr
    }

    pub fn next_attr(&self, attr: AttrId) -> Option<AttrId> {
        self.attrs[attr.index()].next_attr
    }

    pub fn prev_attr(&self, attr: AttrId) -> Option<AttrId> {
        self.attrs[attr.index()].prev_attr
    }

    pub fn attr_owner(&self, attr: AttrId) -> Option<NodeId> {
        self.attrs[attr.index()].owner
    }

    /// Iterates the children of `node` in document order.
    pub fn children(&self, node: NodeId) -> Children<'_, 'buf> {
        Children { doc: self, cursor: self.first_child(node) }
    }

    /// Iterates the attributes of `node` in stored order.
    pub fn attributes(&self, node: NodeId) -> Attributes<'_, 'buf> {
        Attributes { doc: self, cursor: self.first_attr(node) }
    }

    /// First child with a matching name (case sensitive).
    pub fn child_by_name(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.children(node).find(|&child| self.name(child) == name)
    }

    /// First attribute with a matching name (linear scan; lists are short).
    pub fn attr_by_name(&self, node: NodeId, name: &str) -> Option<AttrId> {
        self.attributes(node).find(|&attr| self.attr_name(attr) == name)
    }

    ////////////////////////////////////////////////////////////////////////
    // Child list surgery

    /// Appends an unlinked node at the end of `parent`'s child list.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.index()].parent.is_none(), "node already linked");
        debug_assert!(child != self.root(), "the document node cannot be linked");

        let prev = self.nodes[parent.index()].last_child;
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[child.index()].prev_sibling = prev;
        self.nodes[child.index()].next_sibling = None;
        match prev {
            Some(prev) => self.nodes[prev.index()].next_sibling = Some(child),
            None => self.nodes[parent.index()].first_child = Some(child),
        }
        self.nodes[parent.index()].last_child = Some(child);
    }

    /// Prepends an unlinked node at the front of `parent`'s child list.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.index()].parent.is_none(), "node already linked");
        debug_assert!(child != self.root(), "the document node cannot be linked");

        let next = self.nodes[parent.index()].first_child;
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[child.index()].prev_sibling = None;
        self.nodes[child.index()].next_sibling = next;
        match next {
            Some(next) => self.nodes[next.index()].prev_sibling = Some(child),
            None => self.nodes[parent.index()].last_child = Some(child),
        }
        self.nodes[parent.index()].first_child = Some(child);
    }

    /// Inserts an unlinked node immediately before a linked sibling.
    pub fn insert_child_before(&mut self, before: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.index()].parent.is_none(), "node already linked");
        debug_assert!(self.nodes[before.index()].parent.is_some(), "sibling must be linked");
        let Some(parent) = self.nodes[before.index()].parent else {
            return;
        };

        let prev = self.nodes[before.index()].prev_sibling;
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[child.index()].prev_sibling = prev;
        self.nodes[child.index()].next_sibling = Some(before);
        self.nodes[before.index()].prev_sibling = Some(child);
        match prev {
            Some(prev) => self.nodes[prev.index()].next_sibling = Some(child),
            None => self.nodes[parent.index()].first_child = Some(child),
        }
    }

    /// Detaches a node from its parent. The node itself stays allocated and
    /// keeps its own children and attributes.
    pub fn remove_child(&mut self, child: NodeId) {
        let Some(parent) = self.nodes[child.index()].parent else {
            return;
        };
        let prev = self.nodes[child.index()].prev_sibling;
        let next = self.nodes[child.index()].next_sibling;
        match prev {
            Some(prev) => self.nodes[prev.index()].next_sibling = next,
            None => self.nodes[parent.index()].first_child = next,
        }
        match next {
            Some(next) => self.nodes[next.index()].prev_sibling = prev,
            None => self.nodes[parent.index()].last_child = prev,
        }
        self.nodes[child.index()].parent = None;
        self.nodes[child.index()].prev_sibling = None;
        self.nodes[child.index()].next_sibling = None;
    }

    /// Detaches every child of `parent`.
    pub fn remove_all_children(&mut self, parent: NodeId) {
        let mut cursor = self.nodes[parent.index()].first_child;
        while let Some(child) = cursor {
            cursor = self.nodes[child.index()].next_sibling;
            self.nodes[child.index()].parent = None;
            self.nodes[child.index()].prev_sibling = None;
            self.nodes[child.index()].next_sibling = None;
        }
        self.nodes[parent.index()].first_child = None;
        self.nodes[parent.index()].last_child = None;
    }

    ////////////////////////////////////////////////////////////////////////
    // Attribute list surgery

    /// Appends an unlinked attribute at the end of `node`'s list.
    pub fn append_attr(&mut self, node: NodeId, attr: AttrId) {
        debug_assert!(self.attrs[attr.index()].owner.is_none(), "attribute already linked");

        let prev = self.nodes[node.index()].last_attr;
        self.attrs[attr.index()].owner = Some(node);
        self.attrs[attr.index()].prev_attr = prev;
        self.attrs[attr.index()].next_attr = None;
        match prev {
            Some(prev) => self.attrs[prev.index()].next_attr = Some(attr),
            None => self.nodes[node.index()].first_attr = Some(attr),
        }
        self.nodes[node.index()].last_attr = Some(attr);
    }

    /// Prepends an unlinked attribute at the front of `node`'s list.
    pub fn prepend_attr(&mut self, node: NodeId, attr: AttrId) {
        debug_assert!(self.attrs[attr.index()].owner.is_none(), "attribute already linked");

        let next = self.nodes[node.index()].first_attr;
        self.attrs[attr.index()].owner = Some(node);
        self.attrs[attr.index()].prev_attr = None;
        self.attrs[attr.index()].next_attr = next;
        match next {
            Some(next) => self.attrs[next.index()].prev_attr = Some(attr),
            None => self.nodes[node.index()].last_attr = Some(attr),
        }
        self.nodes[node.index()].first_attr = Some(attr);
    }

    /// Detaches an attribute from its owner.
    pub fn remove_attr(&mut self, attr: AttrId) {
        let Some(owner) = self.attrs[attr.index()].owner else {
            return;
        };
        let prev = self.attrs[attr.index()].prev_attr;
        let next = self.attrs[attr.index()].next_attr;
        match prev {
            Some(prev) => self.attrs[prev.index()].next_attr = next,
            None => self.nodes[owner.index()].first_attr = next,
        }
        match next {
            Some(next) => self.attrs[next.index()].prev_attr = prev,
            None => self.nodes[owner.index()].last_attr = prev,
        }
        self.attrs[attr.index()].owner = None;
        self.attrs[attr.index()].prev_attr = None;
        self.attrs[attr.index()].next_attr = None;
    }

    /// Detaches every attribute of `node`.
    pub fn remove_all_attrs(&mut self, node: NodeId) {
        let mut cursor = self.nodes[node.index()].first_attr;
        while let Some(attr) = cursor {
            cursor = self.attrs[attr.index()].next_attr;
            self.attrs[attr.index()].owner = None;
            self.attrs[attr.index()].prev_attr = None;
            self.attrs[attr.index()].next_attr = None;
        }
        self.nodes[node.index()].first_attr = None;
        self.nodes[node.index()].last_attr = None;
    }

    ////////////////////////////////////////////////////////////////////////
    // Cloning

    /// Deep-copies a subtree within this document. Text handles are shared
    /// with the source; only the tree shape is new. Returns the unlinked
    /// copy of `src`.
    pub fn clone_subtree(&mut self, src: NodeId) -> NodeId {
        debug_assert!(src != self.root(), "clone children of the document node instead");
        let data = &self.nodes[src.index()];
        let (kind, name, value) = (data.kind, data.name, data.value);
        let dst = self.alloc_node(kind);
        self.nodes[dst.index()].name = name;
        self.nodes[dst.index()].value = value;

        let mut attr = self.nodes[src.index()].first_attr;
        while let Some(src_attr) = attr {
            let (attr_name, attr_value, next) = {
                let data = &self.attrs[src_attr.index()];
                (data.name, data.value, data.next_attr)
            };
            let copy = self.alloc_attr();
            self.attrs[copy.index()].name = attr_name;
            self.attrs[copy.index()].value = attr_value;
            self.append_attr(dst, copy);
            attr = next;
        }

        let mut child = self.nodes[src.index()].first_child;
        while let Some(src_child) = child {
            let next = self.nodes[src_child.index()].next_sibling;
            let copy = self.clone_subtree(src_child);
            self.append_child(dst, copy);
            child = next;
        }
        dst
    }

    /// Deep-copies a subtree from another document. Text is re-interned
    /// into this document's arena. Returns the unlinked copy of `src`.
    pub fn clone_subtree_from(&mut self, other: &Document<'_>, src: NodeId) -> NodeId {
        let dst = self.alloc_node(other.kind(src));
        self.set_name(dst, other.name(src));
        if other.has_value(src) {
            self.set_value(dst, other.value(src));
        }

        for src_attr in other.attributes(src) {
            let copy = self.alloc_attr_with(other.attr_name(src_attr), other.attr_value(src_attr));
            self.append_attr(dst, copy);
        }
        for src_child in other.children(src) {
            let copy = self.clone_subtree_from(other, src_child);
            self.append_child(dst, copy);
        }
        dst
    }

    /// Access to the backing string arena.
    pub fn arena(&self) -> &StrArena {
        &self.arena
    }
}

/// The part before and after the first `:` of a qualified name.
pub fn split_qname(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}

/// Child iterator in document order.
pub struct Children<'d, 'buf> {
    doc: &'d Document<'buf>,
    cursor: Option<NodeId>,
}

impl<'d, 'buf> Iterator for Children<'d, 'buf> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.cursor?;
        self.cursor = self.doc.next_sibling(current);
        Some(current)
    }
}

/// Attribute iterator in stored order.
pub struct Attributes<'d, 'buf> {
    doc: &'d Document<'buf>,
    cursor: Option<AttrId>,
}

impl<'d, 'buf> Iterator for Attributes<'d, 'buf> {
    type Item = AttrId;

    fn next(&mut self) -> Option<AttrId> {
        let current = self.cursor?;
        self.cursor = self.doc.next_attr(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walks the child list both ways and checks every invariant the list
    /// promises.
    fn assert_child_list_consistent(doc: &Document, parent: NodeId) {
        let forward: Vec<NodeId> = doc.children(parent).collect();
        assert_eq!(doc.first_child(parent).is_some(), doc.last_child(parent).is_some());

        for pair in forward.windows(2) {
            assert_eq!(doc.next_sibling(pair[0]), Some(pair[1]));
            assert_eq!(doc.prev_sibling(pair[1]), Some(pair[0]));
        }
        for &child in &forward {
            assert_eq!(doc.parent(child), Some(parent));
        }
        match forward.as_slice() {
            [] => {
                assert_eq!(doc.first_child(parent), None);
                assert_eq!(doc.last_child(parent), None);
            }
            [first, rest @ ..] => {
                let last = rest.last().unwrap_or(first);
                assert_eq!(doc.first_child(parent), Some(*first));
                assert_eq!(doc.last_child(parent), Some(*last));
                assert_eq!(doc.prev_sibling(*first), None);
                assert_eq!(doc.next_sibling(*last), None);
            }
        }
    }

    fn element(doc: &mut Document, name: &str) -> NodeId {
        doc.alloc_node_with(NodeKind::Element, Some(name), None)
    }

    #[test]
    fn test_append_prepend_insert_remove() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let c = element(&mut doc, "c");
        let d = element(&mut doc, "d");

        doc.append_child(root, b);
        doc.prepend_child(root, a);
        doc.append_child(root, d);
        doc.insert_child_before(d, c);
        assert_child_list_consistent(&doc, root);
        let names: Vec<&str> = doc.children(root).map(|n| doc.name(n)).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);

        doc.remove_child(b);
        assert_child_list_consistent(&doc, root);
        doc.remove_child(a);
        doc.remove_child(d);
        assert_child_list_consistent(&doc, root);
        let names: Vec<&str> = doc.children(root).map(|n| doc.name(n)).collect();
        assert_eq!(names, ["c"]);

        doc.remove_child(c);
        assert_child_list_consistent(&doc, root);
        assert_eq!(doc.children(root).count(), 0);
    }

    #[test]
    fn test_removed_node_can_be_relinked() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        doc.append_child(root, a);
        doc.append_child(root, b);

        doc.remove_child(a);
        doc.append_child(b, a);
        assert_child_list_consistent(&doc, root);
        assert_child_list_consistent(&doc, b);
        assert_eq!(doc.parent(a), Some(b));
    }

    #[test]
    fn test_remove_all_children() {
        let mut doc = Document::new();
        let root = doc.root();
        let kids: Vec<NodeId> = (0..5).map(|i| element(&mut doc, &format!("k{}", i))).collect();
        for &kid in &kids {
            doc.append_child(root, kid);
        }
        doc.remove_all_children(root);
        assert_child_list_consistent(&doc, root);
        for &kid in &kids {
            assert_eq!(doc.parent(kid), None);
            assert_eq!(doc.next_sibling(kid), None);
        }
    }

    #[test]
    fn test_attribute_list() {
        let mut doc = Document::new();
        let root = doc.root();
        let node = element(&mut doc, "n");
        doc.append_child(root, node);

        let x = doc.alloc_attr_with("x", "1");
        let y = doc.alloc_attr_with("y", "2");
        let z = doc.alloc_attr_with("z", "3");
        doc.append_attr(node, x);
        doc.append_attr(node, y);
        doc.append_attr(node, z);

        let names: Vec<&str> = doc.attributes(node).map(|a| doc.attr_name(a)).collect();
        assert_eq!(names, ["x", "y", "z"]);
        assert_eq!(doc.attr_by_name(node, "y"), Some(y));
        assert_eq!(doc.attr_value(y), "2");
        assert_eq!(doc.attr_by_name(node, "w"), None);

        doc.remove_attr(y);
        let names: Vec<&str> = doc.attributes(node).map(|a| doc.attr_name(a)).collect();
        assert_eq!(names, ["x", "z"]);
        assert_eq!(doc.next_attr(x), Some(z));
        assert_eq!(doc.prev_attr(z), Some(x));

        doc.remove_attr(x);
        doc.remove_attr(z);
        assert_eq!(doc.first_attr(node), None);
        assert_eq!(doc.last_attr(node), None);
    }

    #[test]
    fn test_prepend_and_clear_attributes() {
        let mut doc = Document::new();
        let node = element(&mut doc, "n");
        let b = doc.alloc_attr_with("b", "2");
        let a = doc.alloc_attr_with("a", "1");
        doc.append_attr(node, b);
        doc.prepend_attr(node, a);
        let names: Vec<&str> = doc.attributes(node).map(|at| doc.attr_name(at)).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(doc.prev_attr(b), Some(a));

        doc.remove_all_attrs(node);
        assert_eq!(doc.first_attr(node), None);
        assert_eq!(doc.last_attr(node), None);
        assert_eq!(doc.attr_owner(a), None);
        assert_eq!(doc.attr_owner(b), None);
    }

    #[test]
    fn test_qname_split() {
        let mut doc = Document::new();
        let plain = element(&mut doc, "local");
        let qualified = element(&mut doc, "ns:local");
        assert_eq!(doc.prefix(plain), "");
        assert_eq!(doc.local_name(plain), "local");
        assert_eq!(doc.prefix(qualified), "ns");
        assert_eq!(doc.local_name(qualified), "local");
    }

    #[test]
    fn test_child_by_name() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        doc.append_child(root, a);
        doc.append_child(root, b);
        assert_eq!(doc.child_by_name(root, "b"), Some(b));
        assert_eq!(doc.child_by_name(root, "B"), None, "lookup is case sensitive");
    }

    #[test]
    fn test_clone_subtree_shares_text() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = element(&mut doc, "a");
        doc.set_value(a, "payload");
        let attr = doc.alloc_attr_with("k", "v");
        doc.append_attr(a, attr);
        let b = element(&mut doc, "b");
        doc.append_child(a, b);
        doc.append_child(root, a);

        let before = doc.arena().used_bytes();
        let copy = doc.clone_subtree(a);
        assert_eq!(doc.arena().used_bytes(), before, "clone shares characters");
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.name(copy), "a");
        assert_eq!(doc.value(copy), "payload");
        let copied_attr = doc.first_attr(copy).expect("attribute should be copied");
        assert_eq!(doc.attr_name(copied_attr), "k");
        let copied_child = doc.first_child(copy).expect("child should be copied");
        assert_eq!(doc.name(copied_child), "b");
        assert_ne!(copied_child, b);
    }

    #[test]
    fn test_clone_subtree_from_other_document() {
        let mut src = Document::new();
        let root = src.root();
        let a = element(&mut src, "a");
        src.set_value(a, "text");
        let attr = src.alloc_attr_with("x", "1");
        src.append_attr(a, attr);
        src.append_child(root, a);

        let mut dst = Document::new();
        let copy = dst.clone_subtree_from(&src, a);
        let dst_root = dst.root();
        dst.append_child(dst_root, copy);
        assert_eq!(dst.name(copy), "a");
        assert_eq!(dst.value(copy), "text");
        let copied_attr = dst.first_attr(copy).expect("attribute should be copied");
        assert_eq!(dst.attr_value(copied_attr), "1");
    }
}
