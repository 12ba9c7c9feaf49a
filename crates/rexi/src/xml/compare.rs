// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural equality over document trees: same kinds, names, values and
//! attribute sequences, in order. Attribute order is significant; no
//! schema-aware reordering happens here.

use super::dom::{Document, NodeId};

/// Whether two whole documents are structurally equal.
pub fn documents_eq(a: &Document, b: &Document) -> bool {
    structural_eq(a, a.root(), b, b.root())
}

/// Whether two subtrees are structurally equal.
pub fn structural_eq(a: &Document, a_node: NodeId, b: &Document, b_node: NodeId) -> bool {
    if a.kind(a_node) != b.kind(b_node)
        || a.name(a_node) != b.name(b_node)
        || a.value(a_node) != b.value(b_node)
    {
        return false;
    }

    let mut a_attrs = a.attributes(a_node);
    let mut b_attrs = b.attributes(b_node);
    loop {
        match (a_attrs.next(), b_attrs.next()) {
            (None, None) => break,
            (Some(x), Some(y)) => {
                if a.attr_name(x) != b.attr_name(y) || a.attr_value(x) != b.attr_value(y) {
                    return false;
                }
            }
            _ => return false,
        }
    }

    let mut a_kids = a.children(a_node);
    let mut b_kids = b.children(b_node);
    loop {
        match (a_kids.next(), b_kids.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if !structural_eq(a, x, b, y) {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
