// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Arena-backed XML document model.
//!
//! The codec's XML surface: the encoder walks a [`Document`], the decoder
//! builds one. Nodes and attributes live in flat index arenas owned by the
//! document (see [`dom`]); interned text lives in a bump [`arena`]. The
//! [`parse`] module turns XML text into a document, [`write`] turns a
//! document back into canonical XML text, and [`compare`] checks two trees
//! for structural equality.

pub mod arena;
pub mod compare;
pub mod dom;
pub mod parse;
pub mod write;

pub use arena::{StrArena, StrRef};
pub use compare::{documents_eq, structural_eq};
pub use dom::{split_qname, AttrId, Attributes, Children, Document, NodeId, NodeKind};
pub use parse::{parse_str, ParseError, ParseOptions};
pub use write::{node_to_xml_string, to_xml_string};
