// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec facade: the parser/writer handles that thread a bit stream, the
//! options record and a SAX-shaped event surface together.
//!
//! The decode side is [`Parser`] driving an [`EventSink`]; the encode side
//! is [`Writer`] with the mirroring `emit_*` calls. [`DomBuilder`] and
//! [`encode_document`] connect both sides to the document tree, which is
//! enough to round-trip a header plus a schema-less event stream.

pub mod dom;
pub mod event;
pub mod parser;
pub mod writer;

pub use dom::{encode_document, DomBuilder};
pub use event::{EventSink, QName, SinkAction};
pub use parser::{ParseStep, Parser, Schema};
pub use writer::Writer;
