// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rexi - Efficient XML Interchange codec core
//!
//! A pure Rust implementation of the EXI binary XML format's core layers:
//! the bit-level stream, the header codec with its options document, and
//! the arena-backed document tree the codec reads from and writes into.
//!
//! ## Quick Start
//!
//! ```rust
//! use rexi::{encode_document, parse_str, DomBuilder, ParseOptions, Parser, Writer};
//!
//! fn main() -> rexi::ExiResult<()> {
//!     let doc = parse_str(r#"<a x="1"><b/>text</a>"#, &ParseOptions::default())
//!         .expect("well-formed input");
//!
//!     // Encode: document -> bytes.
//!     let mut buf = vec![0u8; 1024];
//!     let mut writer = Writer::new(&mut buf);
//!     writer.write_header(true, true)?;
//!     encode_document(&mut writer, &doc)?;
//!     let bytes = writer.finalize()?.to_vec();
//!
//!     // Decode: bytes -> document.
//!     let mut parser = Parser::new(DomBuilder::new(), &bytes);
//!     parser.parse_header(false)?;
//!     parser.parse_all()?;
//!     let decoded = parser.into_sink().into_document();
//!     assert_eq!(decoded.children(decoded.root()).count(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------------+
//! |                          Codec Facade                             |
//! |     Parser -> EventSink callbacks | Writer <- emit_* calls        |
//! +-------------------------------------------------------------------+
//! |                      Header & Options Layer                       |
//! |   cookie / distinguishing bits / version | options document       |
//! +-------------------------------------------------------------------+
//! |                        Typed Integer Layer                        |
//! |   fixed-width N-bit ints | LEB128 varints | APInt wide values     |
//! +-------------------------------------------------------------------+
//! |                         Bit Stream Layer                          |
//! |   BitReader / BitWriter over byte slices, bit-exact cursor        |
//! +-------------------------------------------------------------------+
//! ```
//!
//! The XML side ([`xml`]) is the surface both ends share: the encoder
//! walks a [`Document`], the decoder produces one through [`DomBuilder`].
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BitReader`] / [`BitWriter`] | Sub-byte reads and writes over a buffer |
//! | [`ExiError`] | Fixed-shape error value carried by every operation |
//! | [`Options`] | Per-stream settings with the format's validation table |
//! | [`Parser`] / [`Writer`] | Decode/encode handles over the event stream |
//! | [`Document`] | Index-arena XML tree with pooled or borrowed text |
//!
//! Out of scope here, by design: string-table partitions, schema-informed
//! grammars beyond the built-in header-options grammar, and DEFLATE
//! post-processing.

/// Arbitrary-precision unsigned integers with explicit bit widths.
pub mod apint;
/// Codec facade (Parser, Writer, event sinks, DOM bridges).
pub mod codec;
/// Error kinds and the fixed-shape error value.
pub mod error;
/// Header codec: cookie, distinguishing bits, version, options document.
pub mod header;
/// Fixed-width n-bit integer wrappers.
pub mod nbit;
/// The per-stream options record and its validation table.
pub mod options;
/// Bit-level stream layer.
pub mod stream;
/// Arena-backed XML document model.
pub mod xml;

pub use apint::ApInt;
pub use codec::{encode_document, DomBuilder, EventSink, ParseStep, Parser, QName, Schema, SinkAction, Writer};
pub use error::{ErrorKind, ExiError, ExiResult, HeaderCode};
pub use header::{decode_header, encode_header, COOKIE};
pub use nbit::{IBits, UBits};
pub use options::{Align, Options, Preserve, SchemaId, UNBOUNDED};
pub use stream::{BitReader, BitWriter};
pub use xml::{
    documents_eq, node_to_xml_string, parse_str, structural_eq, to_xml_string, Document,
    NodeId, NodeKind, ParseError, ParseOptions,
};
