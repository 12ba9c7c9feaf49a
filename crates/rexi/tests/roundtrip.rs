// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Document-level round trips: XML text -> DOM -> EXI bytes -> DOM, with
// structural comparison against the source tree, plus randomized document
// shapes and the serialize/re-parse loop.

use rexi::{
    documents_eq, encode_document, parse_str, structural_eq, to_xml_string, Align, DomBuilder,
    Document, NodeKind, Options, ParseOptions, Parser, Writer,
};

/// XML -> DOM -> bytes -> DOM.
fn exi_round_trip(doc: &Document, options: Options) -> Document<'static> {
    let mut buf = vec![0u8; 1 << 16];
    let mut writer = Writer::with_options(&mut buf, options);
    writer.write_header(true, true).expect("Header should encode");
    encode_document(&mut writer, doc).expect("Document should encode");
    let bytes = writer.finalize().expect("Finalize should succeed").to_vec();

    let mut parser = Parser::new(DomBuilder::new(), &bytes);
    parser.parse_header(false).expect("Header should decode");
    parser.parse_all().expect("Body should decode");
    let builder = parser.into_sink();
    assert!(builder.is_complete(), "end-document must arrive");
    builder.into_document()
}

#[test]
fn test_serialize_reparse_identity() {
    let input = r#"<a x="1"><b/>text</a>"#;
    let doc = parse_str(input, &ParseOptions::default()).expect("Document should parse");
    let serialized = to_xml_string(&doc);
    assert_eq!(serialized, input);

    let reparsed = parse_str(&serialized, &ParseOptions::default())
        .expect("Serialized form should parse");
    assert!(documents_eq(&doc, &reparsed));
}

#[test]
fn test_exi_round_trip_small_document() {
    let doc = parse_str(r#"<a x="1"><b/>text</a>"#, &ParseOptions::default())
        .expect("Document should parse");
    for options in [Options::default(), byte_aligned(), pre_compression()] {
        let decoded = exi_round_trip(&doc, options);
        assert!(documents_eq(&doc, &decoded), "{}", to_xml_string(&decoded));
    }
}

#[test]
fn test_exi_round_trip_values_with_specials() {
    let input = "<m note=\"a&amp;b &lt;c&gt;\">line one&#10;line &quot;two\"</m>";
    let doc = parse_str(input, &ParseOptions::default()).expect("Document should parse");
    let decoded = exi_round_trip(&doc, Options::default());
    assert!(documents_eq(&doc, &decoded), "{}", to_xml_string(&decoded));
}

#[test]
fn test_exi_round_trip_deep_nesting() {
    let mut input = String::new();
    for i in 0..40 {
        input.push_str(&format!("<n{}>", i));
    }
    input.push_str("leaf");
    for i in (0..40).rev() {
        input.push_str(&format!("</n{}>", i));
    }
    let doc = parse_str(&input, &ParseOptions::default()).expect("Document should parse");
    let decoded = exi_round_trip(&doc, Options::default());
    assert!(documents_eq(&doc, &decoded));
}

#[test]
fn test_exi_round_trip_random_documents() {
    fastrand::seed(0x5EED);
    for round in 0..32 {
        let doc = random_document();
        let options = if fastrand::bool() { Options::default() } else { byte_aligned() };
        let decoded = exi_round_trip(&doc, options);
        assert!(
            documents_eq(&doc, &decoded),
            "round {}: {} != {}",
            round,
            to_xml_string(&doc),
            to_xml_string(&decoded)
        );
    }
}

#[test]
fn test_subtree_comparison_is_positional() {
    let a = parse_str("<r><x/><y/></r>", &ParseOptions::default()).expect("parse");
    let b = parse_str("<r><y/><x/></r>", &ParseOptions::default()).expect("parse");
    let a_root = a.first_child(a.root()).expect("root element");
    let b_root = b.first_child(b.root()).expect("root element");
    assert!(!structural_eq(&a, a_root, &b, b_root));
}

fn byte_aligned() -> Options {
    let mut options = Options::default();
    options.set_alignment(Align::ByteAligned).expect("Valid transition");
    options
}

fn pre_compression() -> Options {
    let mut options = Options::default();
    options.set_alignment(Align::PreCompression).expect("Valid transition");
    options
}

/// A small random tree of elements, attributes and text, built directly on
/// the DOM API.
fn random_document() -> Document<'static> {
    let mut doc = Document::new();
    let root = doc.root();
    let top = doc.alloc_node_with(NodeKind::Element, Some("root"), None);
    doc.append_child(root, top);
    grow(&mut doc, top, 0);
    doc
}

fn grow(doc: &mut Document<'static>, parent: rexi::NodeId, depth: u32) {
    for _ in 0..fastrand::usize(0..4) {
        let attr_name = format!("a{}", fastrand::u8(0..8));
        if doc.attr_by_name(parent, &attr_name).is_none() {
            let attr = doc.alloc_attr_with(&attr_name, &random_text());
            doc.append_attr(parent, attr);
        }
    }
    let children = if depth >= 3 { 0 } else { fastrand::usize(0..4) };
    for _ in 0..children {
        if fastrand::u8(0..4) == 0 {
            let text = doc.alloc_node_with(NodeKind::Text, None, Some(&random_text()));
            doc.append_child(parent, text);
        } else {
            let name = format!("e{}", fastrand::u8(0..16));
            let node = doc.alloc_node_with(NodeKind::Element, Some(&name), None);
            doc.append_child(parent, node);
            grow(doc, node, depth + 1);
        }
    }
}

fn random_text() -> String {
    const ALPHABET: &[char] = &[
        'a', 'b', 'c', 'x', 'y', 'z', '0', '7', ' ', '&', '<', '>', '"', '\u{e9}', '\u{4e16}',
    ];
    (0..fastrand::usize(0..12))
        .map(|_| ALPHABET[fastrand::usize(0..ALPHABET.len())])
        .collect()
}
