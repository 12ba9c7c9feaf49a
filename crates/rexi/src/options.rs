// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The per-stream options record.
//!
//! [`Options`] mirrors the header options document: alignment, fidelity
//! (preserve) flags, strict/fragment/selfContained toggles, the block and
//! partition limits, and the schema identifier. Defaults match the format's
//! final 1.0 values. Setters that could introduce an inconsistent
//! combination validate eagerly and refuse without mutating; [`Options::validate`]
//! is the final gate before header encode and right after header decode.

use std::fmt;
use std::ops::BitOr;

use crate::error::{ExiError, ExiResult, HeaderCode};

/// Alignment of event codes and values in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    /// Events pack tightly with no padding between them.
    #[default]
    BitPacked,
    /// Every event starts on a byte boundary.
    ByteAligned,
    /// Byte alignment arranged for a later compression stage, without the
    /// DEFLATE step itself.
    PreCompression,
}

/// Fidelity options: which XML constructs survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Preserve(u8);

impl Preserve {
    pub const NONE: Preserve = Preserve(0);
    pub const COMMENTS: Preserve = Preserve(0b0_0001);
    pub const PIS: Preserve = Preserve(0b0_0010);
    pub const DTD: Preserve = Preserve(0b0_0100);
    pub const PREFIXES: Preserve = Preserve(0b0_1000);
    pub const LEXICAL_VALUES: Preserve = Preserve(0b1_0000);
    pub const ALL: Preserve = Preserve(0b1_1111);

    pub const fn contains(self, other: Preserve) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Preserve) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: Preserve) -> Preserve {
        Preserve(self.0 | other.0)
    }

    pub fn insert(&mut self, other: Preserve) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Preserve) {
        self.0 &= !other.0;
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Preserve {
        Preserve(bits & Preserve::ALL.0)
    }
}

impl BitOr for Preserve {
    type Output = Preserve;

    fn bitor(self, rhs: Preserve) -> Preserve {
        self.union(rhs)
    }
}

impl fmt::Display for Preserve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (flag, name) in [
            (Preserve::COMMENTS, "comments"),
            (Preserve::PIS, "pis"),
            (Preserve::DTD, "dtd"),
            (Preserve::PREFIXES, "prefixes"),
            (Preserve::LEXICAL_VALUES, "lexicalValues"),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// The schema identifier tri-state carried in the header options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SchemaId {
    /// No schemaId element in the options document.
    #[default]
    Absent,
    /// Present with an empty value.
    Empty,
    /// Present with an identifier.
    Set(Vec<u8>),
    /// Present and explicitly nil.
    Nil,
}

impl SchemaId {
    /// Whether a schemaId element appears in the options document.
    pub fn is_present(&self) -> bool {
        !matches!(self, SchemaId::Absent)
    }
}

/// Sentinel meaning "no limit" for the counted options.
pub const UNBOUNDED: u32 = u32::MAX;

const DEFAULT_BLOCK_SIZE: u32 = 1_000_000;

/// The options record, defaults per the final 1.0 format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub(crate) alignment: Align,
    pub(crate) compression: bool,
    pub(crate) strict: bool,
    pub(crate) fragment: bool,
    pub(crate) self_contained: bool,
    pub(crate) preserve: Preserve,
    pub(crate) block_size: u32,
    pub(crate) value_max_length: u32,
    pub(crate) value_partition_capacity: u32,
    pub(crate) schema_id: SchemaId,
    pub(crate) datatype_representation_map: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            alignment: Align::BitPacked,
            compression: false,
            strict: false,
            fragment: false,
            self_contained: false,
            preserve: Preserve::NONE,
            block_size: DEFAULT_BLOCK_SIZE,
            value_max_length: UNBOUNDED,
            value_partition_capacity: UNBOUNDED,
            schema_id: SchemaId::Absent,
            datatype_representation_map: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    pub fn alignment(&self) -> Align {
        self.alignment
    }

    /// The alignment the body codec actually honors: compression implies
    /// byte alignment even though no alignment element is written.
    pub fn effective_alignment(&self) -> Align {
        if self.compression {
            Align::ByteAligned
        } else {
            self.alignment
        }
    }

    /// Whether the body codec must byte-align before each event.
    pub fn aligned_events(&self) -> bool {
        matches!(self.effective_alignment(), Align::ByteAligned | Align::PreCompression)
    }

    pub fn compression(&self) -> bool {
        self.compression
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn fragment(&self) -> bool {
        self.fragment
    }

    pub fn self_contained(&self) -> bool {
        self.self_contained
    }

    pub fn preserve(&self) -> Preserve {
        self.preserve
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn value_max_length(&self) -> u32 {
        self.value_max_length
    }

    pub fn value_partition_capacity(&self) -> u32 {
        self.value_partition_capacity
    }

    pub fn schema_id(&self) -> &SchemaId {
        &self.schema_id
    }

    pub fn datatype_representation_map(&self) -> bool {
        self.datatype_representation_map
    }

    ////////////////////////////////////////////////////////////////////////
    // Checked setters

    pub fn set_alignment(&mut self, alignment: Align) -> ExiResult<&mut Self> {
        check(alignment, self.compression, self.strict, self.self_contained, self.preserve)?;
        self.alignment = alignment;
        Ok(self)
    }

    pub fn set_compression(&mut self, compression: bool) -> ExiResult<&mut Self> {
        check(self.alignment, compression, self.strict, self.self_contained, self.preserve)?;
        self.compression = compression;
        Ok(self)
    }

    pub fn set_strict(&mut self, strict: bool) -> ExiResult<&mut Self> {
        check(self.alignment, self.compression, strict, self.self_contained, self.preserve)?;
        self.strict = strict;
        Ok(self)
    }

    pub fn set_self_contained(&mut self, self_contained: bool) -> ExiResult<&mut Self> {
        check(self.alignment, self.compression, self.strict, self_contained, self.preserve)?;
        self.self_contained = self_contained;
        Ok(self)
    }

    pub fn set_preserve(&mut self, preserve: Preserve) -> ExiResult<&mut Self> {
        check(self.alignment, self.compression, self.strict, self.self_contained, preserve)?;
        self.preserve = preserve;
        Ok(self)
    }

    ////////////////////////////////////////////////////////////////////////
    // Unconstrained setters

    pub fn set_fragment(&mut self, fragment: bool) -> &mut Self {
        self.fragment = fragment;
        self
    }

    pub fn set_block_size(&mut self, block_size: u32) -> &mut Self {
        self.block_size = block_size;
        self
    }

    pub fn set_value_max_length(&mut self, limit: u32) -> &mut Self {
        self.value_max_length = limit;
        self
    }

    pub fn set_value_partition_capacity(&mut self, limit: u32) -> &mut Self {
        self.value_partition_capacity = limit;
        self
    }

    pub fn set_schema_id(&mut self, schema_id: SchemaId) -> &mut Self {
        self.schema_id = schema_id;
        self
    }

    pub fn set_datatype_representation_map(&mut self, present: bool) -> &mut Self {
        self.datatype_representation_map = present;
        self
    }

    /// Final gate before header encode and immediately after header decode.
    ///
    /// A datatypeRepresentationMap with `Preserve::LEXICAL_VALUES` set (or
    /// on a schema-less stream) has no effect and is not an error.
    pub fn validate(&self) -> ExiResult<()> {
        check(self.alignment, self.compression, self.strict, self.self_contained, self.preserve)?;
        if self.datatype_representation_map && self.preserve.contains(Preserve::LEXICAL_VALUES) {
            log::debug!("[Options] datatypeRepresentationMap ignored with lexicalValues");
        }
        Ok(())
    }
}

/// The closed consistency table over the interacting fields.
fn check(
    alignment: Align,
    compression: bool,
    strict: bool,
    self_contained: bool,
    preserve: Preserve,
) -> ExiResult<()> {
    // The alignment element must not appear alongside compression.
    if compression && alignment != Align::BitPacked {
        return Err(ExiError::mismatch(HeaderCode::MixedAlignment));
    }
    // Only lexicalValues may co-occur with strict.
    if strict {
        let blocked = Preserve::DTD | Preserve::PREFIXES | Preserve::COMMENTS | Preserve::PIS;
        if self_contained || preserve.intersects(blocked) {
            return Err(ExiError::mismatch(HeaderCode::StrictPreserved));
        }
    }
    // selfContained excludes compression and pre-compression.
    if self_contained && (compression || alignment == Align::PreCompression) {
        return Err(ExiError::mismatch(HeaderCode::SelfContained));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_match_final_profile() {
        let opts = Options::default();
        assert_eq!(opts.alignment(), Align::BitPacked);
        assert!(!opts.compression());
        assert!(!opts.strict());
        assert!(!opts.fragment());
        assert!(!opts.self_contained());
        assert!(opts.preserve().is_empty());
        assert_eq!(opts.block_size(), 1_000_000);
        assert_eq!(opts.value_max_length(), UNBOUNDED);
        assert_eq!(opts.value_partition_capacity(), UNBOUNDED);
        assert_eq!(*opts.schema_id(), SchemaId::Absent);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_compression_with_explicit_alignment_is_rejected() {
        let mut opts = Options {
            compression: true,
            alignment: Align::PreCompression,
            ..Options::default()
        };
        let err = opts.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HeaderOptionsMismatch);
        assert_eq!(err.header_code(), Some(HeaderCode::MixedAlignment));

        // The eager setter refuses the same transition without mutating.
        opts = Options::default();
        opts.set_compression(true).expect("Compression alone is valid");
        let err = opts.set_alignment(Align::ByteAligned).unwrap_err();
        assert_eq!(err.header_code(), Some(HeaderCode::MixedAlignment));
        assert_eq!(opts.alignment(), Align::BitPacked);
    }

    #[test]
    fn test_strict_excludes_most_preserve_flags() {
        for flag in [Preserve::COMMENTS, Preserve::PIS, Preserve::DTD, Preserve::PREFIXES] {
            let opts = Options { strict: true, preserve: flag, ..Options::default() };
            let err = opts.validate().unwrap_err();
            assert_eq!(err.header_code(), Some(HeaderCode::StrictPreserved), "{}", flag);
        }

        // lexicalValues is the one fidelity flag allowed with strict.
        let opts = Options {
            strict: true,
            preserve: Preserve::LEXICAL_VALUES,
            ..Options::default()
        };
        assert!(opts.validate().is_ok());

        let opts = Options { strict: true, self_contained: true, ..Options::default() };
        assert_eq!(opts.validate().unwrap_err().header_code(), Some(HeaderCode::StrictPreserved));
    }

    #[test]
    fn test_self_contained_conflicts() {
        let opts = Options { self_contained: true, compression: true, ..Options::default() };
        assert_eq!(opts.validate().unwrap_err().header_code(), Some(HeaderCode::SelfContained));

        let opts = Options {
            self_contained: true,
            alignment: Align::PreCompression,
            ..Options::default()
        };
        assert_eq!(opts.validate().unwrap_err().header_code(), Some(HeaderCode::SelfContained));

        let opts = Options {
            self_contained: true,
            alignment: Align::ByteAligned,
            ..Options::default()
        };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_validation_matrix_is_closed() {
        // Every combination either validates or fails with the exact
        // sub-code of the first violated rule; no other kinds appear.
        let alignments = [Align::BitPacked, Align::ByteAligned, Align::PreCompression];
        let preserves = (0..=Preserve::ALL.bits()).map(Preserve::from_bits);
        for alignment in alignments {
            for compression in [false, true] {
                for strict in [false, true] {
                    for self_contained in [false, true] {
                        for preserve in preserves.clone() {
                            let opts = Options {
                                alignment,
                                compression,
                                strict,
                                self_contained,
                                preserve,
                                ..Options::default()
                            };
                            match opts.validate() {
                                Ok(()) => {
                                    assert!(!(compression && alignment != Align::BitPacked));
                                    assert!(!(strict && self_contained));
                                }
                                Err(err) => {
                                    assert_eq!(err.kind(), ErrorKind::HeaderOptionsMismatch);
                                    let code = err.header_code().expect("Sub-code must be set");
                                    let expect = if compression && alignment != Align::BitPacked {
                                        HeaderCode::MixedAlignment
                                    } else if strict
                                        && (self_contained
                                            || preserve.intersects(
                                                Preserve::DTD
                                                    | Preserve::PREFIXES
                                                    | Preserve::COMMENTS
                                                    | Preserve::PIS,
                                            ))
                                    {
                                        HeaderCode::StrictPreserved
                                    } else {
                                        HeaderCode::SelfContained
                                    };
                                    assert_eq!(code, expect);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_effective_alignment() {
        let mut opts = Options::default();
        assert_eq!(opts.effective_alignment(), Align::BitPacked);
        assert!(!opts.aligned_events());

        opts.set_compression(true).expect("Compression alone is valid");
        assert_eq!(opts.alignment(), Align::BitPacked);
        assert_eq!(opts.effective_alignment(), Align::ByteAligned);
        assert!(opts.aligned_events());
    }

    #[test]
    fn test_preserve_flag_set() {
        let mut flags = Preserve::NONE;
        flags.insert(Preserve::COMMENTS | Preserve::DTD);
        assert!(flags.contains(Preserve::COMMENTS));
        assert!(flags.intersects(Preserve::DTD | Preserve::PIS));
        assert!(!flags.contains(Preserve::COMMENTS | Preserve::PIS));
        flags.remove(Preserve::COMMENTS);
        assert_eq!(flags, Preserve::DTD);
        assert_eq!(format!("{}", Preserve::ALL), "comments+pis+dtd+prefixes+lexicalValues");
    }
}
