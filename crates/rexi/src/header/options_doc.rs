// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The options document: a tiny body encoded with the fixed built-in
//! header-options grammar.
//!
//! Schema structure (strict schema-informed coding, always bit-packed):
//!
//! ```text
//! header      := (lesscommon?, common?, strict?)
//! lesscommon  := (uncommon?, preserve?, blockSize?)
//! uncommon    := (alignment?, selfContained?, valueMaxLength?,
//!                 valuePartitionCapacity?, datatypeRepresentationMap*)
//! alignment   := (byte | pre-compress)
//! preserve    := (dtd?, prefixes?, lexicalValues?, comments?, pis?)
//! common      := (compression?, fragment?, schemaId?)
//! ```
//!
//! Each sequence state carries an event code of `ceil(log2(n))` bits over
//! its live productions (remaining particles plus the end of the element).
//! Leaf counters are LEB-coded, schemaId is a length-prefixed byte string
//! with a 1-bit xsi:nil branch for the nil tri-state. The single-production
//! document events (SD, SE(header), ED) cost no bits; after the end of the
//! document the stream aligns up to the next byte boundary.

use crate::error::{ErrorKind, ExiError, ExiResult, HeaderCode};
use crate::options::{Align, Options, Preserve, SchemaId, UNBOUNDED};
use crate::stream::{BitReader, BitWriter};

const DEFAULT_BLOCK_SIZE: u32 = 1_000_000;

// Particle indices per sequence grammar.
const HDR_LESSCOMMON: u32 = 0;
const HDR_COMMON: u32 = 1;
const HDR_STRICT: u32 = 2;
const HDR_TOTAL: u32 = 3;

const LC_UNCOMMON: u32 = 0;
const LC_PRESERVE: u32 = 1;
const LC_BLOCK_SIZE: u32 = 2;
const LC_TOTAL: u32 = 3;

const UC_ALIGNMENT: u32 = 0;
const UC_SELF_CONTAINED: u32 = 1;
const UC_VALUE_MAX_LENGTH: u32 = 2;
const UC_VALUE_PARTITION: u32 = 3;
const UC_DTR_MAP: u32 = 4;
const UC_TOTAL: u32 = 5;

const PV_DTD: u32 = 0;
const PV_PREFIXES: u32 = 1;
const PV_LEXICAL: u32 = 2;
const PV_COMMENTS: u32 = 3;
const PV_PIS: u32 = 4;
const PV_TOTAL: u32 = 5;

const CM_COMPRESSION: u32 = 0;
const CM_FRAGMENT: u32 = 1;
const CM_SCHEMA_ID: u32 = 2;
const CM_TOTAL: u32 = 3;

/// Width of the minimal event code distinguishing `n` productions.
fn code_width(n: u32) -> u32 {
    if n <= 1 {
        0
    } else {
        32 - (n - 1).leading_zeros()
    }
}

/// Event coder for one sequence-of-optionals grammar: particles must be
/// emitted in ascending order, each code counts from the first particle
/// still allowed, and the end-of-element production always comes last.
struct SeqCoder {
    total: u32,
    state: u32,
}

impl SeqCoder {
    fn new(total: u32) -> Self {
        SeqCoder { total, state: 0 }
    }

    fn live(&self) -> u32 {
        self.total - self.state + 1
    }

    fn write(&mut self, writer: &mut BitWriter, particle: u32) -> ExiResult<()> {
        debug_assert!(particle >= self.state && particle < self.total);
        let code = u64::from(particle - self.state);
        writer.write_bits_u64(code, code_width(self.live()))?;
        self.state = particle + 1;
        Ok(())
    }

    fn finish(&mut self, writer: &mut BitWriter) -> ExiResult<()> {
        let code = u64::from(self.total - self.state);
        writer.write_bits_u64(code, code_width(self.live()))?;
        self.state = self.total + 1;
        Ok(())
    }

    /// Reads the next production; `None` is the end of the element.
    fn read(&mut self, reader: &mut BitReader) -> ExiResult<Option<u32>> {
        let code = reader.read_bits_u64(code_width(self.live()))? as u32;
        let end = self.total - self.state;
        if code == end {
            return Ok(None);
        }
        if code > end {
            log::warn!("[Header] reserved event code {} in options document", code);
            return Err(ExiError::header(HeaderCode::Default));
        }
        let particle = self.state + code;
        self.state = particle + 1;
        Ok(Some(particle))
    }
}

////////////////////////////////////////////////////////////////////////////
// Encoding

pub(super) fn encode(writer: &mut BitWriter, options: &Options) -> ExiResult<()> {
    // SD and SE(header) are single productions: no bits.
    let alignment_elt = options.alignment != Align::BitPacked;
    let has_uncommon = alignment_elt
        || options.self_contained
        || options.value_max_length != UNBOUNDED
        || options.value_partition_capacity != UNBOUNDED;
    let has_preserve = !options.preserve.is_empty();
    let has_block = options.block_size != DEFAULT_BLOCK_SIZE;
    let has_lesscommon = has_uncommon || has_preserve || has_block;
    let has_common =
        options.compression || options.fragment || options.schema_id.is_present();

    if options.datatype_representation_map {
        // Carried in the record for completeness; the map itself belongs to
        // the grammar layer and is never written here.
        log::debug!("[Header] datatypeRepresentationMap not encoded");
    }

    let mut header = SeqCoder::new(HDR_TOTAL);
    if has_lesscommon {
        header.write(writer, HDR_LESSCOMMON)?;
        encode_lesscommon(writer, options, has_uncommon, has_preserve, has_block)?;
    }
    if has_common {
        header.write(writer, HDR_COMMON)?;
        encode_common(writer, options)?;
    }
    if options.strict {
        header.write(writer, HDR_STRICT)?;
    }
    header.finish(writer)?;

    // ED is a single production; terminate on a byte boundary.
    writer.align_up();
    Ok(())
}

fn encode_lesscommon(
    writer: &mut BitWriter,
    options: &Options,
    has_uncommon: bool,
    has_preserve: bool,
    has_block: bool,
) -> ExiResult<()> {
    let mut coder = SeqCoder::new(LC_TOTAL);
    if has_uncommon {
        coder.write(writer, LC_UNCOMMON)?;
        encode_uncommon(writer, options)?;
    }
    if has_preserve {
        coder.write(writer, LC_PRESERVE)?;
        encode_preserve(writer, options.preserve)?;
    }
    if has_block {
        coder.write(writer, LC_BLOCK_SIZE)?;
        writer.write_uint_leb(u64::from(options.block_size))?;
    }
    coder.finish(writer)
}

fn encode_uncommon(writer: &mut BitWriter, options: &Options) -> ExiResult<()> {
    let mut coder = SeqCoder::new(UC_TOTAL);
    if options.alignment != Align::BitPacked {
        coder.write(writer, UC_ALIGNMENT)?;
        let choice = match options.alignment {
            Align::ByteAligned => 0,
            Align::PreCompression => 1,
            Align::BitPacked => unreachable!("bit-packed writes no alignment element"),
        };
        writer.write_bits_u64(choice, 1)?;
    }
    if options.self_contained {
        coder.write(writer, UC_SELF_CONTAINED)?;
    }
    if options.value_max_length != UNBOUNDED {
        coder.write(writer, UC_VALUE_MAX_LENGTH)?;
        writer.write_uint_leb(u64::from(options.value_max_length))?;
    }
    if options.value_partition_capacity != UNBOUNDED {
        coder.write(writer, UC_VALUE_PARTITION)?;
        writer.write_uint_leb(u64::from(options.value_partition_capacity))?;
    }
    coder.finish(writer)
}

fn encode_preserve(writer: &mut BitWriter, preserve: Preserve) -> ExiResult<()> {
    let mut coder = SeqCoder::new(PV_TOTAL);
    let particles = [
        (PV_DTD, Preserve::DTD),
        (PV_PREFIXES, Preserve::PREFIXES),
        (PV_LEXICAL, Preserve::LEXICAL_VALUES),
        (PV_COMMENTS, Preserve::COMMENTS),
        (PV_PIS, Preserve::PIS),
    ];
    for (particle, flag) in particles {
        if preserve.contains(flag) {
            coder.write(writer, particle)?;
        }
    }
    coder.finish(writer)
}

fn encode_common(writer: &mut BitWriter, options: &Options) -> ExiResult<()> {
    let mut coder = SeqCoder::new(CM_TOTAL);
    if options.compression {
        coder.write(writer, CM_COMPRESSION)?;
    }
    if options.fragment {
        coder.write(writer, CM_FRAGMENT)?;
    }
    match &options.schema_id {
        SchemaId::Absent => {}
        SchemaId::Nil => {
            coder.write(writer, CM_SCHEMA_ID)?;
            // xsi:nil branch, value true.
            writer.write_bit(false)?;
            writer.write_bit(true)?;
        }
        SchemaId::Empty => {
            coder.write(writer, CM_SCHEMA_ID)?;
            writer.write_bit(true)?;
            writer.write_uint_leb(0)?;
        }
        SchemaId::Set(bytes) => {
            coder.write(writer, CM_SCHEMA_ID)?;
            writer.write_bit(true)?;
            writer.write_uint_leb(bytes.len() as u64)?;
            writer.write_byte_slice(bytes)?;
        }
    }
    coder.finish(writer)
}

////////////////////////////////////////////////////////////////////////////
// Decoding

pub(super) fn decode(reader: &mut BitReader, options: &mut Options) -> ExiResult<()> {
    let mut header = SeqCoder::new(HDR_TOTAL);
    while let Some(particle) = header.read(reader)? {
        match particle {
            HDR_LESSCOMMON => decode_lesscommon(reader, options)?,
            HDR_COMMON => decode_common(reader, options)?,
            _ => options.strict = true,
        }
    }

    reader.align_up();
    Ok(())
}

fn decode_lesscommon(reader: &mut BitReader, options: &mut Options) -> ExiResult<()> {
    let mut coder = SeqCoder::new(LC_TOTAL);
    while let Some(particle) = coder.read(reader)? {
        match particle {
            LC_UNCOMMON => decode_uncommon(reader, options)?,
            LC_PRESERVE => decode_preserve(reader, options)?,
            _ => options.block_size = read_counter(reader)?,
        }
    }
    Ok(())
}

fn decode_uncommon(reader: &mut BitReader, options: &mut Options) -> ExiResult<()> {
    let mut coder = SeqCoder::new(UC_TOTAL);
    while let Some(particle) = coder.read(reader)? {
        match particle {
            UC_ALIGNMENT => {
                options.alignment = if reader.read_bit()? {
                    Align::PreCompression
                } else {
                    Align::ByteAligned
                };
            }
            UC_SELF_CONTAINED => options.self_contained = true,
            UC_VALUE_MAX_LENGTH => options.value_max_length = read_counter(reader)?,
            UC_VALUE_PARTITION => options.value_partition_capacity = read_counter(reader)?,
            _ => {
                // datatypeRepresentationMap bodies are qname pairs owned by
                // the grammar layer; nothing here can skip them.
                options.datatype_representation_map = true;
                log::warn!("[Header] datatypeRepresentationMap decoding not supported");
                return Err(ExiError::new(ErrorKind::Unimplemented));
            }
        }
    }
    Ok(())
}

fn decode_preserve(reader: &mut BitReader, options: &mut Options) -> ExiResult<()> {
    let mut coder = SeqCoder::new(PV_TOTAL);
    while let Some(particle) = coder.read(reader)? {
        let flag = match particle {
            PV_DTD => Preserve::DTD,
            PV_PREFIXES => Preserve::PREFIXES,
            PV_LEXICAL => Preserve::LEXICAL_VALUES,
            PV_COMMENTS => Preserve::COMMENTS,
            _ => Preserve::PIS,
        };
        options.preserve.insert(flag);
    }
    Ok(())
}

fn decode_common(reader: &mut BitReader, options: &mut Options) -> ExiResult<()> {
    let mut coder = SeqCoder::new(CM_TOTAL);
    while let Some(particle) = coder.read(reader)? {
        match particle {
            CM_COMPRESSION => options.compression = true,
            CM_FRAGMENT => options.fragment = true,
            _ => options.schema_id = decode_schema_id(reader)?,
        }
    }
    Ok(())
}

fn decode_schema_id(reader: &mut BitReader) -> ExiResult<SchemaId> {
    if !reader.read_bit()? {
        // xsi:nil attribute; nil=false falls through to the string content.
        if reader.read_bit()? {
            return Ok(SchemaId::Nil);
        }
    }
    let bytes = read_byte_string(reader)?;
    if bytes.is_empty() {
        Ok(SchemaId::Empty)
    } else {
        Ok(SchemaId::Set(bytes))
    }
}

/// An unsignedInt leaf: a characters event (no bits) holding a LEB value.
fn read_counter(reader: &mut BitReader) -> ExiResult<u32> {
    let value = reader.read_uint_leb()?;
    u32::try_from(value).map_err(|_| {
        log::warn!("[Header] counter {} exceeds 32 bits", value);
        ExiError::new(ErrorKind::InvalidExiInput)
    })
}

fn read_byte_string(reader: &mut BitReader) -> ExiResult<Vec<u8>> {
    let len = reader.read_uint_leb()?;
    if len > reader.remaining_bits() / 8 {
        return Err(ExiError::full(len.saturating_mul(8).min(i64::MAX as u64) as i64));
    }
    let mut bytes = vec![0u8; len as usize];
    reader.read_byte_slice(&mut bytes)?;
    Ok(bytes)
}
