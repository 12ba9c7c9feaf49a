// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Header codec.
//!
//! Wire layout, bit by bit:
//!
//! ```text
//! [optional 4 bytes: '$' 'E' 'X' 'I']          -- cookie
//! [2 bits: distinguishing bits = 1 0]
//! [1 bit:  presence bit for the options document]
//! [1 bit:  format version flag, 0 = final]
//! [4-bit version groups: 0b1111 adds 15 and continues, anything else
//!  terminates; version = sum + 1]
//! [if presence: options document, then pad to a byte boundary]
//! ```
//!
//! Only final version 1 streams are accepted; the preview flag is always
//! rejected.

mod options_doc;

use crate::error::{ExiError, ExiResult, HeaderCode};
use crate::options::Options;
use crate::stream::{BitReader, BitWriter};

/// The optional stream cookie.
pub const COOKIE: [u8; 4] = *b"$EXI";

/// First two bits of every stream.
pub const DISTINGUISHING_BITS: u64 = 0b10;

/// Version groups carry 4 bits; this one means "add 15 and continue".
const VERSION_CONTINUE: u64 = 0b1111;

/// Cap on version groups, far beyond any assigned version.
const MAX_VERSION_GROUPS: u32 = 16;

/// Decodes the header into `options`.
///
/// When the presence bit is clear the stream carries no options document;
/// the caller must have supplied out-of-band options (in `options`) and
/// passed `allow_out_of_band`, otherwise `InvalidExiHeader{OutOfBandOpts}`
/// is returned. Leaves the reader positioned at the first body bit.
pub fn decode_header(
    reader: &mut BitReader,
    options: &mut Options,
    allow_out_of_band: bool,
) -> ExiResult<()> {
    // The cookie is optional: anything not starting with '$' is taken as a
    // cookieless stream. A partial cookie is an error.
    if reader.peek_byte()? == COOKIE[0] {
        for expected in COOKIE {
            let byte = reader.read_byte()?;
            if byte != expected {
                log::warn!("[Header] invalid cookie byte {:#04x}", byte);
                return Err(ExiError::header_with(HeaderCode::Cookie, u32::from(byte)));
            }
        }
    }

    let bits = reader.read_bits_u64(2)?;
    if bits != DISTINGUISHING_BITS {
        log::warn!("[Header] invalid distinguishing bits {:#b}", bits);
        return Err(ExiError::header_with(HeaderCode::DistinguishingBits, bits as u32));
    }

    let presence = reader.read_bit()?;
    let preview = reader.read_bit()?;
    if preview {
        log::warn!("[Header] preview version streams are not supported");
        return Err(ExiError::header(HeaderCode::InvalidVersion));
    }

    let version = decode_version(reader)?;
    if version != 1 {
        log::warn!("[Header] unsupported version {}", version);
        return Err(ExiError::header_with(HeaderCode::InvalidVersion, version));
    }

    if !presence {
        if !allow_out_of_band {
            return Err(ExiError::header(HeaderCode::OutOfBandOpts));
        }
        // Out-of-band options were supplied by the caller; keep them.
        return Ok(());
    }

    options_doc::decode(reader, options)?;
    options
        .validate()
        .map_err(|err| ExiError::header(err.header_code().unwrap_or(HeaderCode::Default)))
}

/// Encodes the header for `options`.
///
/// `include_options_doc` drives the presence bit; when it is false the
/// receiving side needs the same options out of band.
pub fn encode_header(
    writer: &mut BitWriter,
    options: &Options,
    include_cookie: bool,
    include_options_doc: bool,
) -> ExiResult<()> {
    options.validate()?;

    if include_cookie {
        writer.write_byte_slice(&COOKIE)?;
    }
    writer.write_bits_u64(DISTINGUISHING_BITS, 2)?;
    writer.write_bit(include_options_doc)?;
    // Final version 1: flag 0, a single terminating group of value 0.
    writer.write_bit(false)?;
    writer.write_bits_u64(0, 4)?;

    if include_options_doc {
        options_doc::encode(writer, options)?;
    }
    Ok(())
}

fn decode_version(reader: &mut BitReader) -> ExiResult<u32> {
    let mut sum = 0u32;
    for _ in 0..MAX_VERSION_GROUPS {
        let group = reader.read_bits_u64(4)?;
        sum += group as u32;
        if group != VERSION_CONTINUE {
            return Ok(sum + 1);
        }
    }
    log::warn!("[Header] version field exceeded {} groups", MAX_VERSION_GROUPS);
    Err(ExiError::header(HeaderCode::InvalidVersion))
}
