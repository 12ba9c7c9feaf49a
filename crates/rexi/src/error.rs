// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-shape error values for the codec core.
//!
//! Every fallible stream and codec operation returns [`ExiError`]: a kind
//! plus a 32-bit `extra` payload, small enough to pass by value and built
//! without allocation. For `BufferEndReached` the payload is the number of
//! bits the caller asked for; for the header kinds it packs a
//! [`HeaderCode`] sub-code in the low byte and an observed wire value in
//! the upper bits.

use std::fmt;

/// Error kinds, exhaustive for the codec core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorKind {
    /// Not an error.
    Success = 0,
    /// The event sink asked the parser to stop. Terminal but not a failure.
    Stop,
    /// Ran off the end of the buffer (`extra` carries the requested bits).
    BufferEndReached,
    /// End of the body; normal termination of the event loop.
    ParsingComplete,
    /// Reached a code path the implementation does not yet cover.
    Unimplemented,
    /// Any failure that does not fall into the other categories.
    Unexpected,
    /// API called with an out-of-range index.
    OutOfBounds,
    /// A required input was missing.
    NullRef,
    /// Allocation failed.
    InvalidMemoryAlloc,
    /// Header bytes do not match the format (`extra` carries a [`HeaderCode`]).
    InvalidExiHeader,
    /// Parser/writer state is inconsistent with the stream events.
    InconsistentProcState,
    /// Well-formed header but the body decodes to a disallowed value.
    InvalidExiInput,
    /// The options record failed validation.
    InvalidConfig,
    /// Qualified names used without preserving prefixes.
    NoPrefixesPreservedXmlSchema,
    /// String API misuse.
    InvalidStringOp,
    /// Options combination violates the format (`extra` carries a [`HeaderCode`]).
    HeaderOptionsMismatch,
}

/// Sub-codes for `InvalidExiHeader` and `HeaderOptionsMismatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HeaderCode {
    /// No specific code.
    Default = 0,
    /// Cookie is not `$EXI`.
    Cookie,
    /// Distinguishing bits are not `0b10`.
    DistinguishingBits,
    /// Version is not final version 1.
    InvalidVersion,
    /// An alignment element mixed with compression.
    MixedAlignment,
    /// A preserve option (or selfContained) mixed with strict.
    StrictPreserved,
    /// selfContained incompatible with compression or pre-compression.
    SelfContained,
    /// datatypeRepresentationMap conflict.
    DatatypeMap,
    /// Presence bit unset and no out-of-band options supplied.
    OutOfBandOpts,
}

impl HeaderCode {
    fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => HeaderCode::Default,
            1 => HeaderCode::Cookie,
            2 => HeaderCode::DistinguishingBits,
            3 => HeaderCode::InvalidVersion,
            4 => HeaderCode::MixedAlignment,
            5 => HeaderCode::StrictPreserved,
            6 => HeaderCode::SelfContained,
            7 => HeaderCode::DatatypeMap,
            8 => HeaderCode::OutOfBandOpts,
            _ => return None,
        })
    }

    fn message(self) -> &'static str {
        match self {
            HeaderCode::Default => "malformed header",
            HeaderCode::Cookie => "cookie is not '$EXI'",
            HeaderCode::DistinguishingBits => "distinguishing bits are not '10'",
            HeaderCode::InvalidVersion => "version is not final version 1",
            HeaderCode::MixedAlignment => "alignment element mixed with compression",
            HeaderCode::StrictPreserved => "preserve option mixed with strict",
            HeaderCode::SelfContained => "selfContained mixed with incompatible options",
            HeaderCode::DatatypeMap => "datatypeRepresentationMap conflict",
            HeaderCode::OutOfBandOpts => "no options document and no out-of-band options",
        }
    }
}

/// The error value returned by every fallible codec operation.
///
/// Compares equal to another `ExiError` when the kinds match, so callers can
/// test against the named constants without caring about the payload.
#[derive(Debug, Clone, Copy)]
pub struct ExiError {
    kind: ErrorKind,
    extra: u32,
}

/// Result alias used throughout the crate.
pub type ExiResult<T> = Result<T, ExiError>;

impl ExiError {
    /// Marks "no specific detail" in the `extra` payload.
    pub const UNSET: u32 = u32::MAX;

    /// The success value; the only one comparing equal to
    /// [`ErrorKind::Success`]. Mostly useful at FFI-shaped boundaries,
    /// since in-crate APIs signal success with `Ok`.
    pub const OK: ExiError = ExiError::new(ErrorKind::Success);
    /// Sink-requested stop.
    pub const STOP: ExiError = ExiError::new(ErrorKind::Stop);
    /// Normal end of the body.
    pub const DONE: ExiError = ExiError::new(ErrorKind::ParsingComplete);
    /// End of buffer without a recorded bit count.
    pub const FULL: ExiError = ExiError::new(ErrorKind::BufferEndReached);
    /// Out-of-range index.
    pub const OOB: ExiError = ExiError::new(ErrorKind::OutOfBounds);

    /// Generic error of a given kind, no payload.
    pub const fn new(kind: ErrorKind) -> Self {
        ExiError { kind, extra: Self::UNSET }
    }

    /// End-of-buffer error recording the number of bits requested.
    pub fn full(bits: i64) -> Self {
        let extra = u32::try_from(bits).unwrap_or(Self::UNSET);
        ExiError { kind: ErrorKind::BufferEndReached, extra }
    }

    /// `InvalidExiHeader` with a sub-code.
    pub const fn header(code: HeaderCode) -> Self {
        ExiError { kind: ErrorKind::InvalidExiHeader, extra: code as u32 }
    }

    /// `InvalidExiHeader` with a sub-code and the observed wire value.
    pub const fn header_with(code: HeaderCode, observed: u32) -> Self {
        ExiError {
            kind: ErrorKind::InvalidExiHeader,
            extra: (observed << 8) | code as u32,
        }
    }

    /// `HeaderOptionsMismatch` with a sub-code.
    pub const fn mismatch(code: HeaderCode) -> Self {
        ExiError { kind: ErrorKind::HeaderOptionsMismatch, extra: code as u32 }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Raw ancillary payload; [`ExiError::UNSET`] when there is none.
    pub const fn extra(&self) -> u32 {
        self.extra
    }

    /// Sub-code for the header kinds, `None` otherwise.
    pub fn header_code(&self) -> Option<HeaderCode> {
        match self.kind {
            ErrorKind::InvalidExiHeader | ErrorKind::HeaderOptionsMismatch => {
                HeaderCode::from_u8((self.extra & 0xFF) as u8)
            }
            _ => None,
        }
    }

    /// The observed wire value attached to a header error, if any.
    pub fn header_detail(&self) -> u32 {
        match self.kind {
            ErrorKind::InvalidExiHeader | ErrorKind::HeaderOptionsMismatch => self.extra >> 8,
            _ => 0,
        }
    }

    pub const fn is_ok(&self) -> bool {
        matches!(self.kind, ErrorKind::Success)
    }

    pub const fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// Short static description of the kind, without payload context.
    pub fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Success => "success",
            ErrorKind::Stop => "parsing stopped by the sink",
            ErrorKind::BufferEndReached => "end of buffer reached",
            ErrorKind::ParsingComplete => "parsing complete",
            ErrorKind::Unimplemented => "not yet implemented",
            ErrorKind::Unexpected => "unexpected error",
            ErrorKind::OutOfBounds => "index out of bounds",
            ErrorKind::NullRef => "required input missing",
            ErrorKind::InvalidMemoryAlloc => "memory allocation failed",
            ErrorKind::InvalidExiHeader => "invalid EXI header",
            ErrorKind::InconsistentProcState => "inconsistent processor state",
            ErrorKind::InvalidExiInput => "invalid EXI input",
            ErrorKind::InvalidConfig => "invalid configuration",
            ErrorKind::NoPrefixesPreservedXmlSchema => {
                "qualified names require preserved prefixes"
            }
            ErrorKind::InvalidStringOp => "invalid string operation",
            ErrorKind::HeaderOptionsMismatch => "mismatched header options",
        }
    }
}

impl PartialEq for ExiError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for ExiError {}

impl PartialEq<ErrorKind> for ExiError {
    fn eq(&self, other: &ErrorKind) -> bool {
        self.kind == *other
    }
}

impl PartialEq<ExiError> for ErrorKind {
    fn eq(&self, other: &ExiError) -> bool {
        *self == other.kind
    }
}

impl fmt::Display for ExiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::BufferEndReached if self.extra != Self::UNSET => {
                if self.extra % 8 == 0 && self.extra > 0 {
                    write!(f, "buffer full, unable to read a {}-byte integer", self.extra / 8)
                } else {
                    write!(f, "buffer full, unable to read {} bits", self.extra)
                }
            }
            ErrorKind::InvalidExiHeader | ErrorKind::HeaderOptionsMismatch => {
                match self.header_code() {
                    Some(code) => write!(f, "{}: {}", self.message(), code.message()),
                    None => f.write_str(self.message()),
                }
            }
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for ExiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_equality() {
        assert_eq!(ExiError::FULL, ErrorKind::BufferEndReached);
        assert_eq!(ErrorKind::Stop, ExiError::STOP);
        assert_ne!(ExiError::DONE, ErrorKind::Stop);
        // Payload does not take part in equality.
        assert_eq!(ExiError::full(3), ExiError::full(64));
    }

    #[test]
    fn test_ok_is_the_only_success() {
        assert!(ExiError::OK.is_ok());
        assert_eq!(ExiError::OK, ErrorKind::Success);
        for err in [ExiError::STOP, ExiError::DONE, ExiError::FULL, ExiError::OOB] {
            assert!(err.is_err());
            assert_ne!(err, ErrorKind::Success);
        }
    }

    #[test]
    fn test_full_records_requested_bits() {
        let err = ExiError::full(13);
        assert_eq!(err.kind(), ErrorKind::BufferEndReached);
        assert_eq!(err.extra(), 13);

        let huge = ExiError::full(i64::MAX);
        assert_eq!(huge.extra(), ExiError::UNSET);
    }

    #[test]
    fn test_header_code_packing() {
        let err = ExiError::header_with(HeaderCode::DistinguishingBits, 0b00);
        assert_eq!(err.header_code(), Some(HeaderCode::DistinguishingBits));
        assert_eq!(err.header_detail(), 0b00);

        let sig = ExiError::header_with(HeaderCode::Cookie, u32::from(b'X'));
        assert_eq!(sig.header_code(), Some(HeaderCode::Cookie));
        assert_eq!(sig.header_detail(), u32::from(b'X'));

        let plain = ExiError::mismatch(HeaderCode::MixedAlignment);
        assert_eq!(plain.kind(), ErrorKind::HeaderOptionsMismatch);
        assert_eq!(plain.header_code(), Some(HeaderCode::MixedAlignment));
        assert_eq!(plain.header_detail(), 0);
    }

    #[test]
    fn test_display_variants() {
        assert_eq!(
            format!("{}", ExiError::full(32)),
            "buffer full, unable to read a 4-byte integer"
        );
        assert_eq!(format!("{}", ExiError::full(13)), "buffer full, unable to read 13 bits");
        assert_eq!(format!("{}", ExiError::FULL), "end of buffer reached");
        assert_eq!(
            format!("{}", ExiError::mismatch(HeaderCode::MixedAlignment)),
            "mismatched header options: alignment element mixed with compression"
        );
        assert_eq!(format!("{}", ExiError::STOP), "parsing stopped by the sink");
    }
}
