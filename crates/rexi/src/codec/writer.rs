// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode-side facade.
//!
//! [`Writer`] mirrors the sink handlers with an `emit_*` API: header first,
//! then `emit_start_document`, the body events, `emit_end_document`, and
//! [`Writer::finalize`] to obtain the written bytes. An attribute's value
//! is the `emit_string_data` call immediately following `emit_attribute`,
//! matching the decode-side contract. Once a wire write fails mid-event the
//! writer is poisoned and every further call reports
//! `InconsistentProcState`.

use crate::error::{ErrorKind, ExiError, ExiResult};
use crate::header;
use crate::options::{Options, Preserve};
use crate::stream::BitWriter;

use super::event::{
    QName, CODE_AT, CODE_CH, CODE_ED, CODE_EE, CODE_NS, CODE_SE, EVENT_CODE_BITS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    HeaderDone,
    Body,
    Complete,
    Failed,
}

/// The encode-side handle.
pub struct Writer<'a> {
    writer: BitWriter<'a>,
    options: Options,
    state: State,
    depth: u32,
    pending_attr: bool,
}

impl<'a> Writer<'a> {
    /// Wraps an output buffer with default options.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Writer::with_options(buffer, Options::default())
    }

    /// Wraps an output buffer with explicit options.
    pub fn with_options(buffer: &'a mut [u8], options: Options) -> Self {
        Writer {
            writer: BitWriter::new(buffer),
            options,
            state: State::Created,
            depth: 0,
            pending_attr: false,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Current bit position of the underlying writer.
    pub fn bit_pos(&self) -> u64 {
        self.writer.bit_pos()
    }

    /// Encodes the header. `include_options_doc` drives the presence bit;
    /// without it the decoder needs the same options out of band.
    pub fn write_header(&mut self, include_cookie: bool, include_options_doc: bool) -> ExiResult<()> {
        if self.state != State::Created {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        match header::encode_header(&mut self.writer, &self.options, include_cookie, include_options_doc)
        {
            Ok(()) => {
                self.state = State::HeaderDone;
                Ok(())
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    /// Opens the document. Costs no bits; the start-document event is
    /// implicit in the stream.
    pub fn emit_start_document(&mut self) -> ExiResult<()> {
        if self.state != State::HeaderDone {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        self.state = State::Body;
        Ok(())
    }

    pub fn emit_start_element(&mut self, qname: &QName) -> ExiResult<()> {
        self.check_body()?;
        self.event_code(CODE_SE)?;
        self.write_qname(qname)?;
        self.depth += 1;
        Ok(())
    }

    pub fn emit_end_element(&mut self) -> ExiResult<()> {
        self.check_body()?;
        if self.depth == 0 {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        self.event_code(CODE_EE)?;
        self.depth -= 1;
        Ok(())
    }

    /// Opens an attribute; the value must follow as `emit_string_data`.
    pub fn emit_attribute(&mut self, qname: &QName) -> ExiResult<()> {
        self.check_body()?;
        if self.depth == 0 {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        self.event_code(CODE_AT)?;
        self.write_qname(qname)?;
        self.pending_attr = true;
        Ok(())
    }

    /// Emits character data, or the value of the attribute opened by the
    /// preceding `emit_attribute` call.
    pub fn emit_string_data(&mut self, data: &str) -> ExiResult<()> {
        if self.state != State::Body {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        if self.pending_attr {
            self.pending_attr = false;
            return self.write_string(data);
        }
        if self.depth == 0 {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        self.event_code(CODE_CH)?;
        self.write_string(data)
    }

    pub fn emit_namespace_declaration(
        &mut self,
        uri: &str,
        prefix: &str,
        is_local: bool,
    ) -> ExiResult<()> {
        self.check_body()?;
        if self.depth == 0 {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        self.event_code(CODE_NS)?;
        self.write_string(uri)?;
        self.write_string(prefix)?;
        self.writer.write_bit(is_local).map_err(|err| self.poison(err))
    }

    /// Closes the document and pads the stream to a byte boundary.
    pub fn emit_end_document(&mut self) -> ExiResult<()> {
        self.check_body()?;
        if self.depth != 0 {
            log::warn!("[Codec] end-document with {} open elements", self.depth);
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        self.event_code(CODE_ED)?;
        self.writer.align_up();
        self.state = State::Complete;
        Ok(())
    }

    /// Returns the written prefix of the buffer. Only valid after
    /// `emit_end_document`.
    pub fn finalize(self) -> ExiResult<&'a [u8]> {
        if self.state != State::Complete {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        Ok(self.writer.into_written())
    }

    ////////////////////////////////////////////////////////////////////////
    // Wire helpers; any failure here leaves a half-written event, so the
    // writer poisons itself.

    fn check_body(&self) -> ExiResult<()> {
        if self.state != State::Body || self.pending_attr {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        Ok(())
    }

    fn event_code(&mut self, code: u64) -> ExiResult<()> {
        if self.options.aligned_events() {
            self.writer.align_up();
        }
        self.writer.write_bits_u64(code, EVENT_CODE_BITS).map_err(|err| self.poison(err))
    }

    fn write_qname(&mut self, qname: &QName) -> ExiResult<()> {
        self.write_string(&qname.uri)?;
        self.write_string(&qname.local_name)?;
        if self.options.preserve().contains(Preserve::PREFIXES) {
            self.write_string(qname.prefix.as_deref().unwrap_or(""))?;
        }
        Ok(())
    }

    fn write_string(&mut self, data: &str) -> ExiResult<()> {
        let bytes = data.as_bytes();
        let result = self
            .writer
            .write_uint_leb(bytes.len() as u64)
            .and_then(|()| self.writer.write_byte_slice(bytes));
        result.map_err(|err| self.poison(err))
    }

    fn poison(&mut self, err: ExiError) -> ExiError {
        self.state = State::Failed;
        err
    }
}
