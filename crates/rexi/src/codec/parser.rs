// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decode-side facade.
//!
//! [`Parser`] owns the bit reader, the negotiated options and the caller's
//! [`EventSink`], and drives the top-level state machine:
//!
//! ```text
//! Start -> HeaderDone -> (Body)* -> Complete
//!            |                        ^
//!            +------ Failed (terminal)+
//! ```
//!
//! A sink returning [`SinkAction::Stop`] halts the loop with
//! `ErrorKind::Stop`, which is terminal but not a failure.

use crate::error::{ErrorKind, ExiError, ExiResult};
use crate::header;
use crate::options::{Options, Preserve};
use crate::stream::BitReader;

use super::event::{
    EventSink, QName, SinkAction, CODE_AT, CODE_CH, CODE_ED, CODE_EE, CODE_NS, CODE_SE,
    EVENT_CODE_BITS,
};

/// Placeholder for a compiled schema; only the built-in grammars exist in
/// this crate, so none can be constructed with content yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema;

/// Outcome of one [`Parser::parse_next`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStep {
    /// An event was delivered; keep calling.
    Continue,
    /// The end-document event was delivered; the body is finished.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Body,
    Complete,
    Stopped,
    Failed,
}

/// The decode-side handle.
pub struct Parser<'a, S: EventSink> {
    reader: BitReader<'a>,
    options: Options,
    sink: S,
    state: State,
    depth: u32,
    document_started: bool,
}

impl<'a, S: EventSink> Parser<'a, S> {
    /// Wraps a buffer with default (in-band) options.
    pub fn new(sink: S, buffer: &'a [u8]) -> Self {
        Parser::with_options(sink, buffer, Options::default())
    }

    /// Wraps a buffer with caller-supplied out-of-band options, used when
    /// the header's presence bit is clear.
    pub fn with_options(sink: S, buffer: &'a [u8], options: Options) -> Self {
        Parser {
            reader: BitReader::new(buffer),
            options,
            sink,
            state: State::Start,
            depth: 0,
            document_started: false,
        }
    }

    /// The options in effect (after `parse_header`, the negotiated ones).
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Current bit position of the underlying reader.
    pub fn bit_pos(&self) -> u64 {
        self.reader.bit_pos()
    }

    /// Installs a schema for schema-informed coding. Only `None` (the
    /// built-in grammars) is accepted today.
    pub fn set_schema(&mut self, schema: Option<Schema>) -> ExiResult<()> {
        match schema {
            None => Ok(()),
            Some(_) => Err(ExiError::new(ErrorKind::Unimplemented)),
        }
    }

    /// Parses the header and installs the negotiated options.
    pub fn parse_header(&mut self, allow_out_of_band: bool) -> ExiResult<()> {
        if self.state != State::Start {
            return Err(ExiError::new(ErrorKind::InconsistentProcState));
        }
        let mut options = self.options.clone();
        match header::decode_header(&mut self.reader, &mut options, allow_out_of_band) {
            Ok(()) => {
                self.options = options;
                self.state = State::Body;
                Ok(())
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    /// Delivers the next event to the sink.
    ///
    /// Returns `Continue` to keep going, `Complete` once the end-document
    /// event has been delivered. After completion further calls return
    /// `ParsingComplete`; after a failure they return
    /// `InconsistentProcState`.
    pub fn parse_next(&mut self) -> ExiResult<ParseStep> {
        match self.state {
            State::Body => {}
            State::Complete => return Err(ExiError::DONE),
            State::Stopped => return Err(ExiError::STOP),
            State::Start | State::Failed => {
                return Err(ExiError::new(ErrorKind::InconsistentProcState))
            }
        }

        match self.step() {
            Ok(ParseStep::Complete) => {
                self.state = State::Complete;
                Ok(ParseStep::Complete)
            }
            Ok(ParseStep::Continue) => Ok(ParseStep::Continue),
            Err(err) => {
                self.state = if err == ErrorKind::Stop { State::Stopped } else { State::Failed };
                Err(err)
            }
        }
    }

    /// Runs the event loop to completion. A sink-requested stop counts as
    /// success; everything else propagates.
    pub fn parse_all(&mut self) -> ExiResult<()> {
        loop {
            match self.parse_next() {
                Ok(ParseStep::Continue) => {}
                Ok(ParseStep::Complete) => return Ok(()),
                Err(err) if err == ErrorKind::Stop => {
                    log::debug!("[Codec] sink requested stop");
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn step(&mut self) -> ExiResult<ParseStep> {
        if !self.document_started {
            // The start-document event is implicit in the stream.
            self.document_started = true;
            let action = self.sink.start_document();
            deliver(action)?;
            return Ok(ParseStep::Continue);
        }

        if self.options.aligned_events() {
            self.reader.align_up();
        }
        let code = self.reader.read_bits_u64(EVENT_CODE_BITS)?;
        match code {
            CODE_SE => {
                let qname = self.read_qname()?;
                self.depth += 1;
                let action = self.sink.start_element(&qname);
                deliver(action)?;
            }
            CODE_EE => {
                if self.depth == 0 {
                    return Err(desync("end-element below document level"));
                }
                self.depth -= 1;
                let action = self.sink.end_element();
                deliver(action)?;
            }
            CODE_AT => {
                if self.depth == 0 {
                    return Err(desync("attribute below document level"));
                }
                let qname = self.read_qname()?;
                let action = self.sink.attribute(&qname);
                deliver(action)?;
                let value = self.read_string()?;
                let action = self.sink.string_data(&value);
                deliver(action)?;
            }
            CODE_NS => {
                if self.depth == 0 {
                    return Err(desync("namespace below document level"));
                }
                let uri = self.read_string()?;
                let prefix = self.read_string()?;
                let is_local = self.reader.read_bit()?;
                let action = self.sink.namespace_declaration(&uri, &prefix, is_local);
                deliver(action)?;
            }
            CODE_CH => {
                if self.depth == 0 {
                    return Err(desync("character data below document level"));
                }
                let value = self.read_string()?;
                let action = self.sink.string_data(&value);
                deliver(action)?;
            }
            CODE_ED => {
                if self.depth != 0 {
                    return Err(desync("end-document inside an open element"));
                }
                let action = self.sink.end_document();
                deliver(action)?;
                self.reader.align_up();
                return Ok(ParseStep::Complete);
            }
            _ => {
                log::warn!("[Codec] reserved event code {}", code);
                return Err(ExiError::new(ErrorKind::InvalidExiInput));
            }
        }
        Ok(ParseStep::Continue)
    }

    fn read_qname(&mut self) -> ExiResult<QName> {
        let uri = self.read_string()?;
        let local_name = self.read_string()?;
        let prefix = if self.options.preserve().contains(Preserve::PREFIXES) {
            let prefix = self.read_string()?;
            if prefix.is_empty() {
                None
            } else {
                Some(prefix)
            }
        } else {
            None
        };
        Ok(QName { uri, local_name, prefix })
    }

    fn read_string(&mut self) -> ExiResult<String> {
        let len = self.reader.read_uint_leb()?;
        if len > self.reader.remaining_bits() / 8 {
            return Err(ExiError::full(len.saturating_mul(8).min(i64::MAX as u64) as i64));
        }
        let mut bytes = vec![0u8; len as usize];
        self.reader.read_byte_slice(&mut bytes)?;
        String::from_utf8(bytes).map_err(|_| {
            log::warn!("[Codec] string value is not valid UTF-8");
            ExiError::new(ErrorKind::InvalidExiInput)
        })
    }
}

fn deliver(action: SinkAction) -> ExiResult<()> {
    match action {
        SinkAction::Continue => Ok(()),
        SinkAction::Stop => Err(ExiError::STOP),
    }
}

fn desync(what: &str) -> ExiError {
    log::warn!("[Codec] {}", what);
    ExiError::new(ErrorKind::InconsistentProcState)
}
