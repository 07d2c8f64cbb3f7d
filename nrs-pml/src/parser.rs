//!
//! The PML Parser.
//!
//! Every call to [`PmlParser::message_event`] treats its buffer as a
//! complete, self-contained piece of PML holding zero or more top-level
//! elements.  The buffer is parsed namespace-aware: only resolved
//! namespace URIs and local names are used, so a sender may bind the NRS
//! attribute namespace to any prefix it likes.
//!
//! The buffer is decoded as a stream: each message is complete the moment
//! its end tag is read.  Malformed input never escapes as an error.  The
//! parser logs the position of the problem, delivers every message that
//! was complete before it and abandons the rest of the buffer.  Nothing
//! carries over to the next call.
//!

use std::str;

use nrs_core::{Direction, Message, MessageProcessor, PortId, PreProcessor, SenderHandle};
use tracing::warn;

use crate::{
    error::DecodeError,
    event_processor::{EventProcessor, Malformed},
    policy::DecoderPolicy,
    registry::ElementRegistry,
};

/// What happened to one buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Messages decoded and handed on
    pub delivered: usize,
    /// Incomplete messages thrown away because another message started
    pub discarded: usize,
    /// Messages dropped because of fields in an unrecognised namespace
    pub rejected: usize,
    /// Fields dropped because of their namespace
    pub dropped_fields: usize,
    /// Elements that are not registered message types
    pub unknown_elements: usize,
    /// The error that cut the buffer short, if any
    pub error: Option<DecodeError>,
}

/// Decodes PML buffers and delivers the messages to the next stage.
pub struct PmlParser {
    /// The message types this parser recognises
    registry: ElementRegistry,
    /// How forgiving the parser is
    policy: DecoderPolicy,
    /// The entry point of the inbound chain
    next: Box<dyn MessageProcessor>,
}

impl PmlParser {
    /// Create a parser that delivers to `next`
    pub fn new(registry: ElementRegistry, next: Box<dyn MessageProcessor>) -> Self {
        Self {
            registry,
            policy: DecoderPolicy::default(),
            next,
        }
    }

    /// Create a parser with a given strictness
    pub fn with_policy(
        registry: ElementRegistry,
        policy: DecoderPolicy,
        next: Box<dyn MessageProcessor>,
    ) -> Self {
        Self {
            registry,
            policy,
            next,
        }
    }

    /// The message types this parser recognises
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Mutable access to the recognised message types
    pub fn registry_mut(&mut self) -> &mut ElementRegistry {
        &mut self.registry
    }

    /// Decode a buffer received on `port` and deliver its messages.
    ///
    /// Each message is marked with the port it arrived on, offered to the
    /// route's pre-processor and then delivered to the next stage, in that
    /// order.
    pub fn message_event(
        &mut self,
        buffer: &[u8],
        port: Option<PortId>,
        mut pre_processor: Option<&mut dyn PreProcessor>,
    ) -> DecodeReport {
        let (messages, mut report) = self.decode(buffer);
        let sender = port.map(SenderHandle::Port);

        for mut message in messages {
            let aux = message.aux_mut();
            aux.received_port = port;
            aux.direction = Direction::Inbound;

            if let Some(pre_processor) = pre_processor.as_mut() {
                pre_processor.pre_process(&mut message);
            }

            self.next.deliver(message, sender.as_ref());
            report.delivered += 1;
        }

        report
    }

    /// Decode a buffer without delivering anything.
    ///
    /// `delivered` is left at zero in the returned report.
    pub fn decode(&self, buffer: &[u8]) -> (Vec<Message>, DecodeReport) {
        let (text, utf8_error) = match str::from_utf8(buffer) {
            Ok(text) => (text, None),
            Err(err) => {
                let valid_up_to = err.valid_up_to();
                warn!(valid_up_to, "buffer is not valid utf-8, decoding the valid prefix only");
                // The prefix is valid by construction.
                let text = str::from_utf8(&buffer[..valid_up_to]).unwrap_or_default();
                (text, Some(DecodeError::Utf8 { valid_up_to }))
            }
        };

        let (messages, mut report) = self.decode_text(text);
        if utf8_error.is_some() {
            report.error = utf8_error;
        }
        (messages, report)
    }

    fn decode_text(&self, text: &str) -> (Vec<Message>, DecodeReport) {
        let bom = bom_len(text);
        let body = &text[bom..];
        if body.trim().is_empty() {
            return (Vec::new(), DecodeReport::default());
        }

        let mut processor = EventProcessor::new(&self.registry, self.policy);
        let result = processor.process(body);
        let (messages, mut report) = processor.into_messages();

        if let Err(Malformed { offset, reason }) = result {
            let (row, col) = text_pos(text, bom + offset);
            warn!(
                row,
                col,
                error = %reason,
                delivered = messages.len(),
                "malformed PML, abandoning the rest of the buffer"
            );
            report.error = Some(DecodeError::Xml { row, col, reason });
        }
        (messages, report)
    }
}

/// The length of a leading byte order mark
fn bom_len(text: &str) -> usize {
    if text.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    }
}

/// Convert a byte offset into a 1-based row/column (in characters).
fn text_pos(text: &str, offset: usize) -> (u32, u32) {
    let mut row = 1;
    let mut col = 1;
    for (idx, c) in text.char_indices() {
        if idx >= offset {
            break;
        }
        if c == '\n' {
            row += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (row, col)
}
