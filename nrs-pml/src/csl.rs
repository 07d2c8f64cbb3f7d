//!
//! Capture of the CSL document nested in a `ReplyCSL` message.
//!
//! While a `ReplyCSL` element is open the event processor hands every
//! nested element to a [`CslCapture`] instead of treating it as a message.
//! The capture keeps the raw markup and the names of the top-level CSL
//! elements; building a schema from them is the receiver's business.
//!

use nrs_core::{constants::namespace, CslPayload};
use quick_xml::{events::BytesStart, name::ResolveResult, reader::NsReader};
use tracing::debug;

#[derive(Debug, Default)]
pub(crate) struct CslCapture {
    /// Byte offset of the first byte after the `ReplyCSL` start tag
    content_start: usize,
    /// Local names of the top-level elements seen so far
    elements: Vec<String>,
    /// Nesting depth below the `ReplyCSL` element
    depth: usize,
}

impl CslCapture {
    /// Begin capturing the markup that starts at `content_start`
    pub fn begin(content_start: usize) -> Self {
        Self {
            content_start,
            ..Default::default()
        }
    }

    pub fn start_element(&mut self, reader: &NsReader<&[u8]>, start: &BytesStart<'_>, name: &str) {
        if self.depth == 0 {
            let in_csl = match reader.resolve_element(start.name()).0 {
                ResolveResult::Bound(ns) => {
                    String::from_utf8_lossy(ns.as_ref()).eq_ignore_ascii_case(namespace::CSL)
                }
                _ => false,
            };
            if !in_csl {
                debug!(element = name, "top-level element of ReplyCSL is not in the CSL namespace");
            }
            self.elements.push(name.to_string());
        }
        self.depth += 1;
    }

    pub fn end_element(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Finish the capture.  `before` is the buffer up to the `ReplyCSL`
    /// end tag.
    pub fn finish(self, before: &str) -> CslPayload {
        let source = before.get(self.content_start..).unwrap_or_default();
        CslPayload {
            source: source.to_string(),
            elements: self.elements,
        }
    }
}
