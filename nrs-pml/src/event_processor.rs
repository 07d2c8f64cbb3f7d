//!
//! The element event state machine.
//!
//! The processor reads the buffer as a stream of start and end events and
//! acts on each one as it arrives.  It is `Idle` until the start tag of a
//! registered message type opens, `Building` until that element's end tag
//! closes and, for `ReplyCSL`, `CslNested` while the nested CSL document is
//! routed to a [`CslCapture`].  A registered start tag that arrives while a
//! message is being built discards the incomplete message and starts over.
//!
//! The first malformed event stops the stream.  Messages completed before
//! it have already been collected and are kept.
//!

use std::borrow::Cow;

use nrs_core::{
    constants::{message_type, namespace},
    Message,
};
use quick_xml::{
    events::{BytesStart, Event},
    name::ResolveResult,
    reader::NsReader,
};
use tracing::{trace, warn};

use crate::{
    csl::CslCapture,
    parser::DecodeReport,
    policy::{DecoderPolicy, ElementPolicy, NamespacePolicy},
    registry::ElementRegistry,
};

enum State {
    Idle,
    Building {
        message: Message,
        depth: usize,
        rejected: bool,
    },
    CslNested {
        message: Message,
        depth: usize,
        rejected: bool,
        capture: CslCapture,
    },
}

/// Where and why the event stream stopped early.
#[derive(Debug)]
pub(crate) struct Malformed {
    /// Byte offset into the decoded text
    pub offset: usize,
    /// The reader's description of the problem
    pub reason: String,
}

pub(crate) struct EventProcessor<'a> {
    registry: &'a ElementRegistry,
    policy: DecoderPolicy,
    state: State,
    /// Number of elements currently open
    depth: usize,
    completed: Vec<Message>,
    pub report: DecodeReport,
}

impl<'a> EventProcessor<'a> {
    pub fn new(registry: &'a ElementRegistry, policy: DecoderPolicy) -> Self {
        Self {
            registry,
            policy,
            state: State::Idle,
            depth: 0,
            completed: Vec::new(),
            report: DecodeReport::default(),
        }
    }

    /// Feed every event of `text` through the state machine, stopping at
    /// the first malformed one.
    pub fn process(&mut self, text: &str) -> Result<(), Malformed> {
        let mut reader = NsReader::from_str(text);
        reader.config_mut().expand_empty_elements = true;

        let result = self.read_events(&mut reader, text);
        self.abandon_in_progress();
        result
    }

    /// The messages completed so far, in document order.
    pub fn into_messages(self) -> (Vec<Message>, DecodeReport) {
        (self.completed, self.report)
    }

    fn read_events(&mut self, reader: &mut NsReader<&[u8]>, text: &str) -> Result<(), Malformed> {
        loop {
            let before = position(reader, text);
            let (in_pml, event) = match reader.read_resolved_event() {
                Ok((resolved, event)) => (in_pml_namespace(&resolved), event),
                Err(err) => {
                    return Err(Malformed {
                        offset: before,
                        reason: err.to_string(),
                    })
                }
            };

            match event {
                Event::Start(start) => {
                    self.depth += 1;
                    let content_start = position(reader, text);
                    self.start_element(reader, &start, in_pml, content_start)
                        .map_err(|reason| Malformed {
                            offset: before,
                            reason,
                        })?;
                }
                Event::End(_) => {
                    self.end_element(&text[..before]);
                    self.depth = self.depth.saturating_sub(1);
                }
                Event::Eof if self.depth > 0 => {
                    return Err(Malformed {
                        offset: text.len(),
                        reason: format!("buffer ended with {} unclosed element(s)", self.depth),
                    })
                }
                Event::Eof => return Ok(()),
                // Character data only matters inside ReplyCSL, where the
                // capture keeps the raw markup.
                _ => {}
            }
        }
    }

    fn abandon_in_progress(&mut self) {
        if let State::Building { message, .. } | State::CslNested { message, .. } =
            std::mem::replace(&mut self.state, State::Idle)
        {
            warn!(message_type = message.msg_type(), "buffer ended inside a message, discarding it");
            self.report.discarded += 1;
        }
    }

    fn start_element(
        &mut self,
        reader: &NsReader<&[u8]>,
        start: &BytesStart<'_>,
        in_pml: bool,
        content_start: usize,
    ) -> Result<(), String> {
        let local_name = start.local_name();
        let name = String::from_utf8_lossy(local_name.as_ref());

        if let State::CslNested { capture, .. } = &mut self.state {
            capture.start_element(reader, start, &name);
            return Ok(());
        }

        if !(in_pml && self.registry.contains(&name)) {
            self.unknown_element(&name, in_pml);
            return Ok(());
        }

        if let State::Building { message, .. } = std::mem::replace(&mut self.state, State::Idle) {
            warn!(
                discarded = message.msg_type(),
                started = %name,
                "start tag arrived while building a message, discarding the incomplete message"
            );
            self.report.discarded += 1;
        }

        let mut message = Message::new(&*name);
        let rejected = self.classify_attributes(reader, start, &mut message)?;
        let depth = self.depth;

        self.state = if name == message_type::REPLY_CSL {
            State::CslNested {
                message,
                depth,
                rejected,
                capture: CslCapture::begin(content_start),
            }
        } else {
            State::Building {
                message,
                depth,
                rejected,
            }
        };
        Ok(())
    }

    /// Handle an end tag.  `before` is the text up to the end tag.
    fn end_element(&mut self, before: &str) {
        let depth = self.depth;
        if let State::CslNested {
            depth: opened,
            capture,
            ..
        } = &mut self.state
        {
            if *opened != depth {
                capture.end_element();
                return;
            }
        }

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Building {
                message,
                depth: opened,
                rejected,
            } if opened == depth => self.complete(message, rejected),
            State::CslNested {
                mut message,
                depth: opened,
                rejected,
                capture,
            } if opened == depth => {
                message.aux_mut().csl = Some(capture.finish(before));
                self.complete(message, rejected);
            }
            // The end of an element that is not the message being built,
            // e.g. the outer element of a discarded message.
            other => self.state = other,
        }
    }

    fn complete(&mut self, message: Message, rejected: bool) {
        if rejected {
            warn!(
                message_type = message.msg_type(),
                "rejecting message with fields in an unrecognised namespace"
            );
            self.report.rejected += 1;
        } else {
            self.completed.push(message);
        }
    }

    /// Sort the attributes of a message element into the two field
    /// namespaces.  Returns whether the message must be rejected.
    fn classify_attributes(
        &mut self,
        reader: &NsReader<&[u8]>,
        start: &BytesStart<'_>,
        message: &mut Message,
    ) -> Result<bool, String> {
        let mut rejected = false;
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|err| err.to_string())?;
            if is_namespace_declaration(attribute.key.as_ref()) {
                continue;
            }

            let (resolved, local_name) = reader.resolve_attribute(attribute.key);
            let field = String::from_utf8_lossy(local_name.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|err| err.to_string())?
                .into_owned();

            match resolved {
                ResolveResult::Unbound => message.set_field(field, value),
                ResolveResult::Bound(ns) => {
                    let ns = String::from_utf8_lossy(ns.as_ref());
                    if ns.eq_ignore_ascii_case(namespace::NRSA) {
                        message.set_nrs_field(field, value)
                    } else if ns.is_empty() || ns.eq_ignore_ascii_case(namespace::PML) {
                        message.set_field(field, value)
                    } else {
                        rejected |= self.drop_field(message, &field, &ns);
                    }
                }
                ResolveResult::Unknown(prefix) => {
                    let prefix = String::from_utf8_lossy(&prefix).into_owned();
                    rejected |= self.drop_field(message, &field, &prefix);
                }
            }
        }
        Ok(rejected)
    }

    /// Count a field in an unrecognised namespace.  Returns whether the
    /// policy rejects its message.
    fn drop_field(&mut self, message: &Message, field: &str, ns: &str) -> bool {
        warn!(
            message_type = message.msg_type(),
            field,
            namespace = ns,
            "dropping field in unrecognised namespace"
        );
        self.report.dropped_fields += 1;
        self.policy.unknown_namespace == NamespacePolicy::Reject
    }

    fn unknown_element(&mut self, name: &str, in_pml: bool) {
        self.report.unknown_elements += 1;
        match self.policy.unknown_element {
            ElementPolicy::Ignore => trace!(element = name, in_pml, "skipping unknown element"),
            ElementPolicy::Warn => warn!(element = name, in_pml, "skipping unknown element"),
        }
    }
}

/// Whether a resolved element name lies in the PML namespace.  Elements
/// without a namespace count as PML.
fn in_pml_namespace(resolved: &ResolveResult<'_>) -> bool {
    match resolved {
        ResolveResult::Unbound => true,
        ResolveResult::Bound(ns) => {
            let ns: Cow<'_, str> = String::from_utf8_lossy(ns.as_ref());
            ns.is_empty() || ns.eq_ignore_ascii_case(namespace::PML)
        }
        ResolveResult::Unknown(_) => false,
    }
}

fn is_namespace_declaration(key: &[u8]) -> bool {
    key == b"xmlns" || key.starts_with(b"xmlns:")
}

/// The reader's byte offset into `text`
fn position(reader: &NsReader<&[u8]>, text: &str) -> usize {
    usize::try_from(reader.buffer_position())
        .unwrap_or(text.len())
        .min(text.len())
}
