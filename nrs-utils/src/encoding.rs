//!
//! Encoding Messages as PML.
//!
//! Every message becomes a single element whose name is the message type.
//! PML fields are written as unqualified attributes in the default (PML)
//! namespace and NRS fields as attributes qualified with the conventional
//! `nrsa` prefix.  Attributes are written in sorted order so that equal
//! messages always encode to equal bytes.
//!

use std::borrow::Cow;

use thiserror::Error;

use nrs_core::{
    constants::{message_type, namespace},
    Message,
};

/// An error from attempting to encode a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// The message has no type, so there is no element name to write
    #[error("message has no type")]
    EmptyType,
    /// A message type or field name cannot be written as an XML name
    #[error("`{0}` is not a valid element or attribute name")]
    InvalidName(String),
}

/// Encode a message as one PML element.
pub fn encode(message: &Message) -> Result<String, EncodingError> {
    let msg_type = message.msg_type();
    if msg_type.is_empty() {
        return Err(EncodingError::EmptyType);
    }
    check_name(msg_type)?;

    let mut out = String::with_capacity(128);
    out.push('<');
    out.push_str(msg_type);
    push_attribute(&mut out, "xmlns", namespace::PML);
    push_attribute(
        &mut out,
        &format!("xmlns:{}", namespace::NRSA_PREFIX),
        namespace::NRSA,
    );

    let mut nrs_fields: Vec<(&str, &str)> = message.nrs_fields().collect();
    nrs_fields.sort_unstable();
    for (name, value) in nrs_fields {
        check_name(name)?;
        push_attribute(
            &mut out,
            &format!("{}:{}", namespace::NRSA_PREFIX, name),
            value,
        );
    }

    let mut fields: Vec<(&str, &str)> = message.fields().collect();
    fields.sort_unstable();
    for (name, value) in fields {
        check_name(name)?;
        push_attribute(&mut out, name, value);
    }

    match message.aux().csl.as_ref() {
        Some(csl) if msg_type == message_type::REPLY_CSL => {
            out.push('>');
            out.push_str(&csl.source);
            out.push_str("</");
            out.push_str(msg_type);
            out.push('>');
        }
        _ => out.push_str("/>"),
    }

    Ok(out)
}

/// Append the encoding of a message to a byte buffer.
pub fn encode_into(message: &Message, buffer: &mut Vec<u8>) -> Result<(), EncodingError> {
    buffer.extend_from_slice(encode(message)?.as_bytes());
    Ok(())
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

/// Escape an attribute value.
///
/// Tabs and line breaks are written as character references because a
/// parser normalises literal whitespace in attribute values to spaces.
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\'' | '\n' | '\r' | '\t'))
    {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn check_name(name: &str) -> Result<(), EncodingError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(EncodingError::InvalidName(name.to_string()))
    }
}
