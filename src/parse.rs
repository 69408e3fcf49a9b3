// External crates
use log::{debug, warn};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::{Decoder, Reader};
use serde::Serialize;

// Standard library imports
use std::collections::BTreeMap;

use crate::error::{FormatterError, Result};
use crate::xml::{is_xml_char, is_xml_name};

/// Text of one child tag, or of every same-named child in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedValue {
    Scalar(String),
    List(Vec<String>),
}

impl ParsedValue {
    fn push(&mut self, text: String) {
        match self {
            ParsedValue::Scalar(first) => {
                let first = std::mem::take(first);
                *self = ParsedValue::List(vec![first, text]);
            }
            ParsedValue::List(items) => items.push(text),
        }
    }
}

impl From<&str> for ParsedValue {
    fn from(s: &str) -> Self {
        ParsedValue::Scalar(s.to_string())
    }
}

impl From<Vec<&str>> for ParsedValue {
    fn from(items: Vec<&str>) -> Self {
        ParsedValue::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Children of the root element, grouped by tag name.
pub type ParsedDocument = BTreeMap<String, ParsedValue>;

fn reject(reason: &str) -> FormatterError {
    warn!("Rejecting XML input: {}", reason);
    FormatterError::Parse
}

fn check_chars(text: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(reject(&format!("illegal character U+{:04X}", c as u32))),
        None => Ok(()),
    }
}

fn check_name(name: &str) -> Result<()> {
    if is_xml_name(name) {
        Ok(())
    } else {
        Err(reject(&format!("invalid name {:?}", name)))
    }
}

/// Resolves a `&...;` reference in content. Only the five predefined
/// entities and character references to legal XML characters resolve.
fn resolve_reference(reference: &BytesRef) -> Result<String> {
    if reference.is_char_ref() {
        return match reference.resolve_char_ref() {
            Ok(Some(c)) if is_xml_char(c) => Ok(c.to_string()),
            Ok(_) => Err(reject("character reference to an illegal character")),
            Err(e) => Err(reject(&e.to_string())),
        };
    }
    let name = String::from_utf8_lossy(reference);
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| reject(&format!("unresolvable entity reference &{};", name)))
}

/// Attribute values are not split into reference events, so the same
/// lockout is applied while unescaping them here.
fn check_attributes(start: &BytesStart, decoder: Decoder) -> Result<()> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| reject(&e.to_string()))?;
        check_name(&String::from_utf8_lossy(attr.key.as_ref()))?;
        if attr.value.contains(&b'<') {
            return Err(reject("'<' in attribute value"));
        }
        let value = attr
            .decode_and_unescape_value_with(decoder, resolve_predefined_entity)
            .map_err(|e| reject(&e.to_string()))?;
        check_chars(&value)?;
    }
    Ok(())
}

fn element_name(start: &BytesStart) -> Result<String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    check_name(&name)?;
    Ok(name)
}

/// Length of the DOCTYPE declaration at the start of `s`, up to and
/// including its closing `>`. Quoted literals, comments and processing
/// instructions inside the internal subset may contain `>`.
fn doctype_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut in_subset = false;
    let mut i = 2;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'"' | b'\'') => {
                i += 1 + s[i + 1..].find(q as char)?;
            }
            b'<' if in_subset && s[i..].starts_with("<!--") => {
                i += 4 + s[i + 4..].find("-->")? + 2;
            }
            b'<' if in_subset && s[i..].starts_with("<?") => {
                i += 2 + s[i + 2..].find("?>")? + 1;
            }
            b'[' if !in_subset => in_subset = true,
            b']' if in_subset => in_subset = false,
            b'>' if !in_subset => return Some(i + 1),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Converts UTF-8 bytes into a map of the root element's children.
///
/// Input that is not valid UTF-8 is rejected like any other malformed XML.
pub fn convert_bytes_to_array(bytes: &[u8]) -> Result<ParsedDocument> {
    let xml = std::str::from_utf8(bytes).map_err(|e| reject(&e.to_string()))?;
    convert_string_to_array(xml)
}

/// Converts an XML document into a map of the root element's children.
///
/// Declaring entities in a DOCTYPE is tolerated, but any reference to an
/// entity other than the five predefined ones fails the whole conversion
/// instead of being expanded. External entities are never loaded.
pub fn convert_string_to_array(xml: &str) -> Result<ParsedDocument> {
    let mut reader = Reader::from_str(xml);
    // Where `reader`'s input starts within `xml`
    let mut offset = 0usize;

    let mut document = ParsedDocument::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut seen_doctype = false;
    // Tag and accumulated text of the root child currently open
    let mut current: Option<(String, String)> = None;

    loop {
        let event_start = offset + reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| reject(&e.to_string()))?;
        match event {
            Event::Start(start) => {
                let name = element_name(&start)?;
                check_attributes(&start, reader.decoder())?;
                if depth == 0 {
                    if seen_root {
                        return Err(reject("more than one root element"));
                    }
                    seen_root = true;
                } else if depth == 1 {
                    current = Some((name, String::new()));
                }
                depth += 1;
            }
            Event::Empty(start) => {
                let name = element_name(&start)?;
                check_attributes(&start, reader.decoder())?;
                if depth == 0 {
                    if seen_root {
                        return Err(reject("more than one root element"));
                    }
                    seen_root = true;
                } else if depth == 1 {
                    push_child(&mut document, name, String::new());
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| reject("closing tag without opening tag"))?;
                if depth == 1 {
                    if let Some((name, text)) = current.take() {
                        push_child(&mut document, name, text);
                    }
                }
            }
            Event::Text(text) => {
                let text = String::from_utf8_lossy(text.as_ref());
                if text.contains("]]>") {
                    return Err(reject("']]>' in content"));
                }
                check_chars(&text)?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err(reject("text outside the root element"));
                }
                if depth == 2 {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push_str(&text);
                    }
                }
            }
            Event::CData(cdata) => {
                if depth == 0 {
                    return Err(reject("CDATA outside the root element"));
                }
                let cdata = String::from_utf8_lossy(cdata.as_ref());
                check_chars(&cdata)?;
                if depth == 2 {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push_str(&cdata);
                    }
                }
            }
            Event::GeneralRef(reference) => {
                if depth == 0 {
                    return Err(reject("entity reference outside the root element"));
                }
                let resolved = resolve_reference(&reference)?;
                if depth == 2 {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push_str(&resolved);
                    }
                }
            }
            Event::Decl(_) => {
                if event_start != 0 {
                    return Err(reject("XML declaration not at the start of input"));
                }
            }
            Event::DocType(_) => {
                if seen_root || seen_doctype {
                    return Err(reject("unexpected DOCTYPE"));
                }
                seen_doctype = true;

                let len = doctype_len(&xml[event_start..])
                    .ok_or_else(|| reject("unterminated DOCTYPE"))?;
                let doctype_end = event_start + len;
                debug!(
                    "Ignoring {} entity declaration(s) in DOCTYPE",
                    xml[event_start..doctype_end].matches("<!ENTITY").count()
                );
                // The reader stops at the first '>' it sees; resume after
                // the real end of the declaration instead
                if doctype_end > offset + reader.buffer_position() as usize {
                    offset = doctype_end;
                    reader = Reader::from_str(&xml[doctype_end..]);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(reject("no root element"));
    }
    if depth != 0 {
        return Err(reject("unclosed element at end of input"));
    }

    debug!("Parsed XML into {} group(s)", document.len());
    Ok(document)
}

fn push_child(document: &mut ParsedDocument, name: String, text: String) {
    match document.get_mut(&name) {
        Some(value) => value.push(text),
        None => {
            document.insert(name, ParsedValue::Scalar(text));
        }
    }
}
