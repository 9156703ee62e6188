//! Streaming XML reader with one-event look-ahead.
//!
//! # Invariants
//! - `depth()` counts start tags consumed and not yet closed; an empty
//!   element is expanded into a start/end pair when consumed.
//! - Any syntax failure is reported as [`SedaError::XmlSyntax`] carrying the
//!   byte position of the underlying parser.

use crate::error::{SedaError, SedaResult};
use crate::version::SedaVersion;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::VecDeque;
use std::io::BufRead;

/// What the next meaningful event is, without consuming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peeked {
    Start(String),
    End(String),
    Text,
    Eof,
}

/// A consumed start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl StartTag {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

pub struct SedaXmlReader<R: BufRead> {
    inner: Reader<R>,
    buf: Vec<u8>,
    pending: VecDeque<Event<'static>>,
    depth: usize,
    version: SedaVersion,
}

impl<R: BufRead> SedaXmlReader<R> {
    pub fn new(source: R, version: SedaVersion) -> Self {
        Self {
            inner: Reader::from_reader(source),
            buf: Vec::new(),
            pending: VecDeque::new(),
            depth: 0,
            version,
        }
    }

    /// Schema version used to resolve element names.
    pub fn version(&self) -> SedaVersion {
        self.version
    }

    pub fn set_version(&mut self, version: SedaVersion) {
        self.version = version;
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn position(&self) -> u64 {
        self.inner.buffer_position() as u64
    }

    /// Peeks the next event, dropping whitespace, comments, declarations
    /// and processing instructions on the way.
    pub fn peek(&mut self) -> SedaResult<Peeked> {
        loop {
            self.fill()?;
            let ignorable = match self.pending.front() {
                Some(Event::Text(text)) => text.iter().all(u8::is_ascii_whitespace),
                Some(Event::Comment(_))
                | Some(Event::Decl(_))
                | Some(Event::PI(_))
                | Some(Event::DocType(_)) => true,
                _ => false,
            };
            if ignorable {
                self.pull()?;
                continue;
            }
            return Ok(match self.pending.front() {
                Some(Event::Start(start)) | Some(Event::Empty(start)) => {
                    Peeked::Start(decode_name(start.local_name().as_ref(), self.position())?)
                }
                Some(Event::End(end)) => {
                    Peeked::End(decode_name(end.local_name().as_ref(), self.position())?)
                }
                Some(Event::Eof) | None => Peeked::Eof,
                Some(_) => Peeked::Text,
            });
        }
    }

    /// Consumes the next start tag, optionally checking its name.
    pub fn expect_start(&mut self, expected: Option<&str>) -> SedaResult<StartTag> {
        match self.peek()? {
            Peeked::Start(name) => {
                if let Some(expected) = expected {
                    if name != expected {
                        return Err(SedaError::unexpected(name, expected));
                    }
                }
            }
            Peeked::End(name) => {
                return Err(SedaError::missing(expected.unwrap_or("element"), name));
            }
            Peeked::Text => {
                return Err(SedaError::unexpected("#text", expected.unwrap_or("element")));
            }
            Peeked::Eof => return Err(self.syntax("unexpected end of document")),
        }
        let position = self.position();
        match self.pull()? {
            Event::Start(start) => start_tag(&start, position),
            Event::Empty(start) => {
                let tag = start_tag(&start, position)?;
                self.pending.push_front(Event::End(start.to_end().into_owned()));
                self.depth += 1;
                Ok(tag)
            }
            _ => Err(self.syntax("start tag expected")),
        }
    }

    /// Consumes the end tag closing the current element.
    pub fn expect_end(&mut self, name: &str) -> SedaResult<()> {
        match self.peek()? {
            Peeked::End(found) if found == name => {
                self.pull()?;
                Ok(())
            }
            Peeked::End(found) => Err(self.syntax(&format!(
                "closing tag `{found}` found where `{name}` was expected"
            ))),
            Peeked::Start(found) => Err(SedaError::unexpected(found, name)),
            Peeked::Text => Err(SedaError::unexpected("#text", name)),
            Peeked::Eof => Err(self.syntax("unexpected end of document")),
        }
    }

    /// Reads the text of the element whose start tag was just consumed,
    /// up to and including its end tag.
    pub fn read_text(&mut self, name: &str) -> SedaResult<String> {
        let mut value = String::new();
        loop {
            let position = self.position();
            match self.pull()? {
                Event::Text(text) => {
                    let unescaped = text
                        .unescape()
                        .map_err(|err| syntax_at(err, position))?;
                    value.push_str(&unescaped);
                }
                Event::CData(data) => {
                    let chunk = std::str::from_utf8(&data).map_err(|err| syntax_at(err, position))?;
                    value.push_str(chunk);
                }
                Event::End(_) => return Ok(value),
                Event::Start(start) | Event::Empty(start) => {
                    let child = decode_name(start.local_name().as_ref(), position)?;
                    return Err(SedaError::unexpected(child, name));
                }
                Event::Eof => return Err(self.syntax("unexpected end of document")),
                _ => {}
            }
        }
    }

    /// Captures the next element verbatim, returning its local name and
    /// serialized form.
    pub fn read_raw(&mut self) -> SedaResult<(String, String)> {
        let name = match self.peek()? {
            Peeked::Start(name) => name,
            Peeked::Eof => return Err(self.syntax("unexpected end of document")),
            _ => return Err(self.syntax("element expected for raw capture")),
        };
        let mut capture = Writer::new(Vec::new());
        let start_depth = self.depth;
        loop {
            let event = self.pull()?;
            if matches!(event, Event::Eof) {
                return Err(self.syntax("unexpected end of document"));
            }
            capture
                .write_event(event.borrow())
                .map_err(SedaError::xml_write)?;
            if self.depth == start_depth {
                break;
            }
        }
        let raw = String::from_utf8(capture.into_inner())
            .map_err(|err| syntax_at(err, self.position()))?;
        Ok((name, raw))
    }

    /// Consumes events until the depth drops back to `depth`.
    pub fn skip_to_depth(&mut self, depth: usize) -> SedaResult<()> {
        while self.depth > depth {
            if matches!(self.pull()?, Event::Eof) {
                return Err(self.syntax("unexpected end of document"));
            }
        }
        Ok(())
    }

    /// Consumes the whole next element.
    pub fn skip_element(&mut self) -> SedaResult<()> {
        let depth = self.depth;
        self.expect_start(None)?;
        self.skip_to_depth(depth)
    }

    fn fill(&mut self) -> SedaResult<()> {
        if self.pending.is_empty() {
            self.buf.clear();
            let position = self.position();
            let event = self
                .inner
                .read_event_into(&mut self.buf)
                .map_err(|err| syntax_at(err, position))?
                .into_owned();
            self.pending.push_back(event);
        }
        Ok(())
    }

    fn pull(&mut self) -> SedaResult<Event<'static>> {
        self.fill()?;
        let event = self.pending.pop_front().unwrap_or(Event::Eof);
        match &event {
            Event::Start(_) => self.depth += 1,
            Event::End(_) => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        Ok(event)
    }

    fn syntax(&self, message: &str) -> SedaError {
        syntax_at(message, self.position())
    }
}

fn syntax_at(err: impl std::fmt::Display, position: u64) -> SedaError {
    SedaError::XmlSyntax {
        message: err.to_string(),
        position,
    }
}

fn decode_name(raw: &[u8], position: u64) -> SedaResult<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|err| syntax_at(err, position))
}

fn start_tag(start: &BytesStart<'_>, position: u64) -> SedaResult<StartTag> {
    let name = decode_name(start.local_name().as_ref(), position)?;
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| syntax_at(err, position))?;
        let key = decode_name(attribute.key.as_ref(), position)?;
        let value = attribute
            .unescape_value()
            .map_err(|err| syntax_at(err, position))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(StartTag { name, attributes })
}

#[cfg(test)]
mod tests {
    use super::{Peeked, SedaXmlReader};
    use crate::error::SedaError;
    use crate::version::SedaVersion;

    fn reader(xml: &str) -> SedaXmlReader<&[u8]> {
        SedaXmlReader::new(xml.as_bytes(), SedaVersion::V2_1)
    }

    #[test]
    fn empty_elements_expand_into_start_end_pairs() {
        let mut reader = reader("<a><b/><c>x</c></a>");
        reader.expect_start(Some("a")).unwrap();
        let b = reader.expect_start(Some("b")).unwrap();
        assert_eq!(b.name, "b");
        assert_eq!(reader.depth(), 2);
        assert_eq!(reader.read_text("b").unwrap(), "");
        assert_eq!(reader.depth(), 1);
        reader.expect_start(Some("c")).unwrap();
        assert_eq!(reader.read_text("c").unwrap(), "x");
        reader.expect_end("a").unwrap();
        assert_eq!(reader.peek().unwrap(), Peeked::Eof);
    }

    #[test]
    fn raw_capture_keeps_inner_markup() {
        let mut reader = reader("<a>\n  <Gps><V k=\"1\">2</V><W/></Gps>\n</a>");
        reader.expect_start(Some("a")).unwrap();
        let (name, raw) = reader.read_raw().unwrap();
        assert_eq!(name, "Gps");
        assert_eq!(raw, "<Gps><V k=\"1\">2</V><W/></Gps>");
        reader.expect_end("a").unwrap();
    }

    #[test]
    fn mismatched_tags_are_syntax_errors() {
        let mut reader = reader("<a><b></a>");
        reader.expect_start(Some("a")).unwrap();
        reader.expect_start(Some("b")).unwrap();
        let err = reader.read_text("b").unwrap_err();
        assert!(matches!(err, SedaError::XmlSyntax { .. }));
    }

    #[test]
    fn skip_to_depth_drops_remaining_children() {
        let mut reader = reader("<a><u><x>1</x><y><z/></y></u><v/></a>");
        reader.expect_start(Some("a")).unwrap();
        let depth = reader.depth();
        reader.expect_start(Some("u")).unwrap();
        reader.expect_start(Some("x")).unwrap();
        reader.skip_to_depth(depth).unwrap();
        assert_eq!(reader.peek().unwrap(), Peeked::Start("v".to_string()));
    }
}
