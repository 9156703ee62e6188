//! Streaming XML writer.

use crate::error::{SedaError, SedaResult};
use crate::version::SedaVersion;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Thin wrapper over [`quick_xml::Writer`] speaking in element names.
pub struct SedaXmlWriter<W: Write> {
    inner: Writer<W>,
    version: SedaVersion,
}

impl<W: Write> SedaXmlWriter<W> {
    /// Creates a writer; `indent` is the number of spaces per level, 0 for
    /// compact output.
    pub fn new(sink: W, indent: usize, version: SedaVersion) -> Self {
        let inner = if indent == 0 {
            Writer::new(sink)
        } else {
            Writer::new_with_indent(sink, b' ', indent)
        };
        Self { inner, version }
    }

    pub fn version(&self) -> SedaVersion {
        self.version
    }

    pub fn write_declaration(&mut self) -> SedaResult<()> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub fn start(&mut self, name: &str) -> SedaResult<()> {
        self.emit(Event::Start(BytesStart::new(name)))
    }

    pub fn start_with(&mut self, name: &str, attributes: &[(&str, &str)]) -> SedaResult<()> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.emit(Event::Start(start))
    }

    pub fn end(&mut self, name: &str) -> SedaResult<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str) -> SedaResult<()> {
        self.emit(Event::Empty(BytesStart::new(name)))
    }

    /// Writes `<name attrs>value</name>`, escaping the value. An empty
    /// value is written as an empty element.
    pub fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        value: &str,
    ) -> SedaResult<()> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        if value.is_empty() {
            return self.emit(Event::Empty(start));
        }
        self.emit(Event::Start(start))?;
        self.emit(Event::Text(BytesText::new(value)))?;
        self.end(name)
    }

    /// Writes an already serialized element as is, at the current
    /// indentation.
    pub fn raw_block(&mut self, raw: &str) -> SedaResult<()> {
        self.inner.write_indent().map_err(SedaError::xml_write)?;
        self.inner
            .get_mut()
            .write_all(raw.as_bytes())
            .map_err(SedaError::xml_write)
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    fn emit(&mut self, event: Event<'_>) -> SedaResult<()> {
        self.inner.write_event(event).map_err(SedaError::xml_write)
    }
}
