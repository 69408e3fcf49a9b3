// External crates
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

// Standard library imports
use std::io::{self, Write};

use crate::error::{FormatterError, Result};
use crate::link::{build_link, normalise_trailing_slash};
use crate::options::FormatterConfig;
use crate::parse::{convert_string_to_array, ParsedDocument};
use crate::record::{RecordView, ID_FIELD};
use crate::xml::{is_xml_char, is_xml_name, xml_escape};

// Constants for XML output
pub const XML_VERSION: &str = "1.0";
pub const XML_ENCODING: &str = "UTF-8";
pub const TAG_ARRAY_LIST: &str = "ArrayList";
pub const FORMAT_EXTENSION: &str = "xml";
pub const OUTPUT_CONTENT_TYPE: &str = "text/xml";
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xml"];
pub const SUPPORTED_MIME_TYPES: &[&str] = &["text/xml", "application/xml"];

pub fn output_xml_header<W: Write>(writer: &mut Writer<W>) -> io::Result<()> {
    writer
        .write_event(Event::Decl(BytesDecl::new(
            XML_VERSION,
            Some(XML_ENCODING),
            None,
        )))
        .map_err(io::Error::other)?;
    Ok(())
}

/// Fails unless `name` can be used as an element name.
fn checked_name(name: &str) -> Result<&str> {
    if is_xml_name(name) {
        Ok(name)
    } else {
        Err(FormatterError::InvalidArgument(format!(
            "{:?} is not a valid XML name",
            name
        )))
    }
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(io::Error::other)?;
    if !text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::from_escaped(xml_escape(text))))
            .map_err(io::Error::other)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(io::Error::other)?;
    Ok(())
}

/// Formats records as XML and parses XML request bodies.
#[derive(Debug, Clone, Default)]
pub struct XmlDataFormatter {
    config: FormatterConfig,
}

impl XmlDataFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        XmlDataFormatter { config }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    pub fn supported_extensions(&self) -> &'static [&'static str] {
        SUPPORTED_EXTENSIONS
    }

    pub fn supported_mime_types(&self) -> &'static [&'static str] {
        SUPPORTED_MIME_TYPES
    }

    pub fn output_content_type(&self) -> &'static str {
        OUTPUT_CONTENT_TYPE
    }

    /// Parses a request body. See [`convert_string_to_array`].
    pub fn convert_string_to_array(&self, xml: &str) -> Result<ParsedDocument> {
        convert_string_to_array(xml)
    }

    /// Absolute link to a record of type `label` with identifier `id`.
    pub fn record_link(&self, label: &str, id: &str) -> Result<String> {
        let file = format!("{}.{}", id, FORMAT_EXTENSION);
        let mut url = build_link(&self.config.base_url, &[label, file.as_str()])?;
        normalise_trailing_slash(&mut url, self.config.add_trailing_slash);
        Ok(url.into())
    }

    /// Whether a field survives the configured field filters. `ID` is kept
    /// unless explicitly removed.
    fn includes_field(&self, name: &str) -> bool {
        if self.config.remove_fields.iter().any(|f| f == name) {
            return false;
        }
        name == ID_FIELD
            || self.config.custom_fields.is_empty()
            || self.config.custom_fields.iter().any(|f| f == name)
    }

    fn write_record<W: Write>(&self, writer: &mut Writer<W>, record: &RecordView) -> Result<()> {
        let label = checked_name(record.label())?;
        let href = self.record_link(label, &record.id().to_string())?;

        let mut element = BytesStart::new(label);
        element.push_attribute(("href", href.as_str()));
        writer
            .write_event(Event::Start(element))
            .map_err(io::Error::other)?;

        for (name, value) in record.fields() {
            if self.includes_field(name) {
                write_text_element(writer, checked_name(name)?, &value.to_string())?;
            }
        }

        for relation in record.has_one() {
            if !self.includes_field(&relation.name) {
                continue;
            }
            let name = checked_name(&relation.name)?;
            let target_id = relation.target_id.to_string();
            let href = self.record_link(&relation.target_label, &target_id)?;
            let target_id: String = target_id.chars().filter(|c| is_xml_char(*c)).collect();
            let mut link = BytesStart::new(name);
            link.push_attribute(("linktype", "has_one"));
            link.push_attribute(("href", href.as_str()));
            link.push_attribute(("id", target_id.as_str()));
            writer
                .write_event(Event::Start(link))
                .map_err(io::Error::other)?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(io::Error::other)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(label)))
            .map_err(io::Error::other)?;
        Ok(())
    }

    fn render<F>(&self, body: F) -> Result<String>
    where
        F: FnOnce(&mut Writer<Vec<u8>>) -> Result<()>,
    {
        let mut writer = Writer::new(Vec::new());
        body(&mut writer)?;
        let bytes = writer.into_inner();
        Ok(String::from_utf8(bytes).map_err(io::Error::other)?)
    }

    /// Renders one record as an element without the XML declaration.
    pub fn convert_data_object_without_header(&self, record: &RecordView) -> Result<String> {
        debug!("Rendering {} #{}", record.label(), record.id());
        self.render(|writer| self.write_record(writer, record))
    }

    /// Renders one record preceded by the XML declaration.
    pub fn convert_data_object(&self, record: &RecordView) -> Result<String> {
        self.render(|writer| {
            output_xml_header(writer)?;
            writer.get_mut().push(b'\n');
            self.write_record(writer, record)
        })
    }

    /// Renders a list of records inside an `ArrayList` element.
    pub fn convert_data_object_set(&self, records: &[RecordView]) -> Result<String> {
        debug!("Rendering set of {} record(s)", records.len());
        self.render(|writer| {
            output_xml_header(writer)?;
            writer.get_mut().push(b'\n');
            let total = records.len().to_string();
            let mut list = BytesStart::new(TAG_ARRAY_LIST);
            list.push_attribute(("totalSize", total.as_str()));
            writer
                .write_event(Event::Start(list))
                .map_err(io::Error::other)?;
            for record in records {
                writer.get_mut().push(b'\n');
                self.write_record(writer, record)?;
            }
            writer.get_mut().push(b'\n');
            writer
                .write_event(Event::End(BytesEnd::new(TAG_ARRAY_LIST)))
                .map_err(io::Error::other)?;
            Ok(())
        })
    }
}
