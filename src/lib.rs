// src/lib.rs

pub mod args;
pub mod command;
pub mod error;
pub mod link;
pub mod options;
pub mod parse;
pub mod record;
pub mod xml;
pub mod xml_output;

pub use args::parse_args;
pub use command::run;
pub use error::{FormatterError, PARSE_ERROR_MESSAGE};
pub use options::FormatterConfig;
pub use parse::{convert_bytes_to_array, convert_string_to_array, ParsedDocument, ParsedValue};
pub use record::{FieldValue, HasOneRelation, RecordId, RecordView};
pub use xml::xml_escape;
pub use xml_output::XmlDataFormatter;
