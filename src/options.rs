use clap::ArgMatches;

use crate::error::{FormatterError, Result};
use crate::record::{FieldValue, HasOneRelation, RecordView};
use crate::xml::is_xml_name;

pub const DEFAULT_BASE_URL: &str = "http://localhost/api/v1/";

/// Settings the formatter reads when building links and choosing fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterConfig {
    /// Absolute root URL of the API, e.g. `http://host/api/v1/`
    pub base_url: String,
    pub add_trailing_slash: bool,
    /// When non-empty, only these fields (and `ID`) are rendered
    pub custom_fields: Vec<String>,
    pub remove_fields: Vec<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        FormatterConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            add_trailing_slash: false,
            custom_fields: Vec::new(),
            remove_fields: Vec::new(),
        }
    }
}

fn split_list(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| {
            values
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl FormatterConfig {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let base_url = matches
            .get_one::<String>("base-url")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        FormatterConfig {
            base_url,
            add_trailing_slash: matches.get_flag("trailing-slash"),
            custom_fields: split_list(matches, "fields"),
            remove_fields: split_list(matches, "remove-fields"),
        }
    }
}

/// Parses a `Name=Value` field argument. Integer-looking values become
/// integers, everything else stays text.
pub fn parse_field(arg: &str) -> Result<(String, FieldValue)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| FormatterError::InvalidArgument(format!("expected NAME=VALUE, got {:?}", arg)))?;
    let name = name.trim();
    if !is_xml_name(name) {
        return Err(FormatterError::InvalidArgument(format!(
            "invalid field name in {:?}",
            arg
        )));
    }
    let value = match value.parse::<i64>() {
        Ok(n) => FieldValue::Int(n),
        Err(_) => FieldValue::Text(value.to_string()),
    };
    Ok((name.to_string(), value))
}

/// Parses a `Relation=Type:ID` has-one argument.
pub fn parse_has_one(arg: &str) -> Result<HasOneRelation> {
    let invalid = || FormatterError::InvalidArgument(format!("expected RELATION=TYPE:ID, got {:?}", arg));
    let (name, target) = arg.split_once('=').ok_or_else(invalid)?;
    let (target_type, target_id) = target.rsplit_once(':').ok_or_else(invalid)?;
    if !is_xml_name(name) || target_type.is_empty() || target_id.is_empty() {
        return Err(invalid());
    }
    Ok(HasOneRelation::new(name, target_type, target_id))
}

/// Builds the record described by the `render` subcommand's arguments.
pub fn record_from_matches(matches: &ArgMatches) -> Result<RecordView> {
    let type_name = matches
        .get_one::<String>("type")
        .ok_or_else(|| FormatterError::InvalidArgument("--type is required".to_string()))?;
    let id = matches
        .get_one::<String>("id")
        .ok_or_else(|| FormatterError::InvalidArgument("--id is required".to_string()))?;

    let mut record = RecordView::new(type_name, id.as_str());
    if let Some(fields) = matches.get_many::<String>("field") {
        for field in fields {
            let (name, value) = parse_field(field)?;
            record = record.with_field(&name, value);
        }
    }
    if let Some(relations) = matches.get_many::<String>("has-one") {
        for relation in relations {
            record = record.with_has_one(parse_has_one(relation)?);
        }
    }
    Ok(record)
}
