use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::options::DEFAULT_BASE_URL;

/// Builds the command-line interface.
pub fn build_command() -> Command {
    let bold_underline = "\x1b[1;4m";
    let bold = "\x1b[1m";
    let reset = "\x1b[0m";

    Command::new("restxml")
        .version(clap::crate_version!())
        .about(format!(
            "\n\n{}Program:{} {}restxml{} (REST API XML data formatter)\n\
            Version: {}",
            bold_underline,
            reset,
            bold,
            reset,
            clap::crate_version!()
        ))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parse")
                .about("Parse an XML document into JSON, rejecting custom entities")
                .arg(
                    Arg::new("input")
                        .help("XML file to parse, or - for stdin [stdin]")
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render a record as an XML element with an href link")
                .arg(
                    Arg::new("type")
                        .short('t')
                        .long("type")
                        .value_name("NAME")
                        .help("Fully-qualified record type name (required)")
                        .required(true),
                )
                .arg(
                    Arg::new("id")
                        .short('i')
                        .long("id")
                        .value_name("ID")
                        .help("Record identifier (required)")
                        .required(true),
                )
                .arg(
                    Arg::new("field")
                        .short('f')
                        .long("field")
                        .value_name("NAME=VALUE")
                        .help("Field to render, may be repeated")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("has-one")
                        .long("has-one")
                        .value_name("RELATION=TYPE:ID")
                        .help("Has-one relation to link, may be repeated")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("base-url")
                        .short('b')
                        .long("base-url")
                        .value_name("URL")
                        .help(format!("Absolute API root URL [{}]", DEFAULT_BASE_URL)),
                )
                .arg(
                    Arg::new("trailing-slash")
                        .long("trailing-slash")
                        .help("Add trailing slashes to generated links [false]")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("header")
                        .long("header")
                        .help("Prefix the output with the XML declaration [false]")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("fields")
                        .long("fields")
                        .value_name("A,B")
                        .help("Only render these fields (ID is always kept)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("remove-fields")
                        .long("remove-fields")
                        .value_name("A,B")
                        .help("Never render these fields")
                        .action(ArgAction::Append),
                ),
        )
}

/// Parses command-line arguments using clap.
pub fn parse_args() -> ArgMatches {
    build_command().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_consistent() {
        build_command().debug_assert();
    }

    #[test]
    fn test_render_requires_type_and_id() {
        let result = build_command().try_get_matches_from(vec!["restxml", "render", "--id", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_input_is_optional() {
        let matches = build_command()
            .try_get_matches_from(vec!["restxml", "parse"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "parse");
        assert!(sub.get_one::<String>("input").is_none());
    }
}
