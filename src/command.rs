// External crates
use clap::ArgMatches;
use log::info;

// Standard library imports
use std::fs;
use std::io::{self, Read, Write};

use crate::error::FormatterError;
use crate::options::{record_from_matches, FormatterConfig};
use crate::parse::convert_bytes_to_array;
use crate::xml_output::XmlDataFormatter;

/// Prints an error the way the tool reports every failure and exits with 1.
fn fail(message: &str) -> ! {
    eprintln!("[restxml] Error: {}", message);
    std::process::exit(1);
}

fn read_input(path: Option<&String>) -> io::Result<Vec<u8>> {
    match path.map(String::as_str) {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(file) => fs::read(file),
    }
}

fn run_parse(matches: &ArgMatches) -> io::Result<()> {
    let input = matches.get_one::<String>("input");
    let xml = match read_input(input) {
        Ok(xml) => xml,
        Err(e) => fail(&format!(
            "Cannot read {}: {}",
            input.map(String::as_str).unwrap_or("stdin"),
            e
        )),
    };

    let document = match convert_bytes_to_array(&xml) {
        Ok(document) => document,
        Err(e) => fail(&e.to_string()),
    };
    info!("Parsed {} element group(s)", document.len());

    let json = serde_json::to_string_pretty(&document).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)
}

fn run_render(matches: &ArgMatches) -> io::Result<()> {
    let formatter = XmlDataFormatter::new(FormatterConfig::from_matches(matches));
    let record = match record_from_matches(matches) {
        Ok(record) => record,
        Err(e) => fail(&e.to_string()),
    };

    let output = if matches.get_flag("header") {
        formatter.convert_data_object(&record)
    } else {
        formatter.convert_data_object_without_header(&record)
    };
    let output = match output {
        Ok(output) => output,
        Err(FormatterError::Io(e)) => return Err(e),
        Err(e) => fail(&e.to_string()),
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output)
}

/// Runs the main logic of the program.
pub fn run(matches: ArgMatches) -> io::Result<()> {
    match matches.subcommand() {
        Some(("parse", sub)) => run_parse(sub),
        Some(("render", sub)) => run_render(sub),
        _ => fail("A subcommand is required (parse or render)"),
    }
}
