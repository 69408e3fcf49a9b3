// Standard library imports
use std::io;

// Import functions
use restxml::parse_args;
use restxml::run;

/// Entry point of the program.
fn main() -> io::Result<()> {
    env_logger::init();
    let matches = parse_args();
    run(matches)
}
