//! AnyFn program-mode entry point.
//!
//! Runs any top-level, no-argument func in a Go file as the main func.

use anyhow::Result;
use clap::{Arg, Command};

fn main() -> Result<()> {
    // Logging goes to stderr; stdout carries the program's own output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("anyfn")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run any func in any Go file as the main func")
        .arg(
            Arg::new("file")
                .value_name("GO_FILE")
                .help("Path to the Go file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("func")
                .value_name("FUNC")
                .help("Name of the func to run")
                .required(true)
                .index(2),
        )
        .get_matches();

    let mut file = matches.get_one::<String>("file").unwrap().clone();
    let func = matches.get_one::<String>("func").unwrap().clone();

    // The .go extension can be omitted on the command line.
    if !file.ends_with(".go") {
        file.push_str(".go");
    }

    // Failures are reported as a single line on stdout.
    if let Err(err) = anyfn_core::run_as_main(&file, &func) {
        println!("{err}");
    }
    Ok(())
}
