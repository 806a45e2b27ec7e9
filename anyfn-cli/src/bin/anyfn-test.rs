//! AnyFn test-mode entry point.
//!
//! Runs any top-level, no-argument func in a Go file through a synthesized
//! `go test` harness, from within the enclosing Go module.

use anyhow::Result;
use clap::{Arg, Command};

fn main() -> Result<()> {
    // Logging goes to stderr; stdout carries the test runner's output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("anyfn-test")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run any func in any Go file through a go test harness")
        .arg(
            Arg::new("file")
                .value_name("GO_FILE")
                .help("Path to the Go file holding the func")
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
    if let Err(err) = anyfn_core::run_as_test(&file, &func) {
        println!("{err}");
    }
    Ok(())
}
