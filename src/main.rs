//! Doccheck CLI entry point.

use clap::Parser;
use doccheck::cli::{self, Cli, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    doccheck::init_tracing();

    let exit_code = match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
