#![deny(missing_docs)]

//! # oasgen
//!
//! Command Line Interface for the OpenAPI schema model compiler.
//!
//! Reads an OpenAPI 3.x document and writes:
//! - a models file with serde types and their validation routines,
//! - a handler file with an async handler trait and its route table.

use clap::Parser;
use oasgen_core::RustEmitter;
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod error;
mod generator;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Generates a handler trait, route table and models from an OpenAPI document"
)]
struct Cli {
    #[clap(flatten)]
    generate: generator::GenerateArgs,

    /// Log more (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let emitter = RustEmitter::new();
    let written = generator::execute(&cli.generate, &emitter, &command_line)?;
    for path in written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["oasgen", "--spec", "api.yaml"]).unwrap();
        assert_eq!(cli.generate.spec.to_str(), Some("api.yaml"));
        assert_eq!(cli.generate.path.to_str(), Some("."));
        assert_eq!(cli.generate.output.to_str(), Some("handlers.rs"));
        assert_eq!(cli.generate.models.to_str(), Some("models.rs"));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_enum_flags() {
        let cli = Cli::try_parse_from([
            "oasgen",
            "--spec",
            "api.yaml",
            "--path-style",
            "braces",
            "--field-naming",
            "bare",
            "-vv",
        ])
        .unwrap();
        assert_eq!(
            cli.generate.path_style,
            Some(oasgen_core::PathStyle::Braces)
        );
        assert_eq!(
            cli.generate.field_naming,
            Some(oasgen_core::FieldNaming::Bare)
        );
        assert_eq!(cli.verbose, 2);
    }
}
