//! Swagger From Source - Command-line tool for generating Swagger 1.2 documentation.
//!
//! Reads the route table and the documentation attributes of a Rust web project and writes
//! the Swagger 1.2 resource listing plus one API declaration per resource.
//!
//! # Usage
//!
//! ```bash
//! swagger-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Print the resource listing:
//! ```bash
//! swagger-from-source ./petstore
//! ```
//!
//! Print one API declaration:
//! ```bash
//! swagger-from-source ./petstore -d pet
//! ```
//!
//! Write every document as JSON and YAML:
//! ```bash
//! swagger-from-source ./petstore -f json -f yaml -o ./api-docs
//! ```
//!
//! Document a third-party id type as a string:
//! ```bash
//! swagger-from-source ./petstore --primitive Uuid=string:uuid
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! swagger-from-source ./petstore -v
//! ```

mod attributes;
mod builder;
mod cli;
mod descriptor;
mod document;
mod error;
mod extractor;
mod parser;
mod scanner;
mod serializer;
mod store;
mod type_resolver;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag, validate after the logger is up
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Swagger From Source starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
