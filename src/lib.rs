//! Swagger From Source - Swagger 1.2 documentation from annotated Rust web projects.
//!
//! The library reads a project's route table and the documentation attributes attached to
//! its controllers, handlers, parameters and types, then synthesizes a Swagger 1.2 resource
//! listing: one resource per documented controller, its operations grouped by URI, their
//! parameters, and every model reachable from them.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into Abstract Syntax Trees (AST)
//! 3. [`type_resolver`] - Catalogs types, controllers and capability traits
//! 4. [`extractor`] - Extracts the route table (router chains or annotated methods)
//! 5. [`descriptor`] - Routes, definitions and their [`attributes`]-derived tags
//! 6. [`builder`] - Synthesizes the [`document`] model
//! 7. [`serializer`] - Maps the document onto Swagger 1.2 JSON/YAML
//! 8. [`store`] - Caches the rendered documents by name
//!
//! # Example Usage
//!
//! ```no_run
//! use swagger_from_source::{
//!     builder::DocumentBuilder,
//!     extractor::{router::RouterExtractor, RouteExtractor},
//!     parser::AstParser,
//!     scanner::FileScanner,
//!     serializer::DocumentFormat,
//!     store::DocumentStore,
//!     type_resolver::TypeResolver,
//! };
//! use std::path::PathBuf;
//!
//! // Scan and parse the project
//! let scan_result = FileScanner::new(PathBuf::from("./petstore")).scan().unwrap();
//! let parsed_files: Vec<_> = AstParser::parse_files(&scan_result.rust_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//!
//! // Catalog definitions, then register the route table
//! let mut table = TypeResolver::new(&parsed_files).resolve();
//! for route in RouterExtractor.extract_routes(&parsed_files) {
//!     table.register_route(route);
//! }
//!
//! // Build and render
//! let routes_type = table.find_routes_type().map(String::from);
//! let listing = DocumentBuilder::new(&table).build(routes_type.as_deref(), "http://localhost:8080");
//! let store = DocumentStore::build(&listing, &[DocumentFormat::Json]).unwrap();
//! println!("{}", store.get("api-docs.json").unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod attributes;
pub mod builder;
pub mod cli;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod scanner;
pub mod serializer;
pub mod store;
pub mod type_resolver;
