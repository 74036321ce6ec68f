//! Route table extraction.
//!
//! Two sources are supported:
//!
//! - [`router::RouterExtractor`]: explicit route tables written as builder chains,
//!   `router.get().route("/pet/{petId}").with(PetController::get_pet_by_id)`
//! - [`annotated::AnnotatedExtractor`]: controllers whose methods carry `#[path]` and verb
//!   attributes
//!
//! # Example
//!
//! ```no_run
//! use swagger_from_source::extractor::{RouteExtractor, router::RouterExtractor};
//! use swagger_from_source::parser::AstParser;
//! use std::path::Path;
//!
//! let parsed = AstParser::parse_file(Path::new("src/routes.rs")).unwrap();
//! let routes = RouterExtractor.extract_routes(&[parsed]);
//! println!("Found {} routes", routes.len());
//! ```

pub mod annotated;
pub mod router;

use crate::descriptor::Route;
use crate::parser::ParsedFile;
use syn::{Expr, Lit};

/// Trait for extracting the route table from parsed Rust files.
pub trait RouteExtractor {
    /// Extracts every route, in table order.
    ///
    /// # Arguments
    ///
    /// * `parsed_files` - All successfully parsed Rust source files in the project
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<Route>;
}

/// Extract a string literal from an expression
pub(crate) fn extract_string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Some(lit_str.value()),
            _ => None,
        },
        _ => None,
    }
}

/// Joins two path fragments with exactly one `/` between them.
pub(crate) fn combine_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }

    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// Rewrites `:name` segments to the `{name}` form used by Swagger.
pub(crate) fn normalize_uri(uri: &str) -> String {
    uri.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{}}}", name),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
