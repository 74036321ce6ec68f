use crate::error::Error;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parses Rust source files with `syn`.
///
/// Only the item structure and attributes matter to the catalog and the route extractors, so
/// function bodies are kept but never type-checked.
pub struct AstParser;

/// A successfully parsed Rust file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file, also used to derive module paths of the types it defines
    pub path: PathBuf,
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Parses source text that claims to live at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid Rust syntax.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content)
            .map_err(|e| Error::ParseError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Reads and parses a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Self::parse_source(path, &content)
    }

    /// Parses every file, keeping the failures so the caller can report them.
    ///
    /// A broken file only removes its own routes and types from the generated documents.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).map_err(|e| {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
