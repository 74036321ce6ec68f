use crate::serializer::DocumentFormat;
use crate::store::DocumentStore;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Swagger From Source - Generate Swagger 1.2 documents from annotated Rust controllers
#[derive(Parser, Debug)]
#[command(name = "swagger-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Document formats to generate (repeatable)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub formats: Vec<DocumentFormat>,

    /// Directory receiving every generated document (if not specified, prints one document)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Document printed to stdout when no output directory is given
    #[arg(short = 'd', long = "document", default_value = "api-docs.json")]
    pub document: String,

    /// Server URL written as base path of every resource
    #[arg(long = "server-name", default_value = "http://localhost:8080")]
    pub server_name: String,

    /// Context path appended to the server URL
    #[arg(long = "context-path", default_value = "")]
    pub context_path: String,

    /// Type carrying the api_info and version tags (if not specified, auto-detect)
    #[arg(long = "routes-type", value_name = "TYPE")]
    pub routes_type: Option<String>,

    /// Additional framework-injected parameter type, never documented (repeatable)
    #[arg(long = "injected-type", value_name = "TYPE")]
    pub injected_types: Vec<String>,

    /// Extra primitive mapping such as `Uuid=string:uuid` (repeatable)
    #[arg(long = "primitive", value_name = "NAME=TYPE[:FORMAT]", value_parser = parse_primitive)]
    pub primitives: Vec<PrimitiveMapping>,

    /// Route source to use (if not specified, both)
    #[arg(short = 's', long = "source", value_enum)]
    pub source: Option<RouteSource>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// Server name followed by the context path.
    pub fn base_url(&self) -> String {
        format!("{}{}", self.server_name, self.context_path)
    }
}

/// A Rust type documented as a Swagger primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveMapping {
    pub type_name: String,
    pub swagger_type: String,
    pub format: Option<String>,
}

/// Parses `Name=type` or `Name=type:format`.
fn parse_primitive(value: &str) -> std::result::Result<PrimitiveMapping, String> {
    let invalid = || format!("expected NAME=TYPE[:FORMAT], got '{}'", value);
    let (type_name, rest) = value.split_once('=').ok_or_else(invalid)?;
    let (swagger_type, format) = match rest.split_once(':') {
        Some((swagger_type, format)) => (swagger_type, Some(format.trim())),
        None => (rest, None),
    };

    let type_name = type_name.trim();
    let swagger_type = swagger_type.trim();
    if type_name.is_empty() || swagger_type.is_empty() || format == Some("") {
        return Err(invalid());
    }
    Ok(PrimitiveMapping {
        type_name: type_name.to_string(),
        swagger_type: swagger_type.to_string(),
        format: format.map(String::from),
    })
}

/// Where routes are read from
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum RouteSource {
    /// `router.get().route("/uri").with(Type::handler)` chains
    Router,
    /// `#[path]` and verb attributes on controller methods
    Annotated,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(mut args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        return Err(crate::error::Error::InvalidArgument(format!(
            "Project path does not exist: {}",
            args.project_path.display()
        ))
        .into());
    }

    if !args.project_path.is_dir() {
        return Err(crate::error::Error::InvalidArgument(format!(
            "Project path is not a directory: {}",
            args.project_path.display()
        ))
        .into());
    }

    let mut formats = Vec::new();
    for format in args.formats.drain(..) {
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        formats.push(DocumentFormat::Json);
    }
    args.formats = formats;

    info!("Project path: {}", args.project_path.display());
    info!("Formats: {:?}", args.formats);
    info!("Base URL: {}", args.base_url());
    if let Some(ref output) = args.output_dir {
        info!("Output directory: {}", output.display());
    } else {
        info!("Output: stdout ({})", args.document);
    }
    if let Some(ref source) = args.source {
        info!("Route source: {:?}", source);
    } else {
        info!("Route source: router table and annotations");
    }

    Ok(args)
}

/// Scan, parse, build and render; returns the rendered documents.
pub fn generate(args: &CliArgs) -> Result<DocumentStore> {
    use crate::builder::type_mapper::PrimitiveTable;
    use crate::builder::DocumentBuilder;
    use crate::descriptor::{ExtractorRegistry, Route};
    use crate::extractor::annotated::AnnotatedExtractor;
    use crate::extractor::router::RouterExtractor;
    use crate::extractor::RouteExtractor;
    use crate::parser::{AstParser, ParsedFile};
    use crate::scanner::FileScanner;
    use crate::type_resolver::TypeResolver;

    // Step 1: Scan directory for Rust files
    info!("Scanning project directory...");
    let scanner = FileScanner::new(args.project_path.clone());
    let scan_result = scanner.scan().context("Failed to scan project directory")?;

    info!("Found {} Rust files", scan_result.rust_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }

    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Parse files into AST
    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.rust_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping file due to parse error: {}", e);
                None
            }
        })
        .collect();

    info!("Successfully parsed {} files", parsed_files.len());

    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    // Step 3: Catalog types, controllers and capabilities
    info!("Resolving types and controllers...");
    let mut table = TypeResolver::new(&parsed_files).resolve();

    // Step 4: Extract routes, router table first
    info!("Extracting routes...");
    let extractors: Vec<(RouteSource, Box<dyn RouteExtractor>)> = vec![
        (RouteSource::Router, Box::new(RouterExtractor)),
        (RouteSource::Annotated, Box::new(AnnotatedExtractor)),
    ];
    let mut routes: Vec<Route> = Vec::new();
    for (source, extractor) in &extractors {
        if args.source.is_some_and(|forced| forced != *source) {
            continue;
        }
        let extracted = extractor.extract_routes(&parsed_files);
        debug!("Extracted {} routes from {:?}", extracted.len(), source);
        routes.extend(extracted);
    }

    info!("Extracted {} total routes", routes.len());
    if routes.is_empty() {
        warn!("No routes found in the project");
    }

    let route_count = routes.len();
    for route in routes {
        table.register_route(route);
    }

    // Step 5: Build the resource listing
    let routes_type = args
        .routes_type
        .clone()
        .or_else(|| table.find_routes_type().map(String::from));
    match routes_type {
        Some(ref name) => info!("Using {} for API info", name),
        None => debug!("No type carries api_info"),
    }

    let mut injected = ExtractorRegistry::default();
    for type_name in &args.injected_types {
        injected.register(type_name.clone());
    }

    let mut primitives = PrimitiveTable::default();
    for mapping in &args.primitives {
        debug!("Documenting {} as {}", mapping.type_name, mapping.swagger_type);
        primitives.insert(
            &mapping.type_name,
            &mapping.swagger_type,
            mapping.format.as_deref(),
        );
    }

    info!("Building Swagger resource listing...");
    let listing = DocumentBuilder::new(&table)
        .with_primitives(primitives)
        .with_injected_types(injected)
        .build(routes_type.as_deref(), &args.base_url());

    if listing.apis.is_empty() {
        warn!("No documented resources found, the resource listing is empty");
    }

    // Step 6: Render documents
    let store = DocumentStore::build(&listing, &args.formats)
        .context("Failed to render Swagger documents")?;

    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.rust_files.len());
    info!("  - Files parsed: {}", parsed_files.len());
    info!("  - Routes found: {}", route_count);
    info!("  - Resources documented: {}", listing.apis.len());
    info!(
        "  - Operations documented: {}",
        listing
            .declarations()
            .map(|d| d.operations().count())
            .sum::<usize>()
    );

    Ok(store)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");
    let store = generate(&args)?;

    if let Some(output_dir) = &args.output_dir {
        info!("Writing documents to: {}", output_dir.display());
        let written = store
            .write_all(output_dir)
            .with_context(|| format!("Failed to write documents to {}", output_dir.display()))?;
        info!("Successfully wrote {} documents", written.len());
    } else {
        let Some(content) = store.get(&args.document) else {
            let available: Vec<&str> = store.names().collect();
            anyhow::bail!(
                "Document {} was not generated. Available documents: {}",
                DocumentStore::normalize(&args.document),
                available.join(", ")
            );
        };
        println!("{}", content);
    }

    info!("Generation complete!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["swagger-from-source", "."]).unwrap();

        assert_eq!(args.formats, vec![DocumentFormat::Json]);
        assert_eq!(args.document, "api-docs.json");
        assert_eq!(args.base_url(), "http://localhost:8080");
        assert_eq!(args.source, None);
        assert!(args.injected_types.is_empty());
        assert!(args.primitives.is_empty());
    }

    #[test]
    fn test_primitive_option() {
        let args = CliArgs::try_parse_from([
            "swagger-from-source",
            ".",
            "--primitive",
            "Uuid=string:uuid",
            "--primitive",
            "Decimal=number",
        ])
        .unwrap();

        assert_eq!(
            args.primitives,
            vec![
                PrimitiveMapping {
                    type_name: "Uuid".to_string(),
                    swagger_type: "string".to_string(),
                    format: Some("uuid".to_string()),
                },
                PrimitiveMapping {
                    type_name: "Decimal".to_string(),
                    swagger_type: "number".to_string(),
                    format: None,
                },
            ]
        );

        for bad in ["Uuid", "=string", "Uuid=", "Uuid=string:"] {
            assert!(parse_primitive(bad).is_err(), "{} should be rejected", bad);
            assert!(CliArgs::try_parse_from(["swagger-from-source", ".", "--primitive", bad]).is_err());
        }
    }

    #[test]
    fn test_repeated_options() {
        let args = CliArgs::try_parse_from([
            "swagger-from-source",
            ".",
            "-f",
            "yaml",
            "-f",
            "json",
            "-f",
            "yaml",
            "--context-path",
            "/app",
            "--injected-type",
            "DbPool",
            "-s",
            "annotated",
        ])
        .unwrap();
        let args = parse_args_from_parsed(args).unwrap();

        assert_eq!(args.formats, vec![DocumentFormat::Yaml, DocumentFormat::Json]);
        assert_eq!(args.base_url(), "http://localhost:8080/app");
        assert_eq!(args.injected_types, vec!["DbPool"]);
        assert_eq!(args.source, Some(RouteSource::Annotated));
    }

    #[test]
    fn test_invalid_project_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("lib.rs");
        std::fs::write(&file, "").unwrap();

        let missing = CliArgs::try_parse_from([
            "swagger-from-source",
            temp_dir.path().join("missing").to_str().unwrap(),
        ])
        .unwrap();
        assert!(parse_args_from_parsed(missing).is_err());

        let not_dir =
            CliArgs::try_parse_from(["swagger-from-source", file.to_str().unwrap()]).unwrap();
        let err = parse_args_from_parsed(not_dir).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
