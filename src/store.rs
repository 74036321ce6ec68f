//! Rendered document cache.
//!
//! Documents are rendered once, right after the build, and served by name afterwards. Names
//! follow the Swagger UI conventions: `api-docs.json` for the listing and `<resource>.json`
//! for each API declaration.

use crate::document::ResourceListing;
use crate::serializer::{
    api_declaration_document, resource_listing_document, write_to_file, DocumentFormat,
    RESOURCE_LISTING_NAME,
};
use anyhow::Result;
use indexmap::IndexMap;
use log::{debug, info};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

/// Placeholder in resource paths replaced by the document extension.
const FORMAT_PLACEHOLDER: &str = "{format}";

#[derive(Debug, Clone)]
pub struct DocumentStore {
    documents: IndexMap<String, String>,
    generated_at: SystemTime,
    etag: String,
}

impl DocumentStore {
    /// Renders the listing and every resource declaration in each requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be serialized.
    pub fn build(listing: &ResourceListing, formats: &[DocumentFormat]) -> Result<Self> {
        let start = Instant::now();
        let mut documents = IndexMap::new();

        for format in formats {
            let extension = format.extension();
            let listing_doc = format.render(&resource_listing_document(listing))?;
            documents.insert(format!("{}.{}", RESOURCE_LISTING_NAME, extension), listing_doc);

            for entry in &listing.apis {
                let name = entry
                    .path
                    .trim_start_matches('/')
                    .replace(FORMAT_PLACEHOLDER, extension);
                let content = format.render(&api_declaration_document(listing, &entry.declaration))?;
                debug!("Rendered {} ({} bytes)", name, content.len());
                documents.insert(name, content);
            }
        }

        let count = listing.apis.len();
        info!(
            "Generated {} Swagger document{} in {} ms",
            count,
            if count == 1 { "" } else { "s" },
            start.elapsed().as_millis()
        );

        let etag = etag_of(&documents);
        Ok(Self {
            documents,
            generated_at: SystemTime::now(),
            etag,
        })
    }

    /// Looks a document up by request name.
    ///
    /// Leading slashes are ignored, an empty name or `.` means the listing, and a name
    /// without extension is taken as JSON.
    pub fn get(&self, request_name: &str) -> Option<&str> {
        self.documents
            .get(&Self::normalize(request_name))
            .map(String::as_str)
    }

    pub fn normalize(request_name: &str) -> String {
        let name = request_name.trim().trim_start_matches('/');
        if name.is_empty() || name == "." {
            return format!("{}.{}", RESOURCE_LISTING_NAME, DocumentFormat::Json.extension());
        }
        if DocumentFormat::from_name(name).is_some() {
            name.to_string()
        } else {
            format!("{}.{}", name, DocumentFormat::Json.extension())
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Validator shared by every document of this build.
    pub fn etag(&self) -> &str {
        &self.etag
    }

    pub fn generated_at(&self) -> SystemTime {
        self.generated_at
    }

    /// Writes every document below `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be written.
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.documents.len());
        for (name, content) in &self.documents {
            let path = dir.join(name);
            write_to_file(content, &path)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn etag_of(documents: &IndexMap<String, String>) -> String {
    let mut hasher = DefaultHasher::new();
    for (name, content) in documents {
        name.hash(&mut hasher);
        content.hash(&mut hasher);
    }
    format!("\"{:016x}\"", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ResourceDeclaration, ResourceEntry};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn listing(resources: &[&str]) -> ResourceListing {
        let mut listing = ResourceListing::default();
        for name in resources {
            listing.apis.push(ResourceEntry {
                path: format!("/{}.{{format}}", name),
                description: None,
                declaration: ResourceDeclaration::new(*name, "http://localhost:8080", None),
            });
        }
        listing
    }

    #[test]
    fn test_document_names() {
        let store = DocumentStore::build(
            &listing(&["pet", "store"]),
            &[DocumentFormat::Json, DocumentFormat::Yaml],
        )
        .unwrap();

        let names: Vec<&str> = store.names().collect();
        assert_eq!(
            names,
            vec![
                "api-docs.json",
                "pet.json",
                "store.json",
                "api-docs.yaml",
                "pet.yaml",
                "store.yaml"
            ]
        );
    }

    #[test]
    fn test_request_name_normalization() {
        let store = DocumentStore::build(&listing(&["pet"]), &[DocumentFormat::Json]).unwrap();

        let listing_doc = store.get("api-docs.json").unwrap();
        assert_eq!(store.get(""), Some(listing_doc));
        assert_eq!(store.get("."), Some(listing_doc));
        assert_eq!(store.get("/api-docs"), Some(listing_doc));
        assert!(store.get("/pet").unwrap().contains("\"basePath\""));
        assert_eq!(store.get("pet.yaml"), None);
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_etag_follows_content() {
        let one = DocumentStore::build(&listing(&["pet"]), &[DocumentFormat::Json]).unwrap();
        let same = DocumentStore::build(&listing(&["pet"]), &[DocumentFormat::Json]).unwrap();
        let other = DocumentStore::build(&listing(&["store"]), &[DocumentFormat::Json]).unwrap();

        assert_eq!(one.etag(), same.etag());
        assert_ne!(one.etag(), other.etag());
        assert!(one.etag().starts_with('"'));
    }

    #[test]
    fn test_write_all() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("docs");
        let store = DocumentStore::build(&listing(&["pet"]), &[DocumentFormat::Json]).unwrap();

        let written = store.write_all(&out).unwrap();

        assert_eq!(written.len(), 2);
        assert!(out.join("api-docs.json").exists());
        assert_eq!(
            fs::read_to_string(out.join("pet.json")).unwrap(),
            store.get("pet.json").unwrap()
        );
    }

    #[test]
    fn test_empty_listing_still_has_resource_listing() {
        let store = DocumentStore::build(&ResourceListing::default(), &[DocumentFormat::Json]).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("").unwrap().contains("\"swaggerVersion\": \"1.2\""));
    }
}
