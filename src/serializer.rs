//! Swagger 1.2 wire format.
//!
//! The document model of [`crate::document`] is mapped onto the shapes Swagger UI expects:
//! one resource listing plus one API declaration per resource. Both are plain serde structs
//! and can be rendered as JSON or YAML.

use crate::document::{
    AuthorizationType, Constraints, Info, Model, Operation, Parameter, ResourceDeclaration,
    ResourceListing, TypeDescriptor,
};
use anyhow::{Context, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Name of the resource listing document, without extension.
pub const RESOURCE_LISTING_NAME: &str = "api-docs";

/// Output formats of the document writer
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Pretty printed JSON
    Json,
    /// YAML
    Yaml,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }

    /// Format of a document name, from its extension.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        match extension {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }

    pub fn render<T: Serialize>(&self, doc: &T) -> Result<String> {
        match self {
            DocumentFormat::Json => serialize_json(doc),
            DocumentFormat::Yaml => serialize_yaml(doc),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerResourceListing {
    pub api_version: String,
    pub swagger_version: String,
    pub apis: Vec<SwaggerResourceReference>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub authorizations: IndexMap<String, SwaggerAuthorization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<SwaggerInfo>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwaggerResourceReference {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwaggerAuthorization {
    #[serde(rename = "type")]
    pub auth_type: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
}

/// Authorization references: scheme name to scopes. Scopes are always empty for basic auth.
pub type SwaggerAuthorizationRefs = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerApiDeclaration {
    pub api_version: String,
    pub swagger_version: String,
    pub base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub authorizations: SwaggerAuthorizationRefs,
    pub apis: Vec<SwaggerApi>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub models: IndexMap<String, SwaggerModel>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwaggerApi {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operations: Vec<SwaggerOperation>,
}

/// Type fields shared by operations, parameters and properties.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerDataType {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<SwaggerItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwaggerItems {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerOperation {
    pub method: String,
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub data_type: SwaggerDataType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub authorizations: SwaggerAuthorizationRefs,
    pub parameters: Vec<SwaggerParameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_messages: Vec<SwaggerResponseMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerParameter {
    pub param_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub allow_multiple: bool,
    #[serde(flatten)]
    pub data_type: SwaggerDataType,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerResponseMessage {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwaggerModel {
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    pub properties: IndexMap<String, SwaggerProperty>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwaggerProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub data_type: SwaggerDataType,
}

/// How a model reference is written at the top level of a data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelStyle {
    /// `"type": "Pet"` (operations, parameters)
    Type,
    /// `"$ref": "Pet"` (model properties)
    Reference,
}

fn data_type(descriptor: &TypeDescriptor, style: ModelStyle) -> SwaggerDataType {
    match descriptor {
        TypeDescriptor::Primitive {
            swagger_type,
            format,
        } => SwaggerDataType {
            data_type: Some(swagger_type.clone()),
            format: format.clone(),
            ..Default::default()
        },
        TypeDescriptor::Enum { allowed_values } => SwaggerDataType {
            data_type: Some("string".to_string()),
            allowed_values: allowed_values.clone(),
            ..Default::default()
        },
        TypeDescriptor::ArrayOf {
            items,
            unique_items,
        } => SwaggerDataType {
            data_type: Some("array".to_string()),
            items: Some(array_items(items)),
            unique_items: unique_items.then_some(true),
            ..Default::default()
        },
        TypeDescriptor::ModelRef { model_id } => match style {
            ModelStyle::Type => SwaggerDataType {
                data_type: Some(model_id.clone()),
                ..Default::default()
            },
            ModelStyle::Reference => SwaggerDataType {
                reference: Some(model_id.clone()),
                ..Default::default()
            },
        },
    }
}

fn array_items(items: &TypeDescriptor) -> SwaggerItems {
    let mut swagger_items = SwaggerItems {
        data_type: None,
        reference: None,
        format: None,
        allowed_values: Vec::new(),
    };
    match items {
        TypeDescriptor::Primitive {
            swagger_type,
            format,
        } => {
            swagger_items.data_type = Some(swagger_type.clone());
            swagger_items.format = format.clone();
        }
        TypeDescriptor::Enum { allowed_values } => {
            swagger_items.data_type = Some("string".to_string());
            swagger_items.allowed_values = allowed_values.clone();
        }
        TypeDescriptor::ModelRef { model_id } => {
            swagger_items.reference = Some(model_id.clone());
        }
        // nested arrays are rejected by the type mapper
        TypeDescriptor::ArrayOf { .. } => {
            swagger_items.data_type = Some("array".to_string());
        }
    }
    swagger_items
}

fn with_constraints(mut data_type: SwaggerDataType, constraints: &Constraints) -> SwaggerDataType {
    data_type.minimum = constraints.minimum.clone();
    data_type.maximum = constraints.maximum.clone();
    data_type.default_value = constraints.default_value.clone();
    if !constraints.allowed_values.is_empty() {
        data_type.allowed_values = constraints.allowed_values.clone();
    }
    data_type
}

fn authorization_refs(authorizations: &[AuthorizationType]) -> SwaggerAuthorizationRefs {
    authorizations
        .iter()
        .map(|a| (a.name().to_string(), Vec::new()))
        .collect()
}

fn info_document(info: &Info) -> Option<SwaggerInfo> {
    if info.is_empty() {
        return None;
    }
    Some(SwaggerInfo {
        title: info.title.clone(),
        description: info.description.clone(),
        terms_of_service_url: info.terms_of_service_url.clone(),
        contact: info.contact.clone(),
        license: info.license.clone(),
        license_url: info.license_url.clone(),
    })
}

/// Maps the listing onto the top-level `api-docs` document.
pub fn resource_listing_document(listing: &ResourceListing) -> SwaggerResourceListing {
    SwaggerResourceListing {
        api_version: listing.api_version.clone(),
        swagger_version: listing.swagger_version.clone(),
        apis: listing
            .apis
            .iter()
            .map(|entry| SwaggerResourceReference {
                path: entry.path.clone(),
                description: entry.description.clone(),
            })
            .collect(),
        authorizations: listing
            .authorizations
            .iter()
            .map(|a| {
                (
                    a.name().to_string(),
                    SwaggerAuthorization {
                        auth_type: a.swagger_type().to_string(),
                    },
                )
            })
            .collect(),
        info: info_document(&listing.info),
    }
}

/// Maps one resource onto its API declaration document.
///
/// A resource without its own version inherits the listing's.
pub fn api_declaration_document(
    listing: &ResourceListing,
    declaration: &ResourceDeclaration,
) -> SwaggerApiDeclaration {
    SwaggerApiDeclaration {
        api_version: declaration
            .api_version
            .clone()
            .unwrap_or_else(|| listing.api_version.clone()),
        swagger_version: listing.swagger_version.clone(),
        base_path: declaration.base_path.clone(),
        resource_path: declaration.resource_path.clone(),
        produces: declaration.produces.clone(),
        consumes: declaration.consumes.clone(),
        authorizations: authorization_refs(&declaration.authorizations),
        apis: declaration
            .apis
            .values()
            .map(|api| SwaggerApi {
                path: api.uri.clone(),
                description: api.description.clone(),
                operations: api.operations.iter().map(operation_document).collect(),
            })
            .collect(),
        models: declaration
            .models
            .values()
            .map(|model| (model.id.clone(), model_document(model)))
            .collect(),
    }
}

fn operation_document(operation: &Operation) -> SwaggerOperation {
    let data_type = match &operation.return_type {
        Some(descriptor) => data_type(descriptor, ModelStyle::Type),
        None => SwaggerDataType {
            data_type: Some("void".to_string()),
            ..Default::default()
        },
    };

    SwaggerOperation {
        method: operation.method.to_string(),
        nickname: operation.nickname.clone(),
        summary: operation.summary.clone(),
        notes: operation.notes.clone(),
        data_type,
        produces: operation.produces.clone(),
        consumes: operation.consumes.clone(),
        authorizations: authorization_refs(&operation.authorizations),
        parameters: operation.parameters.iter().map(parameter_document).collect(),
        response_messages: operation
            .response_messages
            .iter()
            .map(|m| SwaggerResponseMessage {
                code: m.code,
                message: m.message.clone(),
                response_model: m.response_model.clone(),
            })
            .collect(),
        deprecated: operation.deprecated.then(|| "true".to_string()),
    }
}

fn parameter_document(parameter: &Parameter) -> SwaggerParameter {
    SwaggerParameter {
        param_type: parameter.location.as_str().to_string(),
        name: parameter.name.clone(),
        description: parameter.description.clone(),
        required: parameter.required,
        allow_multiple: parameter.allow_multiple,
        data_type: with_constraints(
            data_type(&parameter.type_descriptor, ModelStyle::Type),
            &parameter.constraints,
        ),
    }
}

fn model_document(model: &Model) -> SwaggerModel {
    SwaggerModel {
        id: model.id.clone(),
        required: model
            .properties
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.clone())
            .collect(),
        properties: model
            .properties
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    SwaggerProperty {
                        description: p.description.clone(),
                        data_type: with_constraints(
                            data_type(&p.type_descriptor, ModelStyle::Reference),
                            &p.constraints,
                        ),
                    },
                )
            })
            .collect(),
    }
}

/// Serializes a Swagger document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml<T: Serialize>(doc: &T) -> Result<String> {
    debug!("Serializing Swagger document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize Swagger document to YAML")
}

/// Serializes a Swagger document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json<T: Serialize>(doc: &T) -> Result<String> {
    debug!("Serializing Swagger document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize Swagger document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file and its parent directories if they don't exist, or overwrites it if it does.
///
/// # Arguments
///
/// * `content` - The string content to write
/// * `path` - The file path to write to
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::HttpMethod;
    use crate::document::{ParamLocation, Property, ResourceEntry, ResponseMessage};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_listing() -> ResourceListing {
        let mut declaration =
            ResourceDeclaration::new("pet", "http://localhost:8080", Some("/pet".to_string()));
        declaration.add_produces("application/json");
        declaration.add_authorization(AuthorizationType::Basic);

        let mut operation = Operation::new("find_by_tags", HttpMethod::Get);
        operation.summary = Some("Finds Pets by tags".to_string());
        operation.return_type = Some(TypeDescriptor::ArrayOf {
            items: Box::new(TypeDescriptor::model("Pet")),
            unique_items: true,
        });
        operation.deprecated = true;
        operation.add_authorization(AuthorizationType::Basic);
        let mut tags = Parameter::new("tags", ParamLocation::Query, TypeDescriptor::string());
        tags.allow_multiple = true;
        tags.constraints.allowed_values = vec!["dog".to_string(), "cat".to_string()];
        operation.parameters.push(tags);
        operation.response_messages.push(ResponseMessage {
            code: 400,
            message: "Invalid tag value".to_string(),
            response_model: None,
        });
        declaration.api_entry("/pet/findByTags").operations.push(operation);

        let mut pet = Model::new("Pet");
        let mut id = Property::new("id", TypeDescriptor::primitive("integer", Some("int64")));
        id.required = true;
        pet.properties.push(id);
        pet.properties
            .push(Property::new("category", TypeDescriptor::model("Category")));
        declaration.models.insert("Pet".to_string(), pet);

        let mut listing = ResourceListing::default();
        listing.info.title = Some("Petstore".to_string());
        listing.add_authorization(AuthorizationType::Basic);
        listing.apis.push(ResourceEntry {
            path: "/pet.{format}".to_string(),
            description: Some("Operations about pets".to_string()),
            declaration,
        });
        listing
    }

    #[test]
    fn test_resource_listing_shape() {
        let listing = create_test_listing();
        let json = serialize_json(&resource_listing_document(&listing)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed,
            json!({
                "apiVersion": "1.0",
                "swaggerVersion": "1.2",
                "apis": [{"path": "/pet.{format}", "description": "Operations about pets"}],
                "authorizations": {"BASIC": {"type": "basicAuth"}},
                "info": {"title": "Petstore"}
            })
        );
    }

    #[test]
    fn test_api_declaration_shape() {
        let listing = create_test_listing();
        let declaration = &listing.apis[0].declaration;
        let json = serialize_json(&api_declaration_document(&listing, declaration)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["basePath"], "http://localhost:8080");
        assert_eq!(parsed["resourcePath"], "/pet");
        assert_eq!(parsed["apiVersion"], "1.0");
        assert_eq!(parsed["authorizations"], json!({"BASIC": []}));

        let operation = &parsed["apis"][0]["operations"][0];
        assert_eq!(operation["method"], "GET");
        assert_eq!(operation["type"], "array");
        assert_eq!(operation["items"], json!({"$ref": "Pet"}));
        assert_eq!(operation["uniqueItems"], true);
        assert_eq!(operation["deprecated"], "true");
        assert_eq!(
            operation["parameters"][0],
            json!({
                "paramType": "query",
                "name": "tags",
                "required": false,
                "allowMultiple": true,
                "type": "string",
                "enum": ["dog", "cat"]
            })
        );
        assert_eq!(
            operation["responseMessages"],
            json!([{"code": 400, "message": "Invalid tag value"}])
        );

        assert_eq!(
            parsed["models"]["Pet"],
            json!({
                "id": "Pet",
                "required": ["id"],
                "properties": {
                    "id": {"type": "integer", "format": "int64"},
                    "category": {"$ref": "Category"}
                }
            })
        );
    }

    #[test]
    fn test_void_operation_and_model_parameter() {
        let mut operation = Operation::new("add_pet", HttpMethod::Post);
        let mut body = Parameter::new("body", ParamLocation::Body, TypeDescriptor::model("Pet"));
        body.required = true;
        operation.parameters.push(body);

        let document = operation_document(&operation);
        let parsed = serde_json::to_value(&document).unwrap();

        assert_eq!(parsed["type"], "void");
        assert_eq!(parsed["parameters"][0]["type"], "Pet");
        assert!(parsed.get("deprecated").is_none());
        assert!(parsed.get("authorizations").is_none());
    }

    #[test]
    fn test_serialize_yaml() {
        let listing = create_test_listing();
        let yaml = serialize_yaml(&resource_listing_document(&listing)).unwrap();

        assert!(yaml.contains("swaggerVersion:"));
        assert!(yaml.contains("/pet.{format}"));
        assert!(yaml.contains("type: basicAuth"));
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let listing = create_test_listing();
        let json = serialize_json(&resource_listing_document(&listing)).unwrap();

        assert!(json.contains('\n'));
        assert!(json.contains("  "));
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let document = resource_listing_document(&create_test_listing());

        let json = DocumentFormat::Json.render(&document).unwrap();
        assert_eq!(json, serialize_json(&document).unwrap());
        let yaml = DocumentFormat::Yaml.render(&document).unwrap();
        assert_eq!(yaml, serialize_yaml(&document).unwrap());
        assert_ne!(json, yaml);
    }

    #[test]
    fn test_document_format() {
        assert_eq!(DocumentFormat::from_name("pet.json"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_name("pet.yml"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_name("pet"), None);
        assert_eq!(DocumentFormat::Yaml.extension(), "yaml");
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested/dir/api-docs.json");

        write_to_file("{}", &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");

        write_to_file("{\"a\":1}", &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{\"a\":1}");
    }
}
