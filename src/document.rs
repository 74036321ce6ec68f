//! In-memory Swagger 1.2 document model.
//!
//! This is what [`crate::builder::DocumentBuilder`] produces. It is independent of the wire
//! format; [`crate::serializer`] maps it onto the Swagger 1.2 JSON shapes.

use crate::descriptor::HttpMethod;
use indexmap::IndexMap;

pub const SWAGGER_VERSION: &str = "1.2";
pub const DEFAULT_API_VERSION: &str = "1.0";

/// Normalized schema kind of a parameter, property or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Primitive {
        swagger_type: String,
        format: Option<String>,
    },
    Enum {
        allowed_values: Vec<String>,
    },
    ArrayOf {
        items: Box<TypeDescriptor>,
        unique_items: bool,
    },
    ModelRef {
        model_id: String,
    },
}

impl TypeDescriptor {
    pub fn primitive(swagger_type: &str, format: Option<&str>) -> Self {
        TypeDescriptor::Primitive {
            swagger_type: swagger_type.to_string(),
            format: format.map(str::to_string),
        }
    }

    pub fn string() -> Self {
        Self::primitive("string", None)
    }

    /// Upload type of multipart form fields
    pub fn file() -> Self {
        Self::primitive("File", None)
    }

    pub fn model(model_id: impl Into<String>) -> Self {
        TypeDescriptor::ModelRef {
            model_id: model_id.into(),
        }
    }

    /// Id of the referenced model, looking through arrays.
    pub fn model_id(&self) -> Option<&str> {
        match self {
            TypeDescriptor::ModelRef { model_id } => Some(model_id),
            TypeDescriptor::ArrayOf { items, .. } => items.model_id(),
            _ => None,
        }
    }
}

/// Where a parameter value is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Form,
    Body,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Form => "form",
            ParamLocation::Body => "body",
        }
    }
}

/// Optional value restrictions of a parameter or property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    pub minimum: Option<String>,
    pub maximum: Option<String>,
    pub default_value: Option<String>,
    pub allowed_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub type_descriptor: TypeDescriptor,
    pub required: bool,
    pub allow_multiple: bool,
    pub description: Option<String>,
    pub constraints: Constraints,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParamLocation, type_descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            location,
            type_descriptor,
            required: false,
            allow_multiple: false,
            description: None,
            constraints: Constraints::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMessage {
    pub code: u16,
    pub message: String,
    pub response_model: Option<String>,
}

/// Authorization schemes that can be declared. Only basic auth is derived from filters today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationType {
    Basic,
}

impl AuthorizationType {
    /// Key in the `authorizations` maps
    pub fn name(&self) -> &'static str {
        match self {
            AuthorizationType::Basic => "BASIC",
        }
    }

    /// Swagger 1.2 `type` value
    pub fn swagger_type(&self) -> &'static str {
        match self {
            AuthorizationType::Basic => "basicAuth",
        }
    }

    /// Maps a request filter to the scheme it enforces.
    pub fn from_filter(filter: &str) -> Option<Self> {
        match filter {
            "BasicAuthFilter" => Some(AuthorizationType::Basic),
            _ => None,
        }
    }
}

fn add_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub nickname: String,
    pub method: HttpMethod,
    pub summary: Option<String>,
    pub notes: Option<String>,
    /// `None` means `void`
    pub return_type: Option<TypeDescriptor>,
    pub produces: Vec<String>,
    pub consumes: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    pub response_messages: Vec<ResponseMessage>,
    pub authorizations: Vec<AuthorizationType>,
}

impl Operation {
    pub fn new(nickname: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            nickname: nickname.into(),
            method,
            summary: None,
            notes: None,
            return_type: None,
            produces: Vec::new(),
            consumes: Vec::new(),
            deprecated: false,
            parameters: Vec::new(),
            response_messages: Vec::new(),
            authorizations: Vec::new(),
        }
    }

    pub fn add_authorization(&mut self, authorization: AuthorizationType) {
        add_unique(&mut self.authorizations, authorization);
    }
}

/// Operations sharing one URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEntry {
    pub uri: String,
    pub description: Option<String>,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub type_descriptor: TypeDescriptor,
    pub required: bool,
    pub description: Option<String>,
    pub constraints: Constraints,
}

impl Property {
    pub fn new(name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            type_descriptor,
            required: false,
            description: None,
            constraints: Constraints::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub properties: Vec<Property>,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Documentation grouping for one specification type; rendered as its own document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDeclaration {
    pub name: String,
    pub base_path: String,
    pub resource_path: Option<String>,
    pub api_version: Option<String>,
    pub produces: Vec<String>,
    pub consumes: Vec<String>,
    pub authorizations: Vec<AuthorizationType>,
    pub apis: IndexMap<String, ApiEntry>,
    pub models: IndexMap<String, Model>,
}

impl ResourceDeclaration {
    pub fn new(name: impl Into<String>, base_path: impl Into<String>, resource_path: Option<String>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            resource_path,
            api_version: None,
            produces: Vec::new(),
            consumes: Vec::new(),
            authorizations: Vec::new(),
            apis: IndexMap::new(),
            models: IndexMap::new(),
        }
    }

    pub fn add_produces(&mut self, media_type: impl Into<String>) {
        add_unique(&mut self.produces, media_type.into());
    }

    pub fn add_consumes(&mut self, media_type: impl Into<String>) {
        add_unique(&mut self.consumes, media_type.into());
    }

    pub fn add_authorization(&mut self, authorization: AuthorizationType) {
        add_unique(&mut self.authorizations, authorization);
    }

    /// The entry for `uri`, created on first use.
    pub fn api_entry(&mut self, uri: &str) -> &mut ApiEntry {
        self.apis
            .entry(uri.to_string())
            .or_insert_with(|| ApiEntry {
                uri: uri.to_string(),
                description: None,
                operations: Vec::new(),
            })
    }

    pub fn has_model(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models.get(id)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.apis.values().flat_map(|api| api.operations.iter())
    }
}

/// Top-level metadata of the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    pub title: Option<String>,
    pub description: Option<String>,
    pub terms_of_service_url: Option<String>,
    pub contact: Option<String>,
    pub license: Option<String>,
    pub license_url: Option<String>,
}

impl Info {
    pub fn is_empty(&self) -> bool {
        *self == Info::default()
    }
}

/// A resource as listed by the top-level document, plus its full declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// `/<name>.{format}`
    pub path: String,
    pub description: Option<String>,
    pub declaration: ResourceDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceListing {
    pub api_version: String,
    pub swagger_version: String,
    pub info: Info,
    pub authorizations: Vec<AuthorizationType>,
    pub apis: Vec<ResourceEntry>,
}

impl Default for ResourceListing {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            swagger_version: SWAGGER_VERSION.to_string(),
            info: Info::default(),
            authorizations: Vec::new(),
            apis: Vec::new(),
        }
    }
}

impl ResourceListing {
    pub fn add_authorization(&mut self, authorization: AuthorizationType) {
        add_unique(&mut self.authorizations, authorization);
    }

    /// Looks a declaration up by resource name.
    pub fn resource(&self, name: &str) -> Option<&ResourceDeclaration> {
        self.apis
            .iter()
            .map(|entry| &entry.declaration)
            .find(|declaration| declaration.name == name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &ResourceDeclaration> {
        self.apis.iter().map(|entry| &entry.declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_entry_is_created_once_per_uri() {
        let mut declaration = ResourceDeclaration::new("pet", "http://localhost:8080", None);
        declaration
            .api_entry("/pet/{petId}")
            .operations
            .push(Operation::new("get_pet", HttpMethod::Get));
        declaration
            .api_entry("/pet/{petId}")
            .operations
            .push(Operation::new("delete_pet", HttpMethod::Delete));
        declaration.api_entry("/pet");

        assert_eq!(declaration.apis.len(), 2);
        assert_eq!(declaration.apis["/pet/{petId}"].operations.len(), 2);
        assert_eq!(declaration.operations().count(), 2);
    }

    #[test]
    fn test_model_id_looks_through_arrays() {
        let descriptor = TypeDescriptor::ArrayOf {
            items: Box::new(TypeDescriptor::model("Tag")),
            unique_items: false,
        };
        assert_eq!(descriptor.model_id(), Some("Tag"));
        assert_eq!(TypeDescriptor::string().model_id(), None);
    }

    #[test]
    fn test_media_types_are_not_duplicated() {
        let mut declaration = ResourceDeclaration::new("pet", "", None);
        declaration.add_produces("application/json");
        declaration.add_produces("application/json");
        declaration.add_produces("application/xml");

        assert_eq!(declaration.produces, vec!["application/json", "application/xml"]);
    }

    #[test]
    fn test_listing_defaults() {
        let listing = ResourceListing::default();
        assert_eq!(listing.api_version, "1.0");
        assert_eq!(listing.swagger_version, "1.2");
        assert!(listing.info.is_empty());
    }
}
