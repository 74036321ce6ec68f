//! Build-time descriptor table.
//!
//! Everything the document builder knows about the application lives here: the ordered
//! route table, the controllers and capability traits with their handlers, the documented
//! types, and the tags attached to each of them. The table is filled by
//! [`crate::type_resolver`] and the route extractors, and is read-only afterwards.

pub mod tags;

use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub use tags::{Tag, Tags};

/// HTTP methods a route can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Parses a verb, ignoring case.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the application's route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub http_method: HttpMethod,
    pub uri: String,
    /// Simple name of the controller type, absent when the route target could not be read
    pub implementation_type: Option<String>,
    pub implementation_handler: Option<String>,
}

impl Route {
    pub fn new(http_method: HttpMethod, uri: impl Into<String>, target: Option<(String, String)>) -> Self {
        let (implementation_type, implementation_handler) = match target {
            Some((ty, handler)) => (Some(ty), Some(handler)),
            None => (None, None),
        };
        Self {
            http_method,
            uri: uri.into(),
            implementation_type,
            implementation_handler,
        }
    }
}

/// Where the documentation metadata of a route lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecificationBinding {
    /// The implementation type and handler carry their own metadata
    CoLocated,
    /// The metadata lives on a separate capability trait
    Paired {
        specification_type: String,
        specification_handler: String,
    },
}

/// A route together with its resolved specification binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub route: Route,
    /// `None` when the route carries no documentation metadata at all
    pub binding: Option<SpecificationBinding>,
}

impl RouteDescriptor {
    /// `(specification type, specification handler)` of a documented route.
    pub fn specification(&self) -> Option<(&str, &str)> {
        match self.binding.as_ref()? {
            SpecificationBinding::CoLocated => Some((
                self.route.implementation_type.as_deref()?,
                self.route.implementation_handler.as_deref()?,
            )),
            SpecificationBinding::Paired {
                specification_type,
                specification_handler,
            } => Some((specification_type, specification_handler)),
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self.binding, Some(SpecificationBinding::Paired { .. }))
    }
}

/// Normalized shape of a type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A plain type, by simple name (`i64`, `String`, `Pet`)
    Named(String),
    /// `Vec<T>`, `[T; N]`, `[T]`
    Array(Box<TypeRef>),
    /// Any other multi-element container
    Collection { kind: String, args: Vec<TypeRef> },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array_of(item: TypeRef) -> Self {
        TypeRef::Array(Box::new(item))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Array(item) => write!(f, "Vec<{}>", item),
            TypeRef::Collection { kind, args } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{}<{}>", kind, args.join(", "))
            }
        }
    }
}

/// A handler argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDef {
    pub name: String,
    pub ty: TypeRef,
    pub tags: Tags,
}

/// A controller method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDef {
    pub name: String,
    pub params: Vec<ParamDef>,
    pub tags: Tags,
}

impl HandlerDef {
    /// Carries an `api` or a `form` tag.
    pub fn is_documented(&self) -> bool {
        self.tags.api().is_some() || self.tags.form().is_some()
    }

    /// Same arity and same parameter types, position by position.
    pub fn signature_matches(&self, other: &HandlerDef) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    /// A struct or enum with inherent or trait impls
    Type,
    /// A trait declaring handlers
    Capability,
}

/// A type that owns handlers, or a trait that declares them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDef {
    pub name: String,
    /// Module of the first item that declared it, `a::b` or empty for the crate root
    pub module: String,
    pub kind: ControllerKind,
    pub tags: Tags,
    pub handlers: IndexMap<String, HandlerDef>,
    /// Traits this type implements, in discovery order
    pub implements: Vec<String>,
}

impl ControllerDef {
    pub fn new(name: impl Into<String>, kind: ControllerKind) -> Self {
        Self {
            name: name.into(),
            module: String::new(),
            kind,
            tags: Tags::default(),
            handlers: IndexMap::new(),
            implements: Vec::new(),
        }
    }

    pub fn handler(&self, name: &str) -> Option<&HandlerDef> {
        self.handlers.get(name)
    }

    fn merge(&mut self, other: ControllerDef) {
        self.tags.extend(&other.tags);
        for (name, handler) in other.handlers {
            self.handlers.entry(name).or_insert(handler);
        }
        for capability in other.implements {
            if !self.implements.contains(&capability) {
                self.implements.push(capability);
            }
        }
    }
}

/// A named field of a documented struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefKind {
    Struct { fields: Vec<FieldDef> },
    /// Unit-like enum, variant names in declaration order
    Enum { variants: Vec<String> },
}

/// A struct or enum that may become a model or an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    /// `module::path::Name`, stable across builds
    pub qualified_name: String,
    pub tags: Tags,
    pub kind: TypeDefKind,
}

impl TypeDef {
    /// Module the type is declared in, empty for the crate root.
    pub fn module(&self) -> &str {
        self.qualified_name
            .rsplit_once("::")
            .map(|(module, _)| module)
            .unwrap_or("")
    }
}

/// Types the framework injects into handlers; they are never documented.
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    injected: HashSet<String>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let injected = ["Context", "Session", "FlashScope", "Validation", "Request", "HeaderMap"]
            .into_iter()
            .map(String::from)
            .collect();
        Self { injected }
    }
}

impl ExtractorRegistry {
    pub fn register(&mut self, type_name: impl Into<String>) {
        self.injected.insert(type_name.into());
    }

    pub fn is_injected(&self, ty: &TypeRef) -> bool {
        ty.name().map(|name| self.injected.contains(name)).unwrap_or(false)
    }
}

/// Routes, controllers and types of one application.
#[derive(Debug, Clone, Default)]
pub struct DescriptorTable {
    routes: Vec<RouteDescriptor>,
    controllers: IndexMap<String, ControllerDef>,
    /// Keyed by qualified name
    types: IndexMap<String, TypeDef>,
    /// Qualified names declaring each simple name, in discovery order
    candidates: HashMap<String, Vec<String>>,
    /// `use` aliases of each module and the qualified names they point at
    imports: HashMap<String, HashMap<String, String>>,
}

fn qualify(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", module, name)
    }
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type definition. Types sharing a simple name are kept apart by module.
    pub fn add_type(&mut self, def: TypeDef) {
        if self.types.contains_key(&def.qualified_name) {
            warn!("Duplicate type {}: keeping the first definition", def.qualified_name);
            return;
        }
        self.candidates
            .entry(def.name.clone())
            .or_default()
            .push(def.qualified_name.clone());
        self.types.insert(def.qualified_name.clone(), def);
    }

    /// Records `use target as alias` written in `module`.
    pub fn add_import(
        &mut self,
        module: &str,
        alias: impl Into<String>,
        target: impl Into<String>,
    ) {
        self.imports
            .entry(module.to_string())
            .or_default()
            .insert(alias.into(), target.into());
    }

    /// Adds a controller, merging tags, handlers and capabilities into an existing entry.
    pub fn add_controller(&mut self, def: ControllerDef) {
        match self.controllers.get_mut(&def.name) {
            Some(existing) => existing.merge(def),
            None => {
                self.controllers.insert(def.name.clone(), def);
            }
        }
    }

    /// Appends a route and resolves its specification binding now.
    ///
    /// Must be called after every controller has been added.
    pub fn register_route(&mut self, route: Route) {
        let binding = self.resolve_binding(&route);
        debug!(
            "Registered {} {} with binding {:?}",
            route.http_method, route.uri, binding
        );
        self.routes.push(RouteDescriptor { route, binding });
    }

    /// Appends a route with a binding supplied by the caller.
    pub fn register_route_with_binding(&mut self, route: Route, binding: Option<SpecificationBinding>) {
        self.routes.push(RouteDescriptor { route, binding });
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn controller(&self, name: &str) -> Option<&ControllerDef> {
        self.controllers.get(name)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ControllerDef> {
        self.controllers.values()
    }

    /// Looks a type up by qualified name, then by simple name. A simple name declared in
    /// several modules yields the first declaration found.
    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name).or_else(|| {
            self.candidates
                .get(name)
                .and_then(|qualified| qualified.first())
                .and_then(|qualified| self.types.get(qualified))
        })
    }

    /// Resolves a type name as written in module `scope`.
    ///
    /// An import in `scope` wins, then the only type of that name, then the one declared in
    /// `scope` itself. Any other ambiguity falls back to the first declaration with a warning.
    pub fn resolve_type(&self, name: &str, scope: &str) -> Option<&TypeDef> {
        let imported = self
            .imports
            .get(scope)
            .and_then(|aliases| aliases.get(name))
            .and_then(|target| self.types.get(target));
        if imported.is_some() {
            return imported;
        }

        let candidates = self.candidates.get(name)?;
        if candidates.len() > 1 {
            if let Some(local) = self.types.get(&qualify(scope, name)) {
                return Some(local);
            }
            warn!(
                "Type name {} is ambiguous in module '{}' ({}), using {}",
                name,
                scope,
                candidates.join(", "),
                candidates[0]
            );
        }
        candidates.first().and_then(|qualified| self.types.get(qualified))
    }

    /// Tags of a controller or, failing that, of a plain type.
    pub fn tags_of(&self, name: &str) -> Option<&Tags> {
        self.controllers
            .get(name)
            .map(|c| &c.tags)
            .or_else(|| self.type_def(name).map(|t| &t.tags))
    }

    /// The first type carrying an `api_info` tag.
    pub fn find_routes_type(&self) -> Option<&str> {
        self.types
            .values()
            .find(|t| t.tags.api_info().is_some())
            .map(|t| t.name.as_str())
            .or_else(|| {
                self.controllers
                    .values()
                    .find(|c| c.tags.api_info().is_some())
                    .map(|c| c.name.as_str())
            })
    }

    fn resolve_binding(&self, route: &Route) -> Option<SpecificationBinding> {
        let type_name = route.implementation_type.as_deref()?;
        let handler_name = route.implementation_handler.as_deref()?;
        let implementation = self.controller(type_name)?;
        let handler = implementation.handler(handler_name)?;

        if implementation.tags.api().is_some() && handler.is_documented() {
            return Some(SpecificationBinding::CoLocated);
        }

        for capability in &implementation.implements {
            let Some(specification) = self.controller(capability) else {
                continue;
            };
            if specification.tags.api().is_none() {
                continue;
            }
            if let Some(candidate) = specification.handler(handler_name) {
                if candidate.is_documented() && candidate.signature_matches(handler) {
                    return Some(SpecificationBinding::Paired {
                        specification_type: specification.name.clone(),
                        specification_handler: candidate.name.clone(),
                    });
                }
            }
        }

        None
    }
}
