//! Swagger document synthesis.
//!
//! [`DocumentBuilder::build`] walks the route table in order and, for every documented route,
//! declares its resource, its operation, the operation's parameters and every model reachable
//! from them. A route that fails is logged and left out; the build itself never fails.

pub mod model_walker;
pub mod operations;
pub mod parameters;
pub mod resources;
pub mod type_mapper;

use crate::descriptor::{
    ControllerDef, DescriptorTable, ExtractorRegistry, HandlerDef, RouteDescriptor, Tag, Tags,
};
use crate::document::{
    AuthorizationType, Constraints, Operation, ResourceDeclaration, ResourceListing,
    ResponseMessage,
};
use crate::error::BuildError;
use log::{debug, error};
use model_walker::ModelWalker;
use operations::OperationBuilder;
use parameters::ParameterClassifier;
use resources::{ResourceId, ResourceRegistry};
use std::collections::HashMap;
use type_mapper::{PrimitiveTable, TypeMapper};

/// Mutable state of one build: the listing being filled and the resources declared so far,
/// keyed by specification type.
#[derive(Debug, Default)]
pub struct BuilderSession {
    pub listing: ResourceListing,
    resources: HashMap<String, ResourceId>,
}

impl BuilderSession {
    fn new(listing: ResourceListing) -> Self {
        Self {
            listing,
            resources: HashMap::new(),
        }
    }
}

/// Applies validation tags to a parameter or property.
///
/// Every tag sets only the bounds or values it owns; when two tags own the same bound the
/// later one wins.
pub(crate) fn define_constraints(constraints: &mut Constraints, tags: &Tags) {
    for tag in tags {
        match tag {
            Tag::Values {
                default_value,
                allowed,
            } => {
                constraints.default_value = default_value.clone();
                constraints.allowed_values = allowed.clone();
            }
            Tag::Size(bounds) | Tag::Length(bounds) | Tag::NumberValue(bounds) => {
                constraints.minimum = Some(bounds.min.clone());
                constraints.maximum = Some(bounds.max.clone());
            }
            Tag::Min(value) | Tag::DecimalMin(value) => constraints.minimum = Some(value.clone()),
            Tag::Max(value) | Tag::DecimalMax(value) => constraints.maximum = Some(value.clone()),
            _ => {}
        }
    }
}

/// Builds a [`ResourceListing`] from a filled [`DescriptorTable`].
///
/// The builder holds no state between calls; every [`build`](Self::build) starts from an
/// empty session.
///
/// # Example
///
/// ```no_run
/// use swagger_from_source::builder::DocumentBuilder;
/// use swagger_from_source::descriptor::DescriptorTable;
///
/// let table = DescriptorTable::new();
/// let listing = DocumentBuilder::new(&table).build(None, "http://localhost:8080");
/// assert!(listing.apis.is_empty());
/// ```
pub struct DocumentBuilder<'t> {
    table: &'t DescriptorTable,
    primitives: PrimitiveTable,
    injected: ExtractorRegistry,
}

impl<'t> DocumentBuilder<'t> {
    pub fn new(table: &'t DescriptorTable) -> Self {
        Self {
            table,
            primitives: PrimitiveTable::default(),
            injected: ExtractorRegistry::default(),
        }
    }

    pub fn with_primitives(mut self, primitives: PrimitiveTable) -> Self {
        self.primitives = primitives;
        self
    }

    pub fn with_injected_types(mut self, injected: ExtractorRegistry) -> Self {
        self.injected = injected;
        self
    }

    /// Synthesizes the resource listing.
    ///
    /// # Arguments
    ///
    /// * `routes_type` - Type whose `api_info` and `version` tags describe the whole API
    /// * `base_url` - Base path written into every resource declaration
    pub fn build(&self, routes_type: Option<&str>, base_url: &str) -> ResourceListing {
        let mut session = BuilderSession::new(self.declare_resource_listing(routes_type));
        let mapper = TypeMapper::new(self.table, &self.primitives);
        let registry = ResourceRegistry::new(self.table, base_url);

        for descriptor in self.table.routes() {
            self.declare_route(&mut session, &registry, &mapper, descriptor);
        }

        debug!(
            "Built {} resources with {} operations",
            session.listing.apis.len(),
            session
                .listing
                .declarations()
                .map(|d| d.operations().count())
                .sum::<usize>()
        );
        session.listing
    }

    fn declare_resource_listing(&self, routes_type: Option<&str>) -> ResourceListing {
        let mut listing = ResourceListing::default();

        let Some(tags) = routes_type.and_then(|name| self.table.tags_of(name)) else {
            return listing;
        };
        let Some(api_info) = tags.api_info() else {
            return listing;
        };

        if let Some(version) = tags.version() {
            listing.api_version = version.to_string();
        }

        let present = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());
        let info = &mut listing.info;
        if let Some(title) = present(&api_info.title) {
            info.title = Some(title);
        }
        if let Some(description) = present(&api_info.description) {
            info.description = Some(description);
        }
        if let Some(contact) = present(&api_info.contact) {
            info.contact = Some(contact);
        }
        if let Some(terms) = present(&api_info.terms_of_service) {
            info.terms_of_service_url = Some(terms);
        }
        if let Some(license) = present(&api_info.license) {
            info.license = Some(license);
        }
        if let Some(license_url) = present(&api_info.license_url) {
            info.license_url = Some(license_url);
        }
        listing
    }

    fn declare_route(
        &self,
        session: &mut BuilderSession,
        registry: &ResourceRegistry<'_>,
        mapper: &TypeMapper<'_>,
        descriptor: &RouteDescriptor,
    ) {
        let route = &descriptor.route;
        let (Some(impl_type), Some(impl_handler)) = (
            route.implementation_type.as_deref(),
            route.implementation_handler.as_deref(),
        ) else {
            debug!("Ignoring invalid route {} {}", route.http_method, route.uri);
            return;
        };

        let Some((spec_type, spec_handler)) = descriptor.specification() else {
            debug!("Ignoring undocumented route {}.{}", impl_type, impl_handler);
            return;
        };
        let Some(specification) = self.table.controller(spec_type) else {
            return;
        };
        if specification.tags.is_hidden() {
            debug!("Ignoring hidden controller {}", spec_type);
            return;
        }
        let Some(spec_def) = specification.handler(spec_handler) else {
            debug!("Ignoring undocumented handler {}.{}", impl_type, impl_handler);
            return;
        };
        if spec_def.tags.is_hidden() {
            debug!("Ignoring hidden handler {}.{}", impl_type, impl_handler);
            return;
        }
        let Some((implementation, impl_def)) = self
            .table
            .controller(impl_type)
            .and_then(|c| c.handler(impl_handler).map(|handler| (c, handler)))
        else {
            debug!("Ignoring route to unknown handler {}.{}", impl_type, impl_handler);
            return;
        };

        let id = registry.get_or_create(session, spec_type, impl_type);
        let declaration = &mut session.listing.apis[id].declaration;

        // models declared by a failing route are rolled back with it
        let models_before = declaration.models.len();
        let handler_id = format!("{}.{}", impl_type, impl_handler);

        match self.declare_operation(
            mapper,
            declaration,
            descriptor,
            &handler_id,
            (specification, spec_def),
            (implementation, impl_def),
        ) {
            Ok(operation) => {
                let authorizations = operation.authorizations.clone();
                OperationBuilder::attach(declaration, &route.uri, operation);
                for authorization in authorizations {
                    session.listing.add_authorization(authorization);
                }
            }
            Err(e) => {
                declaration.models.truncate(models_before);
                error!("Failed to declare {}: {}", handler_id, e);
            }
        }
    }

    /// Types in handler signatures resolve against the module of the controller declaring
    /// them: returns and response codes against the specification, parameters against the
    /// implementation.
    fn declare_operation(
        &self,
        mapper: &TypeMapper<'_>,
        declaration: &mut ResourceDeclaration,
        descriptor: &RouteDescriptor,
        handler_id: &str,
        (specification, spec_def): (&ControllerDef, &HandlerDef),
        (implementation, impl_def): (&ControllerDef, &HandlerDef),
    ) -> Result<Operation, BuildError> {
        let walker = ModelWalker::new(mapper);
        let split = descriptor.is_split().then_some(spec_def);
        let method = descriptor.route.http_method.clone();

        let mut operation = if spec_def.tags.form().is_some() {
            OperationBuilder::form(spec_def, method)
        } else {
            OperationBuilder::standard(declaration, spec_def, method)
        };

        operation.notes = spec_def.tags.notes().map(String::from);

        if let Some((ty, unique_items)) = spec_def.tags.returns() {
            let resolution = mapper.resolve(ty, unique_items, &specification.module)?;
            if let Some(source) = &resolution.model {
                walker.declare_source(declaration, source);
            }
            operation.return_type = Some(resolution.descriptor);
        }

        for code in spec_def.tags.response_codes() {
            let mut message = ResponseMessage {
                code: code.code,
                message: code.message.clone(),
                response_model: None,
            };
            if let Some(ty) = &code.returns {
                let resolution = mapper.resolve(ty, false, &specification.module)?;
                if let Some(source) = &resolution.model {
                    walker.declare_source(declaration, source);
                }
                message.response_model = resolution.descriptor.model_id().map(String::from);
            }
            operation.response_messages.push(message);
        }

        for authorization in impl_def.tags.filters().filter_map(AuthorizationType::from_filter) {
            operation.add_authorization(authorization);
        }

        operation.deprecated = spec_def.tags.is_deprecated() || impl_def.tags.is_deprecated();

        let classifier = ParameterClassifier::new(mapper, &walker, &self.injected);
        classifier.declare_parameters(
            &mut operation,
            declaration,
            handler_id,
            impl_def,
            split,
            &implementation.module,
        )?;

        Ok(operation)
    }
}
