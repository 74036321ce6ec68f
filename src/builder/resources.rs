use super::BuilderSession;
use crate::descriptor::DescriptorTable;
use crate::document::{AuthorizationType, ResourceDeclaration, ResourceEntry};
use log::{debug, warn};

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";

/// Index of a resource in [`BuilderSession::listing`].
pub type ResourceId = usize;

/// Creates resource declarations on first use and returns the same one afterwards.
pub struct ResourceRegistry<'t> {
    table: &'t DescriptorTable,
    base_path: &'t str,
}

impl<'t> ResourceRegistry<'t> {
    pub fn new(table: &'t DescriptorTable, base_path: &'t str) -> Self {
        Self { table, base_path }
    }

    /// Returns the resource of `specification_type`, declaring it if needed.
    ///
    /// On creation the resource path is the first `#[path]` of `implementation_type`, the
    /// api version and media types come from the specification type, and the filters of the
    /// implementation type are declared as authorizations on both the resource and the
    /// listing. Later calls ignore `implementation_type`.
    pub fn get_or_create(
        &self,
        session: &mut BuilderSession,
        specification_type: &str,
        implementation_type: &str,
    ) -> ResourceId {
        if let Some(id) = session.resources.get(specification_type) {
            return *id;
        }

        let spec_tags = self.table.tags_of(specification_type).cloned().unwrap_or_default();
        let impl_tags = self.table.tags_of(implementation_type).cloned().unwrap_or_default();

        let impl_paths = impl_tags.paths();
        if impl_paths.len() > 1 {
            warn!(
                "{} declares {} paths, only {} is used as resource path",
                implementation_type,
                impl_paths.len(),
                impl_paths[0]
            );
        }
        let resource_path = impl_paths.first().map(|p| p.to_string());

        let api = spec_tags.api();
        let name = api
            .and_then(|api| api.name)
            .unwrap_or(specification_type)
            .to_string();

        let mut declaration = ResourceDeclaration::new(name.clone(), self.base_path, resource_path);
        declaration.api_version = spec_tags.version().map(String::from);

        if spec_tags.has_json() {
            declaration.add_consumes(APPLICATION_JSON);
            declaration.add_produces(APPLICATION_JSON);
        }
        if spec_tags.has_xml() {
            declaration.add_consumes(APPLICATION_XML);
            declaration.add_produces(APPLICATION_XML);
        }
        for media_type in spec_tags.produces().unwrap_or_default() {
            declaration.add_produces(media_type);
        }
        for media_type in spec_tags.consumes().unwrap_or_default() {
            declaration.add_consumes(media_type);
        }

        for authorization in impl_tags.filters().filter_map(AuthorizationType::from_filter) {
            declaration.add_authorization(authorization);
            session.listing.add_authorization(authorization);
        }

        debug!("Declared resource {} for {}", name, specification_type);
        let id = session.listing.apis.len();
        session.listing.apis.push(ResourceEntry {
            path: format!("/{}.{{format}}", name),
            description: api.and_then(|api| api.value).map(String::from),
            declaration,
        });
        session
            .resources
            .insert(specification_type.to_string(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::table_from_code;
    use pretty_assertions::assert_eq;

    const CODE: &str = r#"
        #[path("/pet", "/pets")]
        #[filter_with(BasicAuthFilter, LoggingFilter)]
        pub struct PetController;

        #[api(name = "pet", value = "Operations about pets")]
        #[version("2.0")]
        #[json]
        #[produces("text/plain ")]
        impl PetController {
            #[api]
            fn get_pet(&self) {}
        }

        #[api]
        impl StoreController {
            #[api]
            fn get_order(&self) {}
        }
    "#;

    #[test]
    fn test_create_once() {
        let table = table_from_code(CODE);
        let registry = ResourceRegistry::new(&table, "http://localhost:8080");
        let mut session = BuilderSession::default();

        let first = registry.get_or_create(&mut session, "PetController", "PetController");
        let second = registry.get_or_create(&mut session, "PetController", "PetController");
        let store = registry.get_or_create(&mut session, "StoreController", "StoreController");

        assert_eq!(first, second);
        assert_ne!(first, store);
        assert_eq!(session.listing.apis.len(), 2);
    }

    #[test]
    fn test_resource_metadata() {
        let table = table_from_code(CODE);
        let registry = ResourceRegistry::new(&table, "http://localhost:8080");
        let mut session = BuilderSession::default();

        let id = registry.get_or_create(&mut session, "PetController", "PetController");
        let entry = &session.listing.apis[id];

        assert_eq!(entry.path, "/pet.{format}");
        assert_eq!(entry.description.as_deref(), Some("Operations about pets"));

        let declaration = &entry.declaration;
        assert_eq!(declaration.name, "pet");
        assert_eq!(declaration.base_path, "http://localhost:8080");
        assert_eq!(declaration.resource_path.as_deref(), Some("/pet"));
        assert_eq!(declaration.api_version.as_deref(), Some("2.0"));
        assert_eq!(declaration.produces, vec!["application/json", "text/plain"]);
        assert_eq!(declaration.consumes, vec!["application/json"]);
        assert_eq!(declaration.authorizations, vec![AuthorizationType::Basic]);
        assert_eq!(session.listing.authorizations, vec![AuthorizationType::Basic]);
    }

    #[test]
    fn test_name_defaults_to_type_name() {
        let table = table_from_code(CODE);
        let registry = ResourceRegistry::new(&table, "");
        let mut session = BuilderSession::default();

        let id = registry.get_or_create(&mut session, "StoreController", "StoreController");
        let entry = &session.listing.apis[id];

        assert_eq!(entry.path, "/StoreController.{format}");
        assert_eq!(entry.description, None);
        assert!(entry.declaration.produces.is_empty());
        assert!(entry.declaration.authorizations.is_empty());
        assert!(session.listing.authorizations.is_empty());
    }
}
