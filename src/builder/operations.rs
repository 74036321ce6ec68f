use crate::descriptor::{HandlerDef, HttpMethod};
use crate::document::{Operation, ParamLocation, Parameter, ResourceDeclaration, TypeDescriptor};
use log::debug;

pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Creates the operation skeleton of a route from its specification handler.
pub struct OperationBuilder;

impl OperationBuilder {
    /// Standard operation: nickname, summary and media types.
    ///
    /// Media types come from the handler's own `produces`/`consumes` tags when present,
    /// otherwise they are copied, in order, from the resource declaration.
    pub fn standard(
        declaration: &ResourceDeclaration,
        specification: &HandlerDef,
        method: HttpMethod,
    ) -> Operation {
        debug!("Declaring operation {} {}", method, specification.name);
        let mut operation = Self::skeleton(specification, method);

        operation.produces = specification
            .tags
            .produces()
            .unwrap_or_else(|| declaration.produces.clone());
        operation.consumes = specification
            .tags
            .consumes()
            .unwrap_or_else(|| declaration.consumes.clone());
        operation
    }

    /// File upload operation: consumes `multipart/form-data` and declares one parameter per
    /// form field. File fields are sent as the body, every other field as a string form value.
    pub fn form(specification: &HandlerDef, method: HttpMethod) -> Operation {
        debug!("Declaring form operation {} {}", method, specification.name);
        let mut operation = Self::skeleton(specification, method);
        operation.consumes = vec![MULTIPART_FORM_DATA.to_string()];

        for field in specification.tags.form().unwrap_or_default() {
            let mut parameter = if field.is_file() {
                Parameter::new(field.name.clone(), ParamLocation::Body, TypeDescriptor::file())
            } else {
                Parameter::new(field.name.clone(), ParamLocation::Form, TypeDescriptor::string())
            };
            parameter.description = field.description.clone();
            operation.parameters.push(parameter);
        }
        operation
    }

    /// Appends `operation` to the entry of `uri`, creating the entry when the URI is new.
    pub fn attach(declaration: &mut ResourceDeclaration, uri: &str, operation: Operation) {
        declaration.api_entry(uri).operations.push(operation);
    }

    fn skeleton(specification: &HandlerDef, method: HttpMethod) -> Operation {
        let mut operation = Operation::new(specification.name.clone(), method);
        operation.summary = specification
            .tags
            .api()
            .and_then(|api| api.value)
            .map(String::from);
        operation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::tags::FormField;
    use crate::descriptor::{Tag, Tags};
    use pretty_assertions::assert_eq;

    fn handler(name: &str, tags: Vec<Tag>) -> HandlerDef {
        HandlerDef {
            name: name.to_string(),
            params: Vec::new(),
            tags: Tags::new(tags),
        }
    }

    fn declaration() -> ResourceDeclaration {
        let mut declaration = ResourceDeclaration::new("pet", "http://localhost:8080", None);
        declaration.add_produces("application/json");
        declaration.add_produces("application/xml");
        declaration.add_consumes("application/json");
        declaration
    }

    #[test]
    fn test_standard_inherits_media_types() {
        let spec = handler(
            "get_pet_by_id",
            vec![Tag::Api {
                name: None,
                value: Some("Find pet by ID".to_string()),
            }],
        );

        let operation = OperationBuilder::standard(&declaration(), &spec, HttpMethod::Get);

        assert_eq!(operation.nickname, "get_pet_by_id");
        assert_eq!(operation.summary.as_deref(), Some("Find pet by ID"));
        assert_eq!(operation.produces, vec!["application/json", "application/xml"]);
        assert_eq!(operation.consumes, vec!["application/json"]);
    }

    #[test]
    fn test_standard_method_tags_override() {
        let spec = handler(
            "export",
            vec![
                Tag::Api {
                    name: None,
                    value: Some(String::new()),
                },
                Tag::Produces(vec!["text/csv".to_string()]),
            ],
        );

        let operation = OperationBuilder::standard(&declaration(), &spec, HttpMethod::Get);

        assert_eq!(operation.summary, None);
        assert_eq!(operation.produces, vec!["text/csv"]);
        assert_eq!(operation.consumes, vec!["application/json"]);
    }

    #[test]
    fn test_form_fields() {
        let spec = handler(
            "upload_file",
            vec![
                Tag::Api {
                    name: None,
                    value: Some("uploads an image".to_string()),
                },
                Tag::Form(vec![
                    FormField {
                        name: "additionalMetadata".to_string(),
                        type_of: None,
                        description: Some("Additional data to pass to server".to_string()),
                    },
                    FormField {
                        name: "file".to_string(),
                        type_of: Some("File".to_string()),
                        description: Some("file to upload".to_string()),
                    },
                ]),
            ],
        );

        let operation = OperationBuilder::form(&spec, HttpMethod::Post);

        assert_eq!(operation.consumes, vec![MULTIPART_FORM_DATA]);
        assert_eq!(operation.parameters.len(), 2);
        assert_eq!(operation.parameters[0].location, ParamLocation::Form);
        assert_eq!(operation.parameters[0].type_descriptor, TypeDescriptor::string());
        assert_eq!(operation.parameters[1].name, "file");
        assert_eq!(operation.parameters[1].location, ParamLocation::Body);
        assert_eq!(operation.parameters[1].type_descriptor, TypeDescriptor::file());
        assert_eq!(
            operation.parameters[1].description.as_deref(),
            Some("file to upload")
        );
    }

    #[test]
    fn test_attach_groups_by_uri() {
        let mut declaration = declaration();
        let spec = handler("a", vec![]);
        OperationBuilder::attach(
            &mut declaration,
            "/pet",
            OperationBuilder::standard(&ResourceDeclaration::new("x", "", None), &spec, HttpMethod::Post),
        );
        OperationBuilder::attach(&mut declaration, "/pet", OperationBuilder::form(&spec, HttpMethod::Put));

        assert_eq!(declaration.apis.len(), 1);
        assert_eq!(declaration.apis["/pet"].operations.len(), 2);
    }
}
