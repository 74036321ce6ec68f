use super::define_constraints;
use super::model_walker::ModelWalker;
use super::type_mapper::TypeMapper;
use crate::descriptor::{ExtractorRegistry, HandlerDef, ParamDef, Tags, TypeRef};
use crate::document::{Operation, ParamLocation, Parameter, ResourceDeclaration};
use crate::error::BuildError;
use log::{debug, warn};

/// Location of a parameter as decided by its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub name: String,
    pub location: ParamLocation,
    /// Multi-valued tag (`headers`, `params`)
    pub multiple: bool,
}

impl Classification {
    fn new(name: &str, location: ParamLocation, multiple: bool) -> Self {
        Self {
            name: name.to_string(),
            location,
            multiple,
        }
    }
}

/// Declares the documented parameters of an operation from its handler arguments.
pub struct ParameterClassifier<'a, 't> {
    mapper: &'a TypeMapper<'t>,
    walker: &'a ModelWalker<'a, 't>,
    injected: &'a ExtractorRegistry,
}

impl<'a, 't> ParameterClassifier<'a, 't> {
    pub fn new(
        mapper: &'a TypeMapper<'t>,
        walker: &'a ModelWalker<'a, 't>,
        injected: &'a ExtractorRegistry,
    ) -> Self {
        Self {
            mapper,
            walker,
            injected,
        }
    }

    /// Picks the location from the gathered tags.
    ///
    /// Kinds are tested in a fixed order: path, multi-valued header, query, multi-valued
    /// query, header. The first kind present wins regardless of where its tag was written.
    pub fn classify(tags: &Tags) -> Option<Classification> {
        if let Some(name) = tags.path_param() {
            Some(Classification::new(name, ParamLocation::Path, false))
        } else if let Some(name) = tags.headers() {
            Some(Classification::new(name, ParamLocation::Header, true))
        } else if let Some(name) = tags.param() {
            Some(Classification::new(name, ParamLocation::Query, false))
        } else if let Some(name) = tags.params() {
            Some(Classification::new(name, ParamLocation::Query, true))
        } else {
            tags.header()
                .map(|name| Classification::new(name, ParamLocation::Header, false))
        }
    }

    /// Declares every documented argument of `implementation` on `operation`.
    ///
    /// `specification` is the separate declaring handler of a split route; its argument tags
    /// are merged position by position. Argument types resolve against module `scope`.
    ///
    /// # Errors
    ///
    /// The first argument that cannot be declared aborts the whole operation.
    pub fn declare_parameters(
        &self,
        operation: &mut Operation,
        declaration: &mut ResourceDeclaration,
        handler_id: &str,
        implementation: &HandlerDef,
        specification: Option<&HandlerDef>,
        scope: &str,
    ) -> Result<(), BuildError> {
        for (position, param) in implementation.params.iter().enumerate() {
            if self.injected.is_injected(&param.ty) {
                continue;
            }

            let mut tags = param.tags.clone();
            if let Some(spec_param) = specification.and_then(|s| s.params.get(position)) {
                tags.extend(&spec_param.tags);
            }
            if tags.is_hidden() {
                continue;
            }

            let declared = self
                .declare_parameter(declaration, param, &tags, scope)
                .map_err(|e| BuildError::ParameterDeclaration {
                    position,
                    handler: handler_id.to_string(),
                    source: Box::new(e),
                })?;
            if let Some(parameter) = declared {
                operation.parameters.push(parameter);
            }
        }
        Ok(())
    }

    fn declare_parameter(
        &self,
        declaration: &mut ResourceDeclaration,
        param: &ParamDef,
        tags: &Tags,
        scope: &str,
    ) -> Result<Option<Parameter>, BuildError> {
        if tags.location_tag_count() > 1 {
            warn!(
                "Parameter {} carries {} location tags, using the highest priority one",
                param.name,
                tags.location_tag_count()
            );
        }

        let (classification, body) = match Self::classify(tags) {
            Some(classification) => (classification, false),
            None if !tags.has_argument_extractor() => (
                Classification::new(ParamLocation::Body.as_str(), ParamLocation::Body, false),
                true,
            ),
            None => {
                debug!("Parameter {} is bound by the framework, skipping", param.name);
                return Ok(None);
            }
        };

        let (component, allow_multiple) = match &param.ty {
            TypeRef::Array(item) => (item.as_ref(), true),
            TypeRef::Collection { .. } => {
                return Err(BuildError::UnsupportedCollectionType {
                    type_name: param.ty.to_string(),
                })
            }
            single => (single, classification.multiple),
        };

        let resolution = self.mapper.resolve(component, false, scope)?;
        if let Some(source) = &resolution.model {
            self.walker.declare_source(declaration, source);
        }

        let mut parameter = Parameter::new(
            classification.name,
            classification.location,
            resolution.descriptor,
        );
        parameter.allow_multiple = allow_multiple;
        parameter.required = body || tags.is_required();
        parameter.description = tags.api().and_then(|api| api.value).map(String::from);
        define_constraints(&mut parameter.constraints, tags);
        Ok(Some(parameter))
    }
}
