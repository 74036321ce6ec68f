use super::define_constraints;
use super::type_mapper::{ModelSource, TypeMapper};
use crate::descriptor::{FieldDef, TypeDef, TypeDefKind};
use crate::document::{Model, Property, ResourceDeclaration};
use crate::error::BuildError;
use log::{debug, error, warn};

/// Declares structs as reusable models of a resource declaration.
pub struct ModelWalker<'m, 't> {
    mapper: &'m TypeMapper<'t>,
}

impl<'m, 't> ModelWalker<'m, 't> {
    pub fn new(mapper: &'m TypeMapper<'t>) -> Self {
        Self { mapper }
    }

    /// Declares a resolved model, scanned or external.
    ///
    /// An external model has no known fields and is declared empty.
    pub fn declare_source(
        &self,
        declaration: &mut ResourceDeclaration,
        source: &ModelSource<'_>,
    ) {
        match source {
            ModelSource::Defined(def) => self.declare_model(declaration, def),
            ModelSource::External(id) => {
                if declaration.has_model(id) {
                    return;
                }
                warn!(
                    "Type {} is not defined in the scanned sources, declaring it without properties",
                    id
                );
                declaration.models.insert(id.clone(), Model::new(id.clone()));
            }
        }
    }

    /// Declares `def` and, recursively, every model its documented fields reference.
    ///
    /// The model is registered before its fields are walked, so self-referencing and
    /// mutually referencing types stop at the second visit. A field that cannot be resolved
    /// is logged and left out of the model.
    pub fn declare_model(&self, declaration: &mut ResourceDeclaration, def: &TypeDef) {
        let id = TypeMapper::model_id(def);
        if declaration.has_model(&id) {
            return;
        }

        debug!("Declaring model {} for {}", id, def.qualified_name);
        declaration.models.insert(id.clone(), Model::new(id.clone()));

        let TypeDefKind::Struct { fields } = &def.kind else {
            return;
        };

        for field in fields {
            let Some(api) = field.tags.api() else {
                continue;
            };
            if field.tags.is_hidden() {
                continue;
            }

            match self.declare_property(declaration, field, api.value, def.module()) {
                Ok(property) => {
                    if let Some(model) = declaration.models.get_mut(&id) {
                        model.properties.push(property);
                    }
                }
                Err(e) => error!(
                    "Failed to declare {}.{} ({}): {}",
                    def.qualified_name, field.name, field.ty, e
                ),
            }
        }
    }

    fn declare_property(
        &self,
        declaration: &mut ResourceDeclaration,
        field: &FieldDef,
        description: Option<&str>,
        scope: &str,
    ) -> Result<Property, BuildError> {
        let resolution = self.mapper.resolve(&field.ty, false, scope)?;
        if let Some(nested) = &resolution.model {
            self.declare_source(declaration, nested);
        }

        let mut property = Property::new(field.name.clone(), resolution.descriptor);
        property.required = field.tags.is_required();
        property.description = description.map(String::from);
        define_constraints(&mut property.constraints, &field.tags);
        Ok(property)
    }
}
