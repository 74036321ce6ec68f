use crate::descriptor::{DescriptorTable, TypeDef, TypeDefKind, TypeRef};
use crate::document::TypeDescriptor;
use crate::error::BuildError;
use std::collections::HashMap;

/// Maps Rust primitive type names to Swagger `type`/`format` pairs.
#[derive(Debug, Clone)]
pub struct PrimitiveTable {
    entries: HashMap<String, (String, Option<String>)>,
}

impl Default for PrimitiveTable {
    fn default() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        for name in ["i8", "i16", "i32", "u8", "u16", "u32"] {
            table.insert(name, "integer", Some("int32"));
        }
        for name in ["i64", "u64", "i128", "u128", "isize", "usize"] {
            table.insert(name, "integer", Some("int64"));
        }
        table.insert("f32", "number", Some("float"));
        table.insert("f64", "number", Some("double"));
        table.insert("bool", "boolean", None);
        for name in ["String", "str", "char"] {
            table.insert(name, "string", None);
        }
        table.insert("NaiveDate", "string", Some("date"));
        for name in ["DateTime", "NaiveDateTime", "SystemTime"] {
            table.insert(name, "string", Some("date-time"));
        }
        table
    }
}

impl PrimitiveTable {
    pub fn insert(&mut self, type_name: &str, swagger_type: &str, format: Option<&str>) {
        self.entries.insert(
            type_name.to_string(),
            (swagger_type.to_string(), format.map(str::to_string)),
        );
    }

    pub fn lookup(&self, type_name: &str) -> Option<TypeDescriptor> {
        self.entries
            .get(type_name)
            .map(|(swagger_type, format)| TypeDescriptor::Primitive {
                swagger_type: swagger_type.clone(),
                format: format.clone(),
            })
    }
}

/// Where a referenced model comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource<'t> {
    /// A struct found in the scanned sources
    Defined(&'t TypeDef),
    /// A name the scanned sources do not define, such as a third-party type
    External(String),
}

/// Outcome of resolving a type: its descriptor and, for models, what the caller must declare.
#[derive(Debug)]
pub struct Resolution<'t> {
    pub descriptor: TypeDescriptor,
    pub model: Option<ModelSource<'t>>,
}

/// Turns [`TypeRef`]s into [`TypeDescriptor`]s.
pub struct TypeMapper<'t> {
    table: &'t DescriptorTable,
    primitives: &'t PrimitiveTable,
}

impl<'t> TypeMapper<'t> {
    pub fn new(table: &'t DescriptorTable, primitives: &'t PrimitiveTable) -> Self {
        Self { table, primitives }
    }

    /// Model id of a struct: its `#[api(name)]` when present, else its qualified name.
    pub fn model_id(def: &TypeDef) -> String {
        def.tags
            .api()
            .and_then(|api| api.name)
            .map(String::from)
            .unwrap_or_else(|| def.qualified_name.clone())
    }

    /// Resolves a single value or an array written in module `scope`.
    ///
    /// A name that is neither a primitive nor a scanned type becomes an external model
    /// under that name.
    ///
    /// # Errors
    ///
    /// `UnsupportedCollectionType` for non-array containers and `NestedArray` for arrays of
    /// arrays.
    pub fn resolve(
        &self,
        ty: &TypeRef,
        unique_items: bool,
        scope: &str,
    ) -> Result<Resolution<'t>, BuildError> {
        match ty {
            TypeRef::Array(item) => {
                if matches!(**item, TypeRef::Array(_)) {
                    return Err(BuildError::NestedArray {
                        type_name: ty.to_string(),
                    });
                }
                let item = self.resolve_single(item, scope)?;
                Ok(Resolution {
                    descriptor: TypeDescriptor::ArrayOf {
                        items: Box::new(item.descriptor),
                        unique_items,
                    },
                    model: item.model,
                })
            }
            _ => self.resolve_single(ty, scope),
        }
    }

    fn resolve_single(&self, ty: &TypeRef, scope: &str) -> Result<Resolution<'t>, BuildError> {
        let name = match ty {
            TypeRef::Named(name) => name,
            TypeRef::Array(_) => {
                return Err(BuildError::NestedArray {
                    type_name: ty.to_string(),
                })
            }
            TypeRef::Collection { .. } => {
                return Err(BuildError::UnsupportedCollectionType {
                    type_name: ty.to_string(),
                })
            }
        };

        let def = self.table.resolve_type(name, scope);
        if let Some(TypeDef {
            kind: TypeDefKind::Enum { variants },
            ..
        }) = def
        {
            return Ok(Resolution {
                descriptor: TypeDescriptor::Enum {
                    allowed_values: variants.clone(),
                },
                model: None,
            });
        }

        if let Some(descriptor) = self.primitives.lookup(name) {
            return Ok(Resolution {
                descriptor,
                model: None,
            });
        }

        Ok(match def {
            Some(def) => Resolution {
                descriptor: TypeDescriptor::model(Self::model_id(def)),
                model: Some(ModelSource::Defined(def)),
            },
            None => Resolution {
                descriptor: TypeDescriptor::model(name.clone()),
                model: Some(ModelSource::External(name.clone())),
            },
        })
    }
}
