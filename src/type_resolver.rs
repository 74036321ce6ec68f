//! Collects type definitions, controllers and capability traits from parsed files.
//!
//! The result is a [`DescriptorTable`] without routes; the route extractors fill those in
//! afterwards so that specification bindings can be resolved against a complete catalog.

use crate::attributes::parse_tags;
use crate::descriptor::{
    ControllerDef, ControllerKind, DescriptorTable, FieldDef, HandlerDef, ParamDef, Tags, TypeDef,
    TypeDefKind, TypeRef,
};
use crate::parser::ParsedFile;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use syn::visit::Visit;

/// Containers that are not arrays. Handler parameters of these types are rejected.
const COLLECTION_TYPES: &[&str] = &[
    "HashSet",
    "BTreeSet",
    "VecDeque",
    "LinkedList",
    "BinaryHeap",
    "HashMap",
    "BTreeMap",
    "IndexMap",
    "IndexSet",
];

/// Wrappers that do not change the documented shape of a value.
const TRANSPARENT_TYPES: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow"];

/// Type resolver - builds the type and controller catalog of a project
pub struct TypeResolver<'a> {
    parsed_files: &'a [ParsedFile],
}

impl<'a> TypeResolver<'a> {
    pub fn new(parsed_files: &'a [ParsedFile]) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());
        Self { parsed_files }
    }

    /// Walks every file and returns a table holding all types and controllers found.
    pub fn resolve(&self) -> DescriptorTable {
        let mut visitor = CatalogVisitor::default();
        for parsed_file in self.parsed_files {
            visitor.module_path = file_module_path(&parsed_file.path);
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        let mut table = DescriptorTable::new();
        for def in visitor.types {
            table.add_type(def);
        }
        for (module, alias, target) in visitor.imports {
            table.add_import(&module, alias, target);
        }

        // struct/enum level tags go first so impl level tags only add to them
        let mut seen = HashSet::new();
        for controller in visitor.controllers {
            if seen.insert(controller.name.clone()) {
                if let Some(tags) = visitor.item_tags.get(&controller.name) {
                    let mut head = ControllerDef::new(controller.name.clone(), controller.kind);
                    head.module = controller.module.clone();
                    head.tags = tags.clone();
                    table.add_controller(head);
                }
            }
            table.add_controller(controller);
        }

        debug!(
            "Catalog complete: {} controllers",
            table.controllers().count()
        );
        table
    }
}

/// Converts a written type into its documented shape.
///
/// References and the wrappers in `TRANSPARENT_TYPES` are looked through; `Vec`, arrays and
/// slices become [`TypeRef::Array`].
pub fn type_ref(ty: &syn::Type) -> TypeRef {
    match ty {
        syn::Type::Reference(r) => type_ref(&r.elem),
        syn::Type::Paren(p) => type_ref(&p.elem),
        syn::Type::Group(g) => type_ref(&g.elem),
        syn::Type::Array(a) => TypeRef::array_of(type_ref(&a.elem)),
        syn::Type::Slice(s) => TypeRef::array_of(type_ref(&s.elem)),
        syn::Type::Path(p) => path_type_ref(&p.path),
        _ => TypeRef::named("Unknown"),
    }
}

fn path_type_ref(path: &syn::Path) -> TypeRef {
    let Some(segment) = path.segments.last() else {
        return TypeRef::named("Unknown");
    };
    let name = segment.ident.to_string();
    let mut args: Vec<TypeRef> = match &segment.arguments {
        syn::PathArguments::AngleBracketed(generics) => generics
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(type_ref(ty)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    if TRANSPARENT_TYPES.contains(&name.as_str()) && args.len() == 1 {
        return args.remove(0);
    }
    if name == "Vec" && args.len() == 1 {
        return TypeRef::array_of(args.remove(0));
    }
    if COLLECTION_TYPES.contains(&name.as_str()) {
        return TypeRef::Collection { kind: name, args };
    }
    TypeRef::Named(name)
}

/// Module path implied by a file location: `src/models/pet.rs` is `models::pet`.
fn file_module_path(path: &Path) -> Vec<String> {
    let components: Vec<String> = path
        .components()
        .filter_map(|c| c.as_os_str().to_str().map(String::from))
        .collect();
    let start = components
        .iter()
        .rposition(|c| c == "src")
        .map(|i| i + 1)
        .unwrap_or_else(|| components.len().saturating_sub(1));

    let mut segments = components[start..].to_vec();
    if let Some(last) = segments.last_mut() {
        if let Some(stem) = last.strip_suffix(".rs") {
            *last = stem.to_string();
        }
    }
    segments.retain(|s| !matches!(s.as_str(), "lib" | "main" | "mod"));
    segments
}

#[derive(Default)]
struct CatalogVisitor {
    module_path: Vec<String>,
    types: Vec<TypeDef>,
    controllers: Vec<ControllerDef>,
    /// Tags written on struct and enum items, by simple name
    item_tags: HashMap<String, Tags>,
    /// `(module, alias, target)` for every named `use`
    imports: Vec<(String, String, String)>,
}

impl CatalogVisitor {
    fn qualified_name(&self, name: &str) -> String {
        let mut segments = self.module_path.clone();
        segments.push(name.to_string());
        segments.join("::")
    }

    fn controller(&self, name: String, kind: ControllerKind) -> ControllerDef {
        let mut controller = ControllerDef::new(name, kind);
        controller.module = self.module_path.join("::");
        controller
    }

    /// Turns a `use` prefix into a path from the crate root.
    ///
    /// `crate` is absolute, `self` and `super` are relative to the current module and any
    /// other first segment is read as a child of the current module.
    fn absolute_path(&self, prefix: &[String]) -> Vec<String> {
        let mut segments = self.module_path.clone();
        let mut rest = prefix;
        match rest.first().map(String::as_str) {
            Some("crate") => {
                segments.clear();
                rest = &rest[1..];
            }
            Some("self") => rest = &rest[1..],
            _ => {}
        }
        while rest.first().map(String::as_str) == Some("super") {
            segments.pop();
            rest = &rest[1..];
        }
        segments.extend(rest.iter().cloned());
        segments
    }

    fn collect_imports(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.collect_imports(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(name) if name.ident != "self" => {
                let ident = name.ident.to_string();
                self.add_import(prefix, ident.clone(), ident);
            }
            syn::UseTree::Rename(rename) if rename.ident != "self" => {
                self.add_import(prefix, rename.ident.to_string(), rename.rename.to_string());
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.collect_imports(item, prefix);
                }
            }
            // globs and module self-imports name no single type
            _ => {}
        }
    }

    fn add_import(&mut self, prefix: &[String], ident: String, alias: String) {
        let mut target = self.absolute_path(prefix);
        target.push(ident);
        self.imports
            .push((self.module_path.join("::"), alias, target.join("::")));
    }

    fn record_item_tags(&mut self, name: &str, tags: &Tags) {
        if !tags.is_empty() {
            self.item_tags.insert(name.to_string(), tags.clone());
        }
    }
}

fn handler_from_signature(sig: &syn::Signature, attrs: &[syn::Attribute]) -> HandlerDef {
    let params = sig
        .inputs
        .iter()
        .filter_map(|input| match input {
            syn::FnArg::Typed(pat_type) => Some(pat_type),
            syn::FnArg::Receiver(_) => None,
        })
        .enumerate()
        .map(|(position, pat_type)| ParamDef {
            name: match &*pat_type.pat {
                syn::Pat::Ident(ident) => ident.ident.to_string(),
                _ => format!("arg{}", position),
            },
            ty: type_ref(&pat_type.ty),
            tags: parse_tags(&pat_type.attrs),
        })
        .collect();

    HandlerDef {
        name: sig.ident.to_string(),
        params,
        tags: parse_tags(attrs),
    }
}

impl<'ast> Visit<'ast> for CatalogVisitor {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.module_path.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.module_path.pop();
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.collect_imports(&node.tree, &mut Vec::new());
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        let name = node.ident.to_string();
        let tags = parse_tags(&node.attrs);
        let fields = match &node.fields {
            syn::Fields::Named(named) => named
                .named
                .iter()
                .filter_map(|field| {
                    Some(FieldDef {
                        name: field.ident.as_ref()?.to_string(),
                        ty: type_ref(&field.ty),
                        tags: parse_tags(&field.attrs),
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        debug!("Found struct {} with {} fields", name, fields.len());

        self.record_item_tags(&name, &tags);
        self.types.push(TypeDef {
            qualified_name: self.qualified_name(&name),
            name,
            tags,
            kind: TypeDefKind::Struct { fields },
        });
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        let name = node.ident.to_string();
        let tags = parse_tags(&node.attrs);
        let variants = node.variants.iter().map(|v| v.ident.to_string()).collect();

        self.record_item_tags(&name, &tags);
        self.types.push(TypeDef {
            qualified_name: self.qualified_name(&name),
            name,
            tags,
            kind: TypeDefKind::Enum { variants },
        });
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let mut controller = self.controller(node.ident.to_string(), ControllerKind::Capability);
        controller.tags = parse_tags(&node.attrs);
        for item in &node.items {
            if let syn::TraitItem::Fn(method) = item {
                let handler = handler_from_signature(&method.sig, &method.attrs);
                controller.handlers.insert(handler.name.clone(), handler);
            }
        }
        debug!(
            "Found trait {} with {} handlers",
            controller.name,
            controller.handlers.len()
        );
        self.controllers.push(controller);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let syn::Type::Path(self_ty) = &*node.self_ty else {
            return;
        };
        let Some(segment) = self_ty.path.segments.last() else {
            return;
        };

        let mut controller = self.controller(segment.ident.to_string(), ControllerKind::Type);
        controller.tags = parse_tags(&node.attrs);
        if let Some((_, trait_path, _)) = &node.trait_ {
            if let Some(trait_segment) = trait_path.segments.last() {
                controller.implements.push(trait_segment.ident.to_string());
            }
        }
        for item in &node.items {
            if let syn::ImplItem::Fn(method) = item {
                let handler = handler_from_signature(&method.sig, &method.attrs);
                controller.handlers.insert(handler.name.clone(), handler);
            }
        }
        self.controllers.push(controller);
    }
}
