use crate::attributes::parse_tags;
use crate::descriptor::{HttpMethod, Route};
use crate::extractor::{combine_paths, normalize_uri, RouteExtractor};
use crate::parser::ParsedFile;
use log::debug;
use std::collections::HashMap;
use syn::visit::Visit;

/// Route extractor for controllers annotated with `#[path]` and verb attributes.
///
/// Every method with at least one `#[path]` becomes one route per combination of type-level
/// and method-level path. The verb defaults to GET. Routes are ordered by `#[order(n)]`,
/// unordered routes last, then by `Type.handler`.
pub struct AnnotatedExtractor;

impl RouteExtractor for AnnotatedExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<Route> {
        let mut visitor = AnnotatedVisitor::default();
        for parsed_file in parsed_files {
            visitor.visit_file(&parsed_file.syntax_tree);
        }
        visitor.into_routes()
    }
}

struct AnnotatedMethod {
    type_name: String,
    handler: String,
    impl_paths: Vec<String>,
    paths: Vec<String>,
    method: HttpMethod,
    order: Option<i64>,
}

impl AnnotatedMethod {
    fn sort_key(&self) -> (i64, String) {
        (
            self.order.unwrap_or(i64::MAX),
            format!("{}.{}", self.type_name, self.handler),
        )
    }
}

#[derive(Default)]
struct AnnotatedVisitor {
    /// `#[path]` values written on struct and enum items
    type_paths: HashMap<String, Vec<String>>,
    methods: Vec<AnnotatedMethod>,
}

impl AnnotatedVisitor {
    fn record_type_paths(&mut self, name: String, attrs: &[syn::Attribute]) {
        let paths: Vec<String> = parse_tags(attrs)
            .paths()
            .into_iter()
            .map(String::from)
            .collect();
        if !paths.is_empty() {
            self.type_paths.insert(name, paths);
        }
    }

    fn into_routes(mut self) -> Vec<Route> {
        self.methods.sort_by_key(AnnotatedMethod::sort_key);

        let mut routes = Vec::new();
        for annotated in &self.methods {
            let mut prefixes: Vec<&str> = self
                .type_paths
                .get(&annotated.type_name)
                .map(|paths| paths.iter().map(String::as_str).collect())
                .unwrap_or_default();
            prefixes.extend(annotated.impl_paths.iter().map(String::as_str));
            if prefixes.is_empty() {
                prefixes.push("");
            }

            for prefix in &prefixes {
                for path in &annotated.paths {
                    let uri = normalize_uri(&combine_paths(prefix, path));
                    debug!("Found annotated route {} {}", annotated.method, uri);
                    routes.push(Route::new(
                        annotated.method.clone(),
                        uri,
                        Some((annotated.type_name.clone(), annotated.handler.clone())),
                    ));
                }
            }
        }
        routes
    }
}

impl<'ast> Visit<'ast> for AnnotatedVisitor {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.record_type_paths(node.ident.to_string(), &node.attrs);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.record_type_paths(node.ident.to_string(), &node.attrs);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let syn::Type::Path(self_ty) = &*node.self_ty else {
            return;
        };
        let Some(segment) = self_ty.path.segments.last() else {
            return;
        };
        let type_name = segment.ident.to_string();
        let impl_paths: Vec<String> = parse_tags(&node.attrs)
            .paths()
            .into_iter()
            .map(String::from)
            .collect();

        for item in &node.items {
            let syn::ImplItem::Fn(method) = item else {
                continue;
            };
            let tags = parse_tags(&method.attrs);
            let paths: Vec<String> = tags.paths().into_iter().map(String::from).collect();
            if paths.is_empty() {
                continue;
            }
            self.methods.push(AnnotatedMethod {
                type_name: type_name.clone(),
                handler: method.sig.ident.to_string(),
                impl_paths: impl_paths.clone(),
                paths,
                method: tags.http_method().unwrap_or(HttpMethod::Get),
                order: tags.order(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn parse_code(code: &str) -> ParsedFile {
        ParsedFile {
            path: PathBuf::from("test.rs"),
            syntax_tree: syn::parse_file(code).unwrap(),
        }
    }

    fn summary(routes: &[Route]) -> Vec<String> {
        routes
            .iter()
            .map(|r| {
                format!(
                    "{} {} {}",
                    r.http_method,
                    r.uri,
                    r.implementation_handler.as_deref().unwrap_or("-")
                )
            })
            .collect()
    }

    #[test]
    fn test_type_and_method_paths_are_combined() {
        let code = r#"
            #[path("/store", "/shop")]
            pub struct StoreController;

            impl StoreController {
                #[path("/order/:orderId")]
                pub fn get_order(&self) {}

                #[post]
                #[path("/order")]
                pub fn place_order(&self) {}

                pub fn not_a_route(&self) {}
            }
        "#;

        let routes = AnnotatedExtractor.extract_routes(&[parse_code(code)]);

        assert_eq!(
            summary(&routes),
            vec![
                "GET /store/order/{orderId} get_order",
                "GET /shop/order/{orderId} get_order",
                "POST /store/order place_order",
                "POST /shop/order place_order",
            ]
        );
    }

    #[test]
    fn test_order_then_name() {
        let code = r#"
            impl B {
                #[path("/b1")]
                fn one(&self) {}
                #[order(1)]
                #[path("/b2")]
                fn two(&self) {}
            }
            impl A {
                #[path("/a")]
                fn zed(&self) {}
            }
        "#;

        let routes = AnnotatedExtractor.extract_routes(&[parse_code(code)]);

        assert_eq!(
            summary(&routes),
            vec!["GET /b2 two", "GET /a zed", "GET /b1 one"]
        );
    }

    #[test]
    fn test_verb_attribute_path() {
        let code = r#"
            #[path("/user")]
            impl UserController {
                #[delete("/:username")]
                fn delete_user(&self) {}
            }
        "#;

        let routes = AnnotatedExtractor.extract_routes(&[parse_code(code)]);

        assert_eq!(summary(&routes), vec!["DELETE /user/{username} delete_user"]);
    }
}
