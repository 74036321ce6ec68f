use crate::descriptor::{HttpMethod, Route};
use crate::extractor::{extract_string_literal, normalize_uri, RouteExtractor};
use crate::parser::ParsedFile;
use log::{debug, warn};
use syn::{visit::Visit, Expr, ExprMethodCall};

/// Route table extractor for builder chains ending in `.with(...)`.
///
/// ```text
/// router.get().route("/pet/{petId}").with(PetController::get_pet_by_id);
/// router.method("PATCH").route("/pet").with(PetController, "patch_pet");
/// ```
pub struct RouterExtractor;

impl RouteExtractor for RouterExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<Route> {
        let mut visitor = RouterVisitor::default();
        for parsed_file in parsed_files {
            visitor.visit_file(&parsed_file.syntax_tree);
        }
        debug!("Router table: {} routes", visitor.routes.len());
        visitor.routes
    }
}

#[derive(Default)]
struct RouterVisitor {
    routes: Vec<Route>,
}

impl RouterVisitor {
    /// Walks the receiver chain of a `.with(...)` call.
    fn parse_with_call(&self, node: &ExprMethodCall) -> Option<Route> {
        let mut uri = None;
        let mut method = None;

        let mut receiver = &*node.receiver;
        while let Expr::MethodCall(call) = receiver {
            let name = call.method.to_string();
            match name.as_str() {
                "route" => {
                    if uri.is_none() {
                        uri = call.args.first().and_then(extract_string_literal);
                    }
                }
                "method" | "METHOD" => {
                    if method.is_none() {
                        method = call
                            .args
                            .first()
                            .and_then(extract_string_literal)
                            .and_then(|verb| HttpMethod::parse(&verb));
                    }
                }
                other => {
                    if method.is_none() && call.args.is_empty() {
                        method = HttpMethod::parse(other);
                    }
                }
            }
            receiver = &call.receiver;
        }

        let uri = normalize_uri(&uri?);
        let method = method?;
        let target = self.parse_target(node);
        if target.is_none() {
            warn!("Route {} {} has no Type::handler target", method, uri);
        }
        Some(Route::new(method, uri, target))
    }

    /// `Type::handler` or `(Type, "handler")`.
    fn parse_target(&self, node: &ExprMethodCall) -> Option<(String, String)> {
        let mut args = node.args.iter();
        let first = args.next()?;
        let Expr::Path(path_expr) = first else {
            return None;
        };
        let segments: Vec<String> = path_expr
            .path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect();

        match args.next() {
            Some(handler) => {
                let handler = extract_string_literal(handler)?;
                Some((segments.last()?.clone(), handler))
            }
            None if segments.len() >= 2 => {
                let handler = segments[segments.len() - 1].clone();
                let type_name = segments[segments.len() - 2].clone();
                Some((type_name, handler))
            }
            None => None,
        }
    }
}

impl<'ast> Visit<'ast> for RouterVisitor {
    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        if node.method == "with" {
            if let Some(route) = self.parse_with_call(node) {
                debug!("Found route {} {}", route.http_method, route.uri);
                self.routes.push(route);
            }
        }
        syn::visit::visit_expr_method_call(self, node);
    }
}
