//! Reads documentation attributes off items and turns them into [`Tag`]s.
//!
//! The attributes are inert markers (they are never expanded by a macro), so anything that
//! parses as a comma separated list of expressions is accepted:
//!
//! ```text
//! #[api(name = "pet", description = "Operations about pets")]
//! #[returns(Vec<Pet>, unique_items)]
//! #[response_code(code = 404, message = "Pet not found", returns = ApiError)]
//! #[form(field(name = "file", type_of = "file", description = "file to upload"))]
//! #[path_param("petId")] #[min(1)] #[values(default_value = "available", allowed = ["available", "sold"])]
//! ```
//!
//! Attributes that are not documentation markers (`derive`, `serde`, `doc`, ...) are ignored.

use crate::descriptor::tags::{ApiInfo, Bounds, FormField, ResponseCode};
use crate::descriptor::{HttpMethod, Tag, Tags, TypeRef};
use crate::type_resolver::type_ref;
use log::warn;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token, UnOp};

const DEFAULT_MIN: &str = "0";
const DEFAULT_MAX: &str = "2147483647";

/// Collects the tags of every recognized attribute, in order.
///
/// Malformed documentation attributes are logged and skipped.
pub fn parse_tags(attrs: &[Attribute]) -> Tags {
    let mut tags = Tags::default();
    for attr in attrs {
        let Some(name) = attr.path().segments.last().map(|s| s.ident.to_string()) else {
            continue;
        };
        match parse_attribute(&name, attr) {
            Ok(parsed) => {
                for tag in parsed {
                    tags.push(tag);
                }
            }
            Err(e) => warn!("Ignoring malformed #[{}] attribute: {}", name, e),
        }
    }
    tags
}

/// Arguments of an attribute split into positional and `key = value` parts.
struct Args {
    positional: Vec<Expr>,
    named: Vec<(String, Expr)>,
}

impl Args {
    fn parse(attr: &Attribute) -> syn::Result<Self> {
        let exprs: Vec<Expr> = match &attr.meta {
            Meta::Path(_) => Vec::new(),
            Meta::List(_) => attr
                .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)?
                .into_iter()
                .collect(),
            Meta::NameValue(nv) => vec![nv.value.clone()],
        };
        Ok(Self::split(exprs))
    }

    fn split(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let mut positional = Vec::new();
        let mut named = Vec::new();
        for expr in exprs {
            match expr {
                Expr::Assign(assign) => match assign_key(&assign.left) {
                    Some(key) => named.push((key, *assign.right)),
                    None => positional.push(Expr::Assign(assign)),
                },
                other => positional.push(other),
            }
        }
        Self { positional, named }
    }

    fn get(&self, key: &str) -> Option<&Expr> {
        self.named.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(string)
    }

    /// First positional string literal.
    fn first_string(&self) -> Option<String> {
        self.positional.iter().find_map(string)
    }

    fn strings(&self) -> Vec<String> {
        self.positional.iter().filter_map(string).collect()
    }

    fn require_first_string(&self, attr: &Attribute) -> syn::Result<String> {
        self.first_string()
            .or_else(|| self.string("value"))
            .or_else(|| self.string("name"))
            .ok_or_else(|| syn::Error::new_spanned(attr, "expected a string argument"))
    }
}

fn assign_key(left: &Expr) -> Option<String> {
    match left {
        Expr::Path(p) => p.path.get_ident().map(|i| i.to_string()),
        _ => None,
    }
}

fn string(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Some(s.value()),
        _ => None,
    }
}

/// Numeric literal as written, `-` included; string literals pass through.
fn number_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Int(i) => Some(i.base10_digits().to_string()),
            Lit::Float(f) => Some(f.base10_digits().to_string()),
            Lit::Str(s) => Some(s.value()),
            _ => None,
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            number_text(&unary.expr).map(|t| format!("-{}", t))
        }
        _ => None,
    }
}

fn integer(expr: &Expr) -> Option<i64> {
    number_text(expr).and_then(|t| t.parse().ok())
}

/// `Foo`, `crate::Foo` or `"Vec<Foo>"`.
fn type_arg(expr: &Expr) -> Option<TypeRef> {
    match expr {
        Expr::Path(p) => p
            .path
            .segments
            .last()
            .map(|s| TypeRef::named(s.ident.to_string())),
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => syn::parse_str::<syn::Type>(&s.value()).ok().map(|ty| type_ref(&ty)),
        _ => None,
    }
}

fn ident_or_string(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
        other => string(other),
    }
}

fn bounds(args: &Args) -> Bounds {
    Bounds {
        min: args
            .get("min")
            .and_then(number_text)
            .unwrap_or_else(|| DEFAULT_MIN.to_string()),
        max: args
            .get("max")
            .and_then(number_text)
            .unwrap_or_else(|| DEFAULT_MAX.to_string()),
    }
}

fn parse_attribute(name: &str, attr: &Attribute) -> syn::Result<Vec<Tag>> {
    let tag = match name {
        "api" => {
            let args = Args::parse(attr)?;
            Tag::Api {
                name: args.string("name"),
                value: args
                    .string("value")
                    .or_else(|| args.string("description"))
                    .or_else(|| args.first_string()),
            }
        }
        "api_info" => {
            let args = Args::parse(attr)?;
            Tag::ApiInfo(ApiInfo {
                title: args.string("title"),
                description: args.string("description"),
                contact: args.string("contact"),
                terms_of_service: args.string("terms_of_service"),
                license: args.string("license"),
                license_url: args.string("license_url"),
            })
        }
        "hidden" => Tag::Hidden,
        "deprecated" => Tag::Deprecated,
        "json" => Tag::Json,
        "xml" => Tag::Xml,
        "required" => Tag::Required,
        "not_null" => Tag::NotNull,
        "notes" => Tag::Notes(Args::parse(attr)?.require_first_string(attr)?),
        "version" => Tag::Version(Args::parse(attr)?.require_first_string(attr)?),
        "produces" => Tag::Produces(Args::parse(attr)?.strings()),
        "consumes" => Tag::Consumes(Args::parse(attr)?.strings()),
        "returns" => parse_returns(attr)?,
        "response_code" => {
            let args = Args::parse(attr)?;
            let code = args
                .get("code")
                .or_else(|| args.positional.first())
                .and_then(integer)
                .and_then(|c| u16::try_from(c).ok())
                .ok_or_else(|| syn::Error::new_spanned(attr, "expected an HTTP status code"))?;
            Tag::ResponseCode(ResponseCode {
                code,
                message: args.string("message").unwrap_or_default(),
                returns: args.get("returns").and_then(type_arg),
            })
        }
        "form" => Tag::Form(parse_form(attr)?),
        "filter_with" => {
            let args = Args::parse(attr)?;
            Tag::FilterWith(args.positional.iter().filter_map(ident_or_string).collect())
        }
        "path" => Tag::Path(Args::parse(attr)?.strings()),
        "get" | "post" | "put" | "delete" | "patch" | "head" | "options" => {
            let mut tags = Vec::new();
            if let Some(method) = HttpMethod::parse(name) {
                tags.push(Tag::Method(method));
            }
            // `#[get("/pet")]` also declares the path
            let paths = Args::parse(attr)?.strings();
            if !paths.is_empty() {
                tags.push(Tag::Path(paths));
            }
            return Ok(tags);
        }
        "http_method" => {
            let verb = Args::parse(attr)?.require_first_string(attr)?;
            let method = HttpMethod::parse(&verb).ok_or_else(|| {
                syn::Error::new_spanned(attr, format!("unknown HTTP method {}", verb))
            })?;
            Tag::Method(method)
        }
        "order" => {
            let args = Args::parse(attr)?;
            let order = args
                .positional
                .first()
                .and_then(integer)
                .ok_or_else(|| syn::Error::new_spanned(attr, "expected an integer"))?;
            Tag::Order(order)
        }
        "path_param" => Tag::PathParam(Args::parse(attr)?.require_first_string(attr)?),
        "param" => Tag::Param(Args::parse(attr)?.require_first_string(attr)?),
        "params" => Tag::Params(Args::parse(attr)?.require_first_string(attr)?),
        "header" => Tag::Header(Args::parse(attr)?.require_first_string(attr)?),
        "headers" => Tag::Headers(Args::parse(attr)?.require_first_string(attr)?),
        "session_param" => Tag::SessionParam(Args::parse(attr)?.require_first_string(attr)?),
        "min" | "max" | "decimal_min" | "decimal_max" => {
            let args = Args::parse(attr)?;
            let value = args
                .positional
                .first()
                .or_else(|| args.get("value"))
                .and_then(number_text)
                .ok_or_else(|| syn::Error::new_spanned(attr, "expected a number"))?;
            match name {
                "min" => Tag::Min(value),
                "max" => Tag::Max(value),
                "decimal_min" => Tag::DecimalMin(value),
                _ => Tag::DecimalMax(value),
            }
        }
        "size" => Tag::Size(bounds(&Args::parse(attr)?)),
        "length" => Tag::Length(bounds(&Args::parse(attr)?)),
        "number_value" => Tag::NumberValue(bounds(&Args::parse(attr)?)),
        "values" => {
            let args = Args::parse(attr)?;
            let allowed = match args.get("allowed") {
                Some(Expr::Array(array)) => array.elems.iter().filter_map(string).collect(),
                Some(other) => string(other).into_iter().collect(),
                None => Vec::new(),
            };
            Tag::Values {
                default_value: args.string("default_value"),
                allowed,
            }
        }
        _ => return Ok(Vec::new()),
    };
    Ok(vec![tag])
}

fn parse_returns(attr: &Attribute) -> syn::Result<Tag> {
    attr.parse_args_with(|input: ParseStream| {
        let ty: syn::Type = input.parse()?;
        let mut unique_items = false;
        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            let flag: syn::Ident = input.parse()?;
            if flag == "unique_items" {
                unique_items = true;
            } else {
                return Err(syn::Error::new(flag.span(), "expected `unique_items`"));
            }
        }
        Ok(Tag::Returns {
            ty: type_ref(&ty),
            unique_items,
        })
    })
}

fn parse_form(attr: &Attribute) -> syn::Result<Vec<FormField>> {
    let args = Args::parse(attr)?;
    let mut fields = Vec::new();
    for expr in &args.positional {
        let Expr::Call(call) = expr else {
            return Err(syn::Error::new_spanned(expr, "expected field(...)"));
        };
        let field_args = Args::split(call.args.iter().cloned());
        let name = field_args
            .string("name")
            .or_else(|| field_args.first_string())
            .ok_or_else(|| syn::Error::new_spanned(call, "form field without a name"))?;
        fields.push(FormField {
            name,
            type_of: field_args.string("type_of"),
            description: field_args.string("description"),
        });
    }
    Ok(fields)
}
