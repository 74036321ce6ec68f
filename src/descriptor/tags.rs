//! Declarative metadata attached to controllers, handlers, parameters, types and fields.
//!
//! Tags are kept in declaration order. Lookups go through the typed accessors on [`Tags`]
//! instead of matching on the raw list, so callers never depend on iteration order except
//! where it is part of the contract (location priority, produces/consumes order).

use super::{HttpMethod, TypeRef};

/// Metadata read from the `#[api_info(...)]` tag of the routes type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub terms_of_service: Option<String>,
    pub license: Option<String>,
    pub license_url: Option<String>,
}

/// One multipart field declared by `#[form(field(...))]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    /// Free-form type hint, `"file"` (any case) marks an upload
    pub type_of: Option<String>,
    pub description: Option<String>,
}

impl FormField {
    pub fn is_file(&self) -> bool {
        self.type_of
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("file"))
            .unwrap_or(false)
    }
}

/// `#[response_code(...)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCode {
    pub code: u16,
    pub message: String,
    pub returns: Option<TypeRef>,
}

/// Lower/upper bounds as written in source, kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    pub min: String,
    pub max: String,
}

/// A single declarative metadata tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    // documentation
    Api {
        name: Option<String>,
        value: Option<String>,
    },
    ApiInfo(ApiInfo),
    Hidden,
    Notes(String),
    Deprecated,
    Version(String),

    // media types
    Json,
    Xml,
    Produces(Vec<String>),
    Consumes(Vec<String>),

    // responses
    Returns { ty: TypeRef, unique_items: bool },
    ResponseCode(ResponseCode),
    Form(Vec<FormField>),

    // security
    FilterWith(Vec<String>),

    // routing
    Path(Vec<String>),
    Method(HttpMethod),
    Order(i64),

    // argument extractors
    PathParam(String),
    Param(String),
    Params(String),
    Header(String),
    Headers(String),
    SessionParam(String),

    // validation
    Required,
    NotNull,
    Min(String),
    Max(String),
    DecimalMin(String),
    DecimalMax(String),
    Size(Bounds),
    Length(Bounds),
    NumberValue(Bounds),
    Values {
        default_value: Option<String>,
        allowed: Vec<String>,
    },
}

impl Tag {
    /// Tags that tell the framework how to bind an argument.
    pub fn is_argument_extractor(&self) -> bool {
        matches!(
            self,
            Tag::PathParam(_)
                | Tag::Param(_)
                | Tag::Params(_)
                | Tag::Header(_)
                | Tag::Headers(_)
                | Tag::SessionParam(_)
        )
    }
}

/// Ordered list of tags with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<Tag>);

/// `#[api]` content: both parts are optional and empty strings count as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTag<'a> {
    pub name: Option<&'a str>,
    pub value: Option<&'a str>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Tags {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self(tags)
    }

    pub fn push(&mut self, tag: Tag) {
        self.0.push(tag);
    }

    /// Appends every tag of `other`, keeping both orders.
    pub fn extend(&mut self, other: &Tags) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn api(&self) -> Option<ApiTag<'_>> {
        self.0.iter().find_map(|tag| match tag {
            Tag::Api { name, value } => Some(ApiTag {
                name: non_empty(name),
                value: non_empty(value),
            }),
            _ => None,
        })
    }

    pub fn api_info(&self) -> Option<&ApiInfo> {
        self.0.iter().find_map(|tag| match tag {
            Tag::ApiInfo(info) => Some(info),
            _ => None,
        })
    }

    pub fn is_hidden(&self) -> bool {
        self.0.iter().any(|tag| matches!(tag, Tag::Hidden))
    }

    pub fn is_deprecated(&self) -> bool {
        self.0.iter().any(|tag| matches!(tag, Tag::Deprecated))
    }

    pub fn notes(&self) -> Option<&str> {
        self.0.iter().find_map(|tag| match tag {
            Tag::Notes(notes) if !notes.trim().is_empty() => Some(notes.as_str()),
            _ => None,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.0.iter().find_map(|tag| match tag {
            Tag::Version(version) if !version.trim().is_empty() => Some(version.as_str()),
            _ => None,
        })
    }

    pub fn has_json(&self) -> bool {
        self.0.iter().any(|tag| matches!(tag, Tag::Json))
    }

    pub fn has_xml(&self) -> bool {
        self.0.iter().any(|tag| matches!(tag, Tag::Xml))
    }

    /// Media types of every `produces` tag, trimmed, `None` when no tag is present.
    pub fn produces(&self) -> Option<Vec<String>> {
        self.media_types(|tag| match tag {
            Tag::Produces(types) => Some(types),
            _ => None,
        })
    }

    pub fn consumes(&self) -> Option<Vec<String>> {
        self.media_types(|tag| match tag {
            Tag::Consumes(types) => Some(types),
            _ => None,
        })
    }

    fn media_types<F>(&self, select: F) -> Option<Vec<String>>
    where
        F: Fn(&Tag) -> Option<&Vec<String>>,
    {
        let mut found = false;
        let mut media_types = Vec::new();
        for types in self.0.iter().filter_map(select) {
            found = true;
            media_types.extend(types.iter().map(|t| t.trim().to_string()));
        }
        found.then_some(media_types)
    }

    pub fn returns(&self) -> Option<(&TypeRef, bool)> {
        self.0.iter().find_map(|tag| match tag {
            Tag::Returns { ty, unique_items } => Some((ty, *unique_items)),
            _ => None,
        })
    }

    pub fn response_codes(&self) -> impl Iterator<Item = &ResponseCode> {
        self.0.iter().filter_map(|tag| match tag {
            Tag::ResponseCode(code) => Some(code),
            _ => None,
        })
    }

    pub fn form(&self) -> Option<&[FormField]> {
        self.0.iter().find_map(|tag| match tag {
            Tag::Form(fields) => Some(fields.as_slice()),
            _ => None,
        })
    }

    pub fn filters(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter_map(|tag| match tag {
                Tag::FilterWith(filters) => Some(filters),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|tag| match tag {
                Tag::Path(paths) => Some(paths),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
            .collect()
    }

    pub fn http_method(&self) -> Option<HttpMethod> {
        self.0.iter().find_map(|tag| match tag {
            Tag::Method(method) => Some(method.clone()),
            _ => None,
        })
    }

    pub fn order(&self) -> Option<i64> {
        self.0.iter().find_map(|tag| match tag {
            Tag::Order(order) => Some(*order),
            _ => None,
        })
    }

    pub fn path_param(&self) -> Option<&str> {
        self.find_name(|tag| match tag {
            Tag::PathParam(name) => Some(name),
            _ => None,
        })
    }

    pub fn param(&self) -> Option<&str> {
        self.find_name(|tag| match tag {
            Tag::Param(name) => Some(name),
            _ => None,
        })
    }

    pub fn params(&self) -> Option<&str> {
        self.find_name(|tag| match tag {
            Tag::Params(name) => Some(name),
            _ => None,
        })
    }

    pub fn header(&self) -> Option<&str> {
        self.find_name(|tag| match tag {
            Tag::Header(name) => Some(name),
            _ => None,
        })
    }

    pub fn headers(&self) -> Option<&str> {
        self.find_name(|tag| match tag {
            Tag::Headers(name) => Some(name),
            _ => None,
        })
    }

    fn find_name<F>(&self, select: F) -> Option<&str>
    where
        F: Fn(&Tag) -> Option<&String>,
    {
        self.0.iter().find_map(select).map(String::as_str)
    }

    pub fn has_argument_extractor(&self) -> bool {
        self.0.iter().any(Tag::is_argument_extractor)
    }

    /// Number of distinct location-bearing tags (session parameters carry no location).
    pub fn location_tag_count(&self) -> usize {
        self.0
            .iter()
            .filter(|tag| tag.is_argument_extractor() && !matches!(tag, Tag::SessionParam(_)))
            .count()
    }

    pub fn is_required(&self) -> bool {
        self.0
            .iter()
            .any(|tag| matches!(tag, Tag::Required | Tag::NotNull))
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_parts_are_absent() {
        let tags = Tags::new(vec![Tag::Api {
            name: Some("  ".to_string()),
            value: Some("Operations about pets".to_string()),
        }]);

        let api = tags.api().unwrap();
        assert_eq!(api.name, None);
        assert_eq!(api.value, Some("Operations about pets"));
    }

    #[test]
    fn test_media_types_are_trimmed_and_kept_in_order() {
        let tags = Tags::new(vec![
            Tag::Produces(vec![" application/json".to_string()]),
            Tag::Produces(vec!["text/plain ".to_string()]),
        ]);

        assert_eq!(
            tags.produces(),
            Some(vec!["application/json".to_string(), "text/plain".to_string()])
        );
        assert_eq!(tags.consumes(), None);
    }

    #[test]
    fn test_session_param_is_an_extractor_without_location() {
        let tags = Tags::new(vec![Tag::SessionParam("user".to_string())]);

        assert!(tags.has_argument_extractor());
        assert_eq!(tags.location_tag_count(), 0);
    }

    #[test]
    fn test_form_field_file_detection_ignores_case() {
        let field = FormField {
            name: "upload".to_string(),
            type_of: Some("FILE".to_string()),
            description: None,
        };
        assert!(field.is_file());
    }
}
