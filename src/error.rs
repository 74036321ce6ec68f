use std::path::PathBuf;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    ParseError { file: PathBuf, message: String },
    InvalidArgument(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ParseError { file, message } => {
                write!(f, "解析错误 {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "无效参数: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Failures raised while declaring one route, parameter or model field.
///
/// These never escape [`crate::builder::DocumentBuilder::build`]: the route loop and the
/// model walker catch them, log them, and drop the offending route or property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A multi-element type other than an array (`HashSet<T>`, `HashMap<K, V>`, ...)
    UnsupportedCollectionType { type_name: String },
    /// `Vec<Vec<T>>` and friends have no Swagger 1.2 representation
    NestedArray { type_name: String },
    /// A handler parameter could not be declared
    ParameterDeclaration {
        position: usize,
        handler: String,
        source: Box<BuildError>,
    },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BuildError::UnsupportedCollectionType { type_name } => write!(
                f,
                "collections are not supported ({}), declare a Vec or an array instead",
                type_name
            ),
            BuildError::NestedArray { type_name } => {
                write!(f, "nested arrays are not supported ({})", type_name)
            }
            BuildError::ParameterDeclaration {
                position,
                handler,
                source,
            } => write!(
                f,
                "failed to declare parameter #{} of {}: {}",
                position, handler, source
            ),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::ParameterDeclaration { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
