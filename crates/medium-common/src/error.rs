//! Error types for editable medium operations

use miette::Diagnostic;

/// Main error type for editable medium operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum MediumError {
    /// Author parameters could not be turned into a parameter tree
    #[error("invalid content parameters: {0}")]
    #[diagnostic(code(medium::params))]
    InvalidParams(String),

    /// Field schema could not be parsed or used
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// Configuration could not be loaded or saved
    #[error("configuration error: {0}")]
    #[diagnostic(code(medium::config))]
    Config(String),

    /// IO error
    #[error(transparent)]
    #[diagnostic(code(medium::io))]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Serde(#[from] SerDeError),
}

/// Problems with a declarative field schema.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SchemaError {
    /// A `regexp.pattern` that does not compile.
    #[error("invalid pattern `{pattern}` for field `{field}`")]
    #[diagnostic(
        code(medium::schema::pattern),
        help("patterns use Rust regex syntax; lookaround and backreferences are unsupported")
    )]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A group the dialog needs is not present in the schema.
    #[error("schema has no field named `{0}`")]
    #[diagnostic(code(medium::schema::missing))]
    MissingField(String),
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(medium::serde::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(medium::serde::toml))]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(code(medium::serde::toml))]
    TomlSer(#[from] toml::ser::Error),
}

impl From<serde_json::Error> for MediumError {
    fn from(err: serde_json::Error) -> Self {
        MediumError::Serde(SerDeError::Json(err))
    }
}

impl From<toml::de::Error> for MediumError {
    fn from(err: toml::de::Error) -> Self {
        MediumError::Serde(SerDeError::TomlDe(err))
    }
}

impl From<toml::ser::Error> for MediumError {
    fn from(err: toml::ser::Error) -> Self {
        MediumError::Serde(SerDeError::TomlSer(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: MediumError = err.into();
        assert!(matches!(err, MediumError::Serde(SerDeError::Json(_))));
    }

    #[test]
    fn pattern_error_names_field() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = SchemaError::InvalidPattern {
            field: "sourceURL".into(),
            pattern: "(".into(),
            source,
        };
        assert_eq!(err.to_string(), "invalid pattern `(` for field `sourceURL`");
    }
}
