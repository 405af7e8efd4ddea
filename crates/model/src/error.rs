use thiserror::Error;

/// Result type for mock generation operations
pub type Result<T> = std::result::Result<T, MockgenError>;

/// Errors that can occur while extracting interfaces or synthesizing mocks
#[derive(Error, Debug)]
pub enum MockgenError {
    /// Requested interface does not exist in the chosen library or source
    #[error("interface {interface}: not found in {location}")]
    NotFound { interface: String, location: String },

    /// Requested name resolves to a declaration that is not an interface
    #[error("interface {interface}: declared as {kind}, not an interface")]
    NotAnInterface { interface: String, kind: String },

    /// A method signature references a type that cannot be qualified
    #[error("interface {interface}{}: unresolvable type: {detail}", method_suffix(.method))]
    UnresolvableType {
        interface: String,
        method: Option<String>,
        detail: String,
    },

    /// Two embedded interfaces contribute different signatures under one name
    #[error(
        "interface {interface}: method {method} is declared with conflicting signatures by {first} and {second}"
    )]
    AmbiguousEmbedding {
        interface: String,
        method: String,
        first: String,
        second: String,
    },

    /// Generated output does not start with the commented header template
    #[error("generated output does not begin with the expected {expected_prefix_len}-byte header")]
    HeaderMismatch { expected_prefix_len: usize },

    /// Source file could not be parsed
    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// Package model archive could not be read
    #[error("archive {path}: {message}")]
    Archive { path: String, message: String },

    /// Reflect program could not be built or run
    #[error("toolchain error: {0}")]
    Toolchain(String),

    /// Invalid generation request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn method_suffix(method: &Option<String>) -> String {
    method
        .as_ref()
        .map(|m| format!(", method {m}"))
        .unwrap_or_default()
}

impl MockgenError {
    /// Create a not-found error
    pub fn not_found(interface: impl Into<String>, location: impl Into<String>) -> Self {
        Self::NotFound {
            interface: interface.into(),
            location: location.into(),
        }
    }

    /// Create a not-an-interface error
    pub fn not_an_interface(interface: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::NotAnInterface {
            interface: interface.into(),
            kind: kind.into(),
        }
    }

    /// Create an unresolvable type error not tied to a specific method
    pub fn unresolvable(interface: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnresolvableType {
            interface: interface.into(),
            method: None,
            detail: detail.into(),
        }
    }

    /// Create a parse error
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an archive error
    pub fn archive(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a toolchain error
    pub fn toolchain(msg: impl Into<String>) -> Self {
        Self::Toolchain(msg.into())
    }

    /// Interface name the error is about, if any
    pub fn interface(&self) -> Option<&str> {
        match self {
            Self::NotFound { interface, .. }
            | Self::NotAnInterface { interface, .. }
            | Self::UnresolvableType { interface, .. }
            | Self::AmbiguousEmbedding { interface, .. } => Some(interface),
            _ => None,
        }
    }
}
