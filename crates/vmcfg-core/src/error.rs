//! Error types for vmcfg-core

use crate::codec::CodecError;
use crate::location::LoadLocation;

/// Result type for vmcfg-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A top-level namespace was claimed by a second plugin
    #[error("namespace '{namespace}' is already registered by plugin '{owner}' (rejected '{plugin}')")]
    RegistrationConflict {
        namespace: String,
        owner: String,
        plugin: String,
    },

    /// A namespace is present in configuration but no plugin owns it
    #[error("no plugin set for config namespace '{namespace}'")]
    MissingRegistration { namespace: String },

    /// A wire payload could not be decoded into a configuration tree
    #[error("failed to decode configuration: {0}")]
    Decode(#[source] CodecError),

    /// A configuration tree could not be encoded into a wire payload
    #[error("failed to encode configuration: {0}")]
    Encode(#[source] CodecError),

    /// A value had the wrong shape where a tree was required
    #[error("invalid data type for '{context}': expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The requested namespace is not defined in the resolved configuration
    #[error("no config defined for requested namespace ({namespace})")]
    NamespaceNotFound { namespace: String },

    /// A lookup path could not be followed
    #[error("failed to locate value at given path {path:?} (missing segment '{segment}')")]
    LookupNotFound { path: Vec<String>, segment: String },

    /// A lookup was requested without any path segments
    #[error("no lookup path provided")]
    EmptyPath,

    /// The legacy parser failed to expand a target definition
    #[error("failed to parse configuration for target '{target}': {reason}")]
    Parser { target: String, reason: String },

    /// The raw definition for a target is empty
    #[error("empty value found for requested target '{target}'")]
    EmptyTargetDefinition { target: String },

    /// A read was attempted before a successful `init`
    #[error("configuration has not been initialized")]
    NotInitialized,

    /// No source was added for the requested location
    #[error("no configuration source for given location ({location})")]
    NoSource { location: LoadLocation },

    /// Runtime targets require an origin scope
    #[error("cannot create target '{target}', no origin set")]
    NoOrigin { target: String },

    /// A plugin component rejected a merge or finalize request
    #[error("config component for '{namespace}' failed: {reason}")]
    Component { namespace: String, reason: String },

    /// The origin scope failed to load a runtime target
    #[error("origin '{origin}' failed to load target '{target}': {reason}")]
    Origin {
        origin: String,
        target: String,
        reason: String,
    },

    /// A cleanup action failed during close
    #[error("cleanup failed: {reason}")]
    Cleanup { reason: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Build a component failure for the given namespace
    pub fn component(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Component {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    /// Build a parser failure for the given target
    pub fn parser(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parser {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}
