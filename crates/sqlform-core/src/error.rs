//! Conversion and extraction error types.

use sqlform_model::FormationError;
use thiserror::Error;

/// Errors raised while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The option combination is not supported by the target dialect.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A type has no mapping rule, or its shape is explicitly disallowed.
    #[error("unsupported type `{type_name}`: {reason}")]
    UnsupportedType {
        /// The offending native type.
        type_name: String,
        /// What went wrong, and how to fix it where possible.
        reason: String,
    },

    /// Members of a discriminated union have different primary key types.
    #[error("inconsistent primary key types in union `{union}`: {key_types}")]
    InconsistentKeyTypes {
        /// The union type.
        union: String,
        /// The distinct key types found, comma separated.
        key_types: String,
    },

    /// Members of a union have no common SQL representation.
    #[error("incompatible union member types in `{union}`")]
    IncompatibleUnionTypes {
        /// The union type.
        union: String,
        /// Underlying combinator error.
        #[source]
        source: FormationError,
    },

    /// Two modules map to the same namespace.
    #[error("namespace `{namespace}` is the target of more than one module")]
    DuplicateNamespaceTarget {
        /// Repeated target; empty for the default namespace.
        namespace: String,
    },

    /// A module is missing from a non-empty namespace mapping.
    #[error("module `{module}` has no namespace mapping")]
    UnmappedModule {
        /// The unmapped module.
        module: String,
    },

    /// A referenced type is not registered.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// A type name was registered twice with different definitions.
    #[error("type `{0}` is already registered with a different definition")]
    DuplicateType(String),

    /// Struct types reference each other in a cycle.
    #[error("circular dependency among struct types: {0}")]
    CircularDependency(String),

    /// A catalog object violated a structural invariant.
    #[error(transparent)]
    Formation(#[from] FormationError),

    /// Failure while compiling a specific entity.
    #[error("error processing entity `{entity}`: {source}")]
    Entity {
        /// The owning entity.
        entity: String,
        /// Underlying error.
        #[source]
        source: Box<ConvertError>,
    },
}

/// Root cause category of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`ConvertError::Configuration`].
    Configuration,
    /// See [`ConvertError::UnsupportedType`].
    UnsupportedType,
    /// See [`ConvertError::InconsistentKeyTypes`].
    InconsistentKeyTypes,
    /// See [`ConvertError::IncompatibleUnionTypes`].
    IncompatibleUnionTypes,
    /// See [`ConvertError::DuplicateNamespaceTarget`].
    DuplicateNamespaceTarget,
    /// See [`ConvertError::UnmappedModule`].
    UnmappedModule,
    /// See [`ConvertError::UnknownType`].
    UnknownType,
    /// See [`ConvertError::DuplicateType`].
    DuplicateType,
    /// See [`ConvertError::CircularDependency`].
    CircularDependency,
    /// See [`ConvertError::Formation`].
    Formation,
}

impl ConvertError {
    /// Create an unsupported type error.
    pub fn unsupported(type_name: impl ToString, reason: impl Into<String>) -> Self {
        ConvertError::UnsupportedType {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap this error with the identity of the entity being compiled.
    pub fn in_entity(self, entity: impl Into<String>) -> Self {
        ConvertError::Entity {
            entity: entity.into(),
            source: Box::new(self),
        }
    }

    /// Root cause category, looking through entity wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Configuration(_) => ErrorKind::Configuration,
            ConvertError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            ConvertError::InconsistentKeyTypes { .. } => ErrorKind::InconsistentKeyTypes,
            ConvertError::IncompatibleUnionTypes { .. } => ErrorKind::IncompatibleUnionTypes,
            ConvertError::DuplicateNamespaceTarget { .. } => ErrorKind::DuplicateNamespaceTarget,
            ConvertError::UnmappedModule { .. } => ErrorKind::UnmappedModule,
            ConvertError::UnknownType(_) => ErrorKind::UnknownType,
            ConvertError::DuplicateType(_) => ErrorKind::DuplicateType,
            ConvertError::CircularDependency(_) => ErrorKind::CircularDependency,
            ConvertError::Formation(_) => ErrorKind::Formation,
            ConvertError::Entity { source, .. } => source.kind(),
        }
    }

    /// The innermost entity this error was raised in, if any.
    pub fn entity(&self) -> Option<&str> {
        match self {
            ConvertError::Entity { entity, source } => source.entity().or(Some(entity)),
            _ => None,
        }
    }
}

/// Errors raised while extracting insert tuples from records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The table has a column with no matching entity field.
    #[error("column `{column}` has no matching field in entity `{entity}`")]
    UnknownColumn {
        /// Entity name.
        entity: String,
        /// Column name.
        column: String,
    },

    /// A non-nullable field is missing or null.
    #[error("missing value for non-nullable column `{0}`")]
    MissingValue(String),

    /// A value does not fit the column it is bound to.
    #[error("value for column `{column}` does not match {expected}: {found}")]
    ValueMismatch {
        /// Column name.
        column: String,
        /// Expected value shape.
        expected: String,
        /// The value found.
        found: String,
    },

    /// JSON encoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Serialization(err.to_string())
    }
}

/// Result type for conversion.
pub type Result<T> = std::result::Result<T, ConvertError>;
