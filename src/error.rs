use std::collections::BTreeMap;

use thiserror::Error;

use crate::metadata::handle::TypeHandle;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur during type registration,
/// bean materialization and code-unit scanning. Each variant provides specific context about
/// the failure mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## Materialization Errors
/// - [`Error::NotMaterializable`] - Type lacks exactly one public constructor
/// - [`Error::MissingArgument`] - Required constructor parameter absent from the map
/// - [`Error::ArgumentDeserialization`] - Raw value could not be coerced to the parameter type
/// - [`Error::Construction`] - The constructor itself failed
///
/// ## Introspection Errors
/// - [`Error::PropertyNotFound`] - No accessor resolves for a requested property name
/// - [`Error::TypeNotFound`] - Handle does not refer to a registered type
/// - [`Error::TypeInsert`] - Failed to register a new type descriptor
///
/// ## Scanning and I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors during directory traversal
/// - [`Error::ArchiveError`] - Malformed or unreadable archive code unit
/// - [`Error::LockError`] - Thread synchronization failure
#[derive(Error, Debug)]
pub enum Error {
    /// The target type does not expose exactly one public constructor.
    ///
    /// Materialization requires a single designated public constructor so that
    /// parameter names can be matched unambiguously against the incoming map.
    /// This is a configuration/usage bug in the registered descriptor, not a
    /// recoverable condition, and is surfaced only when materialization is
    /// attempted.
    #[error("Type '{type_name}' is not materializable: expected exactly one public constructor, found {found}")]
    NotMaterializable {
        /// Fully qualified name of the offending type
        type_name: String,
        /// Number of public constructors the descriptor declares
        found: usize,
    },

    /// A required, non-nullable constructor parameter was absent from the supplied map.
    ///
    /// The full available parameter map is echoed for diagnosability, since this
    /// typically manifests as a client-input error upstream.
    #[error("Required argument '{parameter}' is missing, available params: {available:?}")]
    MissingArgument {
        /// Name of the missing constructor parameter
        parameter: String,
        /// The complete parameter map that was supplied by the caller
        available: BTreeMap<String, String>,
    },

    /// A supplied raw value could not be coerced to the parameter's declared type.
    ///
    /// Wraps the external deserializer's own failure as the cause.
    #[error("Could not deserialize argument '{parameter}' from raw value '{raw}'")]
    ArgumentDeserialization {
        /// Name of the constructor parameter being deserialized
        parameter: String,
        /// The raw string value that failed to coerce
        raw: String,
        /// The deserializer's underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The constructor itself failed while building the instance.
    ///
    /// May indicate a deeper invariant violation in the target type; the
    /// original cause is preserved.
    #[error("Constructor of type '{type_name}' failed")]
    Construction {
        /// Fully qualified name of the type under construction
        type_name: String,
        /// The constructor's underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Accessor resolution failed for a requested property name.
    ///
    /// A programmer/configuration error, not expected in normal operation.
    #[error("Invalid property '{property}' on type '{type_name}'")]
    PropertyNotFound {
        /// The property name that failed to resolve
        property: String,
        /// Fully qualified name of the type the lookup ran against
        type_name: String,
    },

    /// Failed to find a type in the registry for the given handle.
    #[error("Failed to find type in registry - {0}")]
    TypeNotFound(TypeHandle),

    /// Failed to register a new type descriptor.
    ///
    /// Typically a duplicate fully-qualified name; the registry is append-only
    /// and a name maps to exactly one descriptor for the process lifetime.
    #[error("Failed to insert new type into registry - {0}")]
    TypeInsert(String),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while walking directory code
    /// units during a namespace scan.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error raised while reading an archive code unit.
    #[error("{0}")]
    ArchiveError(#[from] zip::result::ZipError),

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically when a
    /// scan lock was poisoned by a panicking thread.
    #[error("Failed to lock target")]
    LockError,
}
