use camino::Utf8PathBuf;

/// Boxed cause carried by infrastructure errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for the ipgeo library.
///
/// Only fatal outcomes are represented here. A malformed address or an
/// address the database has no coverage for is not an error; lookups turn
/// those into an empty result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A function was called with the wrong number of arguments.
    #[error("{function}() accepts {expected}. {found} found.")]
    InvalidArity {
        function: &'static str,
        expected: &'static str,
        found: usize,
    },

    /// A function argument was not of the required type.
    #[error("{function}() argument {position} must be a string, got {found}")]
    InvalidArgumentType {
        function: &'static str,
        position: usize,
        found: String,
    },

    /// The geo trait argument was null.
    #[error("the lookup trait must not be null; it can be country, subdivision, city, or location")]
    MissingTrait,

    /// The geo trait argument named an attribute we cannot extract.
    #[error("{name} is an unsupported lookup. The lookup trait can be country, subdivision, city, or location.")]
    UnsupportedTrait { name: String },

    /// The geo database could not be opened or parsed.
    #[error("problem reading geo database at {path}")]
    DatabaseOpen {
        path: Utf8PathBuf,
        #[source]
        source: BoxError,
    },

    /// A query against an opened database failed for a reason other than
    /// the address not being covered.
    #[error("problem retrieving information for [ {ip} ]")]
    LookupFailed {
        ip: String,
        #[source]
        source: BoxError,
    },
}

/// Coarse classification of an [`Error`], mirroring how a host should react.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments. Reported before any I/O and never retried.
    Validation,
    /// The database is unreachable, unreadable or corrupt.
    Infrastructure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArity { .. }
            | Error::InvalidArgumentType { .. }
            | Error::MissingTrait
            | Error::UnsupportedTrait { .. } => ErrorKind::Validation,
            Error::DatabaseOpen { .. } | Error::LookupFailed { .. } => ErrorKind::Infrastructure,
        }
    }
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;
