use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by the snapshot store maps onto exactly one kind.
/// Each kind has a stable code usable for programmatic handling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,
    PreconditionFailed,

    // Write contention
    /// A uniqueness constraint would have been violated (e.g. two writers
    /// raced on the same media package version)
    Conflict,
    /// The backing store was busy or locked and the unit of work gave up
    Concurrency,

    /// Stored data violates a model invariant (detected on read)
    DataIntegrity,

    // Integration/IO
    Persistence,
    Serialization,
    Config,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::PreconditionFailed => "ERR_PRECONDITION_FAILED",
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::DataIntegrity => "ERR_DATA_INTEGRITY",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a caller may reasonably retry the whole operation
    pub fn is_retriable(&self) -> bool {
        matches!(self, ExErrorKind::Conflict | ExErrorKind::Concurrency)
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context about which media
/// package, version and element the failing operation targeted.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    media_package_id: Option<String>,
    version: Option<u64>,
    element_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            media_package_id: None,
            version: None,
            element_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add media package context
    pub fn with_media_package_id(mut self, id: impl Into<String>) -> Self {
        self.media_package_id = Some(id.into());
        self
    }

    /// Add version context
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Add media package element context
    pub fn with_element_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// True for conflicts and busy-store failures
    pub fn is_retriable(&self) -> bool {
        self.kind.is_retriable()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the media package context, if any
    pub fn media_package_id(&self) -> Option<&str> {
        self.media_package_id.as_deref()
    }

    /// Get the version context, if any
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// Get the element context, if any
    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(mp) = &self.media_package_id {
            write!(f, " (media_package_id: {})", mp)?;
        }
        if let Some(version) = self.version {
            write!(f, " (version: {})", version)?;
        }
        if let Some(element_id) = &self.element_id {
            write!(f, " (element_id: {})", element_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Failures while parsing or validating value objects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Checksum must not be empty")]
    EmptyChecksum,

    #[error("Checksum is not hexadecimal: {value}")]
    NonHexChecksum { value: String },

    #[error("Malformed MIME type: {value}")]
    MalformedMimeType { value: String },

    #[error("Not a version: {value}")]
    InvalidVersion { value: String },

    #[error("Unknown availability: {value}")]
    UnknownAvailability { value: String },

    #[error("Identifier '{field}' must not be blank")]
    BlankIdentifier { field: &'static str },

    #[error("Size {size} exceeds the storable range")]
    SizeOutOfRange { size: u64 },
}

impl From<ValueError> for ExError {
    fn from(err: ValueError) -> Self {
        ExError::new(ExErrorKind::InvalidInput).with_message(err.to_string())
    }
}
