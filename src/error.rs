use std::fmt;

/// Result type for deepq operations
pub type Result<T> = std::result::Result<T, DeepqError>;

/// Main error type for the deepq library
#[derive(Debug, Clone)]
pub enum DeepqError {
    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),

    /// Persisted parameters do not match the network architecture
    ShapeMismatch {
        expected: String,
        actual: String,
    },

    /// Task name did not resolve against the registry
    UnknownTask {
        name: String,
        available: String,
    },

    /// Task name prefix matched more than one registered task
    AmbiguousTask {
        name: String,
        candidates: String,
    },

    /// Empty batch or container
    EmptyBatch(String),
}

impl fmt::Display for DeepqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeepqError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            DeepqError::IoError(msg) => write!(f, "IO error: {}", msg),
            DeepqError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            DeepqError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {}, got {}", expected, actual)
            }
            DeepqError::UnknownTask { name, available } => {
                write!(f, "Unknown task: '{}'. Available tasks: {}", name, available)
            }
            DeepqError::AmbiguousTask { name, candidates } => {
                write!(f, "Ambiguous task '{}'. Did you mean one of: {}?", name, candidates)
            }
            DeepqError::EmptyBatch(msg) => write!(f, "Empty batch: {}", msg),
        }
    }
}

impl std::error::Error for DeepqError {}

// Conversion from std::io::Error
impl From<std::io::Error> for DeepqError {
    fn from(err: std::io::Error) -> Self {
        DeepqError::IoError(err.to_string())
    }
}

// Conversion from bincode::Error
impl From<bincode::Error> for DeepqError {
    fn from(err: bincode::Error) -> Self {
        DeepqError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl DeepqError {
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DeepqError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn shape_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DeepqError::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
