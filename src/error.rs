//! Error handling for the strzip library
//!
//! One error enum covers the whole crate: UTF-8 validation failures,
//! codepoint-boundary violations, numeric parse failures, and the
//! bounds/allocation errors shared by the span and string types.

use thiserror::Error;

/// Main error type for the strzip library
#[derive(Error, Debug)]
pub enum StrZipError {
    /// Byte buffer failed UTF-8 validation
    #[error("invalid UTF-8: {message}")]
    InvalidUtf8 {
        /// Description of the validation failure
        message: String,
    },

    /// Slicing or splitting violated a structural boundary
    #[error("boundary violation: {message}")]
    Boundary {
        /// Description naming the offending offset
        message: String,
    },

    /// Numeric text could not be parsed
    #[error("parse error: {message}")]
    Parse {
        /// Description echoing the offending input
        message: String,
    },

    /// Index out of bounds access
    #[error("out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Memory allocation failure
    #[error("memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// Feature not supported
    #[error("not supported: {feature}")]
    NotSupported {
        /// Description of the unsupported feature
        feature: String,
    },
}

impl StrZipError {
    /// Create an invalid UTF-8 error
    pub fn invalid_utf8<S: Into<String>>(message: S) -> Self {
        Self::InvalidUtf8 {
            message: message.into(),
        }
    }

    /// Create a boundary violation error
    pub fn boundary<S: Into<String>>(message: S) -> Self {
        Self::Boundary {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create a not supported error
    pub fn not_supported<S: Into<String>>(feature: S) -> Self {
        Self::NotSupported {
            feature: feature.into(),
        }
    }

    /// Check if this error is recoverable by the caller
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidUtf8 { .. } => true,
            Self::Boundary { .. } => true,
            Self::Parse { .. } => true,
            Self::OutOfBounds { .. } => false,
            Self::OutOfMemory { .. } => false,
            Self::NotSupported { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidUtf8 { .. } => "utf8",
            Self::Boundary { .. } => "boundary",
            Self::Parse { .. } => "parse",
            Self::OutOfBounds { .. } => "bounds",
            Self::OutOfMemory { .. } => "memory",
            Self::NotSupported { .. } => "unsupported",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, StrZipError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(StrZipError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}

/// Assert that a half-open range is within bounds
#[inline]
pub fn check_range(start: usize, end: usize, size: usize) -> Result<()> {
    if start > end {
        return Err(StrZipError::boundary(format!(
            "invalid range: start {} > end {}",
            start, end
        )));
    }
    if end > size {
        return Err(StrZipError::out_of_bounds(end, size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = StrZipError::invalid_utf8("truncated sequence");
        assert_eq!(err.category(), "utf8");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = StrZipError::boundary("byte 3: slice index must fall on codepoint boundary");
        let display = format!("{}", err);
        assert!(display.contains("boundary violation"));
        assert!(display.contains("byte 3"));

        let bounds = StrZipError::out_of_bounds(10, 5);
        let display = format!("{}", bounds);
        assert!(display.contains("10"));
        assert!(display.contains("5"));
    }

    #[test]
    fn test_bounds_checking() {
        assert!(check_bounds(5, 10).is_ok());
        assert!(check_bounds(10, 10).is_err());
        assert!(check_bounds(0, 0).is_err());
    }

    #[test]
    fn test_range_checking() {
        assert!(check_range(2, 8, 10).is_ok());
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(8, 2, 10).is_err());
        assert!(check_range(2, 15, 10).is_err());
    }

    #[test]
    fn test_recoverability() {
        assert!(StrZipError::parse("bad digit").is_recoverable());
        assert!(!StrZipError::out_of_memory(1 << 40).is_recoverable());
        assert!(!StrZipError::not_supported("step != 1").is_recoverable());
    }
}
