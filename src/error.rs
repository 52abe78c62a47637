//! Error handling for Soundshift
//!
//! Every pipeline stage reports failure through [`SoundshiftError`]. The
//! per-file boundary in [`crate::engine::processor`] catches all of them,
//! so none of these ever reach the batch driver's caller.

use thiserror::Error;

/// Result type alias for Soundshift operations
pub type Result<T> = std::result::Result<T, SoundshiftError>;

/// Main error type for Soundshift operations
#[derive(Error, Debug)]
pub enum SoundshiftError {
    // Input Errors
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid audio buffer: {reason}")]
    InvalidBuffer { reason: String },

    // Processing Errors
    #[error("Resample failed: {reason}")]
    Resample { reason: String },

    // Output Errors
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SoundshiftError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SoundshiftError::Decode { .. } => "DECODE_ERROR",
            SoundshiftError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            SoundshiftError::InvalidBuffer { .. } => "INVALID_BUFFER",
            SoundshiftError::Resample { .. } => "RESAMPLE_ERROR",
            SoundshiftError::Encode { .. } => "ENCODE_ERROR",
            SoundshiftError::Config { .. } => "CONFIG_ERROR",
            SoundshiftError::Io(_) => "IO_ERROR",
            SoundshiftError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SoundshiftError::Decode { .. } => vec![
                "Check if the file plays in another application",
                "The file may be corrupted - try re-exporting from source",
            ],
            SoundshiftError::UnsupportedFormat { .. } => vec![
                "Supported inputs: MP3, WAV, FLAC, M4A, AAC",
                "Convert the file to WAV first",
            ],
            SoundshiftError::Encode { .. } => vec![
                "FLAC output supports 8 to 24-bit samples only",
                "Use the simplified preset to write WAV instead",
            ],
            SoundshiftError::Config { .. } => vec![
                "Run 'soundshift-cli presets' to see a valid configuration",
                "Ranges must have min <= max and positive bounds",
            ],
            SoundshiftError::Io(_) => vec![
                "Check the path exists and is readable",
                "Check there is free disk space for the output",
            ],
            _ => vec![],
        }
    }

    pub(crate) fn decode(path: &std::path::Path, reason: impl ToString) -> Self {
        SoundshiftError::Decode {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encode(path: &std::path::Path, reason: impl ToString) -> Self {
        SoundshiftError::Encode {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        SoundshiftError::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_codes() {
        let err = SoundshiftError::decode(Path::new("song.mp3"), "bad header");
        assert_eq!(err.error_code(), "DECODE_ERROR");
        assert_eq!(err.to_string(), "Failed to decode song.mp3: bad header");

        let err = SoundshiftError::Resample {
            reason: "ratio must be positive".to_string(),
        };
        assert_eq!(err.error_code(), "RESAMPLE_ERROR");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SoundshiftError = io.into();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = SoundshiftError::encode(Path::new("out.flac"), "32-bit");
        assert!(!err.recovery_suggestions().is_empty());

        let err = SoundshiftError::InvalidBuffer {
            reason: "empty".to_string(),
        };
        assert!(err.recovery_suggestions().is_empty());
    }
}
