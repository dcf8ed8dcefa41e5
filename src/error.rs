//! Error handling for Harmonia
//!
//! Every error carries a stable code and recovery suggestions so a batch run
//! can report a failed track and move on to the next one.

use thiserror::Error;

/// Result type alias for Harmonia operations
pub type Result<T> = std::result::Result<T, HarmoniaError>;

/// Main error type for Harmonia operations
#[derive(Error, Debug)]
pub enum HarmoniaError {
    // Configuration Errors
    #[error("Invalid filter design: {reason}")]
    InvalidFilter { reason: String },

    #[error("Invalid parameter '{param}': {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Envelope Errors
    #[error("Cannot normalize a silent buffer (peak {peak:e})")]
    SilentBuffer { peak: f64 },

    #[error("Fade of {fade_samples} samples does not fit a buffer of {buffer_len} samples")]
    InvalidFade {
        fade_samples: usize,
        buffer_len: usize,
    },

    // Buffer Errors
    #[error("Channel mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: String, actual: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HarmoniaError {
    /// Shorthand for an out-of-range parameter
    pub fn invalid_parameter(
        param: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        HarmoniaError::InvalidParameter {
            param: param.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            HarmoniaError::InvalidFilter { .. } => "INVALID_FILTER",
            HarmoniaError::InvalidParameter { .. } => "INVALID_PARAMETER",
            HarmoniaError::SilentBuffer { .. } => "SILENT_BUFFER",
            HarmoniaError::InvalidFade { .. } => "INVALID_FADE",
            HarmoniaError::ChannelMismatch { .. } => "CHANNEL_MISMATCH",
            HarmoniaError::EmptyAudio => "EMPTY_AUDIO",
            HarmoniaError::FileNotFound { .. } => "FILE_NOT_FOUND",
            HarmoniaError::InvalidAudio { .. } => "INVALID_AUDIO",
            HarmoniaError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            HarmoniaError::Io(_) => "IO_ERROR",
            HarmoniaError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            HarmoniaError::InvalidFilter { .. } => vec![
                "Keep every cutoff strictly between 0 Hz and the Nyquist frequency",
                "Make sure the low band edge is below the high band edge",
                "Raise the sample rate if the track needs higher cutoffs",
            ],
            HarmoniaError::InvalidParameter { .. } => vec![
                "Check the render settings and the track parameters",
                "Tone frequencies must stay below half the sample rate",
            ],
            HarmoniaError::SilentBuffer { .. } => vec![
                "The generator produced silence - check its frequency parameters",
                "A duration of a few samples may be too short for the filters",
            ],
            HarmoniaError::InvalidFade { .. } => vec![
                "Shorten the fade or lengthen the track",
                "The fade at each end may cover at most half the track",
            ],
            HarmoniaError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Regenerate the track if it was deleted",
            ],
            HarmoniaError::InvalidAudio { .. } | HarmoniaError::UnsupportedFormat { .. } => vec![
                "Only 16-bit PCM WAV files written by Harmonia can be re-imported",
                "The file may be truncated - regenerate it",
            ],
            HarmoniaError::Io(_) => vec![
                "Check the output directory exists and is writable",
                "Free up disk space",
            ],
            _ => vec![],
        }
    }
}

impl From<hound::Error> for HarmoniaError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => HarmoniaError::Io(e),
            hound::Error::Unsupported => HarmoniaError::UnsupportedFormat {
                format: "WAV variant not supported by the reader".to_string(),
            },
            other => HarmoniaError::InvalidAudio {
                reason: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
