use thiserror::Error;

/// Main error type for the turntable-rpm library
#[derive(Error, Debug)]
pub enum RpmError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio loading and channel handling errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to decode {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    #[error("Channel mode '{mode}' needs at least 2 channels, but the recording has {channels}")]
    InvalidChannel { mode: String, channels: u16 },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Peak selection and statistics errors
#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid argument: {details}")]
    InvalidArgument { details: String },

    #[error("Degenerate interval #{index} ({interval} s) between consecutive peaks")]
    DegenerateInterval { index: usize, interval: f64 },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid channel mode '{value}', choose 'left', 'right' or 'mix'")]
    InvalidChannelMode { value: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to parse configuration file {path}: {reason}")]
    ParseFailed { path: String, reason: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Plot rendering errors
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Plot rendering failed: {reason}")]
    RenderFailed { reason: String },

    #[error("Could not save plot to {path}: {reason}")]
    SaveFailed { path: String, reason: String },
}

/// Convenience type alias for Results using RpmError
pub type Result<T> = std::result::Result<T, RpmError>;

/// Process exit codes used by the CLI
pub mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const INSUFFICIENT_PEAKS: u8 = 1;
    pub const CONFIGURATION: u8 = 2;
    pub const INPUT: u8 = 3;
    pub const DEGENERATE_INTERVAL: u8 = 4;
    pub const PLOT: u8 = 5;
}

impl RpmError {
    /// Exit code the CLI reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => exit_code::CONFIGURATION,
            Self::Analysis(AnalysisError::InvalidArgument { .. }) => exit_code::CONFIGURATION,
            Self::Analysis(AnalysisError::DegenerateInterval { .. }) => {
                exit_code::DEGENERATE_INTERVAL
            }
            // Asking for the right channel of a mono file is a usage problem
            Self::Audio(AudioError::InvalidChannel { .. }) => exit_code::CONFIGURATION,
            Self::Audio(_) | Self::Io(_) => exit_code::INPUT,
            Self::Plot(_) => exit_code::PLOT,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not load audio file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Audio(AudioError::UnsupportedFormat { format }) => {
                format!("Audio format '{}' is not supported. Use wav, mp3, flac, ogg, m4a or aac.", format)
            }
            Self::Analysis(AnalysisError::DegenerateInterval { index, .. }) => {
                format!("Peaks {} and {} share the same timestamp; no RPM can be derived from a zero-length interval.", index, index + 1)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
