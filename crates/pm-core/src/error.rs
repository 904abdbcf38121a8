use thiserror::Error;

/// Input rejected before any remote call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No image provided")]
    MissingImage,
    #[error("No style provided")]
    MissingStyle,
    #[error("Unknown style: {0}")]
    UnknownStyle(String),
    #[error("No duration provided")]
    MissingDuration,
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Invalid duration {0} (must be {min}-{max} seconds)", min = crate::MIN_VIDEO_DURATION, max = crate::MAX_VIDEO_DURATION)]
    DurationOutOfRange(i64),
    #[error("Invalid file type. Only images are allowed.")]
    UnsupportedFileType,
    #[error("File too large. Maximum size is {max} bytes.", max = crate::MAX_UPLOAD_BYTES)]
    FileTooLarge(usize),
    #[error("Uploaded file is empty")]
    EmptyFile,
}
