use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("invalid padding value: {size} (must be 0..=16)")]
    InvalidPadding { size: u32 },

    #[error("could not fit bitmap into any page: {name}")]
    CantFit { name: String },

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("XML write error: {0}")]
    Xml(#[from] xml::writer::Error),

    #[error("JSON serialize error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("logging setup failed: {0}")]
    LogSetup(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
