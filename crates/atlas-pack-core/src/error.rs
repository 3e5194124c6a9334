use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Basepath is not a directory or does not exist")]
    BadOutputLocation,

    #[error("Could not create atlas index file")]
    CannotOpenIndex,

    #[error("Packing infeasible at requested size {size}x{size}")]
    PackingInfeasible { size: u32 },

    #[error("Some images failed to paint")]
    PaintFailed,

    #[error("Failed to export Texture to file")]
    ExportFailed,

    #[error("path '{0}' contains a comma or newline and cannot be written to the CSV index")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
