use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("evidence payload is empty")]
    Empty,

    #[error("evidence payload of {got} bytes exceeds the {limit}-byte limit")]
    TooLarge { got: usize, limit: usize },

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("unknown evidence reference: {0}")]
    UnknownReference(String),

    #[error("evidence I/O error: {0}")]
    Io(#[from] std::io::Error),
}
