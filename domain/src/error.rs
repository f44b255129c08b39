use thiserror::Error;

/// Reasons a search payload is rejected at the parsing boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error(
        "payload arrays differ in length: {documents} documents, {indices} indices, {similarities} similarities"
    )]
    LengthMismatch {
        documents: usize,
        indices: usize,
        similarities: usize,
    },
    #[error("similarity at position {position} is not a finite number")]
    NonFiniteSimilarity { position: usize },
}
