use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KMeansError {
    #[error("k must be at least 1, got {k}")]
    InvalidClusterCount { k: usize },
    #[error("cannot cluster 0 vectors")]
    EmptyDataset,
    #[error("non-matching lengths of vectors and tags: {vectors}, {tags}")]
    TagsLengthMismatch { vectors: usize, tags: usize },
    #[error("tag {tag} of vector {index} is out of range for {centroids} centroids")]
    TagOutOfRange { index: usize, tag: usize, centroids: usize },
    #[error("cannot tag on 0 centroids")]
    NoCentroids,
    #[error("dimensions mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("vectors must have at least 1 dimension")]
    ZeroDimensions,
    #[error("invalid options: {reason}")]
    InvalidOptions { reason: String },
}

pub type Result<T> = std::result::Result<T, KMeansError>;
