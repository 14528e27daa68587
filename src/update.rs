use crate::error::{KMeansError, Result};
use crate::vectors::*;

/// New centroids as the mean of the vectors tagged with each cluster.
///
/// A cluster nobody is tagged with keeps an all-zero centroid.
pub fn find_means(vectors: &VectorsList, tags: &[usize], k: usize) -> Result<VectorsList> {
    if tags.len() != vectors.count() {
        return Err(KMeansError::TagsLengthMismatch { vectors: vectors.count(), tags: tags.len() });
    }
    let mut means = VectorsList::new(k, vectors.dim());
    let mut counts = vec![0usize; k];
    for (index, (vector, &tag)) in vectors.iter().zip(tags).enumerate() {
        if tag >= k {
            return Err(KMeansError::TagOutOfRange { index, tag, centroids: k });
        }
        counts[tag] += 1;
        accumulate(means.get_mut(tag), vector);
    }
    for (mean, &count) in means.iter_mut().zip(&counts) {
        if count != 0 {
            scale(mean, 1.0 / count as f64);
        }
    }
    Ok(means)
}
