//! k-means clustering over in-memory `f64` vectors.
//!
//! Centroids are seeded with k-means++ and refined with Lloyd's algorithm.
//! The assignment step skips centroids that the triangle inequality proves
//! cannot be nearer than the current best, which pays off once centroids
//! settle and the previous tags become good starting guesses.
//!
//! ```
//! use lloyd_kmeans::{cluster, VectorsList};
//!
//! let vectors = VectorsList::from_arrays(&[
//!     [0.0, 0.0],
//!     [0.0, 1.0],
//!     [10.0, 0.0],
//!     [10.0, 1.0],
//! ]);
//! let (centroids, tags) = cluster(&vectors, 2).unwrap();
//! assert_eq!(2, centroids.count());
//! assert_eq!(4, tags.len());
//! ```

mod assign;
mod error;
mod init;
mod kmeans;
mod update;
mod vectors;

pub use assign::{tag, tag_exhaustive};
pub use error::{KMeansError, Result};
pub use init::{InitCentroids, InitKmeansPP, kmeans_pp_pick_indices};
pub use kmeans::{
    Clustering, DEFAULT_CONVERGENCE_RATIO, DEFAULT_MAX_ITERATIONS, KMeans, cluster, cluster_with_rng,
    mean_squared_error,
};
pub use update::find_means;
pub use vectors::{VectorsList, accumulate, calc_distance_sq, distance, scale};
