use std::time::Instant;
use log::{debug, info, warn};
use rand::Rng;
use crate::assign::tag;
use crate::error::{KMeansError, Result};
use crate::init::{InitCentroids, InitKmeansPP};
use crate::update::find_means;
use crate::vectors::*;

pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
pub const DEFAULT_CONVERGENCE_RATIO: f64 = 0.999;

/// Lloyd's algorithm settings.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    /// Requested number of clusters, reduced to the number of vectors if larger.
    pub k: usize,
    /// Upper bound on refinement iterations after seeding.
    pub max_iterations: usize,
    /// Refinement stops once `error / previous_error` reaches this ratio.
    pub convergence_ratio: f64,
    /// Independent seed-and-refine runs; the one with the lowest error is kept.
    pub tries: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub centroids: VectorsList,
    pub tags: Vec<usize>,
    pub mse: f64,
    pub iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_ratio: DEFAULT_CONVERGENCE_RATIO,
            tries: 1,
        }
    }

    /// Seeds with k-means++ drawing from `rng`, then refines until converged.
    pub fn run(&self, vectors: &VectorsList, rng: &mut impl Rng) -> Result<Clustering> {
        if self.k < 1 {
            return Err(KMeansError::InvalidClusterCount { k: self.k });
        }
        self.check(vectors)?;
        let k = self.k.min(vectors.count());
        if k < self.k {
            debug!("reduced k from {} to {k}, the number of vectors", self.k);
        }
        let mut init = InitKmeansPP{k, rng};
        self.run_with_init(vectors, &mut init)
    }

    /// Refines centroid sets produced by `init`; `self.k` is not consulted.
    pub fn run_with_init(&self, vectors: &VectorsList, init: &mut impl InitCentroids) -> Result<Clustering> {
        self.check(vectors)?;
        let mut best = self.run_once(vectors, init)?;
        let mut best_try = 0;
        for try_index in 1..self.tries {
            let clustering = self.run_once(vectors, init)?;
            if clustering.mse < best.mse {
                best = clustering;
                best_try = try_index;
            }
        }
        if self.tries > 1 {
            info!("best of {} tries is {best_try} with mse {}", self.tries, best.mse);
        }
        Ok(best)
    }

    fn check(&self, vectors: &VectorsList) -> Result<()> {
        if vectors.is_empty() {
            return Err(KMeansError::EmptyDataset);
        }
        if self.max_iterations == 0 {
            return Err(KMeansError::InvalidOptions { reason: "max_iterations must be at least 1".to_string() });
        }
        if self.tries == 0 {
            return Err(KMeansError::InvalidOptions { reason: "tries must be at least 1".to_string() });
        }
        if !(self.convergence_ratio > 0.0 && self.convergence_ratio <= 1.0) {
            return Err(KMeansError::InvalidOptions {
                reason: format!("convergence_ratio must be in (0, 1], got {}", self.convergence_ratio),
            });
        }
        Ok(())
    }

    fn run_once(&self, vectors: &VectorsList, init: &mut impl InitCentroids) -> Result<Clustering> {
        let start = Instant::now();
        let centroids = init.run(vectors);
        debug!("init {} centroids in {:?}", centroids.count(), start.elapsed());
        self.refine(vectors, centroids)
    }

    fn refine(&self, vectors: &VectorsList, mut centroids: VectorsList) -> Result<Clustering> {
        let k = centroids.count();
        let mut tags = tag(vectors, &centroids, &vec![0; vectors.count()])?;
        let mut error = mean_squared_error(vectors, &centroids, &tags)?;
        let mut previous_error = 2.0 * error;
        let mut iterations = 0;
        while is_improving(error, previous_error, self.convergence_ratio) {
            if iterations == self.max_iterations {
                warn!("kmeans stopped after {iterations} iterations without converging, mse {error} previous {previous_error}");
                break;
            }
            let start = Instant::now();
            iterations += 1;
            previous_error = error;
            centroids = find_means(vectors, &tags, k)?;
            tags = tag(vectors, &centroids, &tags)?;
            error = mean_squared_error(vectors, &centroids, &tags)?;
            debug!("kmeans iteration {iterations} in {:?}, mse {error}", start.elapsed());
        }
        info!("kmeans finished after {iterations} iterations with mse {error}");
        Ok(Clustering{centroids, tags, mse: error, iterations})
    }
}

// Error growth also counts as a reason to keep going. Under exact arithmetic a
// Lloyd step never increases the error, so this only fires on numerical noise.
fn is_improving(error: f64, previous_error: f64, ratio: f64) -> bool {
    error > previous_error || error / previous_error < ratio
}

/// Clusters `vectors` into at most `k` groups, seeding from the thread-local RNG.
///
/// Returns the centroids and, for every vector, the index of its centroid.
pub fn cluster(vectors: &VectorsList, k: usize) -> Result<(VectorsList, Vec<usize>)> {
    cluster_with_rng(vectors, k, &mut rand::rng())
}

pub fn cluster_with_rng(vectors: &VectorsList, k: usize, rng: &mut impl Rng) -> Result<(VectorsList, Vec<usize>)> {
    let clustering = KMeans::new(k).run(vectors, rng)?;
    Ok((clustering.centroids, clustering.tags))
}

/// Average squared distance of vectors from their assigned centroids.
///
/// An empty dataset yields 0 without looking at the centroids.
pub fn mean_squared_error(vectors: &VectorsList, centroids: &VectorsList, tags: &[usize]) -> Result<f64> {
    if tags.len() != vectors.count() {
        return Err(KMeansError::TagsLengthMismatch { vectors: vectors.count(), tags: tags.len() });
    }
    if vectors.is_empty() {
        return Ok(0.0);
    }
    if centroids.dim() != vectors.dim() {
        return Err(KMeansError::DimensionMismatch { expected: vectors.dim(), found: centroids.dim() });
    }
    let mut sum = 0.0;
    for (index, (vector, &tag)) in vectors.iter().zip(tags).enumerate() {
        if tag >= centroids.count() {
            return Err(KMeansError::TagOutOfRange { index, tag, centroids: centroids.count() });
        }
        sum += calc_distance_sq(centroids.get(tag), vector);
    }
    Ok(sum / vectors.count() as f64)
}
