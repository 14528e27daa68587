use rand::Rng;
use rand::seq::SliceRandom;
use crate::vectors::*;

/// Seeding strategy producing the first centroid set of a run.
pub trait InitCentroids {
    fn run(&mut self, vectors: &VectorsList) -> VectorsList;
}

pub struct InitKmeansPP<R: Rng> {
    pub k: usize,
    pub rng: R,
}
impl<R: Rng> InitCentroids for InitKmeansPP<R> {
    fn run(&mut self, vectors: &VectorsList) -> VectorsList {
        let indices = kmeans_pp_pick_indices(vectors, self.k, &mut self.rng);
        VectorsList::from_vectors_by_indices(vectors, indices.as_slice())
    }
}

/// Picks `select_count` dataset indices with k-means++.
///
/// Candidates are visited in a random permutation. Each further centroid is
/// drawn in a single pass with probability proportional to the squared
/// distance to the nearest centroid picked so far, keeping the last candidate
/// for which `random * running_sum <= distance^2`. Already picked vectors have
/// zero weight, so for distinct vectors the result holds no repeated index.
/// Asking for more indices than there are vectors picks every vector once.
pub fn kmeans_pp_pick_indices(vectors: &VectorsList, select_count: usize, rng: &mut impl Rng) -> Vec<usize> {
    let count = vectors.count();
    let select_count = select_count.min(count);
    if select_count == 0 {
        return Vec::new();
    }
    let mut perm: Vec<usize> = (0..count).collect();
    perm.shuffle(rng);

    let mut indices = Vec::with_capacity(select_count);
    let first_index = perm[0];
    indices.push(first_index);
    let first = vectors.get(first_index);
    let mut min_distances: Box<[f64]> = vectors.iter().map(|vector| distance(vector, first)).collect();

    while indices.len() < select_count {
        let index = pick_weighted(&perm, &min_distances, rng);
        indices.push(index);
        update_distances(vectors, vectors.get(index), &mut min_distances);
    }
    indices
}

fn pick_weighted(perm: &[usize], min_distances: &[f64], rng: &mut impl Rng) -> usize {
    // the first candidate always passes, so the pick is never left unset
    let mut picked = perm[0];
    let mut sum = 0.0;
    for &index in perm {
        let weight = min_distances[index] * min_distances[index];
        sum += weight;
        if rng.random::<f64>() * sum <= weight {
            picked = index;
        }
    }
    picked
}

fn update_distances(vectors: &VectorsList, last_picked_vector: &[f64], min_distances: &mut [f64]) {
    debug_assert!(vectors.count() == min_distances.len());
    for (min_distance, vector) in min_distances.iter_mut().zip(vectors.iter()) {
        let distance_from_newest_centroid = distance(vector, last_picked_vector);
        *min_distance = min_distance.min(distance_from_newest_centroid);
    }
}
