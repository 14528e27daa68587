use crate::error::{KMeansError, Result};
use crate::vectors::*;

/// Pairwise distances between centroids, rebuilt for every tagging pass.
struct CentroidDistances {
    k: usize,
    data: Box<[f64]>,
}
impl CentroidDistances {
    fn new(centroids: &VectorsList) -> Self {
        let k = centroids.count();
        let mut data = vec![0.0; k * k].into_boxed_slice();
        for i in 0..k {
            for j in (i + 1)..k {
                let d = distance(centroids.get(i), centroids.get(j));
                data[i * k + j] = d;
                data[j * k + i] = d;
            }
        }
        Self{k, data}
    }
    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.k + j]
    }
}

fn check_centroids(vectors: &VectorsList, centroids: &VectorsList) -> Result<()> {
    if centroids.is_empty() {
        return Err(KMeansError::NoCentroids);
    }
    if centroids.dim() != vectors.dim() {
        return Err(KMeansError::DimensionMismatch { expected: vectors.dim(), found: centroids.dim() });
    }
    Ok(())
}

/// Tags each vector with the index of its nearest centroid.
///
/// `old_tags` only decides where the search for each vector starts; a missing
/// or out of range hint starts at centroid 0. Centroid `j` is skipped without
/// computing its distance when `d(c_j, c_best) >= 2 * d(x, c_best)`, since the
/// triangle inequality then gives `d(x, c_j) >= d(x, c_best)`. On exact ties
/// the hinted centroid is kept, so the result can differ from [`tag_exhaustive`]
/// only between equally near centroids.
pub fn tag(vectors: &VectorsList, centroids: &VectorsList, old_tags: &[usize]) -> Result<Vec<usize>> {
    check_centroids(vectors, centroids)?;
    let k = centroids.count();
    let centroid_distances = CentroidDistances::new(centroids);

    let mut tags = Vec::with_capacity(vectors.count());
    for (index, vector) in vectors.iter().enumerate() {
        let mut best = old_tags.get(index).copied().filter(|&hint| hint < k).unwrap_or(0);
        let mut best_distance = distance(centroids.get(best), vector);
        for j in 0..k {
            if j == best || centroid_distances.get(j, best) >= 2.0 * best_distance {
                continue;
            }
            let d = distance(centroids.get(j), vector);
            if d < best_distance {
                best_distance = d;
                best = j;
            }
        }
        tags.push(best);
    }
    Ok(tags)
}

/// Nearest centroid by checking every centroid; the lowest index wins ties.
pub fn tag_exhaustive(vectors: &VectorsList, centroids: &VectorsList) -> Result<Vec<usize>> {
    check_centroids(vectors, centroids)?;
    let tags = vectors.iter()
        .map(|vector| {
            let mut min_distance = f64::MAX;
            let mut min_distance_index = 0;
            for (centroid_index, centroid) in centroids.iter().enumerate() {
                let distance_sq = calc_distance_sq(vector, centroid);
                if distance_sq < min_distance {
                    min_distance = distance_sq;
                    min_distance_index = centroid_index;
                }
            }
            min_distance_index
        })
        .collect();
    Ok(tags)
}

#[cfg(test)]
mod test {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use super::*;

    #[test]
    fn test_centroid_distances() {
        let centroids = VectorsList::from_arrays(&[
            [0.0, 0.0],
            [3.0, 4.0],
            [0.0, 1.0],
        ]);
        let matrix = CentroidDistances::new(&centroids);
        assert_eq!(0.0, matrix.get(0, 0));
        assert_eq!(5.0, matrix.get(0, 1));
        assert_eq!(5.0, matrix.get(1, 0));
        assert_eq!(1.0, matrix.get(2, 0));
        assert_eq!(matrix.get(1, 2), matrix.get(2, 1));
        assert!(float_equal(18.0f64.sqrt(), matrix.get(1, 2)));
    }

    #[test]
    fn test_tag() {
        let vectors = VectorsList::from_arrays(&[
            [-2.0,  1.0],
            [ 2.0,  1.0],
            [-2.0, -1.0],
            [ 2.0, -1.0],
        ]);
        let centroids = VectorsList::from_arrays(&[
            [0.5,  0.5],
            [0.5, -0.5],
        ]);
        let tags = tag(&vectors, &centroids, &[0; 4]).unwrap();
        assert_eq!(vec![0, 0, 1, 1], tags);
        let tags = tag(&vectors, &centroids, &[1; 4]).unwrap();
        assert_eq!(vec![0, 0, 1, 1], tags);

        let centroids = VectorsList::from_arrays(&[
            [ 0.5, 0.5],
            [-0.5, 0.5],
        ]);
        let tags = tag(&vectors, &centroids, &[0, 1, 0, 1]).unwrap();
        assert_eq!(vec![1, 0, 1, 0], tags);
    }

    #[test]
    fn test_tag_ignores_bad_hints() {
        let vectors = VectorsList::from_arrays(&[
            [0.0],
            [8.0],
            [20.0],
        ]);
        let centroids = VectorsList::from_arrays(&[
            [19.0],
            [1.0],
        ]);
        assert_eq!(vec![1, 1, 0], tag(&vectors, &centroids, &[7, 100, 2]).unwrap());
        assert_eq!(vec![1, 1, 0], tag(&vectors, &centroids, &[]).unwrap());
    }

    #[test]
    fn test_tag_keeps_hint_on_ties() {
        let vectors = VectorsList::from_arrays(&[[1.0, 1.0]]);
        // two empty clusters both left at the origin
        let centroids = VectorsList::from_arrays(&[
            [0.0, 0.0],
            [0.0, 0.0],
            [9.0, 9.0],
        ]);
        assert_eq!(vec![1], tag(&vectors, &centroids, &[1]).unwrap());
        assert_eq!(vec![0], tag(&vectors, &centroids, &[0]).unwrap());
        assert_eq!(vec![0], tag_exhaustive(&vectors, &centroids).unwrap());
    }

    #[test]
    fn test_tag_no_centroids() {
        let vectors = VectorsList::from_arrays(&[[1.0, 2.0]]);
        let centroids = VectorsList::new(0, 2);
        assert_eq!(Err(KMeansError::NoCentroids), tag(&vectors, &centroids, &[0]));
        assert_eq!(Err(KMeansError::NoCentroids), tag_exhaustive(&vectors, &centroids));
    }

    #[test]
    fn test_tag_dimensions_mismatch() {
        let vectors = VectorsList::from_arrays(&[[1.0, 2.0, 3.0]]);
        let centroids = VectorsList::from_arrays(&[[1.0, 2.0]]);
        assert_eq!(
            Err(KMeansError::DimensionMismatch { expected: 3, found: 2 }),
            tag(&vectors, &centroids, &[0]),
        );
    }

    #[test]
    fn test_tag_empty_vectors() {
        let vectors = VectorsList::new(0, 2);
        let centroids = VectorsList::from_arrays(&[[1.0, 2.0]]);
        assert_eq!(Vec::<usize>::new(), tag(&vectors, &centroids, &[]).unwrap());
    }

    #[test]
    fn test_tag_matches_exhaustive() {
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let count = rng.random_range(1..200);
            let k = rng.random_range(1..20);
            let dim = rng.random_range(1..12);
            let vectors = VectorsList::new_random(count, dim, &mut rng);
            let centroids = VectorsList::new_random(k, dim, &mut rng);
            let expected = tag_exhaustive(&vectors, &centroids).unwrap();

            let zero_hints = vec![0; count];
            assert_eq!(expected, tag(&vectors, &centroids, &zero_hints).unwrap(), "seed {seed}");

            let random_hints: Vec<usize> = (0..count).map(|_| rng.random_range(0..k)).collect();
            assert_eq!(expected, tag(&vectors, &centroids, &random_hints).unwrap(), "seed {seed}");

            let out_of_range_hints = vec![k + 3; count];
            assert_eq!(expected, tag(&vectors, &centroids, &out_of_range_hints).unwrap(), "seed {seed}");

            // warm start from the exact answer must keep it
            assert_eq!(expected, tag(&vectors, &centroids, &expected).unwrap(), "seed {seed}");
        }
    }

    #[test]
    fn test_tag_matches_exhaustive_clustered_data() {
        // centroids near the data make pruning kick in for most pairs
        let mut rng = SmallRng::seed_from_u64(42);
        let centers = VectorsList::new_random(8, 3, &mut rng);
        let mut vectors = VectorsList::new(400, 3);
        for (index, vector) in vectors.iter_mut().enumerate() {
            vector.copy_from_slice(centers.get(index % 8));
            for value in vector.iter_mut() {
                *value = *value * 10.0 + rng.random_range(-0.5..0.5);
            }
        }
        let mut centroids = VectorsList::new(8, 3);
        for (index, centroid) in centroids.iter_mut().enumerate() {
            centroid.copy_from_slice(centers.get(index));
            scale(centroid, 10.0);
        }
        let expected = tag_exhaustive(&vectors, &centroids).unwrap();
        assert_eq!(expected, tag(&vectors, &centroids, &vec![0; 400]).unwrap());
        assert_eq!(expected, tag(&vectors, &centroids, &expected).unwrap());
    }
}
