use rand::Rng;
use crate::error::{KMeansError, Result};

const LANES: usize = 8;

/// Row-major list of equally sized vectors, backed by one contiguous buffer.
///
/// Used both for the dataset being clustered and for every centroid set.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorsList {
    count: usize,
    dim: usize,
    data: Box<[f64]>,
}
impl VectorsList {
    pub fn new(count: usize, dim: usize) -> Self {
        let size = count * dim;
        let data = vec![0.0; size].into_boxed_slice();
        Self::from_parts(count, dim, data)
    }
    pub fn new_random(count: usize, dim: usize, rng: &mut impl Rng) -> Self {
        let mut vectors = Self::new(count, dim);
        for vector in vectors.iter_mut() {
            fill_random_vector(vector, rng)
        }
        vectors
    }
    /// Copies rows of unknown length, checking that they all share one non-zero dimension.
    pub fn from_rows<V: AsRef<[f64]>>(rows: &[V]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(KMeansError::EmptyDataset);
        };
        let dim = first.as_ref().len();
        if dim == 0 {
            return Err(KMeansError::ZeroDimensions);
        }
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dim {
                return Err(KMeansError::DimensionMismatch { expected: dim, found: row.len() });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::from_parts(rows.len(), dim, data.into_boxed_slice()))
    }
    pub fn from_vectors_by_indices(vectors: &VectorsList, indices: &[usize]) -> Self {
        let count = indices.len();
        let dim = vectors.dim;
        let mut data = Vec::with_capacity(count * dim);
        for &index in indices {
            data.extend_from_slice(vectors.get(index));
        }
        Self::from_parts(count, dim, data.into_boxed_slice())
    }
    pub fn from_arrays<const N: usize>(from_data: &[[f64; N]]) -> Self {
        let count = from_data.len();
        let data = from_data.as_flattened().to_vec().into_boxed_slice();
        Self::from_parts(count, N, data)
    }
    fn from_parts(count: usize, dim: usize, data: Box<[f64]>) -> Self {
        assert!(dim > 0, "vectors must have at least 1 dimension");
        debug_assert!(data.len() == count * dim);
        Self{count, dim, data}
    }
    pub fn count(&self) -> usize {
        self.count
    }
    pub fn dim(&self) -> usize {
        self.dim
    }
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
    pub fn get(&self, index: usize) -> &[f64] {
        let start = index * self.dim;
        let end = start + self.dim;
        &self.data[start..end]
    }
    pub fn get_mut(&mut self, index: usize) -> &mut [f64] {
        let start = index * self.dim;
        let end = start + self.dim;
        &mut self.data[start..end]
    }
    pub fn iter(&self) -> impl Iterator<Item=&[f64]> + use<'_> {
        self.data.chunks(self.dim)
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item=&mut [f64]> + use<'_> {
        self.data.chunks_mut(self.dim)
    }
    pub fn as_vec_of_slices(&self) -> Vec<&[f64]> {
        self.iter().collect()
    }
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter().map(<[f64]>::to_vec).collect()
    }
}

fn fill_random_vector(v: &mut [f64], rng: &mut impl Rng) {
    for value in v.iter_mut() {
        *value = rng.random_range(-1.0..=1.0);
    }
}

/// Euclidean (L2) distance.
///
/// # Panics
///
/// If the vectors have different lengths.
pub fn distance(v1: &[f64], v2: &[f64]) -> f64 {
    calc_distance_sq(v1, v2).sqrt()
}

/// Squared Euclidean distance, summed over independent lanes so the loop vectorizes.
pub fn calc_distance_sq(v1: &[f64], v2: &[f64]) -> f64 {
    assert_eq!(v1.len(), v2.len(), "vectors have different dimensions");
    let chunks1 = v1.chunks_exact(LANES);
    let chunks2 = v2.chunks_exact(LANES);
    let rest1 = chunks1.remainder();
    let rest2 = chunks2.remainder();
    let mut lanes = [0.0; LANES];
    for (chunk1, chunk2) in chunks1.zip(chunks2) {
        for lane in 0..LANES {
            let diff = chunk1[lane] - chunk2[lane];
            lanes[lane] += diff * diff;
        }
    }
    let mut sum: f64 = lanes.iter().sum();
    for (value1, value2) in rest1.iter().zip(rest2) {
        let diff = value1 - value2;
        sum += diff * diff;
    }
    sum
}

/// Adds `source` into `target` elementwise.
pub fn accumulate(target: &mut [f64], source: &[f64]) {
    assert_eq!(target.len(), source.len(), "vectors have different dimensions");
    for (value, added) in target.iter_mut().zip(source) {
        *value += added;
    }
}

pub fn scale(target: &mut [f64], factor: f64) {
    for value in target.iter_mut() {
        *value *= factor;
    }
}

#[cfg(test)]
pub(crate) fn float_equal(v1: f64, v2: f64) -> bool {
    (v1 - v2).abs() < 0.0001
}

#[cfg(test)]
pub(crate) fn vectors_equal(v1: &[f64], v2: &[f64]) -> bool {
    v1.len() == v2.len() && v1.iter().zip(v2).all(|(&a, &b)| float_equal(a, b))
}
