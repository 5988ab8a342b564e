use crate::index::TermVector;
use std::cmp::Ordering;

/// Cosine similarity of two sparse vectors; 0 when either has no weight.
pub fn cosine(a: &TermVector, b: &TermVector) -> f32 {
    let na = a.norm();
    let nb = b.norm();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot(a, b) / (na * nb)).clamp(-1.0, 1.0)
}

/// Merge-join dot product over entries sorted by dimension.
pub fn dot(a: &TermVector, b: &TermVector) -> f32 {
    let (xs, ys) = (a.entries(), b.entries());
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0f32;
    while i < xs.len() && j < ys.len() {
        match xs[i].0.cmp(&ys[j].0) {
            Ordering::Equal => {
                sum += xs[i].1 * ys[j].1;
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    sum
}

/// Dense all-pairs similarity, row-major.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Computes the upper triangle once and mirrors it, so the result is symmetric
    /// bit for bit. Self-similarity is 1 for non-zero vectors and 0 otherwise.
    pub fn from_vectors(vectors: &[TermVector]) -> Self {
        let n = vectors.len();
        let mut data = vec![0.0f32; n * n];
        for i in 0..n {
            data[i * n + i] = if vectors[i].is_zero() { 0.0 } else { 1.0 };
            for j in (i + 1)..n {
                let s = cosine(&vectors[i], &vectors[j]);
                data[i * n + j] = s;
                data[j * n + i] = s;
            }
        }
        Self { n, data }
    }

    pub fn size(&self) -> usize { self.n }

    pub fn get(&self, i: usize, j: usize) -> f32 { self.data[i * self.n + j] }

    pub fn row(&self, i: usize) -> &[f32] { &self.data[i * self.n..(i + 1) * self.n] }
}
