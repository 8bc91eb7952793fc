//! Seeded row and feature sampling for tree growing.
//!
//! Bagging draws a fresh bootstrap sample per tree; split finding considers
//! a fresh random feature subset per node. Both consume a
//! `Xoshiro256PlusPlus` stream owned by the tree being grown, so every tree
//! is reproducible from `(seed, tree_index)` alone.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Derive the RNG seed for one tree from the ensemble seed.
///
/// Streams must not collide across trees, and must not depend on which
/// thread grows the tree.
#[inline]
pub fn tree_seed(seed: u64, tree_index: u32) -> u64 {
    seed ^ (tree_index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Create the RNG stream for one tree.
#[inline]
pub fn tree_rng(seed: u64, tree_index: u32) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(tree_seed(seed, tree_index))
}

// ============================================================================
// BootstrapSampler
// ============================================================================

/// Draws bootstrap samples: `n_rows` indices with replacement.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapSampler {
    n_rows: usize,
}

impl BootstrapSampler {
    pub fn new(n_rows: usize) -> Self {
        assert!(n_rows > 0, "cannot bootstrap an empty set");
        Self { n_rows }
    }

    /// Draw one bootstrap sample of `n_rows` row indices.
    pub fn sample(&self, rng: &mut Xoshiro256PlusPlus) -> Vec<u32> {
        (0..self.n_rows)
            .map(|_| rng.gen_range(0..self.n_rows) as u32)
            .collect()
    }
}

// ============================================================================
// FeatureSampler
// ============================================================================

/// Samples a feature subset without replacement for one split.
///
/// Uses a partial Fisher-Yates shuffle over a reusable index buffer. When
/// the subset covers every feature the sampler returns them in canonical
/// order without consuming randomness, so `FeatureSampling::All` and a
/// full-width `Fraction` behave identically.
#[derive(Debug, Clone)]
pub struct FeatureSampler {
    indices: Vec<u32>,
    subset_size: usize,
}

impl FeatureSampler {
    pub fn new(n_features: usize, subset_size: usize) -> Self {
        assert!(subset_size >= 1 && subset_size <= n_features);
        Self {
            indices: (0..n_features as u32).collect(),
            subset_size,
        }
    }

    #[inline]
    pub fn subset_size(&self) -> usize {
        self.subset_size
    }

    /// Sample the candidate features for one node into the front of the
    /// internal buffer and return them.
    pub fn sample_for_node(&mut self, rng: &mut Xoshiro256PlusPlus) -> &[u32] {
        let n = self.indices.len();
        if self.subset_size == n {
            return &self.indices;
        }
        for i in 0..self.subset_size {
            let j = rng.gen_range(i..n);
            self.indices.swap(i, j);
        }
        &self.indices[..self.subset_size]
    }
}
