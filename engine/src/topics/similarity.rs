//! Pluggable text similarity for topic reuse detection.
//!
//! The engine only needs a symmetric score in `[0, 1]` with `sim(a, a) = 1`;
//! any conforming implementation works, with quality (not correctness)
//! impact. The default is a hashed bag-of-words embedding with cosine
//! similarity, cached per string so repeated comparisons against the whole
//! topic set stay cheap.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;

/// Similarity contract: symmetric, `score(a, a) == 1.0`, range `[0, 1]`.
pub trait Similarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f32;
}

/// Hashed bag-of-words embedding with cosine similarity.
///
/// Words are lowercased, hashed into a fixed number of dimensions, and the
/// resulting count vector is L2-normalized. Crude next to a sentence
/// transformer, but deterministic, dependency-free, and good enough to tell
/// "Solar Energy" from "AI Future".
pub struct HashedBagEmbedding {
    dims: usize,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl Default for HashedBagEmbedding {
    fn default() -> Self {
        Self::new(128)
    }
}

impl HashedBagEmbedding {
    pub fn new(dims: usize) -> Self {
        assert!(dims > 0, "embedding must have at least one dimension");
        Self {
            dims,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        if let Some(cached) = self.cache.lock().get(text) {
            return cached.clone();
        }

        let mut vector = vec![0.0f32; self.dims];
        for word in text.to_lowercase().split_whitespace() {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            word.hash(&mut hasher);
            let idx = (hasher.finish() % self.dims as u64) as usize;
            vector[idx] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        self.cache.lock().insert(text.to_string(), vector.clone());
        vector
    }
}

impl Similarity for HashedBagEmbedding {
    fn score(&self, a: &str, b: &str) -> f32 {
        if a == b {
            return 1.0;
        }
        let ea = self.embed(a);
        let eb = self.embed(b);
        let dot: f32 = ea.iter().zip(eb.iter()).map(|(x, y)| x * y).sum();
        dot.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        let sim = HashedBagEmbedding::default();
        assert_eq!(sim.score("Solar Energy", "Solar Energy"), 1.0);
        assert_eq!(sim.score("", ""), 1.0);
    }

    #[test]
    fn test_symmetry() {
        let sim = HashedBagEmbedding::default();
        let ab = sim.score("solar panel efficiency", "solar energy panels");
        let ba = sim.score("solar energy panels", "solar panel efficiency");
        assert!((ab - ba).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disjoint_vocabulary_scores_low() {
        let sim = HashedBagEmbedding::default();
        let score = sim.score("Solar Energy", "AI Future");
        assert!(score < 0.7, "expected low similarity, got {score}");
    }

    #[test]
    fn test_overlapping_vocabulary_scores_higher() {
        let sim = HashedBagEmbedding::default();
        let near = sim.score("solar energy storage", "solar energy panels");
        let far = sim.score("solar energy storage", "medieval castle history");
        assert!(near > far);
    }

    #[test]
    fn test_case_insensitive() {
        let sim = HashedBagEmbedding::default();
        let score = sim.score("SOLAR ENERGY", "solar energy");
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_range_bounds() {
        let sim = HashedBagEmbedding::default();
        for (a, b) in [("a b c", "c d e"), ("x", "y"), ("", "nonempty")] {
            let score = sim.score(a, b);
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
