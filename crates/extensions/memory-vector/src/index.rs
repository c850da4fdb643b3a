//! Exact vector index for similarity search.

use std::collections::HashMap;

use crate::similarity::cosine_similarity;

/// Search hit from the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub id: String,
    pub score: f32,
}

struct Slot {
    seq: u64,
    vector: Vec<f32>,
}

/// In-memory vector index using brute-force search.
///
/// Not synchronized; the owning backend guards it together with its records.
#[derive(Default)]
pub struct VectorIndex {
    slots: HashMap<String, Slot>,
    next_seq: u64,
}

impl VectorIndex {
    /// Create an empty vector index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vector. A replaced id keeps its original position.
    pub fn insert(&mut self, id: impl Into<String>, vector: Vec<f32>) {
        let id = id.into();
        match self.slots.get_mut(&id) {
            Some(slot) => slot.vector = vector,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.slots.insert(id, Slot { seq, vector });
            }
        }
    }

    /// Remove a vector, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Vec<f32>> {
        self.slots.remove(id).map(|slot| slot.vector)
    }

    /// Insertion position of `id`, used to break ordering ties.
    pub fn position(&self, id: &str) -> Option<u64> {
        self.slots.get(id).map(|slot| slot.seq)
    }

    /// Score every vector against `query` and return the best `k`.
    ///
    /// Results are sorted by descending similarity; equal scores keep
    /// insertion order. Non-finite scores count as `0.0`. There is no
    /// score cutoff.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<IndexHit> {
        if k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(u64, IndexHit)> = self
            .slots
            .iter()
            .map(|(id, slot)| {
                let score = cosine_similarity(query, &slot.vector);
                let score = if score.is_finite() { score } else { 0.0 };
                (slot.seq, IndexHit { id: id.clone(), score })
            })
            .collect();

        scored.sort_by(|(seq_a, a), (seq_b, b)| {
            b.score.total_cmp(&a.score).then(seq_a.cmp(seq_b))
        });
        scored.truncate(k);
        scored.into_iter().map(|(_, hit)| hit).collect()
    }

    /// Remove every vector and restart positions.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.next_seq = 0;
    }
}
