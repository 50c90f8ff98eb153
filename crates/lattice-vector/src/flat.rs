//! Exhaustive cosine index held in memory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use lattice_core::errors::{PersistenceError, VectorError};
use lattice_core::models::VectorHit;
use lattice_core::traits::IVectorIndex;
use rayon::prelude::*;

use crate::similarity::{cosine_with_norms, norm};
use crate::snapshot;

#[derive(Debug, Default)]
struct IndexState {
    dims: Option<usize>,
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
    norms: Vec<f64>,
    /// id -> slot; slot order is insertion order.
    slots: HashMap<String, usize>,
}

impl IndexState {
    fn from_entries(
        dims: Option<usize>,
        entries: Vec<(String, Vec<f32>)>,
    ) -> Result<Self, VectorError> {
        let mut state = IndexState {
            dims,
            ..Default::default()
        };
        for (id, v) in entries {
            state.upsert(id, v)?;
        }
        Ok(state)
    }

    fn check(&self, id: &str, embedding: &[f32]) -> Result<(), VectorError> {
        if embedding.is_empty() {
            return Err(VectorError::EmptyEmbedding { id: id.to_string() });
        }
        if let Some(expected) = self.dims {
            if embedding.len() != expected {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(VectorError::NonFinite { id: id.to_string() });
        }
        Ok(())
    }

    fn upsert(&mut self, id: String, embedding: Vec<f32>) -> Result<(), VectorError> {
        self.check(&id, &embedding)?;
        self.dims.get_or_insert(embedding.len());
        let n = norm(&embedding);
        match self.slots.get(&id) {
            Some(&slot) => {
                self.vectors[slot] = embedding;
                self.norms[slot] = n;
            }
            None => {
                self.slots.insert(id.clone(), self.ids.len());
                self.ids.push(id);
                self.vectors.push(embedding);
                self.norms.push(n);
            }
        }
        Ok(())
    }

    fn remove(&mut self, id: &str) -> bool {
        let Some(slot) = self.slots.remove(id) else {
            return false;
        };
        self.ids.remove(slot);
        self.vectors.remove(slot);
        self.norms.remove(slot);
        for s in self.slots.values_mut() {
            if *s > slot {
                *s -= 1;
            }
        }
        true
    }
}

/// In-memory cosine index.
///
/// Writers take the lock exclusively, so concurrent `add` calls are
/// serialized and a `query` sees the index either before or after any add.
#[derive(Debug)]
pub struct FlatVectorIndex {
    state: RwLock<IndexState>,
    parallel_threshold: usize,
}

impl FlatVectorIndex {
    pub fn new(parallel_threshold: usize) -> Self {
        Self {
            state: RwLock::new(IndexState::default()),
            parallel_threshold: parallel_threshold.max(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Consistent copy of the contents in insertion order.
    pub fn export(&self) -> (Option<usize>, Vec<(String, Vec<f32>)>) {
        let state = self.read();
        let entries = state
            .ids
            .iter()
            .cloned()
            .zip(state.vectors.iter().cloned())
            .collect();
        (state.dims, entries)
    }

    /// Swap in new contents wholesale. Validation happens before the swap,
    /// so a bad entry leaves the current contents untouched.
    pub fn replace(
        &self,
        dims: Option<usize>,
        entries: Vec<(String, Vec<f32>)>,
    ) -> Result<(), VectorError> {
        let next = IndexState::from_entries(dims, entries)?;
        *self.write() = next;
        Ok(())
    }

    pub fn ids(&self) -> Vec<String> {
        self.read().ids.clone()
    }
}

impl Default for FlatVectorIndex {
    fn default() -> Self {
        Self::new(lattice_core::config::defaults::DEFAULT_PARALLEL_SCAN_THRESHOLD)
    }
}

impl IVectorIndex for FlatVectorIndex {
    fn add(&self, id: &str, embedding: &[f32]) -> Result<(), VectorError> {
        self.write().upsert(id.to_string(), embedding.to_vec())
    }

    fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<VectorHit>, VectorError> {
        let state = self.read();
        if state.ids.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if let Some(expected) = state.dims {
            if embedding.len() != expected {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }
        let q_norm = norm(embedding);
        if q_norm == 0.0 {
            return Ok(Vec::new());
        }

        let st: &IndexState = &state;
        let score = |slot: usize| -> (usize, f64) {
            let sim = cosine_with_norms(embedding, q_norm, &st.vectors[slot], st.norms[slot]);
            (slot, 1.0 - sim)
        };
        let mut scored: Vec<(usize, f64)> = if st.ids.len() >= self.parallel_threshold {
            (0..st.ids.len()).into_par_iter().map(score).collect()
        } else {
            (0..st.ids.len()).map(score).collect()
        };

        // Ascending distance, then insertion order.
        let by_rank = |a: &(usize, f64), b: &(usize, f64)| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0));
        if k < scored.len() {
            scored.select_nth_unstable_by(k, by_rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_rank);

        Ok(scored
            .into_iter()
            .map(|(slot, distance)| VectorHit {
                id: state.ids[slot].clone(),
                distance: distance as f32,
            })
            .collect())
    }

    fn remove(&self, id: &str) -> bool {
        self.write().remove(id)
    }

    fn contains(&self, id: &str) -> bool {
        self.read().slots.contains_key(id)
    }

    fn len(&self) -> usize {
        self.read().ids.len()
    }

    fn dimensions(&self) -> Option<usize> {
        self.read().dims
    }

    fn persist(&self, path: &Path) -> Result<(), PersistenceError> {
        let (dims, entries) = self.export();
        snapshot::write(path, dims, &entries)
    }

    fn load(&self, path: &Path) -> Result<(), PersistenceError> {
        let (dims, entries) = snapshot::read(path)?;
        self.replace(dims, entries).map_err(|e| PersistenceError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "flat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatVectorIndex {
        FlatVectorIndex::new(usize::MAX)
    }

    #[test]
    fn empty_index_returns_nothing_for_any_query() {
        let idx = index();
        assert!(idx.query(&[1.0, 2.0, 3.0], 5).unwrap().is_empty());
        assert!(idx.query(&[1.0], 5).unwrap().is_empty());
        assert_eq!(idx.dimensions(), None);
    }

    #[test]
    fn first_add_fixes_dimensions() {
        let idx = index();
        idx.add("a", &[1.0, 0.0, 0.0]).unwrap();
        assert_eq!(idx.dimensions(), Some(3));

        let err = idx.add("b", &[1.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            VectorError::DimensionMismatch { expected: 3, actual: 2 }
        ));
        assert_eq!(idx.len(), 1);
        assert!(!idx.contains("b"));
    }

    #[test]
    fn query_dimension_mismatch_is_error() {
        let idx = index();
        idx.add("a", &[1.0, 0.0]).unwrap();
        assert!(matches!(
            idx.query(&[1.0, 0.0, 0.0], 1),
            Err(VectorError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        let idx = index();
        assert!(matches!(idx.add("a", &[]), Err(VectorError::EmptyEmbedding { .. })));
        assert!(matches!(
            idx.add("a", &[f32::NAN, 1.0]),
            Err(VectorError::NonFinite { .. })
        ));
        assert!(idx.is_empty());
        assert_eq!(idx.dimensions(), None);
    }

    #[test]
    fn results_are_ranked_by_distance() {
        let idx = index();
        idx.add("far", &[-1.0, 0.0]).unwrap();
        idx.add("near", &[1.0, 0.1]).unwrap();
        idx.add("mid", &[0.0, 1.0]).unwrap();

        let hits = idx.query(&[1.0, 0.0], 3).unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["near", "mid", "far"]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!((hits[2].distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let idx = index();
        for id in ["c", "a", "b"] {
            idx.add(id, &[0.5, 0.5]).unwrap();
        }
        let hits = idx.query(&[1.0, 1.0], 2).unwrap();
        assert_eq!(hits[0].id, "c");
        assert_eq!(hits[1].id, "a");
    }

    #[test]
    fn readd_replaces_in_place() {
        let idx = index();
        idx.add("a", &[1.0, 0.0]).unwrap();
        idx.add("b", &[1.0, 0.0]).unwrap();
        idx.add("a", &[1.0, 0.0]).unwrap();
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.ids(), ["a", "b"]);

        idx.add("a", &[0.0, 1.0]).unwrap();
        let hits = idx.query(&[0.0, 1.0], 1).unwrap();
        assert_eq!(hits[0].id, "a");
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let idx = index();
        for id in ["a", "b", "c"] {
            idx.add(id, &[1.0, 1.0]).unwrap();
        }
        assert!(idx.remove("b"));
        assert!(!idx.remove("b"));
        let hits = idx.query(&[1.0, 1.0], 5).unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        idx.add("d", &[1.0, 1.0]).unwrap();
        assert_eq!(idx.ids(), ["a", "c", "d"]);
    }

    #[test]
    fn parallel_and_serial_scans_agree() {
        let serial = FlatVectorIndex::new(usize::MAX);
        let parallel = FlatVectorIndex::new(1);
        for i in 0..200 {
            let v = [(i as f32).sin(), (i as f32).cos(), (i % 7) as f32];
            serial.add(&format!("v{i}"), &v).unwrap();
            parallel.add(&format!("v{i}"), &v).unwrap();
        }
        let q = [0.3, -0.2, 1.0];
        assert_eq!(serial.query(&q, 10).unwrap(), parallel.query(&q, 10).unwrap());
    }

    #[test]
    fn replace_is_all_or_nothing() {
        let idx = index();
        idx.add("keep", &[1.0, 0.0]).unwrap();
        let bad = vec![("x".to_string(), vec![1.0, 0.0]), ("y".to_string(), vec![1.0])];
        assert!(idx.replace(None, bad).is_err());
        assert_eq!(idx.ids(), ["keep"]);
    }
}
