//! Banded LSH index: maps MinHash sketches to candidate keys without
//! pairwise comparison, by bucketing sketches on `bands` independent
//! band-signature hash tables.

use crate::errors::Error;
use crate::hash::band_signature;
use crate::optimizer;
use crate::sketch::Sketch;
use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::hash::Hash;

/// Inline-small append-only bucket of keys sharing a band signature. Most
/// buckets in a realistic corpus hold only a handful of keys, so four
/// inline slots avoid a heap allocation in the common case.
type Bucket<K> = SmallVec<[K; 4]>;

/// A banded LSH index over sketches of fixed width `k`.
///
/// Construct with [`Index::from_threshold`] to let the
/// [`crate::optimizer`] derive `(bands, rows)` from a target similarity
/// threshold, or with [`Index::from_params`] to fix them directly. The
/// index is append-only: there is no deletion or update of an inserted
/// `(key, sketch)` pair, and it is never persisted — rebuilding it from
/// the original sets is the only recovery path.
///
/// `&mut self` is required to `insert`; concurrent `query` calls against a
/// populated index that nobody is concurrently mutating are safe, since
/// `query` performs no interior mutation.
pub struct Index<K>
where
    K: Eq + Hash + Clone,
{
    threshold: f32,
    k: u32,
    bands: u32,
    rows: u32,
    band_start: Vec<u32>,
    tables: Vec<HashMap<u64, Bucket<K>, FxBuildHasher>>,
}

impl<K> Index<K>
where
    K: Eq + Hash + Clone,
{
    /// Derive `(bands, rows)` from `threshold` and `k` via
    /// [`optimizer::optimal_default`], then build an index with those
    /// parameters.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if `threshold` is outside `[0, 1]` or
    /// `k == 0`.
    pub fn from_threshold(threshold: f32, k: u32) -> Result<Self, Error> {
        Self::from_threshold_weighted(threshold, k, 0.5, 0.5)
    }

    /// As [`Index::from_threshold`], with explicit false-positive /
    /// false-negative weights passed to the optimizer.
    pub fn from_threshold_weighted(
        threshold: f32,
        k: u32,
        fp_weight: f32,
        fn_weight: f32,
    ) -> Result<Self, Error> {
        validate_threshold(threshold)?;
        validate_k(k)?;
        let (bands, rows) = optimizer::optimal(threshold, k, fp_weight, fn_weight)?;
        Self::build(threshold, k, bands, rows)
    }

    /// Build an index with explicit `(bands, rows)`.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if `threshold` is outside `[0, 1]`,
    /// `k == 0`, `bands == 0`, `rows == 0`, or `bands * rows > k`.
    pub fn from_params(threshold: f32, k: u32, bands: u32, rows: u32) -> Result<Self, Error> {
        validate_threshold(threshold)?;
        validate_k(k)?;
        if bands == 0 || rows == 0 {
            return Err(Error::InvalidParameter(
                "bands and rows must both be positive".to_string(),
            ));
        }
        let width = bands as u64 * rows as u64;
        if width > k as u64 {
            return Err(Error::InvalidParameter(format!(
                "bands * rows ({bands}*{rows}={width}) exceeds k ({k})"
            )));
        }
        Self::build(threshold, k, bands, rows)
    }

    fn build(threshold: f32, k: u32, bands: u32, rows: u32) -> Result<Self, Error> {
        let band_start = (0..bands).map(|i| i * rows).collect();
        let tables = (0..bands)
            .map(|_| HashMap::with_hasher(FxBuildHasher::default()))
            .collect();
        Ok(Self {
            threshold,
            k,
            bands,
            rows,
            band_start,
            tables,
        })
    }

    /// Similarity threshold this index was built for.
    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Sketch width every inserted sketch must share.
    #[inline]
    pub fn k(&self) -> u32 {
        self.k
    }

    #[inline]
    pub fn bands(&self) -> u32 {
        self.bands
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Insert `key` under `sketch`'s band signatures. Duplicate
    /// `(key, sketch)` inserts are permitted and append duplicate bucket
    /// entries; the index never deduplicates on insert.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if `sketch.k() != self.k()`.
    pub fn insert(&mut self, key: K, sketch: &Sketch) -> Result<bool, Error> {
        self.check_width(sketch)?;
        let values = sketch.hash_values();
        for i in 0..self.bands as usize {
            let sig = self.band_signature_at(i, values);
            self.tables[i]
                .entry(sig)
                .or_insert_with(SmallVec::new)
                .push(key.clone());
        }
        Ok(true)
    }

    /// Return the deduplicated set of keys whose sketch shares at least
    /// one band signature with `sketch`.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if `sketch.k() != self.k()`.
    pub fn query(&self, sketch: &Sketch) -> Result<HashSet<K>, Error> {
        self.check_width(sketch)?;
        let values = sketch.hash_values();
        let mut out = HashSet::new();
        for i in 0..self.bands as usize {
            let sig = self.band_signature_at(i, values);
            if let Some(bucket) = self.tables[i].get(&sig) {
                out.extend(bucket.iter().cloned());
            }
        }
        Ok(out)
    }

    #[inline]
    fn band_signature_at(&self, band: usize, values: &[u64]) -> u64 {
        let start = self.band_start[band] as usize;
        let end = start + self.rows as usize;
        band_signature(&values[start..end])
    }

    fn check_width(&self, sketch: &Sketch) -> Result<(), Error> {
        if sketch.k() as u32 != self.k {
            return Err(Error::InvalidParameter(format!(
                "sketch width {} does not match index width {}",
                sketch.k(),
                self.k
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "parallel")]
impl<K> Index<K>
where
    K: Eq + Hash + Clone + Send + Sync,
{
    /// Run many queries concurrently via `rayon`. Safe because `query`
    /// performs no interior mutation; callers must still ensure nobody
    /// concurrently calls `insert`.
    pub fn par_query_many(&self, sketches: &[Sketch]) -> Result<Vec<HashSet<K>>, Error>
    where
        Sketch: Sync,
    {
        use rayon::prelude::*;
        sketches.par_iter().map(|s| self.query(s)).collect()
    }

    /// Insert many `(key, sketch)` pairs, computing each one's band
    /// signatures in parallel before applying them to the tables
    /// sequentially (table mutation itself is not parallelized).
    pub fn par_bulk_insert(&mut self, items: &[(K, Sketch)]) -> Result<(), Error>
    where
        Sketch: Sync,
    {
        use rayon::prelude::*;

        for (_, sketch) in items {
            self.check_width(sketch)?;
        }

        let bands = self.bands as usize;
        let rows = self.rows as usize;
        let band_start = &self.band_start;
        let signatures: Vec<Vec<u64>> = items
            .par_iter()
            .map(|(_, sketch)| {
                let values = sketch.hash_values();
                (0..bands)
                    .map(|i| {
                        let start = band_start[i] as usize;
                        band_signature(&values[start..start + rows])
                    })
                    .collect()
            })
            .collect();

        for ((key, _), sigs) in items.iter().zip(signatures.into_iter()) {
            for (i, sig) in sigs.into_iter().enumerate() {
                self.tables[i]
                    .entry(sig)
                    .or_insert_with(SmallVec::new)
                    .push(key.clone());
            }
        }
        Ok(())
    }
}

fn validate_threshold(threshold: f32) -> Result<(), Error> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidParameter(format!(
            "threshold {threshold} out of [0,1]"
        )));
    }
    Ok(())
}

fn validate_k(k: u32) -> Result<(), Error> {
    if k == 0 {
        return Err(Error::InvalidParameter("k must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sketch_from(k: usize, items: &[&str]) -> Sketch {
        let mut s = Sketch::new(k).unwrap();
        for it in items {
            s.update(it.as_bytes());
        }
        s
    }

    #[test]
    fn from_params_rejects_width_overflow() {
        // 3 * 3 = 9 > 8 -> must fail.
        assert!(Index::<u32>::from_params(0.5, 8, 3, 3).is_err());
        // 3 * 3 = 9 <= 9 -> must succeed.
        assert!(Index::<u32>::from_params(0.5, 9, 3, 3).is_ok());
    }

    #[test]
    fn from_params_rejects_bad_threshold_and_k() {
        assert!(Index::<u32>::from_params(1.1, 16, 4, 4).is_err());
        assert!(Index::<u32>::from_params(0.5, 0, 1, 1).is_err());
        assert!(Index::<u32>::from_params(0.5, 16, 0, 4).is_err());
    }

    #[test]
    fn insert_rejects_mismatched_width() {
        let mut idx = Index::<u32>::from_params(0.5, 16, 4, 4).unwrap();
        let sketch = Sketch::new(8).unwrap();
        assert!(idx.insert(1, &sketch).is_err());
    }

    #[test]
    fn self_match() {
        let mut idx = Index::<u32>::from_params(0.5, 128, 32, 4).unwrap();
        let sketch = sketch_from(128, &["a", "b", "c", "d"]);
        idx.insert(7, &sketch).unwrap();
        let result = idx.query(&sketch).unwrap();
        assert!(result.contains(&7));
    }

    #[test]
    fn query_deduplicates() {
        let mut idx = Index::<u32>::from_params(0.5, 128, 32, 4).unwrap();
        let sketch = sketch_from(128, &["a", "b", "c", "d"]);
        // Same key colliding in multiple bands still reports once.
        idx.insert(1, &sketch).unwrap();
        let result = idx.query(&sketch).unwrap();
        assert_eq!(result.iter().filter(|&&k| k == 1).count(), 1);
    }

    #[test]
    fn scenario_a_similar_sets_found() {
        let mut idx = Index::<u32>::from_threshold(0.5, 128).unwrap();
        let s1 = sketch_from(128, &["a", "b", "c", "d"]);
        let s2 = sketch_from(128, &["a", "b", "c", "e"]);
        idx.insert(1, &s1).unwrap();
        idx.insert(2, &s2).unwrap();
        let result = idx.query(&s1).unwrap();
        assert!(result.contains(&1));
        assert!(result.contains(&2));
    }

    #[test]
    fn scenario_b_disjoint_sets_not_found() {
        let mut idx = Index::<u32>::from_threshold(0.8, 128).unwrap();
        let s1 = sketch_from(128, &["a", "b", "c", "d"]);
        let s2 = sketch_from(128, &["x", "y", "z", "w"]);
        idx.insert(1, &s1).unwrap();
        idx.insert(2, &s2).unwrap();
        let result = idx.query(&s1).unwrap();
        assert!(result.contains(&1));
        assert!(!result.contains(&2));
    }

    #[test]
    fn duplicate_inserts_are_not_deduplicated_in_bucket() {
        let mut idx = Index::<u32>::from_params(0.5, 32, 8, 4).unwrap();
        let sketch = sketch_from(32, &["a", "b"]);
        idx.insert(1, &sketch).unwrap();
        idx.insert(1, &sketch).unwrap();
        let band0 = &idx.tables[0];
        let sig = idx.band_signature_at(0, sketch.hash_values());
        assert_eq!(band0.get(&sig).unwrap().iter().filter(|&&k| k == 1).count(), 2);
    }

    #[test]
    fn parameter_mode_equivalence() {
        let threshold = 0.6f32;
        let k = 64u32;
        let (bands, rows) = optimizer::optimal_default(threshold, k).unwrap();

        let mut from_t = Index::<u32>::from_threshold(threshold, k).unwrap();
        let mut from_p = Index::<u32>::from_params(threshold, k, bands, rows).unwrap();

        let s1 = sketch_from(64, &["a", "b", "c", "d", "e"]);
        let s2 = sketch_from(64, &["a", "b", "c", "d", "f"]);

        from_t.insert(1, &s1).unwrap();
        from_t.insert(2, &s2).unwrap();
        from_p.insert(1, &s1).unwrap();
        from_p.insert(2, &s2).unwrap();

        assert_eq!(from_t.query(&s1).unwrap(), from_p.query(&s1).unwrap());
        assert_eq!(from_t.bands(), from_p.bands());
        assert_eq!(from_t.rows(), from_p.rows());
    }
}
