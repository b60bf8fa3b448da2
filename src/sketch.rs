//! MinHash sketches: fixed-length probabilistic summaries of a multiset of
//! byte strings, supporting an unbiased Jaccard estimator between two
//! sketches of equal width.

use crate::errors::Error;
use crate::hash::HashFamily;

/// A `k`-permutation MinHash sketch.
///
/// `Sketch::new(k)` starts every slot at the sentinel `u64::MAX` ("no value
/// observed yet for this permutation"); `update` only ever lowers a slot,
/// never raises it, so `hash_values()` is monotonically non-increasing
/// across the sketch's lifetime.
#[derive(Clone)]
pub struct Sketch {
    k: usize,
    hash_values: Vec<u64>,
    family: HashFamily,
}

impl Sketch {
    /// Construct an empty sketch with `k` permutations.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `k == 0`.
    pub fn new(k: usize) -> Result<Self, Error> {
        if k == 0 {
            return Err(Error::InvalidParameter(
                "k must be positive".to_string(),
            ));
        }
        Ok(Self {
            k,
            hash_values: vec![u64::MAX; k],
            family: HashFamily::new(k),
        })
    }

    /// Permutation count this sketch was constructed with.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Fold `value` into the sketch: for each permutation `i`, lowers
    /// `hash_values[i]` to `h_i(value)` if it is smaller. Idempotent for a
    /// value already observed.
    pub fn update(&mut self, value: &[u8]) {
        for (slot, h) in self.hash_values.iter_mut().zip(self.family.hash_values(value)) {
            if h < *slot {
                *slot = h;
            }
        }
    }

    /// Read-only view over the current minima.
    #[inline]
    pub fn hash_values(&self) -> &[u64] {
        &self.hash_values
    }

    /// Estimate the Jaccard similarity to `other` as the fraction of
    /// permutations on which both sketches agree.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if `self.k() != other.k()`.
    pub fn estimate_jaccard(&self, other: &Sketch) -> Result<f64, Error> {
        if self.k != other.k {
            return Err(Error::InvalidParameter(format!(
                "mismatched sketch widths: {} vs {}",
                self.k, other.k
            )));
        }
        let agree = self
            .hash_values
            .iter()
            .zip(other.hash_values.iter())
            .filter(|(a, b)| a == b)
            .count();
        Ok(agree as f64 / self.k as f64)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Sketch;
    use crate::errors::Error as CrateError;
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// On-the-wire shape for a sketch: `k` and its current minima. The
    /// permutation family is not serialized — it is fully determined by
    /// `k` and is rebuilt on deserialize.
    #[derive(Serialize, Deserialize)]
    struct SketchData {
        k: usize,
        hash_values: Vec<u64>,
    }

    impl Serialize for Sketch {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            SketchData {
                k: self.k,
                hash_values: self.hash_values.clone(),
            }
            .serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Sketch {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let data = SketchData::deserialize(deserializer)?;
            if data.hash_values.len() != data.k {
                return Err(DeError::custom(format!(
                    "hash_values length {} does not match k {}",
                    data.hash_values.len(),
                    data.k
                )));
            }
            let mut sketch = Sketch::new(data.k).map_err(|e: CrateError| DeError::custom(e.to_string()))?;
            sketch.hash_values = data.hash_values;
            Ok(sketch)
        }
    }
}
