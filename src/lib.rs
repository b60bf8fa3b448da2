//! setsim_lsh
//!
//! Approximate set-similarity retrieval for large collections of
//! string-valued sets (typically the value-sets of table columns). Given a
//! query set, retrieves every indexed set whose Jaccard similarity to the
//! query exceeds a chosen threshold, without ever comparing sets pairwise.
//!
//! Two pieces do the work:
//! - [`sketch::Sketch`] — a `k`-permutation MinHash summary of a multiset
//!   of byte strings, with an unbiased Jaccard estimator between two
//!   sketches of equal width.
//! - [`index::Index`] — a banded LSH index over sketches, with
//!   [`optimizer::optimal`] choosing the band/row split that best fits a
//!   target threshold.
//!
//! The crate **does not** parse CSV/tables, enumerate the filesystem, or
//! persist its index; it consumes already-materialized sets of byte
//! strings and returns candidate keys.
//!
//! # Quick Start
//!
//! ```rust
//! use setsim_lsh::{Index, Sketch};
//!
//! let a: Vec<&str> = vec!["a", "b", "c", "d"];
//! let b: Vec<&str> = vec!["a", "b", "c", "e"]; // Jaccard(a, b) = 3/5 = 0.6
//!
//! let mut sketch_a = Sketch::new(128).unwrap();
//! for v in &a { sketch_a.update(v.as_bytes()); }
//!
//! let mut sketch_b = Sketch::new(128).unwrap();
//! for v in &b { sketch_b.update(v.as_bytes()); }
//!
//! // Derive (bands, rows) for a threshold of 0.5 from k = 128.
//! let mut index = Index::from_threshold(0.5, 128).unwrap();
//! index.insert("a", &sketch_a).unwrap();
//! index.insert("b", &sketch_b).unwrap();
//!
//! let candidates = index.query(&sketch_a).unwrap();
//! assert!(candidates.contains("a"));
//! assert!(candidates.contains("b"));
//!
//! let j_est = sketch_a.estimate_jaccard(&sketch_b).unwrap();
//! eprintln!("Estimated Jaccard: {j_est:.3}");
//! ```
//!
//! # Notes
//! - Sketch width `k` should equal `bands * rows` of the index it feeds;
//!   [`Index::from_threshold`] picks `bands`/`rows` for you from `k`.
//! - LSH banding is deterministic (`splitmix64`-based folding); the exact
//!   band signature function is not a compatibility contract, since the
//!   index is never persisted.
//! - With the `parallel` feature (on by default), [`Index::par_query_many`]
//!   and [`Index::par_bulk_insert`] fan batch operations out across
//!   `rayon`'s thread pool.

pub mod errors;
mod hash;
pub mod index;
pub mod optimizer;
pub mod sketch;

pub use errors::Error;
pub use index::Index;
pub use sketch::Sketch;
