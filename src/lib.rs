//! # supar - Parallel suffix sorting in shared memory
//!
//! `supar` builds the suffix array (and optionally the LCP array) of a byte
//! string of up to ~2 GiB using prefix doubling with ternary-split quicksort,
//! parallelized over shared memory.
//!
//! ## Architecture
//!
//! The crate is organized into two modules:
//!
//! - [`engine`] - The suffix-sorting engine: first-byte bucketing, the
//!   prefix-doubling driver, per-group ternary-split quicksort, the PLCP/LCP
//!   builder and the post-hoc validator
//! - [`io`] - Input mapping and output writing for the CLI front end
//!
//! ## Quick Start
//!
//! ```
//! use supar::engine::SortEngine;
//!
//! // The engine expects the text to end in a 0x00 sentinel byte.
//! let text = b"banana\x00";
//!
//! let mut engine = SortEngine::new(text, 1).unwrap();
//! engine.build_sa().unwrap();
//! engine.build_lcp().unwrap();
//!
//! assert_eq!(engine.sa().unwrap(), &[6, 5, 3, 1, 0, 4, 2]);
//! assert_eq!(engine.lcp().unwrap(), &[0, 0, 1, 3, 0, 0, 2]);
//! ```
//!
//! ## Algorithm
//!
//! Suffixes are first bucketed by their leading byte, which yields a partial
//! ordering of order 1. Each doubling round then refines an ordering of order
//! h into one of order 2h by sorting every still-unsorted group by the rank of
//! the suffix h positions ahead, as described by Larsson & Sadakane ("Faster
//! Suffix Sorting"). Individual groups are sorted with the Bentley-McIlroy
//! ternary-split quicksort. Finished regions are encoded in place over the
//! suffix array so later rounds skip them in O(1).
//!
//! With more than one worker, rounds run chunk-parallel over disjoint group
//! ranges, oversized groups are handed to a task pool, and rank updates are
//! staged in a second buffer that is swapped at the round boundary.

pub mod engine;
pub mod io;
