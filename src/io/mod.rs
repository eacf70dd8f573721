//! File adapters for the CLI front end.
//!
//! - `input`: memory-mapped reading of the text, appending the sentinel
//! - `output`: little-endian word array writing for the `.rank` and `.lcp`
//!   files

pub mod input;
pub mod output;

pub use input::read_text;
pub use output::{output_path, write_words, LCP_SUFFIX, RANK_SUFFIX};
