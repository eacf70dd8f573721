//! Input reading.
//!
//! The engine wants the text in memory with a trailing sentinel byte, so the
//! input file is memory-mapped and copied into an owned buffer one byte
//! longer than the file.

use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

use crate::engine::{MAX_INPUT, SENTINEL};

/// Read at most `limit` bytes of `path` and append the sentinel.
pub fn read_text(path: &Path, limit: Option<u64>) -> Result<Vec<u8>> {
    let file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let size = file
        .metadata()
        .with_context(|| format!("inspecting {}", path.display()))?
        .len();
    let take = limit.map_or(size, |k| k.min(size));
    if take > MAX_INPUT as u64 {
        bail!(
            "input is {take} bytes, at most {MAX_INPUT} supported; \
             use -n to read a prefix"
        );
    }

    let take = take as usize;
    let mut text = Vec::with_capacity(take + 1);
    if take > 0 {
        let map = unsafe { Mmap::map(&file) }
            .with_context(|| format!("mapping {}", path.display()))?;
        text.extend_from_slice(&map[..take]);
    }
    text.push(SENTINEL);
    Ok(text)
}
