//! Output writing.
//!
//! The finished arrays are persisted as raw little-endian 32-bit words,
//! buffered to keep system-call overhead down.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File suffix of the persisted suffix array.
pub const RANK_SUFFIX: &str = "rank";

/// File suffix of the persisted LCP array.
pub const LCP_SUFFIX: &str = "lcp";

/// `<input>.<suffix>` next to the input file.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Write `words` to `path` as little-endian 32-bit values.
pub fn write_words(path: &Path, words: &[u32]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut file = BufWriter::with_capacity(1 << 16, file);

    let mut buffer = Vec::with_capacity(8 * 1024);
    for &word in words {
        buffer.extend_from_slice(&word.to_le_bytes());
        if buffer.len() >= 8 * 1024 {
            file.write_all(&buffer)?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        file.write_all(&buffer)?;
    }
    file.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
