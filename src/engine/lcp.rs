//! LCP array construction over a finished suffix array.
//!
//! Uses the permuted-LCP route: Φ maps every suffix to its predecessor in
//! suffix-array order, PLCP values are then computed in text order where the
//! classic `plcp[i] >= plcp[i-1] - 1` bound makes the scan linear, and a
//! final gather permutes PLCP into SA order. The rank table is consumed as
//! the PLCP scratch buffer and the LCP array itself hosts Φ, so the build
//! needs no extra allocation.

use rayon::prelude::*;

use super::store::{chunk_step, ScatterSlice};

/// Φ marker for the lexicographically smallest suffix, which has no
/// predecessor.
const NO_PRED: u32 = u32::MAX;

/// Fill `lcp` with the LCP array. `plcp` is scratch (the engine's rank
/// table) and holds the permuted LCP afterwards.
pub(crate) fn build(
    text: &[u8],
    sa: &[u32],
    plcp: &mut [u32],
    lcp: &mut [u32],
    jobs: u32,
    pool: Option<&rayon::ThreadPool>,
) {
    match pool {
        None => build_sequential(text, sa, plcp, lcp),
        Some(pool) => build_parallel(text, sa, plcp, lcp, jobs, pool),
    }
}

fn build_sequential(text: &[u8], sa: &[u32], plcp: &mut [u32], lcp: &mut [u32]) {
    let n = sa.len();

    // Φ, hosted in the LCP buffer
    lcp[sa[0] as usize] = NO_PRED;
    for i in 1..n {
        lcp[sa[i] as usize] = sa[i - 1];
    }

    plcp_scan_into(text, lcp, plcp, 0);

    for i in 0..n {
        lcp[i] = plcp[sa[i] as usize];
    }
}

fn build_parallel(
    text: &[u8],
    sa: &[u32],
    plcp: &mut [u32],
    lcp: &mut [u32],
    jobs: u32,
    pool: &rayon::ThreadPool,
) {
    let n = sa.len();
    let step = chunk_step(n, jobs);

    // Φ scatter: targets are distinct because SA is a permutation
    lcp[sa[0] as usize] = NO_PRED;
    let phi_out = ScatterSlice::new(lcp);
    pool.install(|| {
        sa.par_windows(2)
            .for_each(|w| unsafe { phi_out.write(w[1] as usize, w[0]) })
    });

    // PLCP per chunk; restarting the carried length at a chunk boundary is
    // only a weaker lower bound, the computed values are identical
    pool.install(|| {
        plcp.par_chunks_mut(step)
            .zip(lcp.par_chunks(step))
            .enumerate()
            .for_each(|(j, (plcp_chunk, phi_chunk))| {
                plcp_scan_into(text, phi_chunk, plcp_chunk, j * step);
            })
    });

    // gather into SA order
    pool.install(|| {
        lcp.par_chunks_mut(step)
            .enumerate()
            .for_each(|(j, chunk)| {
                let base = j * step;
                for (i, slot) in chunk.iter_mut().enumerate() {
                    *slot = plcp[sa[base + i] as usize];
                }
            })
    });
}

/// Linear PLCP scan over one stretch of text positions. `base` is the text
/// position of the first element of the chunk slices.
fn plcp_scan_into(text: &[u8], phi: &[u32], plcp: &mut [u32], base: usize) {
    let mut l = 0usize;
    for (i, (&pred, out)) in phi.iter().zip(plcp.iter_mut()).enumerate() {
        if pred == NO_PRED {
            *out = 0;
            l = 0;
            continue;
        }
        l += common_prefix(text, base + i + l, pred as usize + l);
        *out = l as u32;
        l = l.saturating_sub(1);
    }
}

/// Number of identical bytes at the heads of the suffixes starting at `a`
/// and `b`, comparing eight bytes at a time off the tail.
pub(crate) fn common_prefix(text: &[u8], a: usize, b: usize) -> usize {
    let x = &text[a..];
    let y = &text[b..];
    let max = x.len().min(y.len());
    let mut l = 0;
    while l + 8 <= max {
        let xw = u64::from_le_bytes(x[l..l + 8].try_into().unwrap());
        let yw = u64::from_le_bytes(y[l..l + 8].try_into().unwrap());
        if xw != yw {
            return l + ((xw ^ yw).trailing_zeros() / 8) as usize;
        }
        l += 8;
    }
    while l < max && x[l] == y[l] {
        l += 1;
    }
    l
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefix() {
        let text = b"abcabcabcabcabcX_abcabcabcabcabcY\x00";
        // 16-byte match found through the word loop
        assert_eq!(common_prefix(text, 0, 17), 15);
        // mismatch inside the first word
        assert_eq!(common_prefix(text, 0, 3), 12);
        assert_eq!(common_prefix(text, 0, 1), 0);
        // running into the end of the text
        assert_eq!(common_prefix(text, 33, 33), 1);
    }

    #[test]
    fn test_banana_lcp() {
        let text = b"banana\x00";
        let sa: Vec<u32> = vec![6, 5, 3, 1, 0, 4, 2];
        let mut plcp = vec![0u32; 7];
        let mut lcp = vec![0u32; 7];
        build(text, &sa, &mut plcp, &mut lcp, 1, None);
        assert_eq!(lcp, vec![0, 0, 1, 3, 0, 0, 2]);
    }

    #[test]
    fn test_all_equal_lcp() {
        let text = b"aaaaa\x00";
        let sa: Vec<u32> = vec![5, 4, 3, 2, 1, 0];
        let mut plcp = vec![0u32; 6];
        let mut lcp = vec![0u32; 6];
        build(text, &sa, &mut plcp, &mut lcp, 1, None);
        assert_eq!(lcp, vec![0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_single_byte_lcp() {
        let text = b"a\x00";
        let sa: Vec<u32> = vec![1, 0];
        let mut plcp = vec![0u32; 2];
        let mut lcp = vec![0u32; 2];
        build(text, &sa, &mut plcp, &mut lcp, 1, None);
        assert_eq!(lcp, vec![0, 0]);
    }
}
