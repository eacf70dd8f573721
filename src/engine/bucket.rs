//! First-byte bucketing.
//!
//! Seeds the suffix array with a counting sort on the leading byte of each
//! suffix and numbers every suffix with its bucket's right endpoint, which is
//! the partial ordering of order 1 that the doubling rounds refine. Buckets
//! holding a single suffix are final and are marked sorted right away.

use anyhow::{bail, Result};
use rayon::prelude::*;

use super::store::{chunk_step, ScatterSlice, SORTED_FLAG};

/// Number of distinct byte values.
pub(crate) const ALPHA: usize = 256;

pub(crate) struct InitOutcome {
    /// Distinct byte values present in the text (diagnostic only).
    pub alphasize: u32,
    /// Suffixes already uniquely ranked by their first byte.
    pub groups: u32,
}

/// Bucket the whole text on one thread.
pub(crate) fn init_sequential(
    text: &[u8],
    sa: &mut [u32],
    isa: &mut [u32],
) -> Result<InitOutcome> {
    let mut count = [0u32; ALPHA];
    for &b in text {
        count[b as usize] += 1;
    }
    let (first, group, alphasize) = bucket_bounds(&count)?;

    let mut cursor = first;
    for (i, &b) in text.iter().enumerate() {
        let c = b as usize;
        sa[cursor[c] as usize] = i as u32;
        cursor[c] += 1;
        isa[i] = group[c];
    }

    let groups = mark_singleton_buckets(sa, &count, &first);
    Ok(InitOutcome { alphasize, groups })
}

/// Bucket the text chunk-parallel: local histograms per chunk, one merge,
/// then a contention-free scatter where chunk j writes byte b's suffixes
/// starting at the bucket base plus the counts of b in chunks 0..j.
pub(crate) fn init_parallel(
    text: &[u8],
    sa: &mut [u32],
    isa: &mut [u32],
    jobs: u32,
    pool: &rayon::ThreadPool,
) -> Result<InitOutcome> {
    let step = chunk_step(text.len(), jobs);

    let locals: Vec<[u32; ALPHA]> = pool.install(|| {
        text.par_chunks(step)
            .map(|chunk| {
                let mut local = [0u32; ALPHA];
                for &b in chunk {
                    local[b as usize] += 1;
                }
                local
            })
            .collect()
    });

    let mut count = [0u32; ALPHA];
    for local in &locals {
        for c in 0..ALPHA {
            count[c] += local[c];
        }
    }
    let (first, group, alphasize) = bucket_bounds(&count)?;

    let mut offsets: Vec<[u32; ALPHA]> = Vec::with_capacity(locals.len());
    let mut running = first;
    for local in &locals {
        offsets.push(running);
        for c in 0..ALPHA {
            running[c] += local[c];
        }
    }

    let sa_out = ScatterSlice::new(sa);
    let isa_out = ScatterSlice::new(isa);
    pool.install(|| {
        text.par_chunks(step)
            .enumerate()
            .zip(offsets.into_par_iter())
            .for_each(|((j, chunk), mut cursor)| {
                let base = j * step;
                for (i, &b) in chunk.iter().enumerate() {
                    let c = b as usize;
                    // Cursor ranges are disjoint across chunks, and each
                    // text position is owned by exactly one chunk.
                    unsafe {
                        sa_out.write(cursor[c] as usize, (base + i) as u32);
                        isa_out.write(base + i, group[c]);
                    }
                    cursor[c] += 1;
                }
            })
    });

    let groups = mark_singleton_buckets(sa, &count, &first);
    Ok(InitOutcome { alphasize, groups })
}

/// Bucket bases and group numbers (right endpoints) for each byte value.
fn bucket_bounds(count: &[u32; ALPHA]) -> Result<([u32; ALPHA], [u32; ALPHA], u32)> {
    if count[0] != 1 {
        bail!(
            "input must contain exactly one sentinel byte, found {}",
            count[0]
        );
    }
    let mut first = [0u32; ALPHA];
    let mut group = [0u32; ALPHA];
    let mut alphasize = 0u32;
    let mut f = 0u32;
    for c in 0..ALPHA {
        let n = count[c];
        first[c] = f;
        if n > 0 {
            alphasize += 1;
            group[c] = f + n - 1;
        }
        f += n;
    }
    Ok((first, group, alphasize))
}

/// Flag every single-suffix bucket as sorted and coalesce neighbouring ones
/// into runs. Returns the number of suffixes finished by bucketing alone.
fn mark_singleton_buckets(sa: &mut [u32], count: &[u32; ALPHA], first: &[u32; ALPHA]) -> u32 {
    let mut groups = 0u32;
    let mut run_start = 0usize;
    let mut run_len = 0usize;
    for c in 0..ALPHA {
        if count[c] == 0 {
            continue;
        }
        if count[c] == 1 {
            let p = first[c] as usize;
            sa[p] = SORTED_FLAG | 1;
            if run_len == 0 {
                run_start = p;
            }
            run_len += 1;
            groups += 1;
        } else if run_len > 0 {
            sa[run_start] = SORTED_FLAG | run_len as u32;
            run_len = 0;
        }
    }
    if run_len > 0 {
        sa[run_start] = SORTED_FLAG | run_len as u32;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::SORTED_MASK;

    #[test]
    fn test_banana_buckets() {
        let text = b"banana\x00";
        let mut sa = vec![0u32; 7];
        let mut isa = vec![0u32; 7];
        let out = init_sequential(text, &mut sa, &mut isa).unwrap();

        assert_eq!(out.alphasize, 4);
        // sentinel and 'b' are singleton buckets
        assert_eq!(out.groups, 2);

        // buckets: \0 at 0, 'a' at 1..4, 'b' at 4, 'n' at 5..7
        assert_eq!(sa[0] & SORTED_MASK, 1);
        assert!(sa[0] & SORTED_FLAG != 0);
        assert_eq!(&sa[1..4], &[1, 3, 5]);
        assert!(sa[4] & SORTED_FLAG != 0);
        assert_eq!(&sa[5..7], &[2, 4]);

        // ranks are bucket right endpoints
        assert_eq!(isa, vec![4, 3, 6, 3, 6, 3, 0]);
    }

    #[test]
    fn test_interior_sentinel_rejected() {
        let text = b"ab\x00cd\x00";
        let mut sa = vec![0u32; 6];
        let mut isa = vec![0u32; 6];
        assert!(init_sequential(text, &mut sa, &mut isa).is_err());
    }

    #[test]
    fn test_monotonic_input_fully_bucketed() {
        let text = b"abcde\x00";
        let mut sa = vec![0u32; 6];
        let mut isa = vec![0u32; 6];
        let out = init_sequential(text, &mut sa, &mut isa).unwrap();

        // every bucket is a singleton, coalesced into one run
        assert_eq!(out.groups, 6);
        assert_eq!(sa[0], SORTED_FLAG | 6);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let text: Vec<u8> = b"the quick brown fox jumps over the lazy dog"
            .iter()
            .copied()
            .chain(std::iter::once(0))
            .collect();
        let n = text.len();

        let mut sa_seq = vec![0u32; n];
        let mut isa_seq = vec![0u32; n];
        init_sequential(&text, &mut sa_seq, &mut isa_seq).unwrap();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .unwrap();
        let mut sa_par = vec![0u32; n];
        let mut isa_par = vec![0u32; n];
        init_parallel(&text, &mut sa_par, &mut isa_par, 4, &pool).unwrap();

        assert_eq!(sa_seq, sa_par);
        assert_eq!(isa_seq, isa_par);
    }
}
