//! The suffix-sorting engine.
//!
//! Builds the suffix array of a sentinel-terminated byte string by prefix
//! doubling: first-byte bucketing establishes an ordering of order 1, then
//! each round sorts the remaining groups by the rank of the suffix h
//! positions ahead, doubling the known order until every suffix has a unique
//! rank. The finished rank table is inverted into the suffix array, and the
//! LCP array can be derived from it afterwards.
//!
//! ## Modules
//!
//! - `store`: the in-place sorted-run overlay and the per-round array view
//! - `bucket`: first-byte counting sort seeding SA and the rank table
//! - `tqsort`: ternary-split quicksort of one group
//! - `doubling`: the per-round sweep and its parallel decomposition
//! - `lcp`: PLCP-based LCP construction
//! - `validate`: post-hoc consistency checks

mod bucket;
mod doubling;
mod lcp;
mod store;
mod tqsort;
mod validate;

use std::io::{self, Write};
use std::mem;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{bail, ensure, Context, Result};
use rayon::prelude::*;

use self::store::{chunk_step, ScatterSlice, SortPass};

/// Lowest accepted concurrency level.
pub const JOBS_MIN: u32 = 1;

/// Highest accepted concurrency level.
pub const JOBS_MAX: u32 = 64;

/// Longest supported input in bytes, excluding the sentinel.
pub const MAX_INPUT: usize = 0x7FFF_FFFE;

/// Terminator byte the text must end with; must not occur elsewhere.
pub const SENTINEL: u8 = 0;

/// Suffix and LCP array builder over a borrowed, sentinel-terminated text.
///
/// The engine owns the suffix array and rank table it builds. `build_sa` and
/// `build_lcp` are idempotent; the accessors return `None` until the
/// corresponding build has completed. Note that `build_lcp` consumes the
/// rank table as scratch space.
pub struct SortEngine<'a> {
    text: &'a [u8],
    jobs: u32,
    pool: Option<rayon::ThreadPool>,
    sa: Vec<u32>,
    isa: Vec<u32>,
    /// Staged rank writes for parallel rounds; empty when `jobs == 1`.
    isa_next: Vec<u32>,
    lcp: Vec<u32>,
    /// Current doubling distance.
    h: usize,
    /// Suffixes known to be uniquely ranked.
    groups: u32,
    finished_sa: bool,
    finished_lcp: bool,
    diag: Mutex<Box<dyn Write + Send>>,
}

impl<'a> SortEngine<'a> {
    /// Create an engine over `text`, which must end in the sentinel byte.
    /// Diagnostics go to stderr.
    pub fn new(text: &'a [u8], jobs: u32) -> Result<Self> {
        Self::with_diag(text, jobs, Box::new(io::stderr()))
    }

    /// Like [`SortEngine::new`] with an explicit diagnostic sink.
    pub fn with_diag(
        text: &'a [u8],
        jobs: u32,
        diag: Box<dyn Write + Send>,
    ) -> Result<Self> {
        ensure!(
            (JOBS_MIN..=JOBS_MAX).contains(&jobs),
            "concurrency level {jobs} not in [{JOBS_MIN}, {JOBS_MAX}]"
        );
        ensure!(
            text.last() == Some(&SENTINEL),
            "text must end in the sentinel byte 0x{SENTINEL:02x}"
        );
        ensure!(
            text.len() <= MAX_INPUT + 1,
            "input is {} bytes, at most {MAX_INPUT} supported",
            text.len() - 1
        );
        let pool = if jobs > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs as usize)
                    .build()
                    .context("building the worker pool")?,
            )
        } else {
            None
        };
        Ok(SortEngine {
            text,
            jobs,
            pool,
            sa: Vec::new(),
            isa: Vec::new(),
            isa_next: Vec::new(),
            lcp: Vec::new(),
            h: 0,
            groups: 0,
            finished_sa: false,
            finished_lcp: false,
            diag: Mutex::new(diag),
        })
    }

    /// Build the suffix array. Idempotent.
    pub fn build_sa(&mut self) -> Result<()> {
        if self.finished_sa {
            return Ok(());
        }
        let n = self.text.len();
        self.sa = alloc_words(n, "suffix array")?;
        self.isa = alloc_words(n, "rank table")?;
        if self.pool.is_some() {
            self.isa_next = alloc_words(n, "staged rank table")?;
        }

        let init = match &self.pool {
            None => bucket::init_sequential(self.text, &mut self.sa, &mut self.isa)?,
            Some(pool) => {
                bucket::init_parallel(self.text, &mut self.sa, &mut self.isa, self.jobs, pool)?
            }
        };
        self.groups = init.groups;
        self.refresh_staged_ranks();
        self.note(format_args!(
            "{} distinct bytes, {} of {} suffixes unique after bucketing",
            init.alphasize, self.groups, n
        ));

        self.h = 1;
        let mut round = 0u32;
        while (self.groups as usize) < n && self.h < n {
            round += 1;
            let found = self.doubling_round();
            self.groups += found;
            if self.pool.is_some() {
                mem::swap(&mut self.isa, &mut self.isa_next);
                self.refresh_staged_ranks();
            }
            self.note(format_args!(
                "doubling round {round} (h = {}): {} of {} suffixes unique ({:.1}%)",
                self.h,
                self.groups,
                n,
                self.groups as f64 / n as f64 * 100.0
            ));
            self.h <<= 1;
        }

        if self.groups as usize != n {
            bail!(
                "sorting stalled at h = {} with {} of {} suffixes unique",
                self.h,
                self.groups,
                n
            );
        }

        self.invert();
        self.finished_sa = true;
        Ok(())
    }

    /// Build the LCP array. Requires a finished suffix array; consumes the
    /// rank table as scratch. Idempotent.
    pub fn build_lcp(&mut self) -> Result<()> {
        if self.finished_lcp {
            return Ok(());
        }
        ensure!(self.finished_sa, "suffix array not built");
        self.lcp = alloc_words(self.sa.len(), "LCP array")?;
        lcp::build(
            self.text,
            &self.sa,
            &mut self.isa,
            &mut self.lcp,
            self.jobs,
            self.pool.as_ref(),
        );
        self.finished_lcp = true;
        Ok(())
    }

    /// The finished suffix array, or `None` before `build_sa` completes.
    pub fn sa(&self) -> Option<&[u32]> {
        self.finished_sa.then(|| self.sa.as_slice())
    }

    /// The finished LCP array, or `None` before `build_lcp` completes.
    pub fn lcp(&self) -> Option<&[u32]> {
        self.finished_lcp.then(|| self.lcp.as_slice())
    }

    /// Re-derive the invariants of the finished arrays from the text,
    /// reporting every violation to the diagnostic sink.
    pub fn validate(&self) -> bool {
        let Ok(mut guard) = self.diag.lock() else {
            return false;
        };
        let diag = &mut **guard;
        if !self.finished_sa {
            let _ = writeln!(diag, "validate: suffix array not built");
            return false;
        }
        let dupes = validate::count_duplicates(&self.sa, diag);
        let descending = validate::count_descending(self.text, &self.sa, diag);
        let _ = writeln!(
            diag,
            "validate: {dupes} duplicate and {descending} descending suffix entries"
        );
        let mut bad = dupes + descending;
        if self.finished_lcp {
            let mismatched =
                validate::count_lcp_mismatches(self.text, &self.sa, &self.lcp, diag);
            let _ = writeln!(diag, "validate: {mismatched} mismatched LCP entries");
            bad += mismatched;
        }
        bad == 0
    }

    /// Print the suffix array with truncated suffix previews.
    pub fn dump_sa(&self) {
        let Some(sa) = self.sa() else {
            self.note(format_args!("suffix array not built"));
            return;
        };
        let Ok(mut guard) = self.diag.lock() else {
            return;
        };
        let diag = &mut **guard;
        let _ = writeln!(diag, "i\tsa[i]\tsuffix");
        for (i, &p) in sa.iter().enumerate() {
            let _ = writeln!(diag, "{i}\t{p}\t'{}'", preview(self.text, p as usize));
        }
    }

    /// Print the suffix and LCP arrays side by side.
    pub fn dump_lcp(&self) {
        let (Some(sa), Some(lcp)) = (self.sa(), self.lcp()) else {
            self.note(format_args!("LCP array not built"));
            return;
        };
        let Ok(mut guard) = self.diag.lock() else {
            return;
        };
        let diag = &mut **guard;
        let _ = writeln!(diag, "i\tsa[i]\tlcp[i]\tsuffix");
        for (i, (&p, &l)) in sa.iter().zip(lcp.iter()).enumerate() {
            let _ = writeln!(diag, "{i}\t{p}\t{l}\t'{}'", preview(self.text, p as usize));
        }
    }

    /// Run one doubling round over the whole array and return how many new
    /// singleton groups it produced.
    fn doubling_round(&mut self) -> u32 {
        let n = self.sa.len();
        let found = AtomicU32::new(0);
        match &self.pool {
            None => {
                let pass =
                    SortPass::sequential(&mut self.sa, &mut self.isa, self.h, &found);
                let inline = doubling::doubling_range(pass, None, 0, n);
                found.fetch_add(inline, Ordering::Relaxed);
            }
            Some(pool) => {
                let step = chunk_step(n, self.jobs);
                let bounds = doubling::chunk_bounds(&self.sa, &self.isa, step);
                let pass = SortPass::parallel(
                    &mut self.sa,
                    &self.isa,
                    &mut self.isa_next,
                    self.h,
                    &found,
                );
                pool.install(|| {
                    rayon::scope(|s| {
                        for w in bounds.windows(2) {
                            let (lo, hi) = (w[0], w[1]);
                            s.spawn(move |s| {
                                let inline =
                                    doubling::doubling_range(pass, Some(s), lo, hi);
                                pass.new_singletons.fetch_add(inline, Ordering::Relaxed);
                            });
                        }
                    })
                });
            }
        }
        found.into_inner()
    }

    /// Copy the stable rank buffer into the staging buffer so ranks
    /// finalized in earlier rounds stay current after the next swap.
    fn refresh_staged_ranks(&mut self) {
        let Some(pool) = &self.pool else { return };
        let step = chunk_step(self.isa.len(), self.jobs);
        let (src, dst) = (&self.isa, &mut self.isa_next);
        pool.install(|| {
            dst.par_chunks_mut(step)
                .zip(src.par_chunks(step))
                .for_each(|(d, s)| d.copy_from_slice(s));
        });
    }

    /// Rebuild the suffix array from the bijective rank table; this also
    /// clears the sorted-run overlay.
    fn invert(&mut self) {
        let n = self.sa.len();
        match &self.pool {
            None => {
                for i in 0..n {
                    self.sa[self.isa[i] as usize] = i as u32;
                }
            }
            Some(pool) => {
                let step = chunk_step(n, self.jobs);
                let out = ScatterSlice::new(&mut self.sa);
                let isa = &self.isa;
                pool.install(|| {
                    isa.par_chunks(step).enumerate().for_each(|(j, chunk)| {
                        let base = j * step;
                        for (i, &r) in chunk.iter().enumerate() {
                            // ranks are unique, so targets are disjoint
                            unsafe { out.write(r as usize, (base + i) as u32) };
                        }
                    })
                });
            }
        }
    }

    fn note(&self, args: std::fmt::Arguments) {
        if let Ok(mut diag) = self.diag.lock() {
            let _ = writeln!(diag, "{args}");
        }
    }
}

/// Allocate a zeroed u32 array, surfacing allocation failure as an error
/// instead of aborting.
fn alloc_words(n: usize, what: &str) -> Result<Vec<u32>> {
    let mut words = Vec::new();
    words
        .try_reserve_exact(n)
        .with_context(|| format!("allocating the {what} ({n} words)"))?;
    words.resize(n, 0);
    Ok(words)
}

/// Escaped, truncated head of the suffix starting at `p`.
fn preview(text: &[u8], p: usize) -> String {
    const HEAD: usize = 24;
    let end = (p + HEAD).min(text.len());
    let mut s = text[p..end].escape_ascii().to_string();
    if end < text.len() {
        s.push_str("..");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet(text: &[u8], jobs: u32) -> SortEngine<'_> {
        SortEngine::with_diag(text, jobs, Box::new(io::sink())).unwrap()
    }

    #[test]
    fn test_banana_sequential() {
        let mut engine = quiet(b"banana\x00", 1);
        assert!(engine.sa().is_none());
        engine.build_sa().unwrap();
        assert_eq!(engine.sa().unwrap(), &[6, 5, 3, 1, 0, 4, 2]);
        engine.build_lcp().unwrap();
        assert_eq!(engine.lcp().unwrap(), &[0, 0, 1, 3, 0, 0, 2]);
        assert!(engine.validate());
    }

    #[test]
    fn test_banana_parallel() {
        let mut engine = quiet(b"banana\x00", 4);
        engine.build_sa().unwrap();
        assert_eq!(engine.sa().unwrap(), &[6, 5, 3, 1, 0, 4, 2]);
        engine.build_lcp().unwrap();
        assert_eq!(engine.lcp().unwrap(), &[0, 0, 1, 3, 0, 0, 2]);
        assert!(engine.validate());
    }

    #[test]
    fn test_empty_text() {
        let mut engine = quiet(b"\x00", 1);
        engine.build_sa().unwrap();
        assert_eq!(engine.sa().unwrap(), &[0]);
        engine.build_lcp().unwrap();
        assert_eq!(engine.lcp().unwrap(), &[0]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut engine = quiet(b"mississippi\x00", 1);
        engine.build_sa().unwrap();
        let first: Vec<u32> = engine.sa().unwrap().to_vec();
        engine.build_sa().unwrap();
        assert_eq!(engine.sa().unwrap(), first.as_slice());
    }

    #[test]
    fn test_rejects_bad_jobs() {
        assert!(SortEngine::new(b"a\x00", 0).is_err());
        assert!(SortEngine::new(b"a\x00", 65).is_err());
    }

    #[test]
    fn test_rejects_missing_sentinel() {
        assert!(SortEngine::new(b"abc", 1).is_err());
        assert!(SortEngine::new(b"", 1).is_err());
    }

    #[test]
    fn test_interior_sentinel_fails_build() {
        let mut engine = quiet(b"ab\x00cd\x00", 1);
        assert!(engine.build_sa().is_err());
    }

    #[test]
    fn test_lcp_requires_sa() {
        let mut engine = quiet(b"banana\x00", 1);
        assert!(engine.build_lcp().is_err());
    }
}
