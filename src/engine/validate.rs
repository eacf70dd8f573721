//! Post-hoc checks over finished arrays.
//!
//! All checks are diagnostic: they re-derive properties of the suffix and
//! LCP arrays from the text instead of trusting engine state, and report
//! offending positions to the diagnostic sink.

use std::io::Write;

use roaring::RoaringBitmap;

use super::lcp::common_prefix;

/// How many offending positions each check reports before going quiet.
const REPORT_LIMIT: u64 = 8;

/// Entries that are out of range or appear more than once.
pub(crate) fn count_duplicates(sa: &[u32], diag: &mut dyn Write) -> u64 {
    let n = sa.len() as u32;
    let mut seen = RoaringBitmap::new();
    let mut bad = 0u64;
    for (i, &v) in sa.iter().enumerate() {
        if v >= n || !seen.insert(v) {
            bad += 1;
            if bad <= REPORT_LIMIT {
                let _ = writeln!(diag, "slot {i}: suffix {v} repeated or out of range");
            }
        }
    }
    bad
}

/// Adjacent suffix pairs that are not in strictly ascending text order.
pub(crate) fn count_descending(text: &[u8], sa: &[u32], diag: &mut dyn Write) -> u64 {
    let n = text.len();
    let mut bad = 0u64;
    for i in 1..sa.len() {
        let a = sa[i - 1] as usize;
        let b = sa[i] as usize;
        if a >= n || b >= n || text[a..] >= text[b..] {
            bad += 1;
            if bad <= REPORT_LIMIT {
                let _ = writeln!(diag, "slot {i}: suffix {b} does not follow suffix {a}");
            }
        }
    }
    bad
}

/// LCP entries that disagree with the actual common prefix of the adjacent
/// suffix pair in the text.
pub(crate) fn count_lcp_mismatches(
    text: &[u8],
    sa: &[u32],
    lcp: &[u32],
    diag: &mut dyn Write,
) -> u64 {
    let n = text.len();
    let mut bad = 0u64;
    if lcp.first().is_some_and(|&l| l != 0) {
        bad += 1;
        let _ = writeln!(diag, "slot 0: nonzero LCP {}", lcp[0]);
    }
    for i in 1..sa.len() {
        let a = sa[i - 1] as usize;
        let b = sa[i] as usize;
        if a >= n || b >= n {
            continue; // already reported by the duplicate check
        }
        let want = common_prefix(text, a, b) as u32;
        if lcp[i] != want {
            bad += 1;
            if bad <= REPORT_LIMIT {
                let _ = writeln!(
                    diag,
                    "slot {i}: LCP {} but suffixes {a} and {b} share {want} bytes",
                    lcp[i]
                );
            }
        }
    }
    bad
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_arrays_pass() {
        let text = b"banana\x00";
        let sa = vec![6, 5, 3, 1, 0, 4, 2];
        let lcp = vec![0, 0, 1, 3, 0, 0, 2];
        let mut sink = std::io::sink();
        assert_eq!(count_duplicates(&sa, &mut sink), 0);
        assert_eq!(count_descending(text, &sa, &mut sink), 0);
        assert_eq!(count_lcp_mismatches(text, &sa, &lcp, &mut sink), 0);
    }

    #[test]
    fn test_detects_duplicates() {
        let sa = vec![6, 5, 5, 1, 0, 4, 9];
        let mut sink = std::io::sink();
        // 5 repeated, 9 out of range
        assert_eq!(count_duplicates(&sa, &mut sink), 2);
    }

    #[test]
    fn test_detects_descending_pair() {
        let text = b"banana\x00";
        // suffixes 1 and 3 swapped
        let sa = vec![6, 5, 1, 3, 0, 4, 2];
        let mut sink = std::io::sink();
        assert_eq!(count_descending(text, &sa, &mut sink), 1);
    }

    #[test]
    fn test_detects_wrong_lcp() {
        let text = b"banana\x00";
        let sa = vec![6, 5, 3, 1, 0, 4, 2];
        let lcp = vec![0, 0, 1, 2, 0, 0, 2];
        let mut sink = std::io::sink();
        assert_eq!(count_lcp_mismatches(text, &sa, &lcp, &mut sink), 1);
    }
}
