//! Ternary-split quicksort over one group.
//!
//! Sorts the suffixes of a single group by the rank of the suffix h
//! positions ahead, following Bentley & McIlroy ("Engineering a Sort
//! Function"). The partition is three-way: everything equal to the pivot
//! stays one group at order 2h and is renumbered in place, only the
//! less-than and greater-than ranges need further splitting this round.

use rayon::Scope;

use super::doubling::sort_switch;
use super::store::SortPass;

/// Ranges shorter than this use the selection-based small sort.
const SMALL_SORT: usize = 7;

/// Sort the group occupying suffix-array slots [p, p+n). Returns how many
/// suffixes ended up in singleton groups.
pub(crate) fn tqsort<'a, 'scope>(
    pass: SortPass<'a>,
    scope: Option<&Scope<'scope>>,
    p: usize,
    n: usize,
) -> u32
where
    'a: 'scope,
{
    if n < SMALL_SORT {
        return bingo_sort(pass, p, n);
    }

    let v = choose_pivot(&pass, p, n);

    // Three-way partition with equal-to-pivot elements parked at both ends.
    // Signed cursors: the downward scan may step one below the range base.
    let (mut a, mut b) = (p as isize, p as isize);
    let (mut c, mut d) = ((p + n - 1) as isize, (p + n - 1) as isize);
    loop {
        while b <= c && pass.key(b as usize) <= v {
            if pass.key(b as usize) == v {
                pass.swap(a as usize, b as usize);
                a += 1;
            }
            b += 1;
        }
        while c >= b && pass.key(c as usize) >= v {
            if pass.key(c as usize) == v {
                pass.swap(c as usize, d as usize);
                d -= 1;
            }
            c -= 1;
        }
        if b > c {
            break;
        }
        pass.swap(b as usize, c as usize);
        b += 1;
        c -= 1;
    }

    // Rotate the equal parks into the middle.
    let pn = (p + n) as isize;
    let s = (a - p as isize).min(b - a) as usize;
    pass.vecswap(p, b as usize - s, s);
    let t = (d - c).min(pn - 1 - d) as usize;
    pass.vecswap(b as usize, p + n - t, t);

    let ltn = (b - a) as usize;
    let gtn = (d - c) as usize;
    let eqn = n - ltn - gtn;

    let mut found = 0;
    if ltn > 0 {
        found += sort_switch(pass, scope, p, ltn);
    }
    pass.assign(p + ltn, eqn);
    if eqn == 1 {
        found += 1;
    }
    if gtn > 0 {
        found += sort_switch(pass, scope, p + n - gtn, gtn);
    }
    found
}

/// Selection sort for tiny ranges: repeatedly pull the minimum key and all
/// its equals to the front, each maximal equal run becoming one new group.
fn bingo_sort(pass: SortPass<'_>, p: usize, n: usize) -> u32 {
    let end = p + n;
    let mut found = 0;
    let mut a = p;
    while a < end {
        let mut v = pass.key(a);
        for i in a + 1..end {
            v = v.min(pass.key(i));
        }
        let mut b = a;
        for i in a..end {
            if pass.key(i) == v {
                pass.swap(i, b);
                b += 1;
            }
        }
        pass.assign(a, b - a);
        if b - a == 1 {
            found += 1;
        }
        a = b;
    }
    found
}

/// Slot index holding the median of the keys at three slots.
#[inline]
fn med3(pass: &SortPass<'_>, a: usize, b: usize, c: usize) -> usize {
    let ka = pass.key(a);
    let kb = pass.key(b);
    let kc = pass.key(c);
    if ka < kb {
        if kb < kc {
            b
        } else if ka < kc {
            c
        } else {
            a
        }
    } else if kb > kc {
        b
    } else if ka < kc {
        a
    } else {
        c
    }
}

/// Pivot key for [p, p+n): middle element for small ranges, median of three
/// for mid-size, pseudo-median of nine with stride n/8 for large ranges.
fn choose_pivot(pass: &SortPass<'_>, p: usize, n: usize) -> u64 {
    let mut b = p + n / 2;
    if n > 7 {
        let mut a = p;
        let mut c = p + n - 1;
        if n > 40 {
            let s = n / 8;
            a = med3(pass, a, a + s, a + 2 * s);
            b = med3(pass, b - s, b, b + s);
            c = med3(pass, c - 2 * s, c - s, c);
        }
        b = med3(pass, a, b, c);
    }
    pass.key(b)
}
