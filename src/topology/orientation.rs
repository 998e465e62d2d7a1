//! Orientation groups used by the reference numbering rules: the sign of a
//! simplex and the permutations that reorder its vertices.

use core::fmt::{Debug, Formatter};
use serde::{Deserialize, Serialize};

/// A group of orientations: `compose` is associative, `default()` is the
/// identity.
pub trait Orientation: Copy + Default + Eq {
    fn compose(a: Self, b: Self) -> Self;
    fn inverse(a: Self) -> Self;
}

/// 1-bit flip; group C₂. `BitFlip(true)` is a reversal.
/// Compose = XOR; inverse = self.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BitFlip(pub bool);

impl Debug for BitFlip {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(if self.0 { "Sign(-)" } else { "Sign(+)" })
    }
}

impl Orientation for BitFlip {
    #[inline]
    fn compose(a: Self, b: Self) -> Self {
        BitFlip(a.0 ^ b.0)
    }
    #[inline]
    fn inverse(a: Self) -> Self {
        a
    }
}

impl BitFlip {
    pub const POSITIVE: BitFlip = BitFlip(false);
    pub const NEGATIVE: BitFlip = BitFlip(true);

    /// Sign of a nonzero integer; `None` for zero.
    pub fn of(value: i64) -> Option<Self> {
        match value.signum() {
            1 => Some(BitFlip::POSITIVE),
            -1 => Some(BitFlip::NEGATIVE),
            _ => None,
        }
    }

    /// `(-1)^k`.
    pub fn power(k: usize) -> Self {
        BitFlip(k % 2 == 1)
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0
    }
}

/// Jacobian and permutation signs.
pub use BitFlip as Sign;

/// Permutation of `0..n`, stored as the image of each position.
/// Compose(p, q) = p ∘ q (apply q, then p).
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct Perm(Vec<usize>);

impl Debug for Perm {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Perm").field(&self.0).finish()
    }
}

impl Perm {
    pub fn identity(n: usize) -> Self {
        Perm((0..n).collect())
    }

    /// The reversal `k -> n - 1 - k`.
    pub fn reversal(n: usize) -> Self {
        Perm((0..n).rev().collect())
    }

    /// Wraps `image` when it is a permutation of `0..len`.
    pub fn from_image(image: Vec<usize>) -> Option<Self> {
        let mut seen = vec![false; image.len()];
        for &k in &image {
            if k >= image.len() || std::mem::replace(&mut seen[k], true) {
                return None;
            }
        }
        Some(Perm(image))
    }

    /// Positions of `keys` in ascending order (a stable argsort).
    pub fn sorting<K: Ord>(keys: &[K]) -> Self {
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        Perm(order)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// `p ∘ q`; both must have equal length.
    pub fn compose(&self, q: &Perm) -> Perm {
        Perm(q.0.iter().map(|&k| self.0[k]).collect())
    }

    pub fn invert(&self) -> Perm {
        let mut inv = vec![0; self.0.len()];
        for (i, &k) in self.0.iter().enumerate() {
            inv[k] = i;
        }
        Perm(inv)
    }

    /// Parity as a sign, counted by cycle decomposition.
    pub fn sign(&self) -> Sign {
        let mut seen = vec![false; self.0.len()];
        let mut transpositions = 0;
        for start in 0..self.0.len() {
            let mut k = start;
            let mut len = 0;
            while !seen[k] {
                seen[k] = true;
                k = self.0[k];
                len += 1;
            }
            if len > 0 {
                transpositions += len - 1;
            }
        }
        Sign::power(transpositions)
    }

    /// Reorders `items` so that position `i` holds `items[self[i]]`.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.0.iter().map(|&k| items[k].clone()).collect()
    }
}

/// Accumulate a sequence of orientation steps along a path, left-to-right.
/// Identity is `O::default()`.
#[inline]
pub fn accumulate_path<O, I>(path: I) -> O
where
    O: Orientation,
    I: IntoIterator<Item = O>,
{
    path.into_iter()
        .fold(O::default(), |acc, step| O::compose(acc, step))
}

/// Orientation of the simplex spanned by `vertices` (`d + 1` points in `d`
/// dimensions): the sign of `det[v1 - v0, ..., vd - v0]`. `None` when the
/// simplex is degenerate or the shape is inconsistent.
pub fn simplex_orientation(vertices: &[Vec<i64>]) -> Option<Sign> {
    let (origin, rest) = vertices.split_first()?;
    let d = origin.len();
    if rest.len() != d || rest.iter().any(|v| v.len() != d) {
        return None;
    }
    let columns: Vec<Vec<i64>> = rest
        .iter()
        .map(|v| v.iter().zip(origin).map(|(a, b)| a - b).collect())
        .collect();
    Sign::of(determinant(&columns))
}

/// Integer determinant by Laplace expansion along the first column; the
/// matrices are the tiny edge matrices of reference simplices.
fn determinant(columns: &[Vec<i64>]) -> i64 {
    let n = columns.len();
    match n {
        0 => 1,
        1 => columns[0][0],
        _ => (0..n)
            .map(|row| {
                let minor: Vec<Vec<i64>> = columns[1..]
                    .iter()
                    .map(|col| {
                        col.iter()
                            .enumerate()
                            .filter(|&(r, _)| r != row)
                            .map(|(_, &v)| v)
                            .collect()
                    })
                    .collect();
                let sign = if row % 2 == 0 { 1 } else { -1 };
                sign * columns[0][row] * determinant(&minor)
            })
            .sum(),
    }
}
