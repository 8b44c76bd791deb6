//! Myers O(ND) diff, linear-space variant (middle-snake divide and conquer).
//!
//! `find_middle_snake` and `conquer` follow the structure of the Myers
//! module in the `similar` crate (Armin Ronacher, Apache-2.0), adapted to
//! emit index-based [`EditOp`]s.

use std::ops::{Index, IndexMut, Range};

/// One step of an edit script, carrying indices into the old/new sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Equal { old: usize, new: usize },
    Delete { old: usize },
    Insert { new: usize },
}

/// Computes a shortest edit script turning `old` into `new`.
///
/// Inside every run of consecutive non-equal steps, deletions come before
/// insertions, the layout unified diffs use.
pub fn diff<T: PartialEq>(old: &[T], new: &[T]) -> Vec<EditOp> {
    let max_d = max_d(old.len(), new.len());
    let mut vf = V::new(max_d);
    let mut vb = V::new(max_d);
    let mut ops = Vec::with_capacity(old.len().max(new.len()));
    conquer(old, 0..old.len(), new, 0..new.len(), &mut vf, &mut vb, &mut ops);
    group_runs(ops)
}

fn max_d(len1: usize, len2: usize) -> usize {
    (len1 + len2 + 1) / 2 + 1
}

struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize + 1,
            v: vec![0; 2 * max_d + 3],
        }
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn common_prefix_len<T: PartialEq>(
    old: &[T],
    old_range: Range<usize>,
    new: &[T],
    new_range: Range<usize>,
) -> usize {
    old[old_range]
        .iter()
        .zip(new[new_range].iter())
        .take_while(|(a, b)| a == b)
        .count()
}

fn common_suffix_len<T: PartialEq>(
    old: &[T],
    old_range: Range<usize>,
    new: &[T],
    new_range: Range<usize>,
) -> usize {
    old[old_range]
        .iter()
        .rev()
        .zip(new[new_range].iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Finds a point on an optimal edit path roughly half-way through it.
fn find_middle_snake<T: PartialEq>(
    old: &[T],
    old_range: Range<usize>,
    new: &[T],
    new_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
) -> Option<(usize, usize)> {
    let n = old_range.len();
    let m = new_range.len();

    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    let d_max = max_d(n, m) as isize;
    for d in 0..d_max {
        // Forward paths.
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;

            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(
                    old,
                    old_range.start + x..old_range.end,
                    new,
                    new_range.start + y..new_range.end,
                );
            }
            vf[k] = x;

            if odd && (k - delta).abs() <= d - 1 && vf[k] + vb[-(k - delta)] >= n {
                return Some((x0 + old_range.start, y0 + new_range.start));
            }
        }

        // Backward paths, with x measured from the end of each range.
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;

            if x < n && y < m {
                let advance = common_suffix_len(
                    old,
                    old_range.start..old_range.start + n - x,
                    new,
                    new_range.start..new_range.start + m - y,
                );
                x += advance;
                y += advance;
            }
            vb[k] = x;

            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Some((n - x + old_range.start, m - y + new_range.start));
            }
        }
    }

    None
}

fn conquer<T: PartialEq>(
    old: &[T],
    mut old_range: Range<usize>,
    new: &[T],
    mut new_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    ops: &mut Vec<EditOp>,
) {
    let prefix = common_prefix_len(old, old_range.clone(), new, new_range.clone());
    for i in 0..prefix {
        ops.push(EditOp::Equal {
            old: old_range.start + i,
            new: new_range.start + i,
        });
    }
    old_range.start += prefix;
    new_range.start += prefix;

    let suffix = common_suffix_len(old, old_range.clone(), new, new_range.clone());
    let suffix_old = old_range.end - suffix;
    let suffix_new = new_range.end - suffix;
    old_range.end = suffix_old;
    new_range.end = suffix_new;

    if old_range.is_empty() && new_range.is_empty() {
        // nothing between prefix and suffix
    } else if new_range.is_empty() {
        ops.extend(old_range.map(|old| EditOp::Delete { old }));
    } else if old_range.is_empty() {
        ops.extend(new_range.map(|new| EditOp::Insert { new }));
    } else if let Some((x, y)) =
        find_middle_snake(old, old_range.clone(), new, new_range.clone(), vf, vb)
            .filter(|&split| splits_range(split, &old_range, &new_range))
    {
        conquer(old, old_range.start..x, new, new_range.start..y, vf, vb, ops);
        conquer(old, x..old_range.end, new, y..new_range.end, vf, vb, ops);
    } else {
        ops.extend(old_range.map(|old| EditOp::Delete { old }));
        ops.extend(new_range.map(|new| EditOp::Insert { new }));
    }

    for i in 0..suffix {
        ops.push(EditOp::Equal {
            old: suffix_old + i,
            new: suffix_new + i,
        });
    }
}

/// A split point must lie inside both ranges and shrink the problem.
fn splits_range((x, y): (usize, usize), old_range: &Range<usize>, new_range: &Range<usize>) -> bool {
    let inside = old_range.start <= x && x <= old_range.end && new_range.start <= y && y <= new_range.end;
    let at_start = x == old_range.start && y == new_range.start;
    let at_end = x == old_range.end && y == new_range.end;
    inside && !at_start && !at_end
}

fn group_runs(ops: Vec<EditOp>) -> Vec<EditOp> {
    let mut grouped = Vec::with_capacity(ops.len());
    let mut deletes: Vec<EditOp> = Vec::new();
    let mut inserts: Vec<EditOp> = Vec::new();

    for op in ops {
        match op {
            EditOp::Delete { .. } => deletes.push(op),
            EditOp::Insert { .. } => inserts.push(op),
            EditOp::Equal { .. } => {
                grouped.append(&mut deletes);
                grouped.append(&mut inserts);
                grouped.push(op);
            }
        }
    }
    grouped.append(&mut deletes);
    grouped.append(&mut inserts);
    grouped
}
