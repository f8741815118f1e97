use std::collections::HashMap;
use std::hash::Hash;
use std::ops::{Index, IndexMut};
use serde::Serialize;

/// Tokens present in only one of two sequences.
/// Tokens common to both are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditScript<T> {
    /// Present in the new sequence, absent from the old
    pub added: Vec<T>,
    /// Present in the old sequence, absent from the new
    pub deleted: Vec<T>,
}

impl<T> EditScript<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }
}

impl<T> Default for EditScript<T> {
    fn default() -> Self {
        Self { added: Vec::new(), deleted: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equal,
    Insert,
    Delete,
}

/// A maximal stretch of consecutive edits of the same kind, as interned codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub op: Op,
    pub codes: Vec<u32>,
}

/// Maps each distinct token to a dense code so the diff compares integers
/// instead of token values. Codes are assigned on first sight.
pub struct Interner<'a, T> {
    codes: HashMap<&'a T, u32>,
    tokens: Vec<&'a T>,
}

impl<'a, T: Eq + Hash> Default for Interner<'a, T> {
    fn default() -> Self {
        Self { codes: HashMap::new(), tokens: Vec::new() }
    }
}

impl<'a, T: Eq + Hash> Interner<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, token: &'a T) -> u32 {
        if let Some(&code) = self.codes.get(token) {
            return code;
        }
        let code = self.tokens.len() as u32;
        self.codes.insert(token, code);
        self.tokens.push(token);
        code
    }

    pub fn encode(&mut self, tokens: &[&'a T]) -> Vec<u32> {
        tokens.iter().map(|&token| self.intern(token)).collect()
    }

    pub fn resolve(&self, code: u32) -> Option<&'a T> {
        self.tokens.get(code as usize).copied()
    }
}

/// Compute the tokens added and deleted between `old` and `new`.
///
/// Both inputs are sorted (on borrowed views, the caller's slices are left
/// alone) before diffing, so the result does not depend on input order.
/// Repeated tokens count as separate occurrences.
pub fn diff<T>(old: &[T], new: &[T]) -> EditScript<T>
where
    T: Ord + Hash + Clone,
{
    let mut old_sorted: Vec<&T> = old.iter().collect();
    old_sorted.sort();
    let mut new_sorted: Vec<&T> = new.iter().collect();
    new_sorted.sort();

    let mut interner = Interner::new();
    let a = interner.encode(&old_sorted);
    let b = interner.encode(&new_sorted);

    let mut script = EditScript::default();
    for run in myers(&a, &b) {
        let target = match run.op {
            Op::Equal => continue,
            Op::Insert => &mut script.added,
            Op::Delete => &mut script.deleted,
        };
        target.extend(
            run.codes
                .iter()
                .filter_map(|&code| interner.resolve(code))
                .cloned(),
        );
    }
    script
}

/// Myers' shortest-edit-script diff, grouped into runs.
///
/// Uses the linear-space variant: find a middle snake, then recurse on the
/// halves either side of it. Working memory is two diagonal vectors of
/// O(a + b) each, reused across the recursion.
pub fn myers(a: &[u32], b: &[u32]) -> Vec<Run> {
    let max_d = (a.len() + b.len() + 1) / 2 + 1;
    let mut forward = Diagonals::new(max_d);
    let mut backward = Diagonals::new(max_d);

    let mut edits: Vec<(Op, u32)> = Vec::with_capacity(a.len() + b.len());
    conquer(a, b, &mut forward, &mut backward, &mut edits);

    let mut runs: Vec<Run> = Vec::new();
    for (op, code) in edits {
        match runs.last_mut() {
            Some(run) if run.op == op => run.codes.push(code),
            _ => runs.push(Run { op, codes: vec![code] }),
        }
    }
    runs
}

/// Furthest-reaching x per diagonal k, indexable by negative k
struct Diagonals {
    offset: isize,
    v: Vec<isize>,
}

impl Diagonals {
    fn new(max_d: usize) -> Self {
        Self { offset: max_d as isize, v: vec![0; 2 * max_d + 1] }
    }
}

impl Index<isize> for Diagonals {
    type Output = isize;

    fn index(&self, k: isize) -> &isize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Diagonals {
    fn index_mut(&mut self, k: isize) -> &mut isize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn common_prefix(a: &[u32], b: &[u32]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[u32], b: &[u32]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

fn conquer(
    a: &[u32],
    b: &[u32],
    forward: &mut Diagonals,
    backward: &mut Diagonals,
    edits: &mut Vec<(Op, u32)>,
) {
    let prefix = common_prefix(a, b);
    edits.extend(a[..prefix].iter().map(|&code| (Op::Equal, code)));
    let (a, b) = (&a[prefix..], &b[prefix..]);

    let suffix = common_suffix(a, b);
    let (a, b, tail) = (&a[..a.len() - suffix], &b[..b.len() - suffix], &a[a.len() - suffix..]);

    if a.is_empty() {
        edits.extend(b.iter().map(|&code| (Op::Insert, code)));
    } else if b.is_empty() {
        edits.extend(a.iter().map(|&code| (Op::Delete, code)));
    } else if let Some((x, y)) = middle_snake(a, b, forward, backward) {
        conquer(&a[..x], &b[..y], forward, backward, edits);
        conquer(&a[x..], &b[y..], forward, backward, edits);
    } else {
        // Unreachable for non-empty inputs, but a full replace is still a valid script
        edits.extend(a.iter().map(|&code| (Op::Delete, code)));
        edits.extend(b.iter().map(|&code| (Op::Insert, code)));
    }

    edits.extend(tail.iter().map(|&code| (Op::Equal, code)));
}

/// A point on some shortest edit path from (0, 0) to (a.len(), b.len()),
/// found by searching forward from the start and backward from the end
/// until the two frontiers overlap.
fn middle_snake(
    a: &[u32],
    b: &[u32],
    forward: &mut Diagonals,
    backward: &mut Diagonals,
) -> Option<(usize, usize)> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    // Forward diagonal k meets backward diagonal delta - k
    let delta = n - m;
    let odd = delta & 1 == 1;
    let max_d = (n + m + 1) / 2 + 1;

    forward[1] = 0;
    backward[1] = 0;

    for d in 0..max_d {
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && forward[k - 1] < forward[k + 1]) {
                forward[k + 1]
            } else {
                forward[k - 1] + 1
            };
            let y = x - k;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix(&a[x as usize..], &b[y as usize..]) as isize;
            }
            forward[k] = x;

            if odd && (delta - k).abs() <= d - 1 && forward[k] + backward[delta - k] >= n {
                return Some((x0 as usize, y0 as usize));
            }
            k += 2;
        }

        // Backward search runs on the reversed sequences
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && backward[k - 1] < backward[k + 1]) {
                backward[k + 1]
            } else {
                backward[k - 1] + 1
            };
            let mut y = x - k;
            if x < n && y < m {
                let run = common_suffix(&a[..(n - x) as usize], &b[..(m - y) as usize]) as isize;
                x += run;
                y += run;
            }
            backward[k] = x;

            if !odd && (delta - k).abs() <= d && backward[k] + forward[delta - k] >= n {
                return Some(((n - x) as usize, (m - y) as usize));
            }
            k += 2;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn counts(tokens: &[String]) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Occurrences in `a` beyond those in `b`, as a multiset
    fn minus<'a>(a: &BTreeMap<&'a str, usize>, b: &BTreeMap<&'a str, usize>) -> BTreeMap<&'a str, usize> {
        a.iter()
            .filter_map(|(token, &count)| {
                let rest = count.saturating_sub(b.get(token).copied().unwrap_or(0));
                (rest > 0).then_some((*token, rest))
            })
            .collect()
    }

    #[test]
    fn test_unsorted_inputs() {
        let old = strings(&["d", "c", "b", "a"]);
        let new = strings(&["a", "c", "e", "f"]);

        let script = diff(&old, &new);

        assert_eq!(script.deleted, strings(&["b", "d"]));
        assert_eq!(script.added, strings(&["e", "f"]));
        assert_eq!(old, strings(&["d", "c", "b", "a"]), "Caller's input must not be reordered");
    }

    #[test]
    fn test_empty_sides() {
        let some = strings(&["x", "y"]);

        let script = diff(&[], &some);
        assert_eq!(script.added, some);
        assert!(script.deleted.is_empty());

        let script = diff(&some, &[]);
        assert_eq!(script.deleted, some);
        assert!(script.added.is_empty());

        assert!(diff::<String>(&[], &[]).is_empty());
    }

    #[test]
    fn test_duplicates_count_separately() {
        let script = diff(&strings(&["x", "x"]), &strings(&["x"]));

        assert_eq!(script.deleted, strings(&["x"]), "One surplus occurrence should be deleted");
        assert!(script.added.is_empty());
    }

    #[test]
    fn test_equality_is_exact() {
        let script = diff(&strings(&["Web", "db "]), &strings(&["web", "db"]));

        assert_eq!(script.deleted, strings(&["Web", "db "]));
        assert_eq!(script.added, strings(&["db", "web"]));
    }

    #[test]
    fn test_unicode_tokens() {
        let script = diff(&strings(&["ショップ:web", "α"]), &strings(&["α", "ショップ:db"]));

        assert_eq!(script.deleted, strings(&["ショップ:web"]));
        assert_eq!(script.added, strings(&["ショップ:db"]));
    }

    #[test]
    fn test_non_string_tokens() {
        let script = diff(&[3u64, 1, 2], &[2, 4]);

        assert_eq!(script.deleted, vec![1, 3]);
        assert_eq!(script.added, vec![4]);
    }

    #[test]
    fn test_interner_is_bijective() {
        let tokens = strings(&["a", "b", "a", "c"]);
        let refs: Vec<&String> = tokens.iter().collect();
        let mut interner = Interner::new();

        let codes = interner.encode(&refs);

        assert_eq!(codes, vec![0, 1, 0, 2]);
        assert_eq!(interner.resolve(2).map(String::as_str), Some("c"));
        assert_eq!(interner.resolve(3), None);
    }

    #[test]
    fn test_myers_runs() {
        let runs = myers(&[0, 1, 2], &[0, 2, 3]);

        assert_eq!(
            runs,
            vec![
                Run { op: Op::Equal, codes: vec![0] },
                Run { op: Op::Delete, codes: vec![1] },
                Run { op: Op::Equal, codes: vec![2] },
                Run { op: Op::Insert, codes: vec![3] },
            ]
        );
    }

    #[test]
    fn test_large_disjoint_inputs() {
        let n = 4000u32;
        let old: Vec<u32> = (0..n).collect();
        let new: Vec<u32> = (n..2 * n).collect();

        let script = diff(&old, &new);

        assert_eq!(script.deleted, old);
        assert_eq!(script.added, new);
    }

    #[test]
    fn test_large_mostly_shared_inputs() {
        let old: Vec<u32> = (0..5000).filter(|i| i % 7 != 0).collect();
        let new: Vec<u32> = (0..5000).filter(|i| i % 11 != 0).collect();

        let script = diff(&old, &new);

        let deleted: Vec<u32> = (0..5000).filter(|i| i % 11 == 0 && i % 7 != 0).collect();
        let added: Vec<u32> = (0..5000).filter(|i| i % 7 == 0 && i % 11 != 0).collect();
        assert_eq!(script.deleted, deleted);
        assert_eq!(script.added, added);
    }

    /// Longest common subsequence length by dynamic programming
    fn lcs_len(a: &[u32], b: &[u32]) -> usize {
        let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
        for i in 1..=a.len() {
            for j in 1..=b.len() {
                table[i][j] = if a[i - 1] == b[j - 1] {
                    table[i - 1][j - 1] + 1
                } else {
                    table[i - 1][j].max(table[i][j - 1])
                };
            }
        }
        table[a.len()][b.len()]
    }

    fn codes() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(0u32..5, 0..16)
    }

    fn tokens() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-e]{1,2}", 0..12)
    }

    proptest! {
        #[test]
        fn prop_swap_symmetry(old in tokens(), new in tokens()) {
            let forward = diff(&old, &new);
            let backward = diff(&new, &old);
            prop_assert_eq!(&forward.added, &backward.deleted);
            prop_assert_eq!(&forward.deleted, &backward.added);
        }

        #[test]
        fn prop_self_diff_is_empty(seq in tokens()) {
            let mut shuffled = seq.clone();
            shuffled.reverse();
            prop_assert!(diff(&seq, &shuffled).is_empty());
        }

        #[test]
        fn prop_multiset_conservation(old in tokens(), new in tokens()) {
            let script = diff(&old, &new);
            let (old_counts, new_counts) = (counts(&old), counts(&new));
            prop_assert_eq!(counts(&script.deleted), minus(&old_counts, &new_counts));
            prop_assert_eq!(counts(&script.added), minus(&new_counts, &old_counts));
        }

        #[test]
        fn prop_deterministic(old in tokens(), new in tokens()) {
            prop_assert_eq!(diff(&old, &new), diff(&old, &new));
        }

        #[test]
        fn prop_runs_rebuild_both_sides(a in codes(), b in codes()) {
            let runs = myers(&a, &b);
            let old: Vec<u32> = runs
                .iter()
                .filter(|run| run.op != Op::Insert)
                .flat_map(|run| run.codes.iter().copied())
                .collect();
            let new: Vec<u32> = runs
                .iter()
                .filter(|run| run.op != Op::Delete)
                .flat_map(|run| run.codes.iter().copied())
                .collect();
            prop_assert_eq!(old, a);
            prop_assert_eq!(new, b);
        }

        #[test]
        fn prop_script_is_minimal(a in codes(), b in codes()) {
            let edits: usize = myers(&a, &b)
                .iter()
                .filter(|run| run.op != Op::Equal)
                .map(|run| run.codes.len())
                .sum();
            prop_assert_eq!(edits, a.len() + b.len() - 2 * lcs_len(&a, &b));
        }
    }
}
