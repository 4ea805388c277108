//! Sequence similarity
//!
//! Block-matching ratio `2 * M / T`: `M` is the number of characters covered by
//! matching blocks, `T` the combined length of both strings. Blocks are found
//! by taking the longest common contiguous run and recursing on the pieces to
//! its left and right, the same procedure as the classic "ratio" of
//! approximate string matching (including the popular-element heuristic for
//! sequences of 200 characters or more).
//!
//! The raw procedure depends on argument order when several longest runs tie,
//! so [`similarity`] always compares in a canonical order.

use std::collections::{HashMap, HashSet};

/// Sequences at least this long get popular elements excluded from the index
const AUTOJUNK_MIN_LEN: usize = 200;

/// Symmetric similarity in `[0.0, 1.0]`
///
/// Returns 0.0 when either side is empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();

    let matched = BlockMatcher::new(&first, &second).matching_characters();
    2.0 * matched as f64 / (first.len() + second.len()) as f64
}

/// A matching run: `a[a_start..a_start + size] == b[b_start..b_start + size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Longest-block matcher over two character sequences
pub struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each element of `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    pub fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<char> = b2j
                .iter()
                .filter(|(_, positions)| positions.len() > limit)
                .map(|(&c, _)| c)
                .collect();
            b2j.retain(|c, _| !popular.contains(c));
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` x `b[blo..bhi]`
    ///
    /// Among equally long blocks the one starting earliest in `a` wins, then
    /// earliest in `b`. A zero-size block means nothing matched.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // run length of the match ending at b[j] for the previous row of `a`
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // popular elements are missing from the index; grow over them
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        Block {
            a_start: best_i,
            b_start: best_j,
            size: best_size,
        }
    }

    /// All matching blocks, ordered by position
    pub fn matching_blocks(&self) -> Vec<Block> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            let (i, j, k) = (block.a_start, block.b_start, block.size);
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
            blocks.push(block);
        }

        blocks.sort_by_key(|b| (b.a_start, b.b_start));
        blocks
    }

    /// Total characters covered by matching blocks
    pub fn matching_characters(&self) -> usize {
        self.matching_blocks().iter().map(|b| b.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(similarity("jeremy", "jeremy"), 1.0);
        assert_eq!(similarity("", "jeremy"), 0.0);
        assert_eq!(similarity("jeremy", ""), 0.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn test_ocr_misspelling() {
        // 14 of 16 characters line up on each side
        let score = similarity("jermey dickamorc", "jeremy dickamore");
        assert!(approx(score, 0.875), "score = {}", score);
    }

    #[test]
    fn test_known_ratios() {
        assert!(approx(similarity("kitten", "sitting"), 8.0 / 13.0));
        assert!(approx(similarity("abcd", "bcda"), 0.75));
        assert!(approx(similarity("alice smith", "bob jones"), 0.2));
        assert!(approx(similarity("jon smith", "john smith"), 18.0 / 19.0));
    }

    #[test]
    fn test_symmetry_when_order_matters() {
        // raw block matching gives 0.25 one way and 0.5 the other
        let forward = similarity("tide", "diet");
        let backward = similarity("diet", "tide");
        assert_eq!(forward, backward);
        assert!(approx(forward, 0.5));
    }

    #[test]
    fn test_symmetry_sample() {
        let names = [
            "jeremy dickamore",
            "jermey dickamorc",
            "ann lee",
            "anne leigh",
            "b",
            "ab",
            "ba",
            "tide",
            "diet",
        ];
        for a in names {
            for b in names {
                assert_eq!(similarity(a, b), similarity(b, a), "{} / {}", a, b);
            }
        }
    }

    #[test]
    fn test_bounds() {
        for (a, b) in [("x", "y"), ("abc", "abcdef"), ("zzzz", "z")] {
            let score = similarity(a, b);
            assert!((0.0..=1.0).contains(&score));
        }
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_matching_blocks() {
        let a = chars("jeremy");
        let b = chars("jermey");
        let blocks = BlockMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                Block { a_start: 0, b_start: 0, size: 3 },
                Block { a_start: 3, b_start: 4, size: 1 },
                Block { a_start: 5, b_start: 5, size: 1 },
            ]
        );
    }

    #[test]
    fn test_find_longest_match_prefers_earliest() {
        let a = chars("ab");
        let b = chars("ba");
        let block = BlockMatcher::new(&a, &b).find_longest_match(0, 2, 0, 2);
        assert_eq!(block, Block { a_start: 0, b_start: 1, size: 1 });
    }

    #[test]
    fn test_long_sequence_popular_elements() {
        // "a" occurs more than len/100 + 1 times and is dropped from the index;
        // only the extension step can cover it
        let x = format!("b{}", "a".repeat(250));
        let x = chars(&x);
        assert_eq!(BlockMatcher::new(&x, &x).matching_characters(), 251);

        let a = format!("xyz{}", "a".repeat(250));
        let b = format!("{}xyz", "a".repeat(250));
        let a = chars(&a);
        let b = chars(&b);
        let matcher = BlockMatcher::new(&a, &b);
        assert_eq!(
            matcher.find_longest_match(0, a.len(), 0, b.len()),
            Block { a_start: 0, b_start: 250, size: 3 }
        );
        assert_eq!(matcher.matching_characters(), 3);
    }
}
