//! Topic matching — exact lookup first, then approximate string matching.
//!
//! Approximate matching scores every known topic with a sequence-similarity
//! ratio built from the longest matching blocks of the two strings:
//!
//! ```text
//! ratio = 2 * M / T
//! ```
//!
//! where `M` is the number of characters covered by matching blocks and `T`
//! the combined length. The block decomposition is the one popularized by
//! difflib's `SequenceMatcher` (Ratcliff/Obershelp): find the longest common
//! block, then recurse on the pieces to its left and right. For sequences of
//! 200+ characters, characters occurring in more than 1% of positions are
//! not used to seed blocks (the "auto-junk" heuristic).
//!
//! Ties at the best ratio go to the lexicographically smallest topic.

use std::collections::{BTreeMap, HashMap};
use zalo_core::knowledge::normalize_topic;

/// Default minimum ratio for a fuzzy match.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Below this length the auto-junk heuristic never kicks in.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Resolves free-form input to a known topic.
#[derive(Debug, Clone, Copy)]
pub struct TopicMatcher {
    threshold: f64,
}

impl Default for TopicMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl TopicMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best known topic for `input`, or `None` if nothing is close enough.
    ///
    /// Generic over the map's value type so it works directly on a
    /// document's topic map.
    pub fn resolve<V>(&self, input: &str, known: &BTreeMap<String, V>) -> Option<String> {
        let input = normalize_topic(input);
        if input.is_empty() {
            return None;
        }

        if known.contains_key(&input) {
            return Some(input);
        }

        let mut best: Option<(&str, f64)> = None;
        // BTreeMap iterates in ascending order, so strict `>` keeps the
        // smallest topic among equal ratios.
        for topic in known.keys() {
            let ratio = similarity_ratio(topic, &input);
            if ratio < self.threshold {
                continue;
            }
            if best.is_none_or(|(_, r)| ratio > r) {
                best = Some((topic, ratio));
            }
        }

        best.map(|(topic, _)| topic.to_string())
    }
}

/// Similarity of two strings in `[0, 1]`; `1.0` for two empty strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character of `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b2j }
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows,
    /// earliest in `a` (then `b`) among equally long blocks.
    fn longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

        // run length of the match ending at (i - 1, j), keyed by j
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = if j == 0 { 0 } else { j2len.get(&(j - 1)).copied().unwrap_or(0) };
                    let k = prev + 1;
                    next.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            j2len = next;
        }

        // Grow the block over characters dropped by auto-junk.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_k += 1;
        }
        while best_i + best_k < ahi
            && best_j + best_k < bhi
            && self.a[best_i + best_k] == self.b[best_j + best_k]
        {
            best_k += 1;
        }

        (best_i, best_j, best_k)
    }
}
