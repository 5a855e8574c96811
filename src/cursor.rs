//! The input cursor: owns the input text, the current line counter, and the
//! current range of interest (which may be discontiguous, holding holes
//! already claimed by `CHECK-DAG` matches), plus the queue of label-bounded
//! ranges the preprocessor produces.
//!
//! Grounded in `examples/original_source/filecheck/finput.py`, generalized
//! per spec.md §4.5/§9 to the richer discontiguous-range model `matcher.py`
//! assumes.

use std::collections::VecDeque;

use crate::compiler::CompiledPattern;

/// A half-open `[start, end)` interval over the input text, optionally
/// punctured by an ordered, non-overlapping list of "holes" already claimed
/// by `CHECK-DAG` matches. An empty hole list *is* the contiguous case —
/// every operation below is shared between the two, so there is no need for
/// a second concrete type; `is_discontiguous` is simply `!holes.is_empty()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRange {
    pub start: usize,
    pub end: usize,
    holes: Vec<(usize, usize)>,
}

impl InputRange {
    pub fn new(start: usize, end: usize) -> Self {
        InputRange {
            start,
            end,
            holes: Vec::new(),
        }
    }

    pub fn is_discontiguous(&self) -> bool {
        !self.holes.is_empty()
    }

    /// The sub-intervals that remain searchable: `[start, end)` minus the
    /// holes, left to right.
    pub fn ranges(&self) -> Vec<(usize, usize)> {
        if self.holes.is_empty() {
            return vec![(self.start, self.end)];
        }
        let mut out = Vec::with_capacity(self.holes.len() + 1);
        let mut cursor = self.start;
        for &(hs, he) in &self.holes {
            if hs > cursor {
                out.push((cursor, hs));
            }
            cursor = cursor.max(he);
        }
        if cursor < self.end {
            out.push((cursor, self.end));
        }
        out
    }

    /// Insert `[hs, he)` as a new hole, merging with any overlapping or
    /// adjacent holes so the list stays sorted and non-overlapping.
    pub fn add_hole(&mut self, hs: usize, he: usize) {
        self.holes.push((hs, he));
        self.holes.sort_by_key(|&(s, _)| s);
        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(self.holes.len());
        for &(s, e) in &self.holes {
            if let Some(last) = merged.last_mut() {
                if s <= last.1 {
                    last.1 = last.1.max(e);
                    continue;
                }
            }
            merged.push((s, e));
        }
        self.holes = merged;
    }

    pub fn start_of_first_hole(&self) -> Option<usize> {
        self.holes.first().map(|&(s, _)| s)
    }

    pub fn end_of_last_hole(&self) -> Option<usize> {
        self.holes.last().map(|&(_, e)| e)
    }

    /// Split this range at a match `[match_start, match_end)`: the portion
    /// before the match becomes a new sub-range (returned), the portion
    /// after becomes the remainder (kept as `self`). Used only by label
    /// partitioning, so `self` must be contiguous.
    pub fn split_at(&mut self, match_start: usize, match_end: usize) -> InputRange {
        debug_assert!(!self.is_discontiguous());
        let before = InputRange::new(self.start, match_start);
        self.start = match_end;
        before
    }
}

/// A match against the input, as produced by either the regex or the
/// literal matcher. Offsets are stored rather than borrowed text so the
/// cursor can keep mutating the content it's built over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// `groups[0]` is always the whole match; `groups[n]` for `n >= 1` is
    /// capture group `n`, if it participated.
    groups: Vec<Option<(usize, usize)>>,
}

impl MatchResult {
    pub fn whole(start: usize, end: usize) -> Self {
        MatchResult {
            groups: vec![Some((start, end))],
        }
    }

    pub fn with_groups(start: usize, end: usize, groups: Vec<Option<(usize, usize)>>) -> Self {
        let mut all = vec![Some((start, end))];
        all.extend(groups);
        MatchResult { groups: all }
    }

    pub fn start(&self) -> usize {
        self.groups[0].unwrap().0
    }

    pub fn end(&self) -> usize {
        self.groups[0].unwrap().1
    }

    pub fn group<'t>(&self, n: usize, text: &'t str) -> Option<&'t str> {
        self.groups.get(n).copied().flatten().map(|(s, e)| &text[s..e])
    }
}

/// Owns the input text and the matching position within it.
pub struct FileInput {
    pub content: String,
    pub range: InputRange,
    pub line_no: usize,
    pub ranges: VecDeque<InputRange>,
}

impl FileInput {
    /// Load input text, canonicalizing `\r\n` to `\n`.
    pub fn new(raw: &str) -> Self {
        let content = raw.replace("\r\n", "\n");
        let end = content.len();
        FileInput {
            content,
            range: InputRange::new(0, end),
            line_no: 1,
            ranges: VecDeque::new(),
        }
    }

    pub fn is_discontiguous(&self) -> bool {
        self.range.is_discontiguous()
    }

    /// Move `range.start` forward by `n` bytes, tracking newlines crossed.
    pub fn advance_by(&mut self, n: usize) {
        let new_start = self.range.start + n;
        assert!(
            new_start <= self.range.end,
            "advance_by moved past range end"
        );
        self.line_no += self.content[self.range.start..new_start]
            .matches('\n')
            .count();
        self.range.start = new_start;
    }

    /// Move `range.start` to an absolute position `>= range.start`.
    pub fn move_to(&mut self, pos: usize) {
        assert!(pos >= self.range.start, "move_to must not move backwards");
        self.advance_by(pos - self.range.start);
    }

    /// Anchored match at `range.start`, bounded by `range.end`.
    pub fn try_match(&self, pattern: &CompiledPattern) -> Option<MatchResult> {
        pattern.match_at(&self.content, self.range.start, self.range.end)
    }

    /// Unanchored search within the current range; when `this_line`,
    /// restrict the upper bound to the next `\n`.
    pub fn find(&self, pattern: &CompiledPattern, this_line: bool) -> Option<MatchResult> {
        let end = if this_line {
            self.content[self.range.start..self.range.end]
                .find('\n')
                .map(|i| self.range.start + i)
                .unwrap_or(self.range.end)
        } else {
            self.range.end
        };
        pattern.find_at(&self.content, self.range.start, end)
    }

    /// Unanchored search over each sub-interval of `range`, in order;
    /// returns the first hit.
    pub fn find_between(&self, pattern: &CompiledPattern, range: &InputRange) -> Option<MatchResult> {
        for (s, e) in range.ranges() {
            if let Some(m) = pattern.find_at(&self.content, s, e) {
                return Some(m);
            }
        }
        None
    }

    /// Switch the current range to a discontiguous one with identical
    /// bounds. Precondition: the current range is contiguous.
    pub fn start_discontiguous_region(&mut self) {
        debug_assert!(!self.range.is_discontiguous());
        // holes start empty; nothing to do beyond asserting the precondition,
        // since an empty-holes InputRange already behaves contiguously.
        // The first `match_and_add_hole` call is what actually punctures it.
    }

    /// Find the pattern anywhere in the (possibly punctured) current range;
    /// on a hit, record the matched span as a new hole.
    pub fn match_and_add_hole(&mut self, pattern: &CompiledPattern) -> Option<MatchResult> {
        let m = self.find_between(pattern, &self.range)?;
        self.range.add_hole(m.start(), m.end());
        Some(m)
    }

    /// Collapse a discontiguous range to the contiguous remainder
    /// `[end_of_last_hole, end)`, advancing the line counter accordingly.
    pub fn advance_to_last_hole(&mut self) {
        if let Some(last_hole_end) = self.range.end_of_last_hole() {
            let new_start = last_hole_end.max(self.range.start);
            self.line_no += self.content[self.range.start..new_start]
                .matches('\n')
                .count();
            self.range = InputRange::new(new_start, self.range.end);
        }
    }

    pub fn skip_to_end_of_line(&mut self) {
        if let Some(i) = self.content[self.range.start..self.range.end].find('\n') {
            self.advance_by(i);
        } else {
            self.advance_by(self.range.end - self.range.start);
        }
    }

    pub fn is_end_of_line(&self) -> bool {
        self.range.start >= self.content.len() || self.content.as_bytes()[self.range.start] == b'\n'
    }

    /// Only whitespace/newlines remain in the file.
    pub fn is_end_of_file(&self) -> bool {
        self.content[self.range.start..]
            .chars()
            .all(|c| c.is_whitespace())
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.content[self.range.start..].starts_with(s)
    }

    /// The start of the line containing `pos` (defaulting to `range.start`).
    pub fn start_of_line(&self, pos: Option<usize>) -> usize {
        let pos = pos.unwrap_or(self.range.start);
        self.content[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// Pop the next preprocessed range from the queue and make it current.
    pub fn advance_range(&mut self) {
        if let Some(next) = self.ranges.pop_front() {
            self.range = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holes_stay_sorted_and_merged() {
        let mut r = InputRange::new(0, 100);
        r.add_hole(40, 50);
        r.add_hole(10, 20);
        r.add_hole(45, 60);
        assert_eq!(r.ranges(), vec![(0, 10), (20, 40), (60, 100)]);
    }

    #[test]
    fn ranges_is_whole_interval_when_contiguous() {
        let r = InputRange::new(5, 30);
        assert_eq!(r.ranges(), vec![(5, 30)]);
    }

    #[test]
    fn advance_by_tracks_line_number() {
        let mut f = FileInput::new("foo\nbar\nbaz\n");
        f.advance_by(8); // consumes "foo\nbar\n"
        assert_eq!(f.line_no, 3);
        assert_eq!(f.range.start, 8);
    }

    #[test]
    fn advance_to_last_hole_collapses_to_contiguous_tail() {
        let mut f = FileInput::new("aaaabbbbcccc");
        f.range.add_hole(4, 8);
        f.advance_to_last_hole();
        assert!(!f.range.is_discontiguous());
        assert_eq!(f.range.start, 8);
    }

    #[test]
    fn is_end_of_file_true_for_trailing_whitespace_only() {
        let mut f = FileInput::new("hello\n\n  ");
        f.advance_by(5);
        assert!(!f.is_end_of_file());
        f.advance_by(1);
        assert!(f.is_end_of_file());
    }
}
