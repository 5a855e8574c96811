//! The whitespace-insensitive literal matcher: a fast path used when a
//! directive's micro-ops are exclusively literal text and bound-variable
//! substitutions, so no regex compilation is needed at all.
//!
//! Grounded in `examples/original_source/filecheck/regex.py`'s
//! `LiteralMatcher`/`LiteralMatch`.

/// A match produced by `LiteralMatcher`. Mirrors the subset of
/// `crate::cursor::MatchResult` that a literal match can produce: there are
/// no capture groups beyond the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralMatch {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    pattern: String,
    strict_whitespace: bool,
    match_on_next_line: bool,
}

impl LiteralMatcher {
    pub fn new(pattern: String, strict_whitespace: bool, match_on_next_line: bool) -> Self {
        LiteralMatcher {
            pattern,
            strict_whitespace,
            match_on_next_line,
        }
    }

    /// Unanchored search for the pattern in `text[pos..endpos)`.
    pub fn search(&self, text: &str, pos: usize, endpos: usize) -> Option<LiteralMatch> {
        if let Some(rel) = find_in(text, &self.pattern, pos, endpos) {
            return Some(LiteralMatch {
                start: rel,
                end: rel + self.pattern.len(),
            });
        }
        if self.strict_whitespace {
            return None;
        }

        let parts = split_whitespace_runs(&self.pattern);
        let first = parts.first()?;
        let mut scan_from = pos;
        loop {
            let candidate = find_in(text, first, scan_from, endpos)?;
            let mut match_pos = candidate + first.len();
            let mut matched_all = true;
            for part in &parts[1..] {
                match_pos = match skip_whitespace_run(text, match_pos, endpos) {
                    Some(p) => p,
                    None => {
                        matched_all = false;
                        break;
                    }
                };
                if starts_with_at(text, match_pos, endpos, part) {
                    match_pos += part.len();
                } else {
                    matched_all = false;
                    break;
                }
            }
            if matched_all {
                return Some(LiteralMatch {
                    start: candidate,
                    end: match_pos,
                });
            }
            scan_from = candidate + 1;
            if scan_from >= endpos {
                return None;
            }
        }
    }

    /// Anchored match at `pos`, bounded by `endpos`.
    pub fn match_at(&self, text: &str, pos: usize, endpos: usize) -> Option<LiteralMatch> {
        if self.match_on_next_line {
            let mut pos = pos;
            if pos < text.len() && text[pos..].starts_with('\n') {
                pos += 1;
            }
            let bound = endpos.min(text.len());
            let new_end = if pos <= bound {
                text[pos..bound].find('\n').map(|i| pos + i).unwrap_or(endpos)
            } else {
                endpos
            };
            return self.search(text, pos, new_end);
        }

        if starts_with_at(text, pos, endpos, &self.pattern) {
            return Some(LiteralMatch {
                start: pos,
                end: pos + self.pattern.len(),
            });
        }
        if self.strict_whitespace {
            return None;
        }

        let parts = split_whitespace_runs(&self.pattern);
        if parts.is_empty() {
            return None;
        }
        let mut match_pos = pos;
        for part in &parts[..parts.len() - 1] {
            if !starts_with_at(text, match_pos, endpos, part) {
                return None;
            }
            match_pos += part.len();
            match_pos = skip_whitespace_run(text, match_pos, endpos)?;
        }
        let last = &parts[parts.len() - 1];
        if !starts_with_at(text, match_pos, endpos, last) {
            return None;
        }
        match_pos += last.len();
        Some(LiteralMatch {
            start: pos,
            end: match_pos,
        })
    }
}

fn find_in(text: &str, needle: &str, pos: usize, endpos: usize) -> Option<usize> {
    let end = endpos.min(text.len());
    if pos > end {
        return None;
    }
    text[pos..end].find(needle).map(|i| pos + i)
}

/// Whether `text[pos..endpos)` starts with `needle`, without panicking when
/// `pos`/`endpos` fall outside the string.
fn starts_with_at(text: &str, pos: usize, endpos: usize, needle: &str) -> bool {
    let end = endpos.min(text.len());
    if pos > end || pos + needle.len() > end {
        return false;
    }
    text[pos..end].starts_with(needle)
}

/// Consume a run of one-or-more whitespace characters starting at `pos`;
/// fails (returns `None`) if `pos` isn't at whitespace, matching the "any
/// positive run of whitespace is consumed between parts" rule.
fn skip_whitespace_run(text: &str, pos: usize, endpos: usize) -> Option<usize> {
    let end = endpos.min(text.len());
    let mut p = pos;
    let mut consumed = false;
    while p < end {
        let ch = text[p..].chars().next()?;
        if !ch.is_whitespace() {
            break;
        }
        p += ch.len_utf8();
        consumed = true;
    }
    if consumed { Some(p) } else { None }
}

fn split_whitespace_runs(pattern: &str) -> Vec<String> {
    pattern
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_whitespace_is_plain_substring_search() {
        let lm = LiteralMatcher::new("foo  bar".to_string(), true, false);
        assert!(lm.search("xx foo  bar yy", 0, 14).is_some());
        assert!(lm.search("xx foo bar yy", 0, 13).is_none());
    }

    #[test]
    fn whitespace_insensitive_collapses_runs() {
        let lm = LiteralMatcher::new("foo bar".to_string(), false, false);
        let m = lm.search("xx foo    bar yy", 0, 16).unwrap();
        assert_eq!(&"xx foo    bar yy"[m.start..m.end], "foo    bar");
    }

    #[test]
    fn anchored_match_requires_start_position() {
        let lm = LiteralMatcher::new("bar".to_string(), true, false);
        assert!(lm.match_at("foobar", 0, 6).is_none());
        assert!(lm.match_at("foobar", 3, 6).is_some());
    }

    #[test]
    fn next_line_flag_restricts_to_following_line() {
        let lm = LiteralMatcher::new("bar".to_string(), true, true);
        let text = "foo\nbar\nbaz";
        // positioned right after "foo", match_on_next_line consumes the \n
        // and restricts the search to the following line.
        let m = lm.match_at(text, 3, text.len()).unwrap();
        assert_eq!(&text[m.start..m.end], "bar");
    }

    #[test]
    fn next_line_flag_does_not_cross_into_second_following_line() {
        let lm = LiteralMatcher::new("baz".to_string(), true, true);
        let text = "foo\nbar\nbaz";
        assert!(lm.match_at(text, 3, text.len()).is_none());
    }
}
