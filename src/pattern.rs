use std::collections::HashSet;

/// The path separator. `*` and `?` never match it.
const SEPARATOR: char = '.';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wildcard {
    /// `#`: any run of characters, separators included.
    Hash,
    /// `*`: any run of non-separator characters.
    Star,
}

/// Splits the next segment off `pattern`: an optional wildcard, followed by
/// the literal chunk that runs up to the next wildcard.
///
/// A run of consecutive wildcards collapses into one; it behaves as `#` if
/// any of them is a `#`.
fn scan_chunk(pattern: &str) -> (Option<Wildcard>, &str, &str) {
    let mut wildcard = None;
    let mut pattern = pattern;

    while let Some(c) = pattern.chars().next() {
        match c {
            '#' => wildcard = Some(Wildcard::Hash),
            '*' if wildcard != Some(Wildcard::Hash) => wildcard = Some(Wildcard::Star),
            '*' => {}
            _ => break,
        }
        pattern = &pattern[1..];
    }

    let end = pattern.find(|c: char| c == '#' || c == '*').unwrap_or(pattern.len());
    (wildcard, &pattern[..end], &pattern[end..])
}

/// Tests whether `chunk` matches the beginning of `path`. On success, returns
/// the remainder of `path` after the matched prefix.
fn match_chunk<'a>(chunk: &str, path: &'a str) -> Option<&'a str> {
    let mut rest = path;

    for expected in chunk.chars() {
        let mut chars = rest.chars();
        let actual = chars.next()?;

        match expected {
            '?' if actual == SEPARATOR => return None,
            '?' => {}
            _ if expected != actual => return None,
            _ => {}
        }

        rest = chars.as_str();
    }

    Some(rest)
}

/// Determines whether `path` matches `pattern` in its entirety.
///
/// Pattern syntax:
///
/// ```text
/// pattern:
///     { term }
///
/// term:
///     '#'     matches any sequence of characters
///     '*'     matches any sequence of non-separator ('.') characters
///     '?'     matches any single non-separator ('.') character
///     c       matches character c
/// ```
///
/// Every string is a valid pattern; a pattern that cannot match simply
/// returns `false`.
///
/// ```
/// use jsoncheck::matches;
///
/// assert!(matches("array.#.field", "array.10.field"));
/// assert!(matches("array.#.field", "array.10.object.field"));
/// assert!(!matches("array.*.field", "array.10.object.field"));
/// assert!(matches("h#rld", "hello.world"));
/// ```
pub fn matches(pattern: &str, path: &str) -> bool {
    Matcher {
        pattern,
        path,
        failed: HashSet::new(),
    }
    .matches_at(0, 0)
}

/// Backtracking matcher over byte offsets into the pattern and path.
///
/// Offset pairs that failed once are remembered and never retried.
struct Matcher<'a> {
    pattern: &'a str,
    path: &'a str,
    failed: HashSet<(usize, usize)>,
}

impl<'a> Matcher<'a> {
    fn matches_at(&mut self, pattern_at: usize, path_at: usize) -> bool {
        if self.failed.contains(&(pattern_at, path_at)) {
            return false;
        }

        let matched = self.try_match(pattern_at, path_at);
        if !matched {
            self.failed.insert((pattern_at, path_at));
        }
        matched
    }

    fn try_match(&mut self, pattern_at: usize, path_at: usize) -> bool {
        let full_pattern: &'a str = self.pattern;
        let full_path: &'a str = self.path;
        let pattern = &full_pattern[pattern_at..];
        let path = &full_path[path_at..];

        if pattern.is_empty() {
            return path.is_empty();
        }

        let (wildcard, chunk, rest) = scan_chunk(pattern);
        let rest_at = full_pattern.len() - rest.len();

        let wildcard = match wildcard {
            Some(wildcard) => wildcard,
            None => {
                return match match_chunk(chunk, path) {
                    Some(tail) => self.matches_at(rest_at, full_path.len() - tail.len()),
                    None => false,
                }
            }
        };

        // A wildcard with no chunk after it is always the last term.
        if chunk.is_empty() {
            return match wildcard {
                Wildcard::Hash => true,
                Wildcard::Star => !path.contains(SEPARATOR),
            };
        }

        // Try the chunk at the earliest offset first, then backtrack one
        // character at a time.
        let mut offset = path_at;
        loop {
            let tail = &full_path[offset..];

            if let Some(remainder) = match_chunk(chunk, tail) {
                if self.matches_at(rest_at, full_path.len() - remainder.len()) {
                    return true;
                }
            }

            match tail.chars().next() {
                None => return false,
                Some(SEPARATOR) if wildcard == Wildcard::Star => return false,
                Some(c) => offset += c.len_utf8(),
            }
        }
    }
}
