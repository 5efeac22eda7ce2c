//! Ignore rule evaluation
//!
//! Rules use Go's `filepath.Match` shell syntax: `*` and `?` never cross
//! `/`, `[...]` is a class negated by `[^...]`, and `\` escapes the next
//! character. A rule is matched against the *whole*
//! project-relative path, so `*.log` only matches top-level files and
//! `build` matches the `build` entry itself. Descendants of an ignored
//! directory are excluded by the walker pruning the directory, not by the
//! pattern.
//!
//! Rules are rewritten into `glob` crate syntax once, when the matcher is
//! built.

use std::iter::Peekable;
use std::str::Chars;

use glob::{MatchOptions, Pattern};
use tracing::{trace, warn};

use codesync_core::domain::rules::IgnoreRule;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A range `glob` can never satisfy
const EMPTY_RANGE: &str = "b-a";

/// Characters `glob` reads specially inside a class, with their neighbours
const CLASS_SPECIALS: [(char, char, char); 2] = [('!', ' ', '"'), (']', '\\', '^')];

/// A rule after normalization; `None` when the glob did not compile
#[derive(Debug, Clone)]
struct CompiledRule {
    source: String,
    pattern: Option<Pattern>,
}

/// Decides whether a relative path is excluded from a walk
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    rules: Vec<CompiledRule>,
}

impl PathMatcher {
    /// Compiles the given rules
    ///
    /// A malformed pattern is logged and kept as a rule that never matches.
    pub fn new<'a>(rules: impl IntoIterator<Item = &'a IgnoreRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let compiled = translate(&rule.normalized())
                    .and_then(|glob| Pattern::new(&glob).map_err(|err| err.to_string()));
                let pattern = match compiled {
                    Ok(pattern) => Some(pattern),
                    Err(err) => {
                        warn!(
                            pattern = %rule.as_str(),
                            error = %err,
                            "Malformed ignore pattern, treating as non-matching"
                        );
                        None
                    }
                };
                CompiledRule {
                    source: rule.as_str().to_string(),
                    pattern,
                }
            })
            .collect();

        Self { rules }
    }

    /// True if the first rule that matches `relative_path` exists
    ///
    /// `is_directory` does not change the outcome; it tells the caller to
    /// prune rather than skip and is kept for tracing.
    ///
    /// A malformed rule is skipped and the rules after it are still tried.
    /// This differs from evaluating the rules with `filepath.Match` in order,
    /// which stops at the first malformed rule and reports the path as not
    /// ignored.
    pub fn is_ignored(&self, relative_path: &str, is_directory: bool) -> bool {
        let hit = self.rules.iter().find(|rule| {
            rule.pattern
                .as_ref()
                .is_some_and(|p| p.matches_with(relative_path, MATCH_OPTIONS))
        });

        if let Some(rule) = hit {
            trace!(path = relative_path, is_directory, rule = %rule.source, "Ignored");
            return true;
        }
        false
    }
}

// ============================================================================
// Shell pattern translation
// ============================================================================

/// Rewrites a `filepath.Match` pattern into an equivalent `glob` pattern
fn translate(pattern: &str) -> Result<String, String> {
    let mut chars = pattern.chars().peekable();
    let mut out = String::with_capacity(pattern.len());

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.next_if_eq(&'*').is_some() {}
                out.push('*');
            }
            '?' => out.push('?'),
            '[' => out.push_str(&translate_class(&mut chars)?),
            '\\' => {
                let escaped = chars.next().ok_or("trailing escape")?;
                push_literal(&mut out, escaped);
            }
            c => push_literal(&mut out, c),
        }
    }

    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if matches!(c, '*' | '?' | '[' | ']') {
        out.push('[');
        out.push(c);
        out.push(']');
    } else {
        out.push(c);
    }
}

/// Translates a class body; the opening `[` is already consumed
fn translate_class(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    let negated = chars.next_if_eq(&'^').is_some();
    let mut ranges = Vec::new();

    loop {
        if !ranges.is_empty() && chars.next_if_eq(&']').is_some() {
            break;
        }
        let lo = class_char(chars)?;
        let hi = match chars.next_if_eq(&'-') {
            Some(_) => class_char(chars)?,
            None => lo,
        };
        ranges.push((lo, hi));
    }

    Ok(render_class(negated, &ranges))
}

fn class_char(chars: &mut Peekable<Chars<'_>>) -> Result<char, String> {
    match chars.next() {
        None => Err("unclosed character class".into()),
        Some(c @ ('-' | ']')) => Err(format!("unescaped '{c}' in character class")),
        Some('\\') => chars.next().ok_or_else(|| "unclosed character class".into()),
        Some(c) => Ok(c),
    }
}

/// Renders ranges as a `glob` class
///
/// Every range is written as `lo-hi`. `!` and `]` are split out of the
/// ranges and placed where `glob` reads them literally: `]` first, `!` last.
fn render_class(negated: bool, ranges: &[(char, char)]) -> String {
    let mut pieces = Vec::new();
    let mut has_bang = false;
    let mut has_bracket = false;

    for &(lo, hi) in ranges {
        if lo > hi {
            pieces.push(('b', 'a'));
            continue;
        }
        let mut split = vec![(lo, hi)];
        for (special, before, after) in CLASS_SPECIALS {
            let mut next = Vec::with_capacity(split.len() + 1);
            for (lo, hi) in split {
                if lo <= special && special <= hi {
                    match special {
                        '!' => has_bang = true,
                        _ => has_bracket = true,
                    }
                    if lo < special {
                        next.push((lo, before));
                    }
                    if special < hi {
                        next.push((after, hi));
                    }
                } else {
                    next.push((lo, hi));
                }
            }
            split = next;
        }
        pieces.extend(split);
    }

    let mut out = String::from("[");
    if negated {
        out.push('!');
    }
    if has_bracket {
        out.push(']');
        out.push_str(EMPTY_RANGE);
    } else if !negated && pieces.is_empty() {
        out.push_str(EMPTY_RANGE);
    }
    for (lo, hi) in pieces {
        out.push(lo);
        out.push('-');
        out.push(hi);
    }
    if has_bang {
        out.push('!');
    }
    out.push(']');
    out
}
