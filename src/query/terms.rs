use std::sync::LazyLock;

use regex::Regex;

/// Matches one term: a `key:"quoted value"` (quotes may be unclosed while typing,
/// `\"` stays inside the quotes) or a plain run of non-whitespace.
pub static TERM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\S*?:"(?:[^"\\]|\\.)*"?\S*|\S+"#).unwrap());

/// A single term carved from the query, with byte offsets into the query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Term {
    /// True when `cursor` is inside the term or touching either edge.
    #[must_use]
    pub fn touches(&self, cursor: usize) -> bool {
        self.start <= cursor && cursor <= self.end
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub terms: Vec<Term>,
    pub last_term_boundary: usize,
}

impl Tokenized {
    /// The term under or directly before the cursor.
    #[must_use]
    pub fn active(&self) -> Option<&Term> {
        self.terms.last()
    }
}

/// Clamps `cursor` to the query and moves it back onto a char boundary.
#[must_use]
pub fn clamp_cursor(query: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(query.len());
    while !query.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Splits `query[..boundary]` into terms, left to right.
#[must_use]
pub fn query_terms(query: &str, boundary: usize) -> Vec<Term> {
    let boundary = clamp_cursor(query, boundary);
    TERM_REGEX
        .find_iter(&query[..boundary])
        .map(|m| Term {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Right edge of the term under or before the cursor.
///
/// Scans forward to the next whitespace, except that a cursor strictly inside a
/// quoted term resolves to the end of that term so the quoted span is never cut.
#[must_use]
pub fn last_term_index(query: &str, cursor: usize) -> usize {
    let cursor = clamp_cursor(query, cursor);

    if let Some(term) = TERM_REGEX
        .find_iter(query)
        .find(|m| m.start() < cursor && cursor < m.end())
        && term.as_str().contains('"')
    {
        return term.end();
    }

    query[cursor..]
        .find(char::is_whitespace)
        .map_or(query.len(), |offset| cursor + offset)
}

/// True when the characters adjacent to the cursor are all whitespace.
#[must_use]
pub fn is_blank_gap(query: &str, cursor: usize) -> bool {
    let cursor = clamp_cursor(query, cursor);
    let before = query[..cursor].chars().next_back();
    let after = query[cursor..].chars().next();

    match (before, after) {
        (None, None) => false,
        (Some(b), Some(a)) => b.is_whitespace() && a.is_whitespace(),
        (Some(c), None) | (None, Some(c)) => c.is_whitespace(),
    }
}

#[must_use]
pub fn tokenize(query: &str, cursor: usize) -> Tokenized {
    let last_term_boundary = last_term_index(query, cursor);
    Tokenized {
        terms: query_terms(query, last_term_boundary),
        last_term_boundary,
    }
}
