mod clause;
mod terms;

pub use clause::{
    Clause, Filter, FreeText, Span, classify, classify_str, quote_value, unquote_value,
};
pub use terms::{
    TERM_REGEX, Term, Tokenized, clamp_cursor, is_blank_gap, last_term_index, query_terms,
    tokenize,
};

/// Resolves the clause the cursor is editing.
///
/// Returns `None` when there is nothing to complete: an empty query, a cursor sitting
/// in a whitespace gap, or a query that is only the default sentinel term.
#[must_use]
pub fn active_clause(query: &str, cursor: usize, default_query: Option<&str>) -> Option<Clause> {
    let cursor = clamp_cursor(query, cursor);
    let tokenized = tokenize(query, cursor);

    if tokenized.terms.is_empty() || is_blank_gap(query, cursor) {
        return None;
    }

    if let [only] = tokenized.terms.as_slice()
        && default_query.is_some_and(|default| !default.is_empty() && only.text == default)
    {
        return None;
    }

    let term = tokenized.active()?;
    if !term.touches(cursor) {
        return None;
    }

    Some(classify(term))
}
