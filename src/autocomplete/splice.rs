use crate::query::{Clause, Filter, FreeText, Span, clamp_cursor, quote_value};
use crate::registry::Operator;

use super::types::{CandidateItem, ItemKind};

/// Result of accepting a candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Splice {
    pub query: String,
    /// Byte offset just past the inserted text
    pub cursor: usize,
    /// The search should run right away
    pub submit: bool,
}

impl Splice {
    fn unchanged(query: &str, cursor: usize) -> Self {
        Self {
            query: query.to_string(),
            cursor,
            submit: false,
        }
    }
}

/// Writes `item` into `query` for the clause under the cursor.
///
/// `clause` must come from the same `query` and `cursor`. With no clause the
/// item is inserted at the cursor.
#[must_use]
pub fn apply_candidate(
    query: &str,
    cursor: usize,
    clause: Option<&Clause>,
    item: &CandidateItem,
) -> Splice {
    let cursor = clamp_cursor(query, cursor);

    if item.kind == ItemKind::RecentSearch {
        return Splice {
            query: item.value.clone(),
            cursor: item.value.len(),
            submit: true,
        };
    }

    let text = match (item.kind, clause) {
        (ItemKind::TagValue, Some(Clause::Filter(filter))) => {
            quote_value(filter.key_text(), &item.value)
        }
        (ItemKind::TagValue, _) => quote_value("", &item.value),
        _ => item.value.clone(),
    };

    match clause {
        None => {
            let mut replacement = with_trailing_space(query, cursor, &text);
            // keep a term touching the cursor separate from the new one
            if query[..cursor].ends_with(|c: char| !c.is_whitespace()) {
                replacement.insert(0, ' ');
            }
            replace(query, Span::new(cursor, cursor), &replacement)
        }
        Some(Clause::FreeText(free)) => splice_free_text(query, free, &text),
        Some(Clause::Filter(filter)) => splice_filter(query, cursor, filter, item, &text),
    }
}

fn splice_free_text(query: &str, free: &FreeText, text: &str) -> Splice {
    let span = Span::new(free.text.start, free.term.end);
    let replacement = with_trailing_space(query, span.end, text);
    replace(query, span, &replacement)
}

fn splice_filter(
    query: &str,
    cursor: usize,
    filter: &Filter,
    item: &CandidateItem,
    text: &str,
) -> Splice {
    if item.kind == ItemKind::TagOperator {
        let replacement = if text == Operator::NotEqual.spelling() {
            format!("!{}:", filter.key_text())
        } else {
            format!("{}{text}", filter.key_text())
        };
        return replace(
            query,
            Span::new(filter.term.start, filter.value.start),
            &replacement,
        );
    }

    if filter.value.contains(cursor) {
        let replacement = with_trailing_space(query, filter.value.end, text);
        return replace(query, filter.value, &replacement);
    }

    if filter.key.contains(cursor) {
        // the candidate carries its own colon
        return replace(
            query,
            Span::new(filter.key.start, filter.colon() + 1),
            text,
        );
    }

    Splice::unchanged(query, cursor)
}

/// Appends a space so the next term starts cleanly, unless the text is a
/// partial key or whitespace already follows.
fn with_trailing_space(query: &str, at: usize, text: &str) -> String {
    let followed_by_space = query[at..].starts_with(char::is_whitespace);
    if text.ends_with(':') || followed_by_space {
        text.to_string()
    } else {
        format!("{text} ")
    }
}

fn replace(query: &str, span: Span, replacement: &str) -> Splice {
    let mut new_query = String::with_capacity(query.len() - span.len() + replacement.len());
    new_query.push_str(&query[..span.start]);
    new_query.push_str(replacement);
    let mut cursor = new_query.len();
    new_query.push_str(&query[span.end..]);

    // step over a space that was already there
    if !replacement.ends_with(char::is_whitespace)
        && !replacement.ends_with(':')
        && new_query[cursor..].starts_with(' ')
    {
        cursor += 1;
    }

    Splice {
        query: new_query,
        cursor,
        submit: false,
    }
}
