use crate::registry::Operator;

use super::terms::Term;

const NEGATION: char = '!';

/// Operator tokens in match priority; `!` first, then two-char tokens before their prefixes.
const OPERATOR_TOKENS: &[(&str, Operator)] = &[
    ("!", Operator::NotEqual),
    (">=", Operator::GreaterThanEqual),
    ("<=", Operator::LessThanEqual),
    (">", Operator::GreaterThan),
    ("<", Operator::LessThan),
    ("=", Operator::Equal),
];

/// Byte range into the query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive on both edges, so an empty span still contains its position.
    #[must_use]
    pub fn contains(&self, cursor: usize) -> bool {
        self.start <= cursor && cursor <= self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreeText {
    pub term: Term,
    pub negated: bool,
    /// Text after the negation marker
    pub text: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub term: Term,
    pub negated: bool,
    pub key: Span,
    pub operator: Operator,
    /// Empty for the default `:` operator
    pub operator_span: Span,
    pub value: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Clause {
    FreeText(FreeText),
    Filter(Filter),
}

fn slice(term: &Term, span: Span) -> &str {
    &term.text[span.start - term.start..span.end - term.start]
}

impl FreeText {
    #[must_use]
    pub fn text(&self) -> &str {
        slice(&self.term, self.text)
    }
}

impl Filter {
    #[must_use]
    pub fn key_text(&self) -> &str {
        slice(&self.term, self.key)
    }

    #[must_use]
    pub fn value_text(&self) -> &str {
        slice(&self.term, self.value)
    }

    /// Offset of the separating colon.
    #[must_use]
    pub fn colon(&self) -> usize {
        self.key.end
    }
}

impl Clause {
    #[must_use]
    pub fn term(&self) -> &Term {
        match self {
            Self::FreeText(free) => &free.term,
            Self::Filter(filter) => &filter.term,
        }
    }

    #[must_use]
    pub fn is_negated(&self) -> bool {
        match self {
            Self::FreeText(free) => free.negated,
            Self::Filter(filter) => filter.negated,
        }
    }

    /// Rebuilds the term text from its parts.
    #[must_use]
    pub fn reconstruct(&self) -> String {
        let negation = if self.is_negated() { "!" } else { "" };
        match self {
            Self::FreeText(free) => format!("{negation}{}", free.text()),
            Self::Filter(filter) => format!(
                "{negation}{}:{}{}",
                filter.key_text(),
                filter.operator.token(),
                filter.value_text()
            ),
        }
    }
}

/// Byte index of the first `:` outside quotes and not escaped.
fn find_separator(text: &str) -> Option<usize> {
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            ':' if !in_quote => return Some(i),
            _ => {}
        }
    }

    None
}

#[must_use]
pub fn classify(term: &Term) -> Clause {
    let (negated, body_offset) = if term.text.starts_with(NEGATION) {
        (true, NEGATION.len_utf8())
    } else {
        (false, 0)
    };
    let body = &term.text[body_offset..];
    let body_start = term.start + body_offset;

    let Some(colon) = find_separator(body).filter(|&i| i > 0) else {
        return Clause::FreeText(FreeText {
            term: term.clone(),
            negated,
            text: Span::new(body_start, term.end),
        });
    };

    let rest = &body[colon + 1..];
    let rest_start = body_start + colon + 1;
    let (operator, token_len) = OPERATOR_TOKENS
        .iter()
        .find(|(token, _)| rest.starts_with(token))
        .map_or((Operator::Default, 0), |(token, op)| (*op, token.len()));

    Clause::Filter(Filter {
        term: term.clone(),
        negated,
        key: Span::new(body_start, body_start + colon),
        operator,
        operator_span: Span::new(rest_start, rest_start + token_len),
        value: Span::new(rest_start + token_len, term.end),
    })
}

/// Classifies a standalone string as if it were a term at offset 0.
#[must_use]
pub fn classify_str(text: &str) -> Clause {
    classify(&Term {
        text: text.to_string(),
        start: 0,
        end: text.len(),
    })
}

/// Removes quoting from a value typed by the user, for use as a lookup prefix.
#[must_use]
pub fn unquote_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                out.push('"');
                chars.next();
            }
            '"' => {}
            _ => out.push(c),
        }
    }

    out.trim().to_string()
}

/// Quotes a value for `tag` so it stays a single term. Whitespace or `"`
/// forces quoting, as does `:` in a `user` value (`user:"id:1"`). Inner
/// quotes are backslash-escaped.
#[must_use]
pub fn quote_value(tag: &str, value: &str) -> String {
    let user_colon = tag == "user" && value.contains(':');
    if user_colon || value.contains(char::is_whitespace) || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
