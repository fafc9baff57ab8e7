//! Backward token pattern matching.
//!
//! Attachment rules describe the modifiers that may sit between a doc
//! comment and the construct it documents (`public`, `static`, whitespace,
//! ...). Those modifiers are expressed as a small [`Pattern`] tree and
//! matched *backwards* from the construct's keyword.
//!
//! Positions are exclusive upper bounds: matching at `position` first looks
//! at the token at `position - 1`. A successful match returns the index of
//! the earliest consumed token as the new position. Failed matches never
//! consume anything, and probes before the start of the stream fail closed.

use crate::lexer::{TokenKind, TokenStream};

/// A backward-matching pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Exactly one token of this kind.
    Literal(TokenKind),
    /// All children, consecutively. The last child is matched first.
    Sequence(Vec<Pattern>),
    /// The inner pattern, or nothing.
    Optional(Box<Pattern>),
    /// Exactly one token whose kind is any of these.
    Alternation(Vec<TokenKind>),
}

impl Pattern {
    pub fn literal(kind: TokenKind) -> Self {
        Pattern::Literal(kind)
    }

    pub fn sequence(children: impl IntoIterator<Item = Pattern>) -> Self {
        Pattern::Sequence(children.into_iter().collect())
    }

    pub fn optional(inner: Pattern) -> Self {
        Pattern::Optional(Box::new(inner))
    }

    pub fn any_of(kinds: impl IntoIterator<Item = TokenKind>) -> Self {
        Pattern::Alternation(kinds.into_iter().collect())
    }

    /// Greatest number of tokens this pattern can consume.
    pub fn max_width(&self) -> usize {
        match self {
            Pattern::Literal(_) | Pattern::Alternation(_) => 1,
            Pattern::Sequence(children) => children.iter().map(Pattern::max_width).sum(),
            Pattern::Optional(inner) => inner.max_width(),
        }
    }
}

/// Outcome of a backward match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub matched: bool,
    /// Position after matching; unchanged when `matched` is false.
    pub position: usize,
}

impl Match {
    fn hit(position: usize) -> Self {
        Self {
            matched: true,
            position,
        }
    }

    fn miss(position: usize) -> Self {
        Self {
            matched: false,
            position,
        }
    }
}

/// Match `pattern` backwards from `position`.
pub fn match_backward(pattern: &Pattern, stream: &TokenStream, position: usize) -> Match {
    match pattern {
        Pattern::Literal(kind) => match preceding_kind(stream, position) {
            Some(k) if k == *kind => Match::hit(position - 1),
            _ => Match::miss(position),
        },
        Pattern::Alternation(kinds) => match preceding_kind(stream, position) {
            Some(k) if kinds.contains(&k) => Match::hit(position - 1),
            _ => Match::miss(position),
        },
        Pattern::Sequence(children) => {
            let mut cursor = position;
            for child in children.iter().rev() {
                let m = match_backward(child, stream, cursor);
                if !m.matched {
                    return Match::miss(position);
                }
                cursor = m.position;
            }
            Match::hit(cursor)
        }
        Pattern::Optional(inner) => {
            let m = match_backward(inner, stream, position);
            if m.matched {
                m
            } else {
                Match::hit(position)
            }
        }
    }
}

/// Step back over a run of whitespace tokens ending at `position`.
pub fn skip_whitespace_backward(stream: &TokenStream, position: usize) -> usize {
    let mut cursor = position;
    while preceding_kind(stream, cursor).map_or(false, |k| k.is_whitespace()) {
        cursor -= 1;
    }
    cursor
}

/// Index of the first non-whitespace token after `index`, if any.
pub fn skip_whitespace_forward(stream: &TokenStream, index: usize) -> Option<usize> {
    (index + 1..stream.len()).find(|&i| stream.kind_at(i).map_or(false, |k| !k.is_whitespace()))
}

/// Kind of the token just before `position`; `None` at the stream start or
/// past its end.
fn preceding_kind(stream: &TokenStream, position: usize) -> Option<TokenKind> {
    position.checked_sub(1).and_then(|i| stream.kind_at(i))
}
