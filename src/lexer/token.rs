//! Token model and the immutable token stream.

use serde::{Deserialize, Serialize};

/// Member visibility keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        }
    }
}

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// `/** ... */`
    DocComment,
    /// `// ...`, `# ...` and `/* ... */`
    Comment,
    Whitespace,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Semicolon,
    ClassKeyword,
    InterfaceKeyword,
    FunctionKeyword,
    ConstKeyword,
    AbstractKeyword,
    StaticKeyword,
    VisibilityKeyword(Visibility),
    /// `$name`
    VariableName,
    Identifier,
    StringLiteral,
    Number,
    /// Text outside of `<?php ... ?>`.
    InlineProlog,
    OpenTag,
    CloseTag,
    /// Operators and any other punctuation.
    Symbol,
}

impl TokenKind {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }

    pub fn is_doc_comment(&self) -> bool {
        matches!(self, TokenKind::DocComment)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::DocComment => write!(f, "doc comment"),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::Whitespace => write!(f, "whitespace"),
            TokenKind::OpenBrace => write!(f, "`{{`"),
            TokenKind::CloseBrace => write!(f, "`}}`"),
            TokenKind::OpenParen => write!(f, "`(`"),
            TokenKind::CloseParen => write!(f, "`)`"),
            TokenKind::Semicolon => write!(f, "`;`"),
            TokenKind::ClassKeyword => write!(f, "`class`"),
            TokenKind::InterfaceKeyword => write!(f, "`interface`"),
            TokenKind::FunctionKeyword => write!(f, "`function`"),
            TokenKind::ConstKeyword => write!(f, "`const`"),
            TokenKind::AbstractKeyword => write!(f, "`abstract`"),
            TokenKind::StaticKeyword => write!(f, "`static`"),
            TokenKind::VisibilityKeyword(v) => write!(f, "`{}`", v.as_str()),
            TokenKind::VariableName => write!(f, "variable"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::StringLiteral => write!(f, "string"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::InlineProlog => write!(f, "inline text"),
            TokenKind::OpenTag => write!(f, "open tag"),
            TokenKind::CloseTag => write!(f, "close tag"),
            TokenKind::Symbol => write!(f, "symbol"),
        }
    }
}

/// A single lexical unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line the token starts on.
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

/// Ordered, read-only token sequence for one source file.
///
/// All access is bounds-checked; probing outside the stream yields `None`
/// rather than panicking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Token at `index`, if any.
    pub fn at(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Kind of the token at `index`, if any.
    pub fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_access_is_none() {
        let stream = TokenStream::new(vec![Token::new(TokenKind::Whitespace, " ", 1)]);
        assert_eq!(stream.len(), 1);
        assert!(stream.at(0).is_some());
        assert!(stream.at(1).is_none());
        assert_eq!(stream.kind_at(7), None);
    }

    #[test]
    fn test_empty_stream() {
        let stream = TokenStream::default();
        assert!(stream.is_empty());
        assert!(stream.at(0).is_none());
    }
}
