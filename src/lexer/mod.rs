//! PHP lexer.
//!
//! Turns raw PHP source into a [`TokenStream`]. The lexer is deliberately
//! shallow: it only distinguishes what the doc-comment checks need (doc
//! comments, whitespace, braces, declaration keywords, variables) and treats
//! strings, heredocs and comments as opaque single tokens. Every byte of the
//! input ends up in exactly one token, and lexing never fails.

mod token;

pub use token::{Token, TokenKind, TokenStream, Visibility};

use phf::phf_map;

/// Keywords the checker cares about. Lookup is on the lowercased word.
static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "class" => TokenKind::ClassKeyword,
    "interface" => TokenKind::InterfaceKeyword,
    "function" => TokenKind::FunctionKeyword,
    "const" => TokenKind::ConstKeyword,
    "abstract" => TokenKind::AbstractKeyword,
    "static" => TokenKind::StaticKeyword,
    "public" => TokenKind::VisibilityKeyword(Visibility::Public),
    "private" => TokenKind::VisibilityKeyword(Visibility::Private),
    "protected" => TokenKind::VisibilityKeyword(Visibility::Protected),
};

/// Member access operators; a word right after one of these is never a keyword.
const MEMBER_ACCESS: &[&str] = &["->", "?->", "::"];

/// Lexer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Outside `<?php ... ?>`.
    Inline,
    /// Inside PHP code.
    Script,
}

/// Tokenize PHP source with default settings.
pub fn tokenize(source: &str) -> TokenStream {
    Lexer::new(source).tokenize()
}

/// Two-mode PHP lexer.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    line: u32,
    mode: Mode,
    short_tags: bool,
    tokens: Vec<Token>,
    /// Index of the last token that is not whitespace or a comment.
    last_significant: Option<usize>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            mode: Mode::Inline,
            short_tags: false,
            tokens: Vec::new(),
            last_significant: None,
        }
    }

    /// Recognise bare `<?` as an open tag (PHP's `short_open_tag`).
    pub fn short_tags(mut self, enabled: bool) -> Self {
        self.short_tags = enabled;
        self
    }

    /// Consume the whole input.
    pub fn tokenize(mut self) -> TokenStream {
        while self.pos < self.bytes.len() {
            let before = self.pos;
            match self.mode {
                Mode::Inline => self.lex_inline(),
                Mode::Script => self.lex_script(),
            }
            debug_assert!(self.pos > before, "lexer made no progress");
        }
        TokenStream::new(self.tokens)
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    /// Move the cursor to `end`, keeping the line counter in sync.
    fn advance_to(&mut self, end: usize) {
        let end = end.min(self.bytes.len());
        let newlines = self.bytes[self.pos..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line += newlines as u32;
        self.pos = end;
    }

    /// Emit a token spanning `start..end` and move past it.
    fn emit(&mut self, kind: TokenKind, end: usize) {
        let start = self.pos;
        let line = self.line;
        self.advance_to(end);
        let text = &self.source[start..self.pos];
        if !matches!(
            kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        ) {
            self.last_significant = Some(self.tokens.len());
        }
        self.tokens.push(Token::new(kind, text, line));
    }

    // ---------------------------------------------------------------------
    // Inline mode
    // ---------------------------------------------------------------------

    fn lex_inline(&mut self) {
        match self.find_open_tag(self.pos) {
            Some((start, len)) if start == self.pos => self.lex_open_tag(len),
            Some((start, _)) => self.emit(TokenKind::InlineProlog, start),
            None => self.emit(TokenKind::InlineProlog, self.bytes.len()),
        }
    }

    /// Locate the next open tag at or after `from`, returning its offset and
    /// the length of the tag itself.
    fn find_open_tag(&self, from: usize) -> Option<(usize, usize)> {
        let bytes = self.bytes;
        let mut i = from;
        while i + 1 < bytes.len() {
            if bytes[i] == b'<' && bytes[i + 1] == b'?' {
                let rest = &bytes[i + 2..];
                if rest.len() >= 3 && rest[..3].eq_ignore_ascii_case(b"php") {
                    let after = rest.get(3).copied();
                    if after.map_or(true, is_whitespace) {
                        return Some((i, 5));
                    }
                }
                if rest.first() == Some(&b'=') {
                    return Some((i, 3));
                }
                if self.short_tags {
                    return Some((i, 2));
                }
            }
            i += 1;
        }
        None
    }

    fn lex_open_tag(&mut self, len: usize) {
        let mut end = self.pos + len;
        // `<?php` and `<?` swallow a single trailing whitespace character.
        if len != 3 {
            if self.bytes[end..].starts_with(b"\r\n") {
                end += 2;
            } else if self.bytes.get(end).copied().map_or(false, is_whitespace) {
                end += 1;
            }
        }
        self.emit(TokenKind::OpenTag, end);
        self.mode = Mode::Script;
    }

    // ---------------------------------------------------------------------
    // Script mode
    // ---------------------------------------------------------------------

    fn lex_script(&mut self) {
        let b = self.bytes[self.pos];
        match b {
            _ if is_whitespace(b) => {
                let end = self.scan_while(self.pos, is_whitespace);
                self.emit(TokenKind::Whitespace, end);
            }
            b'?' if self.starts_with("?>") => self.lex_close_tag(),
            b'?' if self.starts_with("?->") => self.emit(TokenKind::Symbol, self.pos + 3),
            b'#' if self.peek(1) == Some(b'[') => self.emit(TokenKind::Symbol, self.pos + 2),
            b'#' => self.lex_line_comment(),
            b'/' if self.peek(1) == Some(b'/') => self.lex_line_comment(),
            b'/' if self.peek(1) == Some(b'*') => self.lex_block_comment(),
            b'$' if self.peek(1).map_or(false, is_ident_start) => {
                let end = self.scan_while(self.pos + 1, is_ident_char);
                self.emit(TokenKind::VariableName, end);
            }
            b'\'' | b'"' | b'`' => self.lex_quoted(b),
            b'<' if self.starts_with("<<<") => self.lex_heredoc(),
            b'0'..=b'9' => self.lex_number(),
            b'.' if self.peek(1).map_or(false, |c| c.is_ascii_digit()) => self.lex_number(),
            _ if is_ident_start(b) => self.lex_word(),
            b'{' => self.emit(TokenKind::OpenBrace, self.pos + 1),
            b'}' => self.emit(TokenKind::CloseBrace, self.pos + 1),
            b'(' => self.emit(TokenKind::OpenParen, self.pos + 1),
            b')' => self.emit(TokenKind::CloseParen, self.pos + 1),
            b';' => self.emit(TokenKind::Semicolon, self.pos + 1),
            b'-' if self.peek(1) == Some(b'>') => self.emit(TokenKind::Symbol, self.pos + 2),
            b':' if self.peek(1) == Some(b':') => self.emit(TokenKind::Symbol, self.pos + 2),
            _ => {
                let width = self.source[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.emit(TokenKind::Symbol, self.pos + width);
            }
        }
    }

    fn scan_while(&self, from: usize, pred: fn(u8) -> bool) -> usize {
        let mut end = from;
        while end < self.bytes.len() && pred(self.bytes[end]) {
            end += 1;
        }
        end
    }

    fn lex_close_tag(&mut self) {
        let mut end = self.pos + 2;
        if self.bytes[end..].starts_with(b"\r\n") {
            end += 2;
        } else if self.bytes.get(end) == Some(&b'\n') {
            end += 1;
        }
        self.emit(TokenKind::CloseTag, end);
        self.mode = Mode::Inline;
    }

    /// `//` and `#` comments run to the end of the line (newline included)
    /// but stop in front of a `?>`.
    fn lex_line_comment(&mut self) {
        let bytes = self.bytes;
        let mut end = self.pos;
        while end < bytes.len() {
            if bytes[end] == b'\n' {
                end += 1;
                break;
            }
            if bytes[end] == b'?' && bytes.get(end + 1) == Some(&b'>') {
                break;
            }
            end += 1;
        }
        self.emit(TokenKind::Comment, end);
    }

    fn lex_block_comment(&mut self) {
        let is_doc = self.starts_with("/**") && self.peek(3).map_or(false, is_whitespace);
        let body = self.pos + 2;
        let end = find(self.bytes, body, b"*/").map_or(self.bytes.len(), |i| i + 2);
        let kind = if is_doc {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.emit(kind, end);
    }

    fn lex_quoted(&mut self, quote: u8) {
        let bytes = self.bytes;
        let mut end = self.pos + 1;
        while end < bytes.len() {
            match bytes[end] {
                b'\\' => end += 2,
                c if c == quote => {
                    end += 1;
                    break;
                }
                _ => end += 1,
            }
        }
        self.emit(TokenKind::StringLiteral, end);
    }

    /// Heredoc and nowdoc. Falls back to a plain symbol when `<<<` is not
    /// followed by a valid label line.
    fn lex_heredoc(&mut self) {
        let Some((label, body_start)) = self.heredoc_label() else {
            self.emit(TokenKind::Symbol, self.pos + 1);
            return;
        };
        let end = self
            .find_heredoc_end(&label, body_start)
            .unwrap_or(self.bytes.len());
        self.emit(TokenKind::StringLiteral, end);
    }

    /// Parse `<<<[ \t]*(ID|"ID"|'ID')\r?\n`, returning the label and the
    /// offset of the first body line.
    fn heredoc_label(&self) -> Option<(String, usize)> {
        let bytes = self.bytes;
        let mut i = self.scan_while(self.pos + 3, |b| b == b' ' || b == b'\t');
        let quote = match bytes.get(i).copied() {
            Some(q) if q == b'\'' || q == b'"' => {
                i += 1;
                Some(q)
            }
            _ => None,
        };
        if !bytes.get(i).copied().map_or(false, is_ident_start) {
            return None;
        }
        let label_end = self.scan_while(i, is_label_char);
        let label = self.source[i..label_end].to_string();
        i = label_end;
        if let Some(q) = quote {
            if bytes.get(i) != Some(&q) {
                return None;
            }
            i += 1;
        }
        if bytes[i..].starts_with(b"\r\n") {
            Some((label, i + 2))
        } else if bytes.get(i) == Some(&b'\n') {
            Some((label, i + 1))
        } else {
            None
        }
    }

    /// Find the end of the closing label, which may be indented and must not
    /// be followed by another label character.
    fn find_heredoc_end(&self, label: &str, body_start: usize) -> Option<usize> {
        let bytes = self.bytes;
        let mut line_start = body_start;
        while line_start < bytes.len() {
            let i = self.scan_while(line_start, |b| b == b' ' || b == b'\t');
            if bytes[i..].starts_with(label.as_bytes()) {
                let after = i + label.len();
                if !bytes.get(after).copied().map_or(false, is_label_char) {
                    return Some(after);
                }
            }
            line_start = find(bytes, line_start, b"\n")? + 1;
        }
        None
    }

    fn lex_number(&mut self) {
        let bytes = self.bytes;
        let mut end = self.pos;
        while end < bytes.len() {
            let c = bytes[end];
            let continues = c.is_ascii_alphanumeric()
                || c == b'_'
                || (c == b'.' && bytes.get(end + 1).map_or(false, u8::is_ascii_digit))
                || ((c == b'+' || c == b'-')
                    && end > self.pos
                    && matches!(bytes[end - 1], b'e' | b'E')
                    && !self.source[self.pos..end].starts_with("0x")
                    && !self.source[self.pos..end].starts_with("0X"));
            if !continues {
                break;
            }
            end += 1;
        }
        self.emit(TokenKind::Number, end);
    }

    fn lex_word(&mut self) {
        let end = self.scan_while(self.pos, is_ident_char);
        let word = &self.source[self.pos..end];
        let kind = if self.after_member_access() {
            TokenKind::Identifier
        } else {
            KEYWORDS
                .get(word.to_ascii_lowercase().as_str())
                .copied()
                .unwrap_or(TokenKind::Identifier)
        };
        self.emit(kind, end);
    }

    fn after_member_access(&self) -> bool {
        self.last_significant
            .and_then(|i| self.tokens.get(i))
            .map_or(false, |t| {
                t.kind == TokenKind::Symbol && MEMBER_ACCESS.contains(&t.text.as_str())
            })
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_label_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

/// Identifier characters, including `\` so qualified names stay one token.
fn is_ident_char(b: u8) -> bool {
    is_label_char(b) || b == b'\\'
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(|t| t.kind).collect()
    }

    fn significant(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .iter()
            .filter(|t| !t.kind.is_whitespace())
            .map(|t| (t.kind, t.text.clone()))
            .collect()
    }

    #[test]
    fn test_lossless() {
        let source = "<h1>x</h1>\n<?php\n/** doc */\nclass Foo {\n  public $a = \"{$b}\";\n}\n?>\ntrailer";
        let joined: String = tokenize(source).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, source);
    }

    #[test]
    fn test_open_tag_swallows_one_newline() {
        let stream = tokenize("<?php\n/** doc */");
        assert_eq!(stream.at(0).unwrap().kind, TokenKind::OpenTag);
        assert_eq!(stream.at(0).unwrap().text, "<?php\n");
        assert_eq!(stream.at(1).unwrap().kind, TokenKind::DocComment);
        assert_eq!(stream.at(1).unwrap().line, 2);
    }

    #[test]
    fn test_open_tag_blank_line_leaves_whitespace() {
        assert_eq!(
            kinds("<?php\n\n/** doc */"),
            vec![TokenKind::OpenTag, TokenKind::Whitespace, TokenKind::DocComment]
        );
    }

    #[test]
    fn test_inline_prolog_before_open_tag() {
        let stream = tokenize("<html>\n<?php echo 1;");
        assert_eq!(stream.at(0).unwrap().kind, TokenKind::InlineProlog);
        assert_eq!(stream.at(1).unwrap().kind, TokenKind::OpenTag);
        assert_eq!(stream.at(1).unwrap().line, 2);
    }

    #[test]
    fn test_file_without_open_tag_is_all_inline() {
        assert_eq!(kinds("just text"), vec![TokenKind::InlineProlog]);
    }

    #[test]
    fn test_short_tags_only_when_enabled() {
        let off = Lexer::new("<? echo 1;").tokenize();
        assert_eq!(off.len(), 1);
        let on = Lexer::new("<? echo 1;").short_tags(true).tokenize();
        assert_eq!(on.at(0).unwrap().kind, TokenKind::OpenTag);
    }

    #[test]
    fn test_doc_comment_vs_comment() {
        let toks = significant("<?php /** a */ /**/ /* b */ // c\n# d\n");
        let comment_kinds: Vec<_> = toks.iter().skip(1).map(|(k, _)| *k).collect();
        assert_eq!(
            comment_kinds,
            vec![
                TokenKind::DocComment,
                TokenKind::Comment,
                TokenKind::Comment,
                TokenKind::Comment,
                TokenKind::Comment,
            ]
        );
    }

    #[test]
    fn test_line_comment_stops_before_close_tag() {
        let toks = significant("<?php // note ?>html");
        assert_eq!(toks[1], (TokenKind::Comment, "// note ".to_string()));
        assert_eq!(toks[2].0, TokenKind::CloseTag);
        assert_eq!(toks[3].0, TokenKind::InlineProlog);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let toks = significant("<?php ABSTRACT Class Foo { Public STATIC Function bar() {} }");
        let ks: Vec<_> = toks.iter().map(|(k, _)| *k).collect();
        assert!(ks.contains(&TokenKind::AbstractKeyword));
        assert!(ks.contains(&TokenKind::ClassKeyword));
        assert!(ks.contains(&TokenKind::VisibilityKeyword(Visibility::Public)));
        assert!(ks.contains(&TokenKind::StaticKeyword));
        assert!(ks.contains(&TokenKind::FunctionKeyword));
    }

    #[test]
    fn test_word_after_member_access_is_identifier() {
        let toks = significant("<?php $x = Foo::class; $y->function; $z?->static;");
        assert!(!toks.iter().any(|(k, _)| *k == TokenKind::ClassKeyword));
        assert!(!toks.iter().any(|(k, _)| *k == TokenKind::FunctionKeyword));
        assert!(!toks.iter().any(|(k, _)| *k == TokenKind::StaticKeyword));
    }

    #[test]
    fn test_variables() {
        let toks = significant("<?php $foo $$bar $");
        assert_eq!(toks[1], (TokenKind::VariableName, "$foo".to_string()));
        assert_eq!(toks[2], (TokenKind::Symbol, "$".to_string()));
        assert_eq!(toks[3], (TokenKind::VariableName, "$bar".to_string()));
        assert_eq!(toks[4], (TokenKind::Symbol, "$".to_string()));
    }

    #[test]
    fn test_strings_hide_braces() {
        let ks = kinds("<?php \"a {$b} c\" 'it\\'s {' `cmd {`");
        assert!(!ks.contains(&TokenKind::OpenBrace));
        assert!(!ks.contains(&TokenKind::CloseBrace));
        assert_eq!(
            ks.iter().filter(|k| **k == TokenKind::StringLiteral).count(),
            3
        );
    }

    #[test]
    fn test_heredoc_and_nowdoc() {
        let source = "<?php\n$a = <<<EOT\n  { class }\n  EOT;\n$b = <<<'RAW'\nfunction\nRAW;\n";
        let toks = significant(source);
        let strings: Vec<_> = toks
            .iter()
            .filter(|(k, _)| *k == TokenKind::StringLiteral)
            .collect();
        assert_eq!(strings.len(), 2);
        assert!(strings[0].1.ends_with("EOT"));
        assert!(strings[1].1.ends_with("RAW"));
        assert!(!toks.iter().any(|(k, _)| *k == TokenKind::ClassKeyword));
        assert!(!toks.iter().any(|(k, _)| *k == TokenKind::FunctionKeyword));
        // Line counting continues correctly after the heredocs.
        let stream = tokenize(source);
        assert_eq!(stream.at(stream.len() - 1).unwrap().line, 7);
    }

    #[test]
    fn test_shift_operator_is_not_heredoc() {
        let ks = kinds("<?php $a <<< 2;");
        assert!(!ks.contains(&TokenKind::StringLiteral));
    }

    #[test]
    fn test_line_numbers() {
        let stream = tokenize("<?php\n\nclass Foo\n{\n}\n");
        let class = stream
            .iter()
            .find(|t| t.kind == TokenKind::ClassKeyword)
            .unwrap();
        assert_eq!(class.line, 3);
        let close = stream
            .iter()
            .find(|t| t.kind == TokenKind::CloseBrace)
            .unwrap();
        assert_eq!(close.line, 5);
    }

    #[test]
    fn test_unterminated_constructs_run_to_eof() {
        for source in ["<?php /** open", "<?php 'open", "<?php <<<EOT\nbody"] {
            let joined: String = tokenize(source).iter().map(|t| t.text.as_str()).collect();
            assert_eq!(joined, source);
        }
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let source = "<?php $café = 'naïve'; // ünïcödé\n€";
        let joined: String = tokenize(source).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, source);
    }
}
