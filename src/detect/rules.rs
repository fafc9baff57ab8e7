//! Attachment rules: is an entity immediately preceded by a doc comment?
//!
//! Each rule matches a fixed modifier pattern backwards from the entity's
//! keyword (or variable) token, skips any whitespace before that, and then
//! expects a doc comment.
//!
//! | Entity         | Modifiers allowed between comment and keyword |
//! |----------------|-----------------------------------------------|
//! | class          | `abstract`                                    |
//! | interface      | none                                          |
//! | function       | `static` and/or a visibility keyword          |
//! | class variable | same as function                              |
//! | class constant | none                                          |

use crate::lexer::{TokenKind, TokenStream, Visibility};
use crate::pattern::{match_backward, skip_whitespace_backward, Pattern};

use super::{EntityKind, FileReport, Finding};

const VISIBILITY: [TokenKind; 3] = [
    TokenKind::VisibilityKeyword(Visibility::Public),
    TokenKind::VisibilityKeyword(Visibility::Private),
    TokenKind::VisibilityKeyword(Visibility::Protected),
];

/// Most modifier tokens any rule may step over.
const MAX_MODIFIER_TOKENS: usize = 6;

/// Name given to anonymous functions in messages.
pub const CLOSURE_NAME: &str = "{closure}";

/// `[keyword whitespace]`, consumed atomically.
fn keyword_then_space(keyword: TokenKind) -> Pattern {
    Pattern::optional(Pattern::sequence([
        Pattern::literal(keyword),
        Pattern::literal(TokenKind::Whitespace),
    ]))
}

/// `[static ws] [public|private|protected] [ws] [static ws]`
fn member_modifiers() -> Pattern {
    Pattern::sequence([
        keyword_then_space(TokenKind::StaticKeyword),
        Pattern::optional(Pattern::any_of(VISIBILITY)),
        Pattern::optional(Pattern::literal(TokenKind::Whitespace)),
        keyword_then_space(TokenKind::StaticKeyword),
    ])
}

/// Modifier pattern for an entity kind; `None` means whitespace only.
pub fn modifier_pattern(kind: EntityKind) -> Option<Pattern> {
    match kind {
        EntityKind::Class => Some(keyword_then_space(TokenKind::AbstractKeyword)),
        EntityKind::Function | EntityKind::ClassVariable => Some(member_modifiers()),
        EntityKind::Interface
        | EntityKind::ClassConstant
        | EntityKind::File
        | EntityKind::Constant => None,
    }
}

/// Index of the doc comment attached to the entity whose first token is at
/// `anchor`, if there is one.
pub fn attached_doc_comment(
    stream: &TokenStream,
    anchor: usize,
    pattern: Option<&Pattern>,
) -> Option<usize> {
    let position = match pattern {
        Some(p) => {
            debug_assert!(p.max_width() <= MAX_MODIFIER_TOKENS);
            match_backward(p, stream, anchor).position
        }
        None => anchor,
    };
    let index = skip_whitespace_backward(stream, position).checked_sub(1)?;
    stream
        .kind_at(index)
        .filter(TokenKind::is_doc_comment)
        .map(|_| index)
}

/// A documentable construct found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity<'a> {
    pub kind: EntityKind,
    pub name: String,
    pub line: u32,
    /// Name of the enclosing class or interface.
    pub enclosing: Option<&'a str>,
}

impl Entity<'_> {
    /// `Enclosing::name`, or just the name at top level.
    pub fn qualified_name(&self) -> String {
        match self.enclosing {
            Some(outer) => format!("{}::{}", outer, self.name),
            None => self.name.clone(),
        }
    }

    pub fn missing_message(&self) -> String {
        let what = match self.kind {
            EntityKind::File => return FILE_MESSAGE.to_string(),
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::Function => "function",
            EntityKind::ClassVariable => "class variable",
            EntityKind::ClassConstant => "class level constant",
            EntityKind::Constant => "constant",
        };
        format!("Missing doc-comment for {} `{}`", what, self.qualified_name())
    }
}

const FILE_MESSAGE: &str = "Missing file level doc-comment";

/// Run the attachment rule for `entity` anchored at `anchor`.
///
/// Updates the counters, records a finding when the comment is missing, and
/// returns the index of the attached doc comment when there is one.
pub fn check_entity(
    stream: &TokenStream,
    anchor: usize,
    entity: &Entity<'_>,
    file: &str,
    report: &mut FileReport,
) -> Option<usize> {
    let pattern = modifier_pattern(entity.kind);
    match attached_doc_comment(stream, anchor, pattern.as_ref()) {
        Some(index) => {
            report.tally.record_found(entity.kind);
            Some(index)
        }
        None => {
            report.tally.record_missing(entity.kind);
            report.add_finding(Finding {
                kind: entity.kind,
                file: file.to_string(),
                line: entity.line,
                message: entity.missing_message(),
            });
            None
        }
    }
}

/// Result of the file-level check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStart {
    /// Where the forward scan starts.
    pub cursor: usize,
    /// The leading doc comment, while it is still credited to the file.
    pub doc_slot: Option<usize>,
}

/// Check for a doc comment at the very start of the file, after an optional
/// inline prolog and open tag.
pub fn check_file_comment(stream: &TokenStream, file: &str, report: &mut FileReport) -> FileStart {
    let mut cursor = 0;
    let mut line = 1;
    for prefix in [TokenKind::InlineProlog, TokenKind::OpenTag] {
        if let Some(token) = stream.at(cursor).filter(|t| t.kind == prefix) {
            line = token.line;
            cursor += 1;
        }
    }

    if stream.kind_at(cursor) == Some(TokenKind::DocComment) {
        report.tally.record_found(EntityKind::File);
        FileStart {
            cursor: cursor + 1,
            doc_slot: Some(cursor),
        }
    } else {
        report_missing_file_comment(file, line, report);
        FileStart {
            cursor,
            doc_slot: None,
        }
    }
}

/// The leading comment turned out to belong to the first entity, so the file
/// itself is undocumented after all.
pub fn reclaim_file_comment(file: &str, report: &mut FileReport) {
    report.tally.reclassify_as_missing(EntityKind::File);
    report.add_finding(Finding {
        kind: EntityKind::File,
        file: file.to_string(),
        line: 1,
        message: FILE_MESSAGE.to_string(),
    });
}

fn report_missing_file_comment(file: &str, line: u32, report: &mut FileReport) {
    report.tally.record_missing(EntityKind::File);
    report.add_finding(Finding {
        kind: EntityKind::File,
        file: file.to_string(),
        line,
        message: FILE_MESSAGE.to_string(),
    });
}
