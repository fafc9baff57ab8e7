//! Forward entity scanner.
//!
//! A single pass over the token stream that tracks which class or interface
//! body we are in and whether we are inside a function body, and runs the
//! matching attachment rule for every declaration it meets.
//!
//! All per-file state lives in [`ScanState`], which each step consumes and
//! returns. Findings and counters go into the file's [`FileReport`].

use crate::lexer::{TokenKind, TokenStream};
use crate::pattern::skip_whitespace_forward;

use super::rules::{self, Entity, CLOSURE_NAME};
use super::{EntityKind, FileReport};

/// Kind of an enclosing declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Class,
    Interface,
}

/// An open class or interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityContext {
    pub kind: ContextKind,
    pub name: String,
    pub declared_at_line: u32,
    /// Brace depth inside the declaration; 0 until its body opens.
    pub nesting_depth: u32,
}

/// Class/interface contexts, innermost last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack {
    contexts: Vec<EntityContext>,
}

impl ContextStack {
    pub fn current(&self) -> Option<&EntityContext> {
        self.contexts.last()
    }

    pub fn is_active(&self) -> bool {
        !self.contexts.is_empty()
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.contexts.len()
    }

    /// Start a new context. A declaration whose body never opened is
    /// replaced rather than nested under.
    pub fn open(&mut self, context: EntityContext) {
        if self.current().map_or(false, |c| c.nesting_depth == 0) {
            self.contexts.pop();
        }
        self.contexts.push(context);
    }

    pub fn open_brace(&mut self) {
        if let Some(current) = self.contexts.last_mut() {
            current.nesting_depth += 1;
        }
    }

    /// Close a brace, leaving the innermost context once its body closes.
    pub fn close_brace(&mut self) {
        if let Some(current) = self.contexts.last_mut() {
            current.nesting_depth = current.nesting_depth.saturating_sub(1);
            if current.nesting_depth == 0 {
                self.contexts.pop();
            }
        }
    }
}

/// Function body depth meaning "not inside any function".
pub const OUTSIDE_FUNCTION: i32 = -1;

/// Scan-local state, threaded through every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanState {
    pub cursor: usize,
    pub contexts: ContextStack,
    /// -1 outside functions, 0 between `function` and its body, >0 inside.
    pub function_nesting: i32,
    /// The leading doc comment while it is still credited to the file.
    pub file_doc_slot: Option<usize>,
    pub last_doc_comment: Option<usize>,
}

impl ScanState {
    pub fn new(cursor: usize, file_doc_slot: Option<usize>) -> Self {
        Self {
            cursor,
            contexts: ContextStack::default(),
            function_nesting: OUTSIDE_FUNCTION,
            file_doc_slot,
            last_doc_comment: None,
        }
    }

    fn advance(mut self) -> Self {
        self.cursor += 1;
        self
    }

    /// Class variables are only declarations outside function bodies.
    fn in_member_position(&self) -> bool {
        self.contexts.is_active() && self.function_nesting <= 0
    }
}

/// Scan one tokenized file.
pub fn scan(file: &str, stream: &TokenStream) -> FileReport {
    Scanner::new(file, stream).run()
}

/// Drives the forward pass for one file.
pub struct Scanner<'a> {
    file: &'a str,
    stream: &'a TokenStream,
}

impl<'a> Scanner<'a> {
    pub fn new(file: &'a str, stream: &'a TokenStream) -> Self {
        Self { file, stream }
    }

    pub fn run(&self) -> FileReport {
        let mut report = FileReport::new();
        let start = rules::check_file_comment(self.stream, self.file, &mut report);
        let mut state = ScanState::new(start.cursor, start.doc_slot);

        while state.cursor < self.stream.len() {
            let before = state.cursor;
            state = self.step(state, &mut report);
            state = self.settle_file_comment(state, &mut report);
            if state.cursor <= before {
                state.cursor = before + 1;
            }
        }

        report
    }

    /// Process the token under the cursor.
    pub fn step(&self, state: ScanState, report: &mut FileReport) -> ScanState {
        let Some(kind) = self.stream.kind_at(state.cursor) else {
            return state;
        };

        match kind {
            TokenKind::ClassKeyword => self.open_context(state, ContextKind::Class, report),
            TokenKind::InterfaceKeyword => {
                self.open_context(state, ContextKind::Interface, report)
            }
            TokenKind::FunctionKeyword => self.enter_function(state, report),
            TokenKind::VariableName if state.in_member_position() => {
                self.check_class_variable(state, report)
            }
            TokenKind::ConstKeyword if state.contexts.is_active() => {
                self.check_class_constant(state, report)
            }
            TokenKind::DocComment => {
                let mut state = state;
                state.last_doc_comment = Some(state.cursor);
                state.advance()
            }
            TokenKind::OpenBrace => {
                let mut state = state;
                state.contexts.open_brace();
                if state.function_nesting >= 0 {
                    state.function_nesting += 1;
                }
                state.advance()
            }
            TokenKind::CloseBrace => {
                let mut state = state;
                state.contexts.close_brace();
                // Closing the outermost body leaves function scope entirely.
                state.function_nesting = match state.function_nesting {
                    n if n > 1 => n - 1,
                    _ => OUTSIDE_FUNCTION,
                };
                state.advance()
            }
            _ => state.advance(),
        }
    }

    /// Fire the deferred file-level finding once the leading comment has
    /// been claimed by an entity.
    fn settle_file_comment(&self, mut state: ScanState, report: &mut FileReport) -> ScanState {
        if state.file_doc_slot.is_some() && state.last_doc_comment == state.file_doc_slot {
            rules::reclaim_file_comment(self.file, report);
            state.file_doc_slot = None;
        }
        state
    }

    /// Name token following the keyword at `keyword`: its index, text and line.
    fn name_after(&self, keyword: usize) -> Option<(usize, &'a str, u32)> {
        let index = skip_whitespace_forward(self.stream, keyword)?;
        let token = self.stream.at(index)?;
        Some((index, token.text.as_str(), token.line))
    }

    fn keyword_line(&self, index: usize) -> u32 {
        self.stream.at(index).map_or(1, |t| t.line)
    }

    fn run_rule(
        &self,
        mut state: ScanState,
        anchor: usize,
        entity: &Entity<'_>,
        report: &mut FileReport,
    ) -> ScanState {
        if let Some(doc) = rules::check_entity(self.stream, anchor, entity, self.file, report) {
            state.last_doc_comment = Some(doc);
        }
        state
    }

    fn open_context(
        &self,
        state: ScanState,
        kind: ContextKind,
        report: &mut FileReport,
    ) -> ScanState {
        let keyword = state.cursor;
        let (next, name, line) = match self.name_after(keyword) {
            Some((index, text, line)) => (index, text.to_string(), line),
            None => (keyword + 1, String::new(), self.keyword_line(keyword)),
        };
        let entity = Entity {
            kind: match kind {
                ContextKind::Class => EntityKind::Class,
                ContextKind::Interface => EntityKind::Interface,
            },
            name: name.clone(),
            line,
            enclosing: None,
        };
        let mut state = self.run_rule(state, keyword, &entity, report);
        state.contexts.open(EntityContext {
            kind,
            name,
            declared_at_line: line,
            nesting_depth: 0,
        });
        state.cursor = next;
        state
    }

    fn enter_function(&self, state: ScanState, report: &mut FileReport) -> ScanState {
        let keyword = state.cursor;
        let mut name_index = skip_whitespace_forward(self.stream, keyword);
        // `function &name()` returns by reference.
        if let Some(i) = name_index {
            if self.stream.at(i).map_or(false, |t| t.text == "&") {
                name_index = skip_whitespace_forward(self.stream, i);
            }
        }
        let (name, line) = match name_index.and_then(|i| self.stream.at(i)) {
            Some(token) if token.kind == TokenKind::Identifier => (token.text.clone(), token.line),
            Some(token) => (CLOSURE_NAME.to_string(), token.line),
            None => (CLOSURE_NAME.to_string(), self.keyword_line(keyword)),
        };

        let enclosing = state.contexts.current().map(|c| c.name.clone());
        let entity = Entity {
            kind: EntityKind::Function,
            name,
            line,
            enclosing: enclosing.as_deref(),
        };
        let mut state = self.run_rule(state, keyword, &entity, report);
        // A closure inside a body keeps counting from the enclosing depth.
        if state.function_nesting <= 0 {
            state.function_nesting = 0;
        }
        state.cursor = self.parameter_list_end(keyword);
        state
    }

    /// Index just before the function's body `{` (or the `;` ending an
    /// abstract declaration), so parameters are never seen as properties.
    fn parameter_list_end(&self, keyword: usize) -> usize {
        (keyword + 1..self.stream.len())
            .find(|&i| {
                matches!(
                    self.stream.kind_at(i),
                    Some(TokenKind::OpenBrace | TokenKind::Semicolon)
                )
            })
            .map_or(self.stream.len(), |i| i - 1)
    }

    fn check_class_variable(&self, state: ScanState, report: &mut FileReport) -> ScanState {
        let index = state.cursor;
        let Some(token) = self.stream.at(index) else {
            return state;
        };
        let enclosing = state.contexts.current().map(|c| c.name.clone());
        let entity = Entity {
            kind: EntityKind::ClassVariable,
            name: token.text.clone(),
            line: token.line,
            enclosing: enclosing.as_deref(),
        };
        self.run_rule(state, index, &entity, report).advance()
    }

    fn check_class_constant(&self, state: ScanState, report: &mut FileReport) -> ScanState {
        let keyword = state.cursor;
        let (next, name, line) = match self.name_after(keyword) {
            Some((index, text, line)) => (index, text.to_string(), line),
            None => (keyword + 1, String::new(), self.keyword_line(keyword)),
        };
        let enclosing = state.contexts.current().map(|c| c.name.clone());
        let entity = Entity {
            kind: EntityKind::ClassConstant,
            name,
            line,
            enclosing: enclosing.as_deref(),
        };
        let mut state = self.run_rule(state, keyword, &entity, report);
        state.cursor = next;
        state
    }
}
