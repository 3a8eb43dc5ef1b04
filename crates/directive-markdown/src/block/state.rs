//! Block-level parse state.

use directive_core::{BlockHost, DirectiveResult, Env, Nesting, ParentType, Token, TokenSink};

use crate::MarkdownParser;

/// Offsets of one source line.
///
/// Container rules (blockquotes, list items) temporarily move `begin` past
/// their markers so nested rules see the line's content only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LineMarks {
    /// Offset of the first byte of the line.
    pub begin: usize,
    /// Offset of the terminating newline, or the source length.
    pub end: usize,
    /// Offset of the first non-space byte, `end` for a blank line.
    pub text: usize,
    /// Indentation width in columns, tabs expanded to multiples of 4.
    pub indent: usize,
}

impl LineMarks {
    pub(crate) fn scan(src: &str, begin: usize, end: usize) -> Self {
        let bytes = src.as_bytes();
        let mut text = begin;
        let mut indent = 0;
        while text < end {
            match bytes[text] {
                b' ' => indent += 1,
                b'\t' => indent += 4 - indent % 4,
                _ => break,
            }
            text += 1;
        }
        Self {
            begin,
            end,
            text,
            indent,
        }
    }
}

/// Mutable state of the block pass over one document.
pub(crate) struct BlockState<'a> {
    pub src: &'a str,
    pub md: &'a MarkdownParser,
    pub env: &'a mut Env,
    pub tokens: Vec<Token>,
    /// Line marks plus one empty sentinel line at `line_max`.
    pub lines: Vec<LineMarks>,
    pub line: usize,
    pub line_max: usize,
    /// Indentation of the current container's content, in columns.
    pub blk_indent: usize,
    pub level: usize,
    /// False once the current pass has seen a blank line between blocks.
    pub tight: bool,
    pub parent_type: ParentType,
}

impl<'a> BlockState<'a> {
    pub(crate) fn new(src: &'a str, md: &'a MarkdownParser, env: &'a mut Env) -> Self {
        let mut lines = Vec::new();
        let mut begin = 0;
        for (offset, byte) in src.bytes().enumerate() {
            if byte == b'\n' {
                lines.push(LineMarks::scan(src, begin, offset));
                begin = offset + 1;
            }
        }
        if begin < src.len() {
            lines.push(LineMarks::scan(src, begin, src.len()));
        }

        let line_max = lines.len();
        lines.push(LineMarks {
            begin: src.len(),
            end: src.len(),
            text: src.len(),
            indent: 0,
        });

        Self {
            src,
            md,
            env,
            tokens: Vec::new(),
            lines,
            line: 0,
            line_max,
            blk_indent: 0,
            level: 0,
            tight: false,
            parent_type: ParentType::Root,
        }
    }

    pub(crate) fn is_empty(&self, line: usize) -> bool {
        let marks = self.lines[line];
        marks.text >= marks.end
    }

    pub(crate) fn skip_empty_lines(&self, mut line: usize) -> usize {
        while line < self.line_max && self.is_empty(line) {
            line += 1;
        }
        line
    }

    /// True if the line is indented four or more columns past the current
    /// container's content.
    pub(crate) fn is_code_indented(&self, line: usize) -> bool {
        self.lines[line].indent.saturating_sub(self.blk_indent) >= 4
    }

    /// Line content without indentation.
    pub(crate) fn text(&self, line: usize) -> &'a str {
        let src = self.src;
        let marks = self.lines[line];
        &src[marks.text..marks.end]
    }

    pub(crate) fn first_byte(&self, line: usize) -> Option<u8> {
        self.text(line).bytes().next()
    }

    /// Join lines `begin..end`, removing up to `indent` columns of leading
    /// whitespace from each and keeping every line terminator present in the
    /// source.
    pub(crate) fn get_lines(&self, begin: usize, end: usize, indent: usize) -> String {
        let bytes = self.src.as_bytes();
        let mut out = String::new();

        for line in begin..end {
            let marks = self.lines[line];
            let mut start = marks.begin;
            let mut column = 0;
            while start < marks.end && column < indent {
                match bytes[start] {
                    b' ' => column += 1,
                    b'\t' => column += 4 - column % 4,
                    _ => break,
                }
                start += 1;
            }

            out.push_str(&self.src[start..marks.end]);
            if marks.end < self.src.len() {
                out.push('\n');
            }
        }

        out
    }

    /// Run the block rules over `start_line..end_line`.
    pub(crate) fn tokenize(&mut self, start_line: usize, end_line: usize) -> DirectiveResult<()> {
        let md = self.md;
        md.block.tokenize(self, start_line, end_line)
    }
}

impl TokenSink for BlockState<'_> {
    fn push(&mut self, kind: &str, tag: &str, nesting: Nesting) -> &mut Token {
        let mut token = Token::new(kind, tag, nesting);
        token.block = true;
        if nesting == Nesting::Close {
            self.level = self.level.saturating_sub(1);
        }
        token.level = self.level;
        if nesting == Nesting::Open {
            self.level += 1;
        }

        let index = self.tokens.len();
        self.tokens.push(token);
        &mut self.tokens[index]
    }

    fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn env(&self) -> &Env {
        &*self.env
    }

    fn env_mut(&mut self) -> &mut Env {
        &mut *self.env
    }
}

impl BlockHost for BlockState<'_> {
    fn line(&self) -> usize {
        self.line
    }

    fn set_line(&mut self, line: usize) {
        self.line = line;
    }

    fn line_max(&self) -> usize {
        self.line_max
    }

    fn set_line_max(&mut self, line_max: usize) {
        self.line_max = line_max;
    }

    fn parent_type(&self) -> &ParentType {
        &self.parent_type
    }

    fn set_parent_type(&mut self, parent_type: ParentType) {
        self.parent_type = parent_type;
    }

    fn tokenize_block(&mut self, start_line: usize, end_line: usize) -> DirectiveResult<()> {
        self.tokenize(start_line, end_line)
    }
}
