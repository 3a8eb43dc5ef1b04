//! Block rules.
//!
//! Every rule has the signature of [`BlockRule`](super::BlockRule). In silent
//! mode a rule only reports whether it would match, which is how paragraphs
//! find their terminators.

use directive_core::{BlockScope, DirectiveResult, Nesting, ParentType, TokenSink};

use super::state::{BlockState, LineMarks};
use crate::syntax::fence::Fence;

/// Fenced code block: ```` ``` ```` or `~~~`.
pub(crate) fn fence(
    state: &mut BlockState<'_>,
    start_line: usize,
    end_line: usize,
    silent: bool,
) -> DirectiveResult<bool> {
    if state.is_code_indented(start_line) {
        return Ok(false);
    }
    let Some(fence) = Fence::opening(state.text(start_line)) else {
        return Ok(false);
    };
    if silent {
        return Ok(true);
    }

    let mut next = start_line + 1;
    let mut closed = false;
    while next < end_line {
        if !state.is_empty(next) && state.lines[next].indent < state.blk_indent {
            break;
        }
        if !state.is_code_indented(next) && fence.closes(state.text(next)) {
            closed = true;
            break;
        }
        next += 1;
    }

    let content = state.get_lines(start_line + 1, next, state.lines[start_line].indent);
    let line_after = if closed { next + 1 } else { next };

    let token = state.push("fence", "code", Nesting::SelfClosing);
    token.info = fence.info.trim().to_owned();
    token.content = content;
    token.markup = fence.markup();
    token.map = Some([start_line, line_after]);

    state.line = line_after;
    Ok(true)
}

/// Blockquote: consecutive lines starting with `>`.
pub(crate) fn blockquote(
    state: &mut BlockState<'_>,
    start_line: usize,
    end_line: usize,
    silent: bool,
) -> DirectiveResult<bool> {
    if state.is_code_indented(start_line) || state.first_byte(start_line) != Some(b'>') {
        return Ok(false);
    }
    if silent {
        return Ok(true);
    }

    let src = state.src;
    let bytes = src.as_bytes();
    let mut saved = Vec::new();
    let mut next = start_line;
    while next < end_line {
        if state.is_code_indented(next) || state.first_byte(next) != Some(b'>') {
            break;
        }
        let marks = state.lines[next];
        saved.push(marks);

        let mut begin = marks.text + 1;
        if begin < marks.end && bytes[begin] == b' ' {
            begin += 1;
        }
        state.lines[next] = LineMarks::scan(src, begin, marks.end);
        next += 1;
    }

    let open = state.tokens.len();
    let token = state.push("blockquote_open", "blockquote", Nesting::Open);
    token.markup = ">".to_owned();

    let old_indent = state.blk_indent;
    state.blk_indent = 0;
    let result = {
        let mut scope = BlockScope::enter(&mut *state);
        scope.parent_type = ParentType::Blockquote;
        scope.line_max = next;
        scope.tokenize(start_line, next)
    };
    state.blk_indent = old_indent;
    for (offset, marks) in saved.into_iter().enumerate() {
        state.lines[start_line + offset] = marks;
    }
    result?;

    let token = state.push("blockquote_close", "blockquote", Nesting::Close);
    token.markup = ">".to_owned();
    state.tokens[open].map = Some([start_line, next]);

    state.line = next;
    Ok(true)
}

/// Thematic break: three or more `*`, `-` or `_`, optionally spaced.
pub(crate) fn hr(
    state: &mut BlockState<'_>,
    start_line: usize,
    _end_line: usize,
    silent: bool,
) -> DirectiveResult<bool> {
    if state.is_code_indented(start_line) {
        return Ok(false);
    }
    let Some(marker) = state.first_byte(start_line) else {
        return Ok(false);
    };
    if !matches!(marker, b'*' | b'-' | b'_') {
        return Ok(false);
    }

    let mut count = 0;
    for byte in state.text(start_line).bytes() {
        if byte == marker {
            count += 1;
        } else if byte != b' ' && byte != b'\t' {
            return Ok(false);
        }
    }
    if count < 3 {
        return Ok(false);
    }
    if silent {
        return Ok(true);
    }

    let token = state.push("hr", "hr", Nesting::SelfClosing);
    token.map = Some([start_line, start_line + 1]);
    token.markup = char::from(marker).to_string().repeat(count);

    state.line = start_line + 1;
    Ok(true)
}

/// Bullet list marker on a line: the marker byte and the offset past it.
fn bullet_marker(state: &BlockState<'_>, line: usize) -> Option<(u8, usize)> {
    let marks = state.lines[line];
    let bytes = state.src.as_bytes();
    if marks.text >= marks.end {
        return None;
    }

    let marker = bytes[marks.text];
    if !matches!(marker, b'-' | b'*' | b'+') {
        return None;
    }
    let after = marks.text + 1;
    if after < marks.end && !matches!(bytes[after], b' ' | b'\t') {
        return None;
    }
    Some((marker, after))
}

/// Bullet list with `-`, `*` or `+` items.
///
/// Paragraphs of a tight list (no blank lines between or inside items) are
/// marked hidden.
pub(crate) fn list(
    state: &mut BlockState<'_>,
    start_line: usize,
    end_line: usize,
    silent: bool,
) -> DirectiveResult<bool> {
    if state.is_code_indented(start_line) {
        return Ok(false);
    }
    let Some((marker, after)) = bullet_marker(state, start_line) else {
        return Ok(false);
    };
    if silent {
        // an empty item cannot interrupt a paragraph
        return Ok(!state.src[after..state.lines[start_line].end].trim().is_empty());
    }

    let src = state.src;
    let bytes = src.as_bytes();
    let markup = char::from(marker).to_string();

    let list_open = state.tokens.len();
    let token = state.push("bullet_list_open", "ul", Nesting::Open);
    token.markup.clone_from(&markup);

    let mut line = start_line;
    let mut tight = true;
    let mut prev_empty_end = false;

    while let Some((item_marker, after)) = bullet_marker(state, line) {
        if item_marker != marker {
            break;
        }

        let marks = state.lines[line];
        let mut content_start = after;
        while content_start < marks.end && bytes[content_start] == b' ' {
            content_start += 1;
        }
        let spaces = content_start - after;
        if content_start >= marks.end || spaces > 4 {
            content_start = (after + 1).min(marks.end);
        }
        let content_indent = marks.indent + (content_start - marks.text);

        let item_open = state.tokens.len();
        let token = state.push("list_item_open", "li", Nesting::Open);
        token.markup.clone_from(&markup);

        let content_marks = LineMarks::scan(src, content_start, marks.end);
        state.lines[line] = LineMarks {
            indent: content_indent + content_marks.indent,
            ..content_marks
        };
        let old_indent = state.blk_indent;
        let old_tight = state.tight;
        state.blk_indent = content_indent;
        state.tight = true;

        let result = {
            let mut scope = BlockScope::enter(&mut *state);
            scope.parent_type = ParentType::List;
            scope.tokenize(line, end_line)
        };

        if !state.tight || prev_empty_end {
            tight = false;
        }
        if state.line <= line {
            state.line = line + 1;
        }
        prev_empty_end = state.line - line > 1 && state.is_empty(state.line - 1);

        state.blk_indent = old_indent;
        state.tight = old_tight;
        state.lines[line] = marks;
        result?;

        let token = state.push("list_item_close", "li", Nesting::Close);
        token.markup.clone_from(&markup);
        state.tokens[item_open].map = Some([line, state.line]);

        line = state.line;
        if line >= end_line
            || state.lines[line].indent < state.blk_indent
            || state.is_code_indented(line)
        {
            break;
        }
    }

    let token = state.push("bullet_list_close", "ul", Nesting::Close);
    token.markup = markup;
    state.tokens[list_open].map = Some([start_line, line]);

    if tight {
        mark_tight_paragraphs(state, list_open + 1);
    }

    state.line = line;
    Ok(true)
}

/// Hide the paragraph wrappers directly inside the items of a tight list.
fn mark_tight_paragraphs(state: &mut BlockState<'_>, from: usize) {
    let level = state.level + 2;
    for token in &mut state.tokens[from..] {
        if token.level == level && (token.kind == "paragraph_open" || token.kind == "paragraph_close")
        {
            token.hidden = true;
        }
    }
}

/// ATX heading: `#` to `######`.
pub(crate) fn heading(
    state: &mut BlockState<'_>,
    start_line: usize,
    _end_line: usize,
    silent: bool,
) -> DirectiveResult<bool> {
    if state.is_code_indented(start_line) {
        return Ok(false);
    }
    let text = state.text(start_line);
    let level = text.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return Ok(false);
    }
    let rest = &text[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return Ok(false);
    }
    if silent {
        return Ok(true);
    }

    let mut content = rest.trim();
    let without_closing = content.trim_end_matches('#');
    if without_closing.is_empty() {
        content = "";
    } else if without_closing.ends_with([' ', '\t']) {
        content = without_closing.trim_end();
    }

    let tag = format!("h{level}");
    let markup = "#".repeat(level);
    let map = Some([start_line, start_line + 1]);

    let token = state.push("heading_open", &tag, Nesting::Open);
    token.markup.clone_from(&markup);
    token.map = map;

    let token = state.push("inline", "", Nesting::SelfClosing);
    content.clone_into(&mut token.content);
    token.map = map;
    token.children = Some(Vec::new());

    let token = state.push("heading_close", &tag, Nesting::Close);
    token.markup = markup;

    state.line = start_line + 1;
    Ok(true)
}

/// Paragraph: any run of non-blank lines not interrupted by another block.
pub(crate) fn paragraph(
    state: &mut BlockState<'_>,
    start_line: usize,
    end_line: usize,
    _silent: bool,
) -> DirectiveResult<bool> {
    let md = state.md;
    let mut scope = BlockScope::enter(&mut *state);
    scope.parent_type = ParentType::Paragraph;

    let mut next = start_line + 1;
    'lines: while next < end_line && !scope.is_empty(next) {
        // deeply indented lines continue the paragraph
        if !scope.is_code_indented(next) {
            for rule in md.block.ruler.alt("paragraph") {
                if rule(&mut scope, next, end_line, true)? {
                    break 'lines;
                }
            }
        }
        next += 1;
    }

    let content = scope.get_lines(start_line, next, scope.blk_indent);
    let map = Some([start_line, next]);
    scope.line = next;

    let token = scope.push("paragraph_open", "p", Nesting::Open);
    token.map = map;

    let token = scope.push("inline", "", Nesting::SelfClosing);
    content.trim().clone_into(&mut token.content);
    token.map = map;
    token.children = Some(Vec::new());

    scope.push("paragraph_close", "p", Nesting::Close);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use directive_core::{Env, Token};
    use pretty_assertions::assert_eq;

    use crate::MarkdownParser;

    fn parse(src: &str) -> Vec<Token> {
        MarkdownParser::new().parse(src, &mut Env::new()).unwrap()
    }

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn test_paragraphs() {
        let tokens = parse("one\ntwo\n\nthree");
        assert_eq!(
            kinds(&tokens),
            vec![
                "paragraph_open",
                "inline",
                "paragraph_close",
                "paragraph_open",
                "inline",
                "paragraph_close",
            ]
        );
        assert_eq!(tokens[1].content, "one\ntwo");
        assert_eq!(tokens[0].map, Some([0, 2]));
        assert_eq!(tokens[4].content, "three");
        assert_eq!(tokens[3].map, Some([3, 4]));
    }

    #[test]
    fn test_heading() {
        let tokens = parse("## Title ##\ntext");
        assert_eq!(tokens[0].kind, "heading_open");
        assert_eq!(tokens[0].tag, "h2");
        assert_eq!(tokens[0].markup, "##");
        assert_eq!(tokens[1].content, "Title");
        assert_eq!(tokens[3].kind, "paragraph_open");
    }

    #[test]
    fn test_heading_requires_space() {
        let tokens = parse("#tag");
        assert_eq!(tokens[0].kind, "paragraph_open");
    }

    #[test]
    fn test_heading_interrupts_paragraph() {
        let tokens = parse("text\n# Title");
        assert_eq!(
            kinds(&tokens),
            vec![
                "paragraph_open",
                "inline",
                "paragraph_close",
                "heading_open",
                "inline",
                "heading_close",
            ]
        );
    }

    #[test]
    fn test_fence() {
        let tokens = parse("```js\nlet a = 1;\n:::\n```\nafter");
        assert_eq!(tokens[0].kind, "fence");
        assert_eq!(tokens[0].info, "js");
        assert_eq!(tokens[0].content, "let a = 1;\n:::\n");
        assert_eq!(tokens[0].markup, "```");
        assert_eq!(tokens[0].map, Some([0, 4]));
        assert_eq!(tokens[2].content, "after");
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let tokens = parse("~~~\ncode");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].content, "code");
        assert_eq!(tokens[0].map, Some([0, 2]));
    }

    #[test]
    fn test_hr() {
        let tokens = parse("* * *\n\n___");
        assert_eq!(kinds(&tokens), vec!["hr", "hr"]);
        assert_eq!(tokens[0].markup, "***");
    }

    #[test]
    fn test_blockquote() {
        let tokens = parse("> quoted\n> more\n\nafter");
        assert_eq!(
            kinds(&tokens),
            vec![
                "blockquote_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "blockquote_close",
                "paragraph_open",
                "inline",
                "paragraph_close",
            ]
        );
        assert_eq!(tokens[2].content, "quoted\nmore");
        assert_eq!(tokens[0].map, Some([0, 2]));
        assert_eq!(tokens[1].level, 1);
        assert_eq!(tokens[6].content, "after");
    }

    #[test]
    fn test_tight_list() {
        let tokens = parse("- a\n- b");
        assert_eq!(
            kinds(&tokens),
            vec![
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "bullet_list_close",
            ]
        );
        assert!(tokens[2].hidden);
        assert_eq!(tokens[3].content, "a");
        assert_eq!(tokens[8].content, "b");
        assert_eq!(tokens[0].map, Some([0, 2]));
    }

    #[test]
    fn test_loose_list() {
        let tokens = parse("- a\n\n- b");
        assert!(!tokens[2].hidden);
        assert_eq!(tokens[8].content, "b");
    }

    #[test]
    fn test_list_item_continuation() {
        let tokens = parse("- a\n  b\n- c");
        assert_eq!(tokens[3].content, "a\nb");
        assert_eq!(tokens[1].map, Some([0, 2]));
    }

    #[test]
    fn test_list_interrupts_paragraph() {
        let tokens = parse("text\n- item");
        assert_eq!(tokens[3].kind, "bullet_list_open");
    }

    #[test]
    fn test_blank_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n  \n").is_empty());
    }
}
