//! Structured output fragments.
//!
//! Generators return trees of [`Fragment`] instead of concatenated text so
//! each nesting level can be built and inspected on its own. Indentation is
//! applied only when the tree is rendered.

/// Columns used for one indentation level.
pub const INDENT: &str = "    ";

const WRAP_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A single line of code.
    Line(String),
    /// `open`, then `body` one level deeper, then `close`. An empty `close`
    /// emits nothing.
    Block {
        open: String,
        body: Vec<Fragment>,
        close: String,
    },
    /// A C block comment, wrapped to the output width.
    Comment(String),
    Blank,
}

impl Fragment {
    pub fn line(text: impl Into<String>) -> Self {
        Fragment::Line(text.into())
    }

    pub fn block(open: impl Into<String>, body: Vec<Fragment>, close: impl Into<String>) -> Self {
        Fragment::Block {
            open: open.into(),
            body,
            close: close.into(),
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Fragment::Comment(text.into())
    }
}

/// Render fragments starting at column zero.
pub fn render(fragments: &[Fragment]) -> String {
    render_at(fragments, 0)
}

/// Render fragments starting at the given indentation level.
pub fn render_at(fragments: &[Fragment], level: usize) -> String {
    let mut out = String::new();
    for fragment in fragments {
        render_into(&mut out, fragment, level);
    }
    out
}

fn render_into(out: &mut String, fragment: &Fragment, level: usize) {
    let indent = INDENT.repeat(level);
    match fragment {
        Fragment::Line(text) => {
            out.push_str(&indent);
            out.push_str(text);
            out.push('\n');
        }
        Fragment::Block { open, body, close } => {
            out.push_str(&indent);
            out.push_str(open);
            out.push('\n');
            for child in body {
                render_into(out, child, level + 1);
            }
            if !close.is_empty() {
                out.push_str(&indent);
                out.push_str(close);
                out.push('\n');
            }
        }
        Fragment::Comment(text) => render_comment(out, text, &indent),
        Fragment::Blank => out.push('\n'),
    }
}

fn render_comment(out: &mut String, text: &str, indent: &str) {
    let width = WRAP_WIDTH.saturating_sub(indent.len() + 3).max(20);
    let single = format!("/* {} */", text);
    if !text.contains('\n') && indent.len() + single.len() <= WRAP_WIDTH {
        out.push_str(indent);
        out.push_str(&single);
        out.push('\n');
        return;
    }

    out.push_str(indent);
    out.push_str("/*\n");
    for paragraph in text.lines() {
        for line in wrap(paragraph, width) {
            out.push_str(indent);
            if line.is_empty() {
                out.push_str(" *\n");
            } else {
                out.push_str(" * ");
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
    out.push_str(indent);
    out.push_str(" */\n");
}

fn wrap(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_indent_their_body() {
        let tree = vec![Fragment::block(
            "struct pointStruct{",
            vec![Fragment::line("int member0;"), Fragment::line("int member1;")],
            "};",
        )];
        assert_eq!(
            render(&tree),
            "struct pointStruct{\n    int member0;\n    int member1;\n};\n"
        );
    }

    #[test]
    fn nested_blocks_accumulate_indentation() {
        let tree = vec![Fragment::block(
            "a {",
            vec![Fragment::block("b {", vec![Fragment::line("c;")], "}")],
            "}",
        )];
        assert_eq!(render(&tree), "a {\n    b {\n        c;\n    }\n}\n");
    }

    #[test]
    fn short_comments_stay_on_one_line() {
        let tree = vec![Fragment::comment("pack the arguments")];
        assert_eq!(render_at(&tree, 1), "    /* pack the arguments */\n");
    }

    #[test]
    fn long_comments_are_wrapped() {
        let text = "word ".repeat(40);
        let rendered = render(&[Fragment::comment(text.trim())]);
        assert!(rendered.starts_with("/*\n"));
        assert!(rendered.ends_with(" */\n"));
        assert!(rendered.lines().all(|line| line.len() <= WRAP_WIDTH));
    }

    #[test]
    fn empty_close_chains_into_else() {
        let tree = vec![
            Fragment::block("if (x) {", vec![Fragment::line("y();")], ""),
            Fragment::block("} else {", vec![Fragment::line("z();")], "}"),
        ];
        assert_eq!(render(&tree), "if (x) {\n    y();\n} else {\n    z();\n}\n");
    }
}
