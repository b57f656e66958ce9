/// Remove `//` line comments and `/* */` block comments that sit outside
/// JSON string literals. Line breaks are kept so parse errors still point at
/// the right line.
pub fn strip_comments(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        String { escaped: bool },
        Line,
        Block,
    }

    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        state = match state {
            State::Code => match (c, chars.peek()) {
                ('/', Some('/')) => {
                    chars.next();
                    State::Line
                }
                ('/', Some('*')) => {
                    chars.next();
                    out.push(' ');
                    State::Block
                }
                ('"', _) => {
                    out.push(c);
                    State::String { escaped: false }
                }
                _ => {
                    out.push(c);
                    State::Code
                }
            },
            State::String { escaped } => {
                out.push(c);
                match c {
                    _ if escaped => State::String { escaped: false },
                    '\\' => State::String { escaped: true },
                    '"' => State::Code,
                    _ => State::String { escaped: false },
                }
            }
            State::Line => {
                if c == '\n' {
                    out.push(c);
                    State::Code
                } else {
                    State::Line
                }
            }
            State::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    State::Code
                } else {
                    if c == '\n' {
                        out.push(c);
                    }
                    State::Block
                }
            }
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_block_comments_are_removed() {
        assert_eq!(strip_comments("{ // c\n\"a\": 1 }"), "{ \n\"a\": 1 }");
        assert_eq!(strip_comments("[1, /* two */ 3]"), "[1,   3]");
    }

    #[test]
    fn comment_markers_inside_strings_are_kept() {
        let text = r#"{"url": "http://x/*y*/", "q": "a \" // b"}"#;
        assert_eq!(strip_comments(text), text);
    }

    #[test]
    fn block_comment_keeps_line_breaks() {
        assert_eq!(strip_comments("a/*\n\n*/b"), "a \n\nb");
    }

    #[test]
    fn unterminated_block_drops_the_rest() {
        assert_eq!(strip_comments("1 /* open"), "1  ");
    }
}
