use crate::parsing::cursor::Cursor;

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    /// Text with character references already decoded.
    Text(String),
}

/// Splits an HTML fragment into tokens.
///
/// Forgiving like a browser: comments, doctypes and processing instructions
/// are skipped, a `<` that does not open a tag is text, and a tag left open
/// at the end of input is treated as text.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut cur = Cursor::new(input, 0);
    let mut tokens = Vec::new();
    let mut text_start = 0;

    while !cur.eof() {
        if cur.peek() != Some(b'<') {
            cur.bump();
            continue;
        }

        let tag_start = cur.i;
        let Some(token) = try_markup(&mut cur) else {
            cur.i = tag_start + 1;
            continue;
        };

        push_text(&mut tokens, &input[text_start..tag_start]);

        let raw_text_element = match &token {
            Token::StartTag {
                name,
                self_closing: false,
                ..
            } if RAW_TEXT_ELEMENTS.contains(&name.as_str()) => Some(name.clone()),
            _ => None,
        };
        if !matches!(token, Token::Text(_)) {
            tokens.push(token);
        }

        if let Some(name) = raw_text_element {
            let raw_start = cur.i;
            let closing = format!("</{name}");
            while !cur.eof() && !cur.starts_with_ignore_case(closing.as_bytes()) {
                cur.bump();
            }
            let raw = cur.slice_from(raw_start);
            if !raw.is_empty() {
                tokens.push(Token::Text(raw.to_string()));
            }
            if !cur.eof() {
                cur.seek(b">");
                cur.bump();
            }
            tokens.push(Token::EndTag { name });
        }
        text_start = cur.i.min(input.len());
    }

    push_text(&mut tokens, &input[text_start.min(input.len())..]);
    tokens
}

fn push_text(tokens: &mut Vec<Token>, raw: &str) {
    if raw.is_empty() {
        return;
    }
    let decoded = html_escape::decode_html_entities(raw).into_owned();
    if let Some(Token::Text(prev)) = tokens.last_mut() {
        prev.push_str(&decoded);
    } else {
        tokens.push(Token::Text(decoded));
    }
}

/// Reads the markup construct at a `<`. Returns `None` when the `<` does not
/// start one; skipped constructs (comments, doctypes) come back as empty
/// text so the caller still moves past them.
fn try_markup(cur: &mut Cursor<'_>) -> Option<Token> {
    if cur.starts_with(b"<!--") {
        cur.bump_n(4);
        if cur.seek(b"-->") {
            cur.bump_n(3);
        }
        return Some(Token::Text(String::new()));
    }
    match cur.peek_at(1) {
        Some(b'!') | Some(b'?') => {
            if !cur.seek(b">") {
                return None;
            }
            cur.bump();
            Some(Token::Text(String::new()))
        }
        Some(b'/') if cur.peek_at(2).is_some_and(|b| b.is_ascii_alphabetic()) => {
            cur.bump_n(2);
            let name = read_name(cur);
            if !cur.seek(b">") {
                return None;
            }
            cur.bump();
            Some(Token::EndTag { name })
        }
        Some(b) if b.is_ascii_alphabetic() => {
            cur.bump();
            read_start_tag(cur)
        }
        _ => None,
    }
}

fn read_name(cur: &mut Cursor<'_>) -> String {
    let start = cur.i;
    cur.bump_while(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b':');
    cur.slice_from(start).to_ascii_lowercase()
}

fn read_start_tag(cur: &mut Cursor<'_>) -> Option<Token> {
    let name = read_name(cur);
    let mut attrs = Vec::new();

    loop {
        cur.bump_while(|b| b.is_ascii_whitespace());
        match cur.peek()? {
            b'>' => {
                cur.bump();
                return Some(Token::StartTag {
                    name,
                    attrs,
                    self_closing: false,
                });
            }
            b'/' if cur.peek_at(1) == Some(b'>') => {
                cur.bump_n(2);
                return Some(Token::StartTag {
                    name,
                    attrs,
                    self_closing: true,
                });
            }
            b'/' => {
                cur.bump();
            }
            _ => {
                let attr_start = cur.i;
                cur.bump_while(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'));
                let attr_name = cur.slice_from(attr_start).to_ascii_lowercase();
                if attr_name.is_empty() {
                    // lone `=` or similar; skip it
                    cur.bump();
                    continue;
                }
                cur.bump_while(|b| b.is_ascii_whitespace());
                let value = if cur.peek() == Some(b'=') {
                    cur.bump();
                    cur.bump_while(|b| b.is_ascii_whitespace());
                    read_attr_value(cur)?
                } else {
                    String::new()
                };
                attrs.push((attr_name, value));
            }
        }
    }
}

fn read_attr_value(cur: &mut Cursor<'_>) -> Option<String> {
    let raw = match cur.peek()? {
        quote @ (b'"' | b'\'') => {
            cur.bump();
            let start = cur.i;
            if !cur.seek(&[quote]) {
                return None;
            }
            let raw = cur.slice_from(start);
            cur.bump();
            raw
        }
        _ => {
            let start = cur.i;
            cur.bump_while(|b| !b.is_ascii_whitespace() && b != b'>');
            cur.slice_from(start)
        }
    };
    Some(html_escape::decode_html_entities(raw).into_owned())
}
