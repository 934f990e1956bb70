use std::sync::OnceLock;

use regex::Regex;

use crate::models::BlockDraft;

fn paragraph_break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("Invalid paragraph break regex"))
}

/// Splits plain text into text blocks.
///
/// Literal `\n` escape sequences (a backslash followed by `n`, as left behind
/// by double-encoded saves) become real newlines first. Paragraphs are
/// separated by blank lines; the lines of one paragraph are joined with a
/// single space. Blank paragraphs are dropped, so whitespace-only input
/// yields no blocks at all.
pub fn parse_plain_text(input: &str) -> Vec<BlockDraft> {
    let text = input.replace("\\n", "\n");

    paragraph_break_regex()
        .split(&text)
        .filter_map(|paragraph| {
            let joined = paragraph
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let joined = joined.trim();
            (!joined.is_empty()).then(|| BlockDraft::text(joined))
        })
        .collect()
}
