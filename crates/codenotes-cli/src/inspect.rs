use std::fmt::Write as _;

use anyhow::{Result, anyhow};
use codenotes_engine::convert::ListGrouping;
use codenotes_engine::editing::ordinal;
use codenotes_engine::models::{Block, BlockKind, Document};
use codenotes_engine::parsing::load_document;
use codenotes_engine::persistence::{StorageFormat, serialize};

/// Human-readable report of what a stored note field contains.
pub fn inspect(raw: &str) -> String {
    let loaded = load_document(Some(raw));
    let mut out = String::new();

    let _ = writeln!(out, "format: {}", loaded.format.as_str());
    for warning in &loaded.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    let _ = writeln!(out, "blocks: {}", loaded.document.len());
    for block in loaded.document.blocks() {
        let _ = writeln!(out, "  {}", describe(&loaded.document, block));
    }
    out
}

fn describe(doc: &Document, block: &Block) -> String {
    let detail = match &block.kind {
        BlockKind::Heading { level } => format!(" h{level}"),
        BlockKind::Bullet { level } => format!(" level {level}"),
        BlockKind::Numbered { level } => {
            let n = ordinal(doc, block.id).unwrap_or(1);
            format!(" level {level} #{n}")
        }
        BlockKind::Todo { level, checked } => {
            format!(" level {level}{}", if *checked { " checked" } else { "" })
        }
        BlockKind::Code { language: Some(language) } => format!(" {language}"),
        BlockKind::Image(image) => format!(" src={}", image.src),
        BlockKind::Video(video) => format!(" url={}", video.video_url),
        _ => String::new(),
    };
    format!(
        "#{} {}{detail}: {:?}",
        block.id.0,
        block.block_type().as_str(),
        block.content
    )
}

/// Re-serializes a stored note field into `format`.
pub fn convert(raw: &str, format: &str, grouping: ListGrouping) -> Result<String> {
    let format = StorageFormat::from_name(format)
        .ok_or_else(|| anyhow!("Unknown format `{format}`, expected `flat` or `nested`"))?;
    let loaded = load_document(Some(raw));
    Ok(serialize(&loaded.document, format, grouping)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inspect_reports_format_and_blocks() {
        let report = inspect("<h1>Title</h1><ul><li>one</li></ul>");

        assert_eq!(
            report,
            "format: legacy html\nblocks: 2\n  #1 heading h1: \"Title\"\n  #2 bullet level 0: \"one\"\n"
        );
    }

    #[test]
    fn test_inspect_numbers_rows() {
        let report = inspect("<ol><li>sort</li><li>sweep</li></ol>");

        assert_eq!(
            report,
            "format: legacy html\nblocks: 2\n  #1 numbered level 0 #1: \"sort\"\n  #2 numbered level 0 #2: \"sweep\"\n"
        );
    }

    #[test]
    fn test_convert_to_flat() {
        let flat = convert("just text", "flat", ListGrouping::default()).unwrap();
        assert_eq!(flat, r#"[{"id":1,"type":"text","content":"just text"}]"#);
    }

    #[test]
    fn test_convert_rejects_unknown_format() {
        assert!(convert("x", "yaml", ListGrouping::default()).is_err());
    }
}
