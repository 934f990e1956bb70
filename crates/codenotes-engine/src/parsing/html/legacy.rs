use super::HtmlError;
use super::tree::{Element, Node, parse_fragment, sanitize};
use crate::media;
use crate::models::{BlockDraft, BlockKind, ImageData};

/// Reads a legacy HTML note into block drafts.
///
/// Walks the fragment top down; the first rule matching an element wins and
/// the children of a matched element are not walked again. Elements without
/// text are dropped, so an all-empty fragment yields no drafts.
pub fn parse_legacy_html(input: &str) -> Result<Vec<BlockDraft>, HtmlError> {
    let mut nodes = parse_fragment(input.trim())?;
    sanitize(&mut nodes);

    let mut out = Vec::new();
    walk(&nodes, None, &mut out);
    Ok(out)
}

fn walk(nodes: &[Node], parent: Option<&Element>, out: &mut Vec<BlockDraft>) {
    for node in nodes {
        match node {
            Node::Text(text) => push_text(out, BlockKind::Text, text),
            Node::Element(element) => read_element(element, parent, out),
        }
    }
}

fn read_element(e: &Element, parent: Option<&Element>, out: &mut Vec<BlockDraft>) {
    match e.name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = e.name[1..].parse().unwrap_or(1);
            push_text(out, BlockKind::Heading { level }, &e.text_content());
        }
        "ul" | "ol" => {
            let kind = if e.name == "ul" {
                BlockKind::Bullet { level: 0 }
            } else {
                BlockKind::Numbered { level: 0 }
            };
            for item in e.child_elements().filter(|c| c.name == "li") {
                push_text(out, kind.clone(), &item.text_content());
            }
        }
        "blockquote" => push_text(out, BlockKind::Quote, &e.text_content()),
        "pre" | "code" => {
            let language = code_language(e);
            push_text(out, BlockKind::Code { language }, &e.text_content());
        }
        "p" => {
            if !parent.is_some_and(|p| p.name == "li") {
                push_text(out, BlockKind::Text, &e.text_content());
            }
        }
        // a list item outside any list
        "li" => push_text(out, BlockKind::Text, &e.text_content()),
        "hr" => out.push(BlockDraft::new(BlockKind::Divider, "")),
        "img" => {
            if let Some(image) = image_from_img(e) {
                out.push(BlockDraft::new(BlockKind::Image(image), ""));
            }
        }
        "br" => {}
        "div" if e.has_class("media-block") => match media_block(e) {
            Some(draft) => out.push(draft),
            None => walk(&e.children, Some(e), out),
        },
        _ => walk(&e.children, Some(e), out),
    }
}

fn push_text(out: &mut Vec<BlockDraft>, kind: BlockKind, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        out.push(BlockDraft::new(kind, text));
    }
}

/// Language from a `language-*` / `lang-*` class on the element or its `<code>` child.
fn code_language(e: &Element) -> Option<String> {
    let from_class = |el: &Element| {
        el.attr("class")?
            .split_ascii_whitespace()
            .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    };
    from_class(e).or_else(|| e.find(&|c| c.name == "code").and_then(from_class))
}

fn image_from_img(img: &Element) -> Option<ImageData> {
    let src = img.attr("src").map(str::trim).filter(|s| !s.is_empty())?;
    Some(ImageData {
        src: src.to_string(),
        alt: img.attr("alt").unwrap_or_default().to_string(),
        description: img.attr("title").unwrap_or_default().to_string(),
    })
}

/// `<div class="media-block" data-type="image|youtube">` as written by the
/// media widgets.
fn media_block(e: &Element) -> Option<BlockDraft> {
    let description = e
        .find(&|c| c.has_class("media-description"))
        .map(|d| d.text_content().trim().to_string())
        .or_else(|| e.attr("data-description").map(str::to_string))
        .unwrap_or_default();

    match e.attr("data-type")? {
        "image" => {
            let img = e.find(&|c| c.name == "img")?;
            let mut image = image_from_img(img)?;
            image.description = description;
            Some(BlockDraft::new(BlockKind::Image(image), ""))
        }
        "youtube" | "video" => {
            let video = match e.attr("data-video-id").filter(|id| !id.is_empty()) {
                Some(id) => media::video_from_id(id, &description),
                None => media::video_from_url(e.attr("data-video-url")?, &description)?,
            };
            Some(BlockDraft::new(BlockKind::Video(video), ""))
        }
        _ => None,
    }
}
