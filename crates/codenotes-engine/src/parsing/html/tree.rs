use super::HtmlError;
use super::tokenizer::{Token, tokenize};

/// Nesting depth past which a fragment is rejected.
pub const MAX_DEPTH: usize = 256;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Start tags that implicitly close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "p", "div", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "hr",
    "table", "section", "article",
];

/// Elements removed (with their content) before any content is read.
const DANGEROUS_ELEMENTS: &[&str] = &[
    "script", "style", "object", "embed", "iframe", "form", "input", "noscript",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            name,
            attrs,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First descendant element (depth first) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated descendant text; `<br>` contributes a newline.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, &|_| false);
        out
    }

    /// Like [`Element::text_content`] but skipping subtrees for which
    /// `skip` returns true.
    pub fn text_content_except(&self, skip: &dyn Fn(&Element) -> bool) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, skip);
        out
    }

    fn collect_text(&self, out: &mut String, skip: &dyn Fn(&Element) -> bool) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) if e.name == "br" => out.push('\n'),
                Node::Element(e) if !skip(e) => e.collect_text(out, skip),
                Node::Element(_) => {}
            }
        }
    }
}

/// Parses an HTML fragment into a forest of nodes.
///
/// Recovers from sloppy markup the way browsers do for the cases legacy
/// content contains: unclosed `<p>` and `<li>`, stray end tags and elements
/// left open at the end are all tolerated.
pub fn parse_fragment(input: &str) -> Result<Vec<Node>, HtmlError> {
    let mut stack: Vec<Element> = vec![Element::new(String::new(), Vec::new())];

    for token in tokenize(input) {
        match token {
            Token::Text(text) => append_text(&mut stack, text),
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                if CLOSES_PARAGRAPH.contains(&name.as_str()) {
                    close_open_paragraph(&mut stack);
                }
                if name == "li" {
                    close_open_list_item(&mut stack);
                }

                let element = Element::new(name, attrs);
                if self_closing || VOID_ELEMENTS.contains(&element.name.as_str()) {
                    append(&mut stack, Node::Element(element));
                } else {
                    if stack.len() > MAX_DEPTH {
                        return Err(HtmlError::TooDeep { limit: MAX_DEPTH });
                    }
                    stack.push(element);
                }
            }
            Token::EndTag { name } => {
                let open = stack.iter().skip(1).rposition(|e| e.name == name);
                if let Some(index) = open {
                    close_until(&mut stack, index + 1);
                }
            }
        }
    }

    close_until(&mut stack, 1);
    Ok(stack.pop().map(|root| root.children).unwrap_or_default())
}

/// Removes dangerous elements and inline event handler attributes.
pub fn sanitize(nodes: &mut Vec<Node>) {
    nodes.retain(|node| match node {
        Node::Element(e) => !DANGEROUS_ELEMENTS.contains(&e.name.as_str()),
        Node::Text(_) => true,
    });
    for node in nodes.iter_mut() {
        if let Node::Element(e) = node {
            e.attrs.retain(|(name, _)| !name.starts_with("on"));
            sanitize(&mut e.children);
        }
    }
}

fn append(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn append_text(stack: &mut [Element], text: String) {
    if let Some(parent) = stack.last_mut() {
        if let Some(Node::Text(prev)) = parent.children.last_mut() {
            prev.push_str(&text);
        } else {
            parent.children.push(Node::Text(text));
        }
    }
}

/// Pops elements until the stack has `len` entries, attaching each popped
/// element to its parent.
fn close_until(stack: &mut Vec<Element>, len: usize) {
    while stack.len() > len.max(1) {
        if let Some(element) = stack.pop() {
            append(stack, Node::Element(element));
        }
    }
}

fn close_open_paragraph(stack: &mut Vec<Element>) {
    if stack.last().is_some_and(|e| e.name == "p") {
        let len = stack.len() - 1;
        close_until(stack, len);
    }
}

fn close_open_list_item(stack: &mut Vec<Element>) {
    let open_li = stack
        .iter()
        .rposition(|e| matches!(e.name.as_str(), "li" | "ul" | "ol"))
        .filter(|&i| stack[i].name == "li");
    if let Some(index) = open_li {
        close_until(stack, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element_names(nodes: &[Node]) -> Vec<&str> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e.name.as_str()),
                Node::Text(_) => None,
            })
            .collect()
    }

    fn first_element(nodes: &[Node]) -> &Element {
        nodes
            .iter()
            .find_map(|n| match n {
                Node::Element(e) => Some(e),
                Node::Text(_) => None,
            })
            .unwrap()
    }

    #[test]
    fn test_unclosed_paragraphs_are_siblings() {
        let nodes = parse_fragment("<p>one<p>two").unwrap();
        assert_eq!(element_names(&nodes), vec!["p", "p"]);
    }

    #[test]
    fn test_unclosed_list_items_are_siblings() {
        let nodes = parse_fragment("<ul><li>a<li>b</ul>").unwrap();
        let ul = first_element(&nodes);
        let names: Vec<_> = ul.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["li", "li"]);
    }

    #[test]
    fn test_nested_list_stays_inside_item() {
        let nodes = parse_fragment("<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>").unwrap();
        let ul = first_element(&nodes);
        let items: Vec<_> = ul.child_elements().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text_content(), "ab");
        assert_eq!(
            items[0].text_content_except(&|e| e.name == "ul" || e.name == "ol"),
            "a"
        );
    }

    #[test]
    fn test_stray_end_tags_are_ignored() {
        let nodes = parse_fragment("</div><p>text</span></p>").unwrap();
        assert_eq!(element_names(&nodes), vec!["p"]);
        assert_eq!(first_element(&nodes).text_content(), "text");
    }

    #[test]
    fn test_br_is_newline_in_text_content() {
        let nodes = parse_fragment("<p>a<br>b</p>").unwrap();
        assert_eq!(first_element(&nodes).text_content(), "a\nb");
    }

    #[test]
    fn test_too_deep_is_an_error() {
        let input = "<div>".repeat(MAX_DEPTH + 5);
        assert_eq!(
            parse_fragment(&input),
            Err(HtmlError::TooDeep { limit: MAX_DEPTH })
        );
    }

    #[test]
    fn test_sanitize_removes_scripts_and_handlers() {
        let mut nodes =
            parse_fragment("<p onclick=\"x()\">hi</p><script>alert(1)</script><iframe src=x></iframe>")
                .unwrap();
        sanitize(&mut nodes);
        assert_eq!(element_names(&nodes), vec!["p"]);
        assert!(first_element(&nodes).attrs.is_empty());
    }

    #[test]
    fn test_find_descendant() {
        let nodes = parse_fragment("<div><span><img src=\"a.png\"></span></div>").unwrap();
        let img = first_element(&nodes).find(&|e| e.name == "img").unwrap();
        assert_eq!(img.attr("src"), Some("a.png"));
    }
}
